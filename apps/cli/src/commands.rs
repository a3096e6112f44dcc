//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

use classgrab_core::{
    HttpFetcher, PageFetcher, ScrapeProgress, SnapshotFetcher, SyllabusSink, run_scrape,
};
use classgrab_extract::{
    PortalSelectors, extract_course_urls, parse_courses, parse_files, parse_groups, parse_scores,
};
use classgrab_shared::{init_config, load_config, session_cookie};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// classgrab — structured records out of a classroom portal.
#[derive(Parser)]
#[command(
    name = "classgrab",
    version,
    about = "Scrape a classroom portal into structured course records.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run a full scrape against the live portal.
    Scrape {
        /// Write the run JSON here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Also write one JSON file per course into this directory.
        #[arg(long)]
        courses_dir: Option<PathBuf>,

        /// Snapshot every fetched HTML page into this directory.
        #[arg(long)]
        html_dir: Option<PathBuf>,

        /// Download discovered syllabus files into this directory.
        #[arg(long)]
        syllabus_dir: Option<PathBuf>,

        /// Env var holding the portal session cookie.
        #[arg(long)]
        cookie_env: Option<String>,

        /// Maximum courses aggregated concurrently.
        #[arg(long)]
        concurrency: Option<u32>,

        /// Portal root URL override.
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Parse a saved portal page offline and print the result as JSON.
    Parse {
        /// Saved HTML file to parse.
        file: PathBuf,

        /// Which page kind the file is.
        #[arg(short, long, value_enum, default_value = "listing")]
        kind: PageKind,

        /// Lector name for files-tab scoping (materials outside this
        /// lector's section are dropped).
        #[arg(long)]
        lector: Option<String>,
    },

    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// The portal page kinds the offline parser understands.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum PageKind {
    /// The main course-listing page.
    Listing,
    /// A course landing page (tab discovery).
    Tabs,
    /// A scores sub-page.
    Scores,
    /// A files sub-page.
    Files,
    /// A groups sub-page.
    Groups,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a default config file to ~/.classgrab/classgrab.toml.
    Init,
    /// Print the effective configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing from the global CLI flags. Logs go to stderr so that
/// JSON output on stdout stays machine-readable.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::EnvFilter;

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,classgrab_cli={level},classgrab_core={level},classgrab_extract={level},classgrab_shared={level}"
        ))
    });

    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

// ---------------------------------------------------------------------------
// Command routing
// ---------------------------------------------------------------------------

/// Route and execute the parsed CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Scrape {
            out,
            courses_dir,
            html_dir,
            syllabus_dir,
            cookie_env,
            concurrency,
            base_url,
        } => {
            scrape(
                out,
                courses_dir,
                html_dir,
                syllabus_dir,
                cookie_env,
                concurrency,
                base_url,
            )
            .await
        }
        Command::Parse { file, kind, lector } => parse_offline(&file, kind, lector.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => {
                let path = init_config()?;
                println!("wrote {}", path.display());
                Ok(())
            }
            ConfigAction::Show => {
                let config = load_config()?;
                print!("{}", toml::to_string_pretty(&config)?);
                Ok(())
            }
        },
    }
}

// ---------------------------------------------------------------------------
// scrape
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
async fn scrape(
    out: Option<PathBuf>,
    courses_dir: Option<PathBuf>,
    html_dir: Option<PathBuf>,
    syllabus_dir: Option<PathBuf>,
    cookie_env: Option<String>,
    concurrency: Option<u32>,
    base_url: Option<String>,
) -> Result<()> {
    let mut config = load_config()?;

    // CLI flags override config file values.
    if let Some(env) = cookie_env {
        config.fetch.cookie_env = env;
    }
    if let Some(n) = concurrency {
        config.fetch.concurrency = n;
    }
    if let Some(url) = base_url {
        config.portal.base_url = url;
    }
    let html_dir = html_dir.or(config.output.html_dir.as_ref().map(PathBuf::from));
    let courses_dir = courses_dir.or(config.output.courses_dir.as_ref().map(PathBuf::from));
    let syllabus_dir = syllabus_dir.or(config.output.syllabus_dir.as_ref().map(PathBuf::from));

    let cookie = session_cookie(&config)?;
    let http = HttpFetcher::new(Duration::from_secs(config.fetch.timeout_secs), Some(cookie))?;

    let fetcher: Arc<dyn PageFetcher> = match html_dir {
        Some(dir) => Arc::new(SnapshotFetcher::new(http, dir)),
        None => Arc::new(http),
    };
    let sink: Option<Arc<dyn SyllabusSink>> =
        syllabus_dir.map(|dir| Arc::new(FsSyllabusSink { dir }) as Arc<dyn SyllabusSink>);

    let progress = BarProgress::new();
    let run = run_scrape(fetcher, sink, &config, &progress).await?;
    progress.finish();

    let json = serde_json::to_string_pretty(&run)?;
    match out {
        Some(path) => {
            std::fs::write(&path, &json)?;
            info!(path = %path.display(), "scrape run written");
        }
        None => println!("{json}"),
    }

    if let Some(dir) = courses_dir {
        std::fs::create_dir_all(&dir)?;
        for (i, record) in run.courses.iter().enumerate() {
            let name = format!("{:02}_{}.json", i + 1, slugify(&record.course.name));
            std::fs::write(dir.join(name), serde_json::to_string_pretty(record)?)?;
        }
        info!(dir = %dir.display(), count = run.courses.len(), "per-course JSON written");
    }

    Ok(())
}

/// Indicatif-backed progress reporter over the course listing.
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{pos}/{len}] {msg}")
                .expect("progress template"),
        );
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ScrapeProgress for BarProgress {
    fn listing_parsed(&self, course_count: usize) {
        self.bar.set_length(course_count as u64);
    }

    fn course_done(&self, name: &str, _current: usize, _total: usize) {
        self.bar.set_message(name.to_string());
        self.bar.inc(1);
    }
}

/// Stores syllabus payloads under a directory, named by the URL's file name.
struct FsSyllabusSink {
    dir: PathBuf,
}

impl SyllabusSink for FsSyllabusSink {
    fn store(&self, course_name: &str, url: &Url, bytes: &[u8]) -> classgrab_shared::Result<()> {
        let file_name = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}.bin", slugify(course_name)));

        std::fs::create_dir_all(&self.dir)
            .map_err(|e| classgrab_shared::ClassgrabError::io(&self.dir, e))?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, bytes)
            .map_err(|e| classgrab_shared::ClassgrabError::io(&path, e))?;

        info!(course = course_name, path = %path.display(), "syllabus stored");
        Ok(())
    }
}

/// Filesystem-safe slug from a course name.
fn slugify(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() { "course".into() } else { slug }
}

// ---------------------------------------------------------------------------
// parse (offline)
// ---------------------------------------------------------------------------

/// Re-parse a saved portal page without touching the network.
fn parse_offline(file: &Path, kind: PageKind, lector: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let sel = PortalSelectors::compile(&config.portal)?;
    let html = std::fs::read_to_string(file)
        .map_err(|e| eyre!("cannot read {}: {e}", file.display()))?;

    let value = match kind {
        PageKind::Listing => {
            let (courses, total_ects) = parse_courses(&html, &sel);
            serde_json::json!({ "courses": courses, "total_ects": total_ects })
        }
        PageKind::Tabs => {
            let urls = extract_course_urls(&html, &sel);
            let map: serde_json::Map<String, serde_json::Value> = urls
                .iter()
                .map(|(tab, url)| (tab.as_str().to_string(), url.as_str().into()))
                .collect();
            serde_json::Value::Object(map)
        }
        PageKind::Scores => serde_json::to_value(parse_scores(&html, &sel))?,
        PageKind::Files => serde_json::to_value(parse_files(&html, lector, &sel))?,
        PageKind::Groups => serde_json::to_value(parse_groups(&html, &sel))?,
    };

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_is_filesystem_safe() {
        assert_eq!(slugify("Calculus II (Fall)"), "calculus-ii-fall");
        assert_eq!(slugify(""), "course");
        assert_eq!(slugify("!!!"), "course");
    }

    #[test]
    fn cli_parses_scrape_flags() {
        let cli = Cli::try_parse_from([
            "classgrab",
            "scrape",
            "--concurrency",
            "8",
            "--base-url",
            "https://portal.example.edu",
        ])
        .expect("parse args");

        match cli.command {
            Command::Scrape {
                concurrency,
                base_url,
                ..
            } => {
                assert_eq!(concurrency, Some(8));
                assert_eq!(base_url.as_deref(), Some("https://portal.example.edu"));
            }
            _ => panic!("expected scrape command"),
        }
    }

    #[test]
    fn cli_parses_offline_parse_command() {
        let cli = Cli::try_parse_from([
            "classgrab", "parse", "saved.html", "--kind", "scores",
        ])
        .expect("parse args");

        match cli.command {
            Command::Parse { kind, .. } => {
                assert!(matches!(kind, PageKind::Scores));
            }
            _ => panic!("expected parse command"),
        }
    }
}
