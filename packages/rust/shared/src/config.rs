//! Application configuration for classgrab.
//!
//! User config lives at `~/.classgrab/classgrab.toml`. CLI flags override
//! config file values, which override defaults.
//!
//! Every structural selector and marker phrase the parsers depend on lives
//! here so that portal markup drift is fixable by editing the config file,
//! not the code.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ClassgrabError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "classgrab.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".classgrab";

// ---------------------------------------------------------------------------
// Config structs (matching classgrab.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Portal location and structural markers.
    #[serde(default)]
    pub portal: PortalConfig,

    /// Fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Output locations.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[portal]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Portal root; relative hrefs are resolved against this.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the student's course-listing page, relative to `base_url`.
    #[serde(default = "default_courses_path")]
    pub courses_path: String,

    /// CSS selectors locating the relevant document regions.
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Marker phrases and row classes used to classify table rows.
    #[serde(default)]
    pub markers: MarkerConfig,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            courses_path: default_courses_path(),
            selectors: SelectorConfig::default(),
            markers: MarkerConfig::default(),
        }
    }
}

fn default_base_url() -> String {
    "https://classroom.btu.edu.ge".into()
}
fn default_courses_path() -> String {
    "/en/student/me/courses".into()
}

/// `[portal.selectors]` section — CSS selectors for document regions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// The unique course-listing table.
    #[serde(default = "default_course_table")]
    pub course_table: String,

    /// Container holding the course sub-page tab links.
    #[serde(default = "default_tabs_container")]
    pub tabs_container: String,

    /// Syllabus-file download anchor within the tabs container.
    #[serde(default = "default_syllabus_file_anchor")]
    pub syllabus_file_anchor: String,

    /// Heading above the scores table (group + lector).
    #[serde(default = "default_scores_heading")]
    pub scores_heading: String,

    /// The scores table itself.
    #[serde(default = "default_scores_table")]
    pub scores_table: String,

    /// The materials table on the files tab.
    #[serde(default = "default_files_table")]
    pub files_table: String,

    /// The groups table on the groups tab.
    #[serde(default = "default_groups_table")]
    pub groups_table: String,

    /// Anchor linking to a lector profile page.
    #[serde(default = "default_lector_anchor")]
    pub lector_anchor: String,

    /// Anchor linking to an uploaded file.
    #[serde(default = "default_uploads_anchor")]
    pub uploads_anchor: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            course_table: default_course_table(),
            tabs_container: default_tabs_container(),
            syllabus_file_anchor: default_syllabus_file_anchor(),
            scores_heading: default_scores_heading(),
            scores_table: default_scores_table(),
            files_table: default_files_table(),
            groups_table: default_groups_table(),
            lector_anchor: default_lector_anchor(),
            uploads_anchor: default_uploads_anchor(),
        }
    }
}

fn default_course_table() -> String {
    "table.table.table-striped.table-bordered.table-hover.fluid".into()
}
fn default_tabs_container() -> String {
    "#course_tabs".into()
}
fn default_syllabus_file_anchor() -> String {
    "a.syllabus_file".into()
}
fn default_scores_heading() -> String {
    ".tab_scores h4".into()
}
fn default_scores_table() -> String {
    ".tab_scores table".into()
}
fn default_files_table() -> String {
    "#files".into()
}
fn default_groups_table() -> String {
    "#groups".into()
}
fn default_lector_anchor() -> String {
    "a[href*='/lector/']".into()
}
fn default_uploads_anchor() -> String {
    "a[href*='/uploads/']".into()
}

/// `[portal.markers]` section — phrases and row classes the parsers match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Token marking the grading-group heading, stripped from the group name.
    #[serde(default = "default_group_token")]
    pub group_token: String,

    /// Component labels of summary rows excluded from assessments.
    #[serde(default = "default_reserved_labels")]
    pub reserved_labels: Vec<String>,

    /// Phrase marking the exam-eligibility summary row.
    #[serde(default = "default_eligibility_marker")]
    pub eligibility_marker: String,

    /// Sentinel text on placeholder group rows.
    #[serde(default = "default_not_found_sentinel")]
    pub not_found_sentinel: String,

    /// Row class marking a lector section header in the files table.
    #[serde(default = "default_info_row_class")]
    pub info_row_class: String,

    /// Row class marking placeholder rows in the groups table.
    #[serde(default = "default_warning_row_class")]
    pub warning_row_class: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            group_token: default_group_token(),
            reserved_labels: default_reserved_labels(),
            eligibility_marker: default_eligibility_marker(),
            not_found_sentinel: default_not_found_sentinel(),
            info_row_class: default_info_row_class(),
            warning_row_class: default_warning_row_class(),
        }
    }
}

fn default_group_token() -> String {
    "Group".into()
}
fn default_reserved_labels() -> Vec<String> {
    vec!["სულ".into(), "Credits".into()]
}
fn default_eligibility_marker() -> String {
    "გამოცდაზე გასვლის".into()
}
fn default_not_found_sentinel() -> String {
    "Not found".into()
}
fn default_info_row_class() -> String {
    "info".into()
}
fn default_warning_row_class() -> String {
    "warning".into()
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum courses aggregated concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Name of the env var holding the portal session cookie
    /// (never store the cookie itself).
    #[serde(default = "default_cookie_env")]
    pub cookie_env: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            concurrency: default_concurrency(),
            cookie_env: default_cookie_env(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_concurrency() -> u32 {
    4
}
fn default_cookie_env() -> String {
    "CLASSGRAB_SESSION".into()
}

/// `[output]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// When set, every fetched page body is snapshotted here for offline
    /// re-parsing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_dir: Option<String>,

    /// When set, one JSON file per course is written here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courses_dir: Option<String>,

    /// When set, discovered syllabus files are downloaded here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syllabus_dir: Option<String>,
}

impl PortalConfig {
    /// Absolute URL of the course-listing page.
    pub fn courses_url(&self) -> Result<url::Url> {
        let base = url::Url::parse(&self.base_url)
            .map_err(|e| ClassgrabError::config(format!("bad base_url: {e}")))?;
        base.join(&self.courses_path)
            .map_err(|e| ClassgrabError::config(format!("bad courses_path: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.classgrab/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ClassgrabError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.classgrab/classgrab.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ClassgrabError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ClassgrabError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ClassgrabError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ClassgrabError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ClassgrabError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the session cookie env var is set and non-empty.
pub fn session_cookie(config: &AppConfig) -> Result<String> {
    let var_name = &config.fetch.cookie_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(ClassgrabError::config(format!(
            "portal session cookie not found. Set the {var_name} environment variable \
             to the authenticated session cookie header."
        ))),
    }
}
