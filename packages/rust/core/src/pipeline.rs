//! Full scrape run: listing → per-course aggregation → [`ScrapeRun`].

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

use classgrab_extract::{PortalSelectors, parse_courses};
use classgrab_shared::{AppConfig, CourseRecord, Result, ScrapeRun};

use crate::aggregator::aggregate_course;
use crate::fetch::{PageFetcher, SyllabusSink};

/// Progress callback for reporting scrape status.
pub trait ScrapeProgress: Send + Sync {
    /// Called once the course listing has been parsed.
    fn listing_parsed(&self, course_count: usize);
    /// Called when a course record has been assembled.
    fn course_done(&self, name: &str, current: usize, total: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ScrapeProgress for SilentProgress {
    fn listing_parsed(&self, _course_count: usize) {}
    fn course_done(&self, _name: &str, _current: usize, _total: usize) {}
}

/// Run one full scrape.
///
/// Fetches the course-listing page, parses it, and aggregates every course
/// under a bounded concurrency limit. Per-course work is independent, so
/// courses run concurrently up to `fetch.concurrency`; output order equals
/// listing order regardless of completion order. The run completes even when
/// individual courses degrade — only a failure to reach the listing itself
/// (or invalid config) is an error.
#[instrument(skip_all)]
pub async fn run_scrape(
    fetcher: Arc<dyn PageFetcher>,
    sink: Option<Arc<dyn SyllabusSink>>,
    config: &AppConfig,
    progress: &dyn ScrapeProgress,
) -> Result<ScrapeRun> {
    let sel = Arc::new(PortalSelectors::compile(&config.portal)?);
    let listing_url = config.portal.courses_url()?;

    info!(url = %listing_url, "fetching course listing");
    let listing_html = fetcher.fetch_html(&listing_url).await?;

    let (courses, total_ects) = parse_courses(&listing_html, &sel);
    progress.listing_parsed(courses.len());
    info!(courses = courses.len(), total_ects = ?total_ects, "listing parsed");

    let total = courses.len();
    let semaphore = Arc::new(Semaphore::new(config.fetch.concurrency.max(1) as usize));
    let mut handles = Vec::with_capacity(total);

    for (index, course) in courses.into_iter().enumerate() {
        let fetcher = fetcher.clone();
        let sink = sink.clone();
        let sel = sel.clone();
        let semaphore = semaphore.clone();

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire().await.expect("semaphore closed");
            let record =
                aggregate_course(course, fetcher.as_ref(), sink.as_deref(), &sel).await;
            (index, record)
        }));
    }

    let mut records: Vec<(usize, CourseRecord)> = Vec::with_capacity(total);
    for handle in handles {
        match handle.await {
            Ok((index, record)) => {
                progress.course_done(&record.course.name, records.len() + 1, total);
                records.push((index, record));
            }
            Err(e) => warn!(error = %e, "course aggregation task panicked"),
        }
    }

    // Restore listing order; tasks complete in whatever order the permits allow.
    records.sort_by_key(|(index, _)| *index);
    let courses: Vec<CourseRecord> = records.into_iter().map(|(_, record)| record).collect();

    let run = ScrapeRun {
        total_ects,
        courses,
        scraped_at: Utc::now(),
    };

    info!(courses = run.courses.len(), "scrape run complete");
    Ok(run)
}
