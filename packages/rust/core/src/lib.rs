//! Per-course aggregation and the scrape pipeline.
//!
//! This crate owns the decision logic around the pure parsers in
//! `classgrab-extract`: which sub-pages to fetch for each course, how to
//! merge their parsed output into one [`classgrab_shared::CourseRecord`],
//! and how to run the whole listing under a bounded concurrency limit.
//! All I/O goes through the [`PageFetcher`] and [`SyllabusSink`] seams.

pub mod aggregator;
pub mod fetch;
pub mod pipeline;

pub use aggregator::aggregate_course;
pub use fetch::{HttpFetcher, PageFetcher, SnapshotFetcher, SyllabusSink};
pub use pipeline::{ScrapeProgress, SilentProgress, run_scrape};
