//! Shared types, error model, and configuration for classgrab.
//!
//! This crate is the foundation depended on by all other classgrab crates.
//! It provides:
//! - [`ClassgrabError`] — the unified error type
//! - Domain types ([`CourseSummary`], [`ScoreBlock`], [`CourseRecord`], ...)
//! - Configuration ([`AppConfig`], selector/marker overrides, config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FetchConfig, MarkerConfig, OutputConfig, PortalConfig, SelectorConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, session_cookie,
};
pub use error::{ClassgrabError, Result};
pub use types::{
    Assessment, CourseRecord, CourseSummary, GroupSet, MaterialEntry, NumericOrText, ScoreBlock,
    ScrapeRun,
};
