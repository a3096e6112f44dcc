//! Compiled selector bundle shared by all parsers.
//!
//! Selector strings arrive from [`classgrab_shared::config`] so markup drift
//! is fixable without code changes; they are compiled once here, and an
//! invalid selector is a load-time error rather than a panic mid-parse.

use scraper::Selector;
use url::Url;

use classgrab_shared::config::{MarkerConfig, PortalConfig};
use classgrab_shared::{ClassgrabError, Result};

/// All configurable document-region selectors, compiled, plus the marker
/// phrases and the portal base URL used for href resolution.
#[derive(Debug, Clone)]
pub struct PortalSelectors {
    /// Portal root; relative hrefs are joined against this.
    pub base: Url,
    pub course_table: Selector,
    pub tabs_container: Selector,
    pub syllabus_file_anchor: Selector,
    pub scores_heading: Selector,
    pub scores_table: Selector,
    pub files_table: Selector,
    pub groups_table: Selector,
    pub lector_anchor: Selector,
    pub uploads_anchor: Selector,
    pub markers: MarkerConfig,
}

impl PortalSelectors {
    /// Compile the selector strings from a portal config.
    pub fn compile(portal: &PortalConfig) -> Result<Self> {
        let base = Url::parse(&portal.base_url)
            .map_err(|e| ClassgrabError::config(format!("bad base_url: {e}")))?;
        let s = &portal.selectors;

        Ok(Self {
            base,
            course_table: compile_one("course_table", &s.course_table)?,
            tabs_container: compile_one("tabs_container", &s.tabs_container)?,
            syllabus_file_anchor: compile_one("syllabus_file_anchor", &s.syllabus_file_anchor)?,
            scores_heading: compile_one("scores_heading", &s.scores_heading)?,
            scores_table: compile_one("scores_table", &s.scores_table)?,
            files_table: compile_one("files_table", &s.files_table)?,
            groups_table: compile_one("groups_table", &s.groups_table)?,
            lector_anchor: compile_one("lector_anchor", &s.lector_anchor)?,
            uploads_anchor: compile_one("uploads_anchor", &s.uploads_anchor)?,
            markers: portal.markers.clone(),
        })
    }

    /// Resolve an href to absolute form against the portal base.
    /// Absolute hrefs pass through unchanged; unresolvable ones are dropped.
    pub(crate) fn absolutize(&self, href: &str) -> Option<String> {
        self.base.join(href).ok().map(|u| u.to_string())
    }
}

fn compile_one(name: &str, selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| ClassgrabError::Selector(format!("{name} ({selector:?}): {e}")))
}
