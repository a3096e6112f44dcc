//! Course landing-page tab discovery.

use std::collections::HashMap;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::selectors::PortalSelectors;

static ANCHOR_WITH_HREF: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector"));

/// The sub-pages a course landing page can link to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CourseTab {
    Syllabus,
    Groups,
    Scores,
    Files,
    /// Direct syllabus-file download, matched by its own structural marker
    /// rather than an href keyword.
    SyllabusFile,
}

impl CourseTab {
    /// Stable lowercase name, used as the JSON key for resolved tab URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Syllabus => "syllabus",
            Self::Groups => "groups",
            Self::Scores => "scores",
            Self::Files => "files",
            Self::SyllabusFile => "syllabus_file",
        }
    }
}

/// Fixed href keywords checked against every tab anchor. An href containing
/// several keywords registers under each of them.
const TAB_KEYWORDS: [(&str, CourseTab); 4] = [
    ("syllabus", CourseTab::Syllabus),
    ("groups", CourseTab::Groups),
    ("scores", CourseTab::Scores),
    ("files", CourseTab::Files),
];

/// Discover the sub-page URLs published on a course landing page.
///
/// Scans anchors within the tabs container and classifies them by href
/// substring; the syllabus download anchor is classified separately via its
/// selector. All URLs are resolved to absolute form. Missing tabs are absent
/// keys — not every course publishes every tab.
pub fn extract_course_urls(html: &str, sel: &PortalSelectors) -> HashMap<CourseTab, Url> {
    let doc = Html::parse_document(html);
    let mut urls = HashMap::new();

    let Some(container) = doc.select(&sel.tabs_container).next() else {
        debug!("tabs container not found on course page");
        return urls;
    };

    let mut syllabus_file_hrefs: Vec<&str> = Vec::new();
    for anchor in container.select(&sel.syllabus_file_anchor) {
        if let Some(href) = anchor.value().attr("href") {
            syllabus_file_hrefs.push(href);
            if let Some(url) = join(sel, href) {
                urls.insert(CourseTab::SyllabusFile, url);
            }
        }
    }

    for anchor in container.select(&ANCHOR_WITH_HREF) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if syllabus_file_hrefs.contains(&href) {
            continue;
        }
        for (keyword, tab) in TAB_KEYWORDS {
            if href.contains(keyword) {
                if let Some(url) = join(sel, href) {
                    urls.insert(tab, url);
                }
            }
        }
    }

    urls
}

fn join(sel: &PortalSelectors, href: &str) -> Option<Url> {
    sel.base.join(href).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use classgrab_shared::config::PortalConfig;

    fn selectors() -> PortalSelectors {
        PortalSelectors::compile(&PortalConfig::default()).unwrap()
    }

    #[test]
    fn no_container_yields_no_urls() {
        let urls = extract_course_urls("<html><body></body></html>", &selectors());
        assert!(urls.is_empty());
    }

    #[test]
    fn discovers_all_four_tabs() {
        let html = r#"<div id="course_tabs">
            <a href="/course/1/scores">Scores</a>
            <a href="/course/1/files">Materials</a>
            <a href="/course/1/groups">Groups</a>
            <a href="/course/1/syllabus">Syllabus</a>
        </div>"#;
        let urls = extract_course_urls(html, &selectors());

        assert_eq!(urls.len(), 4);
        assert_eq!(
            urls[&CourseTab::Scores].as_str(),
            "https://classroom.btu.edu.ge/course/1/scores"
        );
        assert_eq!(
            urls[&CourseTab::Files].as_str(),
            "https://classroom.btu.edu.ge/course/1/files"
        );
    }

    #[test]
    fn missing_tabs_are_absent_keys() {
        let html = r#"<div id="course_tabs"><a href="/course/2/scores">Scores</a></div>"#;
        let urls = extract_course_urls(html, &selectors());

        assert_eq!(urls.len(), 1);
        assert!(urls.contains_key(&CourseTab::Scores));
        assert!(!urls.contains_key(&CourseTab::Groups));
    }

    #[test]
    fn syllabus_download_is_classified_separately() {
        let html = r#"<div id="course_tabs">
            <a href="/course/3/syllabus">Syllabus</a>
            <a class="syllabus_file" href="/uploads/syllabus_3.pdf">Download</a>
        </div>"#;
        let urls = extract_course_urls(html, &selectors());

        assert_eq!(
            urls[&CourseTab::Syllabus].as_str(),
            "https://classroom.btu.edu.ge/course/3/syllabus"
        );
        assert_eq!(
            urls[&CourseTab::SyllabusFile].as_str(),
            "https://classroom.btu.edu.ge/uploads/syllabus_3.pdf"
        );
    }

    #[test]
    fn anchors_outside_the_container_are_ignored() {
        let html = r#"
            <a href="/elsewhere/scores">Not a tab</a>
            <div id="course_tabs"><a href="/course/4/files">Files</a></div>"#;
        let urls = extract_course_urls(html, &selectors());

        assert_eq!(urls.len(), 1);
        assert!(urls.contains_key(&CourseTab::Files));
    }
}
