//! Per-course aggregation protocol.
//!
//! For each course with a known URL: resolve its tabs from the landing page,
//! then run the four tab parsers over whatever sub-pages exist, merging their
//! output into one [`CourseRecord`]. The `files` parse depends on the lector
//! discovered by the `scores` parse (materials are scoped to the student's
//! own section), so those two fetches are sequential; `groups` and the
//! syllabus download have no such dependency and run concurrently with them.

use tracing::{debug, warn};
use url::Url;

use classgrab_extract::{
    CourseTab, PortalSelectors, extract_course_urls, parse_files, parse_groups, parse_scores,
};
use classgrab_shared::{CourseRecord, CourseSummary, GroupSet, MaterialEntry, ScoreBlock};

use crate::fetch::{PageFetcher, SyllabusSink};

/// Aggregate one course into a [`CourseRecord`].
///
/// Every fetch failure is caught per-tab and downgraded to that field's
/// empty default — partial data is still useful, and one broken tab must not
/// abort the course, let alone the run. A course with no URL yields an
/// all-defaults record without attempting any fetch.
pub async fn aggregate_course(
    course: CourseSummary,
    fetcher: &dyn PageFetcher,
    sink: Option<&dyn SyllabusSink>,
    sel: &PortalSelectors,
) -> CourseRecord {
    let Some(course_url) = course.url.as_deref() else {
        debug!(course = %course.name, "course has no URL, emitting defaults");
        return CourseRecord::empty(course);
    };
    let Ok(landing_url) = Url::parse(course_url) else {
        warn!(course = %course.name, url = course_url, "unparsable course URL");
        return CourseRecord::empty(course);
    };

    let landing_html = match fetcher.fetch_html(&landing_url).await {
        Ok(html) => html,
        Err(e) => {
            warn!(course = %course.name, error = %e, "failed to fetch course landing page");
            return CourseRecord::empty(course);
        }
    };

    let urls = extract_course_urls(&landing_html, sel);
    debug!(course = %course.name, tabs = urls.len(), "resolved course tabs");

    // scores → files are order-dependent: the files parse filters by the
    // lector the scores page names.
    let scores_then_files = async {
        let scores = match urls.get(&CourseTab::Scores) {
            Some(url) => fetch_scores(fetcher, url, sel).await,
            None => ScoreBlock::default(),
        };

        let materials = match urls.get(&CourseTab::Files) {
            Some(url) => fetch_materials(fetcher, url, scores.lector.as_deref(), sel).await,
            None => Vec::new(),
        };

        (scores, materials)
    };

    let groups_fut = async {
        match urls.get(&CourseTab::Groups) {
            Some(url) => fetch_groups(fetcher, url, sel).await,
            None => GroupSet::default(),
        }
    };

    let syllabus_fut = async {
        if let (Some(url), Some(sink)) = (urls.get(&CourseTab::SyllabusFile), sink) {
            store_syllabus(fetcher, sink, &course.name, url).await;
        }
    };

    let ((scores, materials), groups, ()) =
        tokio::join!(scores_then_files, groups_fut, syllabus_fut);

    CourseRecord {
        course,
        scores,
        materials,
        groups,
    }
}

async fn fetch_scores(fetcher: &dyn PageFetcher, url: &Url, sel: &PortalSelectors) -> ScoreBlock {
    match fetcher.fetch_html(url).await {
        Ok(html) => parse_scores(&html, sel),
        Err(e) => {
            warn!(%url, error = %e, "scores tab fetch failed");
            ScoreBlock::default()
        }
    }
}

async fn fetch_materials(
    fetcher: &dyn PageFetcher,
    url: &Url,
    my_lector: Option<&str>,
    sel: &PortalSelectors,
) -> Vec<MaterialEntry> {
    match fetcher.fetch_html(url).await {
        Ok(html) => parse_files(&html, my_lector, sel),
        Err(e) => {
            warn!(%url, error = %e, "files tab fetch failed");
            Vec::new()
        }
    }
}

async fn fetch_groups(fetcher: &dyn PageFetcher, url: &Url, sel: &PortalSelectors) -> GroupSet {
    match fetcher.fetch_html(url).await {
        Ok(html) => parse_groups(&html, sel),
        Err(e) => {
            warn!(%url, error = %e, "groups tab fetch failed");
            GroupSet::default()
        }
    }
}

async fn store_syllabus(
    fetcher: &dyn PageFetcher,
    sink: &dyn SyllabusSink,
    course_name: &str,
    url: &Url,
) {
    match fetcher.fetch_bytes(url).await {
        Ok(bytes) => {
            if let Err(e) = sink.store(course_name, url, &bytes) {
                warn!(%url, error = %e, "failed to store syllabus file");
            }
        }
        Err(e) => warn!(%url, error = %e, "syllabus file fetch failed"),
    }
}
