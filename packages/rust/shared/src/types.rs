//! Core domain types for scraped classroom records.
//!
//! All of these are immutable value objects: created fresh on every scrape
//! run, never mutated, and replaced wholesale on the next run. The JSON
//! shape (`course` / `scores` / `materials` / `groups` keys, numeric-or-text
//! values serialized bare) is the interchange format consumed by the
//! presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// NumericOrText
// ---------------------------------------------------------------------------

/// A portal value that may or may not be numeric (grades, scores, ECTS).
///
/// Text that round-trips through float parsing after comma→period
/// normalization is stored as [`NumericOrText::Number`]; anything else keeps
/// the trimmed original text verbatim. Serializes untagged — a bare JSON
/// number or string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericOrText {
    Number(f64),
    Text(String),
}

impl NumericOrText {
    /// The numeric value, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl From<f64> for NumericOrText {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for NumericOrText {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Course listing
// ---------------------------------------------------------------------------

/// One data row of the main course table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSummary {
    /// Course name. May legitimately be empty when the portal renders an
    /// empty cell; that is data, not an error.
    pub name: String,
    /// Grade as shown in the listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<NumericOrText>,
    /// ECTS credits for the course.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ects: Option<NumericOrText>,
    /// Absolute URL of the course landing page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

/// A single graded component from the scores tab.
///
/// Document order is significant — the assessment breakdown is displayed
/// positionally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Component label, e.g. `"Midterm (max. 30)"`.
    pub component: String,
    /// Raw score text; numeric interpretation is the consumer's job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
    /// Maximum points parsed out of a `max N` annotation in the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_points: Option<f64>,
}

/// Parsed scores tab: grading-group metadata plus the ordered assessments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBlock {
    /// Grading group name, stripped of the "Group" marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// The lector teaching this group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lector: Option<String>,
    /// Graded components in document order.
    #[serde(default)]
    pub assessments: Vec<Assessment>,
}

// ---------------------------------------------------------------------------
// Materials and groups
// ---------------------------------------------------------------------------

/// One entry from the files tab. `name` is always non-empty; either URL may
/// be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialEntry {
    pub name: String,
    /// Absolute URL of an uploaded file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Absolute URL of an external resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
}

/// Group memberships from the groups tab, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSet {
    #[serde(default)]
    pub groups: Vec<String>,
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Everything scraped for one course: the listing row plus the merged output
/// of the scores/files/groups tab parsers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub course: CourseSummary,
    #[serde(default)]
    pub scores: ScoreBlock,
    #[serde(default)]
    pub materials: Vec<MaterialEntry>,
    #[serde(default)]
    pub groups: GroupSet,
}

impl CourseRecord {
    /// An all-defaults record for a course with no landing page URL or whose
    /// tabs could not be fetched.
    pub fn empty(course: CourseSummary) -> Self {
        Self {
            course,
            scores: ScoreBlock::default(),
            materials: Vec::new(),
            groups: GroupSet::default(),
        }
    }
}

/// The full output of one scrape run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeRun {
    /// Program-wide ECTS total from the listing's aggregate row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_ects: Option<NumericOrText>,
    /// One record per course, in listing order.
    pub courses: Vec<CourseRecord>,
    /// When this run completed.
    pub scraped_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_or_text_serializes_bare() {
        let n = NumericOrText::Number(6.0);
        assert_eq!(serde_json::to_string(&n).unwrap(), "6.0");

        let t = NumericOrText::Text("pass".into());
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"pass\"");
    }

    #[test]
    fn course_record_json_shape() {
        let record = CourseRecord::empty(CourseSummary {
            name: "Algebra".into(),
            grade: Some(NumericOrText::Number(91.0)),
            ects: Some(NumericOrText::Number(6.0)),
            url: Some("https://classroom.example.edu/course/1".into()),
        });

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["course"]["name"], "Algebra");
        assert_eq!(json["course"]["grade"], 91.0);
        assert!(json["scores"].is_object());
        assert!(json["materials"].is_array());
        assert!(json["groups"]["groups"].is_array());
    }

    #[test]
    fn score_block_default_is_all_absent() {
        let block = ScoreBlock::default();
        assert!(block.group.is_none());
        assert!(block.lector.is_none());
        assert!(block.assessments.is_empty());
    }

    #[test]
    fn scrape_run_roundtrip() {
        let run = ScrapeRun {
            total_ects: Some(NumericOrText::Number(60.0)),
            courses: vec![],
            scraped_at: Utc::now(),
        };

        let json = serde_json::to_string(&run).unwrap();
        let parsed: ScrapeRun = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.total_ects, Some(NumericOrText::Number(60.0)));
    }
}
