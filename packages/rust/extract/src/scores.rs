//! Scores-tab parser: grading-group metadata and assessment breakdown.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use classgrab_shared::{Assessment, ScoreBlock};

use crate::selectors::PortalSelectors;
use crate::text::{collapsed_text, spaced_text};

static BODY_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tbody tr").expect("row selector"));
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("cell selector"));

/// Matches a `max N` annotation inside a component label, e.g.
/// `"Midterm (max. 30)"` or `"Quiz max 2,5"`. Comma or period decimals.
static MAX_POINTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)max\.?\s*([\d.,]+)").expect("max-points regex"));

/// Parse a scores sub-page into a [`ScoreBlock`].
///
/// The heading yields the grading group (prefix before the first `" - "`,
/// with the group marker token stripped) and the lector (profile anchor
/// inside the heading). Two-cell body rows become assessments, except the
/// reserved total/credits labels and the exam-eligibility summary row, which
/// are summary rows rather than graded components.
pub fn parse_scores(html: &str, sel: &PortalSelectors) -> ScoreBlock {
    let doc = Html::parse_document(html);
    let markers = &sel.markers;
    let mut block = ScoreBlock::default();

    if let Some(heading) = doc.select(&sel.scores_heading).next() {
        let text = spaced_text(heading);
        if text.contains(&markers.group_token) {
            let prefix = text.splitn(2, " - ").next().unwrap_or(&text);
            block.group = Some(prefix.replace(&markers.group_token, "").trim().to_string());
        }
        if let Some(lector) = heading.select(&sel.lector_anchor).next() {
            block.lector = Some(collapsed_text(lector));
        }
    }

    let Some(table) = doc.select(&sel.scores_table).next() else {
        return block;
    };

    for row in table.select(&BODY_ROW) {
        let cells: Vec<_> = row.select(&CELL).collect();
        if cells.len() != 2 {
            continue;
        }

        let component = collapsed_text(cells[0]);
        let score = collapsed_text(cells[1]);

        if markers.reserved_labels.iter().any(|l| *l == component)
            || component.contains(&markers.eligibility_marker)
        {
            continue;
        }

        block.assessments.push(Assessment {
            max_points: max_points(&component),
            component,
            score: if score.is_empty() { None } else { Some(score) },
        });
    }

    block
}

/// Extract the numeric part of a `max N` annotation. A malformed numeral
/// inside a matched pattern is swallowed — garbled annotations are common
/// and must not abort the parse.
fn max_points(component: &str) -> Option<f64> {
    let caps = MAX_POINTS_RE.captures(component)?;
    caps[1].replace(',', ".").parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use classgrab_shared::config::PortalConfig;

    fn selectors() -> PortalSelectors {
        PortalSelectors::compile(&PortalConfig::default()).unwrap()
    }

    fn scores_page(heading: &str, rows: &str) -> String {
        format!(
            r#"<div class="tab_scores">
                 <h4>{heading}</h4>
                 <table><tbody>{rows}</tbody></table>
               </div>"#
        )
    }

    #[test]
    fn empty_page_yields_default_block() {
        let block = parse_scores("<html></html>", &selectors());
        assert_eq!(block, ScoreBlock::default());
    }

    #[test]
    fn heading_yields_group_and_lector() {
        let html = scores_page(
            r#"Group 1103 - <a href="/en/lector/42">John Smith</a>"#,
            "",
        );
        let block = parse_scores(&html, &selectors());

        assert_eq!(block.group.as_deref(), Some("1103"));
        assert_eq!(block.lector.as_deref(), Some("John Smith"));
    }

    #[test]
    fn heading_without_group_token_leaves_group_absent() {
        let html = scores_page(r#"<a href="/en/lector/42">John Smith</a>"#, "");
        let block = parse_scores(&html, &selectors());

        assert!(block.group.is_none());
        assert_eq!(block.lector.as_deref(), Some("John Smith"));
    }

    #[test]
    fn max_points_with_comma_decimal() {
        let html = scores_page(
            "Group 1",
            r#"<tr><td>Midterm (max. 30)</td><td>28,5</td></tr>"#,
        );
        let block = parse_scores(&html, &selectors());

        assert_eq!(block.assessments.len(), 1);
        let a = &block.assessments[0];
        assert_eq!(a.component, "Midterm (max. 30)");
        assert_eq!(a.score.as_deref(), Some("28,5"));
        assert_eq!(a.max_points, Some(30.0));
    }

    #[test]
    fn max_without_period_and_case_insensitive() {
        let html = scores_page("Group 1", r#"<tr><td>Quiz MAX 2,5</td><td></td></tr>"#);
        let block = parse_scores(&html, &selectors());

        let a = &block.assessments[0];
        assert_eq!(a.max_points, Some(2.5));
        // Empty score cell is absent, not an empty string.
        assert!(a.score.is_none());
    }

    #[test]
    fn malformed_max_numeral_is_swallowed() {
        let html = scores_page("Group 1", r#"<tr><td>Lab max 1.2.3</td><td>1</td></tr>"#);
        let block = parse_scores(&html, &selectors());

        assert_eq!(block.assessments[0].max_points, None);
        assert_eq!(block.assessments[0].component, "Lab max 1.2.3");
    }

    #[test]
    fn summary_rows_are_excluded() {
        let html = scores_page(
            "Group 1",
            r#"<tr><td>Final (max. 40)</td><td>35</td></tr>
               <tr><td>სულ</td><td>85</td></tr>
               <tr><td>Credits</td><td>6</td></tr>
               <tr><td>გამოცდაზე გასვლის ქულა</td><td>21</td></tr>"#,
        );
        let block = parse_scores(&html, &selectors());

        assert_eq!(block.assessments.len(), 1);
        assert_eq!(block.assessments[0].component, "Final (max. 40)");
    }

    #[test]
    fn assessment_order_follows_the_document() {
        let html = scores_page(
            "Group 1",
            r#"<tr><td>Quiz 1 (max. 5)</td><td>4</td></tr>
               <tr><td>Quiz 2 (max. 5)</td><td>5</td></tr>
               <tr><td>Midterm (max. 30)</td><td>25</td></tr>"#,
        );
        let block = parse_scores(&html, &selectors());

        let labels: Vec<_> = block
            .assessments
            .iter()
            .map(|a| a.component.as_str())
            .collect();
        assert_eq!(labels, ["Quiz 1 (max. 5)", "Quiz 2 (max. 5)", "Midterm (max. 30)"]);
    }
}
