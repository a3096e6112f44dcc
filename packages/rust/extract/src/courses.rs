//! Course-listing page parser.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::debug;

use classgrab_shared::{CourseSummary, NumericOrText};

use crate::numeric::parse_num;
use crate::selectors::PortalSelectors;
use crate::text::collapsed_text;

static BODY_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tbody tr").expect("row selector"));
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("cell selector"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("anchor selector"));

/// Parse the main course table into course summaries plus the aggregate
/// credit total.
///
/// A missing table is not an error — it signals "no data yet rendered"
/// (the caller may retry once the page finishes rendering) and yields
/// `(vec![], None)`. Within the table body each row is classified by cell
/// count:
/// - two cells with an empty first cell → aggregate row; its second cell,
///   numerically normalized, becomes the total (last one wins if repeated);
/// - six cells → course row;
/// - anything else → header/separator artifact, skipped.
///
/// Output order equals document order.
pub fn parse_courses(
    html: &str,
    sel: &PortalSelectors,
) -> (Vec<CourseSummary>, Option<NumericOrText>) {
    let doc = Html::parse_document(html);

    let Some(table) = doc.select(&sel.course_table).next() else {
        debug!("course table not found in listing page");
        return (Vec::new(), None);
    };

    let mut courses = Vec::new();
    let mut total_ects = None;

    for row in table.select(&BODY_ROW) {
        let cells: Vec<_> = row.select(&CELL).collect();

        if cells.len() == 2 && collapsed_text(cells[0]).is_empty() {
            total_ects = parse_num(&collapsed_text(cells[1]));
            continue;
        }
        if cells.len() != 6 {
            continue;
        }

        let anchor = cells[2].select(&ANCHOR).next();
        let name = match anchor {
            Some(a) => collapsed_text(a),
            None => collapsed_text(cells[2]),
        };
        let url = anchor
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| sel.absolutize(href));

        courses.push(CourseSummary {
            name,
            grade: parse_num(&collapsed_text(cells[3])),
            ects: parse_num(&collapsed_text(cells[5])),
            url,
        });
    }

    (courses, total_ects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use classgrab_shared::config::PortalConfig;

    fn selectors() -> PortalSelectors {
        PortalSelectors::compile(&PortalConfig::default()).unwrap()
    }

    const TABLE_OPEN: &str =
        r#"<table class="table table-striped table-bordered table-hover fluid"><tbody>"#;
    const TABLE_CLOSE: &str = "</tbody></table>";

    fn listing(rows: &str) -> String {
        format!("<html><body>{TABLE_OPEN}{rows}{TABLE_CLOSE}</body></html>")
    }

    #[test]
    fn empty_input_yields_nothing() {
        let (courses, total) = parse_courses("", &selectors());
        assert!(courses.is_empty());
        assert!(total.is_none());
    }

    #[test]
    fn missing_table_is_not_an_error() {
        let html = "<html><body><table><tr><td>other</td></tr></table></body></html>";
        let (courses, total) = parse_courses(html, &selectors());
        assert!(courses.is_empty());
        assert!(total.is_none());
    }

    #[test]
    fn six_cell_row_becomes_a_course() {
        let html = listing(
            r#"<tr><td></td><td></td><td><a href="/c/1">Algebra</a></td>
               <td>91</td><td></td><td>6</td></tr>"#,
        );
        let (courses, _) = parse_courses(&html, &selectors());

        assert_eq!(courses.len(), 1);
        let course = &courses[0];
        assert_eq!(course.name, "Algebra");
        assert_eq!(course.grade, Some(NumericOrText::Number(91.0)));
        assert_eq!(course.ects, Some(NumericOrText::Number(6.0)));
        assert_eq!(
            course.url.as_deref(),
            Some("https://classroom.btu.edu.ge/c/1")
        );
    }

    #[test]
    fn aggregate_row_sets_total_without_a_course() {
        let html = listing(r#"<tr><td></td><td>60</td></tr>"#);
        let (courses, total) = parse_courses(&html, &selectors());

        assert!(courses.is_empty());
        assert_eq!(total, Some(NumericOrText::Number(60.0)));
    }

    #[test]
    fn repeated_aggregate_rows_last_write_wins() {
        let html = listing(
            r#"<tr><td></td><td>30</td></tr>
               <tr><td></td><td>60</td></tr>"#,
        );
        let (_, total) = parse_courses(&html, &selectors());
        assert_eq!(total, Some(NumericOrText::Number(60.0)));
    }

    #[test]
    fn other_cell_counts_are_skipped() {
        let html = listing(
            r#"<tr><td>header</td><td>x</td><td>y</td></tr>
               <tr><td></td><td></td><td>No anchor</td><td>pass</td><td></td><td>4,5</td></tr>"#,
        );
        let (courses, total) = parse_courses(&html, &selectors());

        assert!(total.is_none());
        assert_eq!(courses.len(), 1);
        // No anchor: falls back to raw cell text, no URL.
        assert_eq!(courses[0].name, "No anchor");
        assert!(courses[0].url.is_none());
        assert_eq!(courses[0].grade, Some(NumericOrText::Text("pass".into())));
        assert_eq!(courses[0].ects, Some(NumericOrText::Number(4.5)));
    }

    #[test]
    fn empty_name_is_kept_as_empty_string() {
        let html = listing(
            r#"<tr><td></td><td></td><td><a href="/c/2"></a></td>
               <td></td><td></td><td></td></tr>"#,
        );
        let (courses, _) = parse_courses(&html, &selectors());

        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].name, "");
        assert!(courses[0].grade.is_none());
        assert!(courses[0].ects.is_none());
    }

    #[test]
    fn document_order_is_preserved() {
        let html = listing(
            r#"<tr><td></td><td></td><td><a href="/c/1">First</a></td><td></td><td></td><td>5</td></tr>
               <tr><td></td><td></td><td><a href="/c/2">Second</a></td><td></td><td></td><td>5</td></tr>"#,
        );
        let (courses, _) = parse_courses(&html, &selectors());
        let names: Vec<_> = courses.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["First", "Second"]);
    }
}
