//! Groups-tab parser.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use classgrab_shared::GroupSet;

use crate::selectors::PortalSelectors;
use crate::text::collapsed_text;

static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("row selector"));

/// Parse a groups sub-page into the set of group-membership strings.
///
/// Rows carrying the "warning" class and rows containing the "Not found"
/// sentinel are placeholders, not memberships. A missing table yields an
/// empty set. Order equals document order.
pub fn parse_groups(html: &str, sel: &PortalSelectors) -> GroupSet {
    let doc = Html::parse_document(html);
    let markers = &sel.markers;
    let mut set = GroupSet::default();

    let Some(table) = doc.select(&sel.groups_table).next() else {
        return set;
    };

    for row in table.select(&ROW) {
        if row
            .value()
            .classes()
            .any(|c| c == markers.warning_row_class.as_str())
        {
            continue;
        }
        let text = collapsed_text(row);
        if !text.is_empty() && !text.contains(&markers.not_found_sentinel) {
            set.groups.push(text);
        }
    }

    set
}
