//! Files-tab parser with lector-scoped visibility filtering.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use classgrab_shared::MaterialEntry;

use crate::selectors::PortalSelectors;
use crate::text::collapsed_text;

static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("row selector"));
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("cell selector"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("anchor selector"));

/// Accumulator for the single linear scan over the materials table.
/// Section boundaries affect filtering only, never ordering.
struct Scan {
    current_lector: Option<String>,
    out: Vec<MaterialEntry>,
}

/// Parse a files sub-page into materials, scoped to the student's own
/// lector's section when `my_lector` is known.
///
/// The table interleaves lector section-header rows (lector-profile anchor +
/// the "info" row class) with material rows. A header row updates the scan's
/// current lector and emits nothing. Material rows under a different lector's
/// section are skipped (case-insensitive); rows before any header are
/// included unfiltered. Rows with an empty name are excluded.
pub fn parse_files(
    html: &str,
    my_lector: Option<&str>,
    sel: &PortalSelectors,
) -> Vec<MaterialEntry> {
    let doc = Html::parse_document(html);

    let Some(table) = doc.select(&sel.files_table).next() else {
        return Vec::new();
    };

    let scan = table.select(&ROW).fold(
        Scan {
            current_lector: None,
            out: Vec::new(),
        },
        |mut scan, row| {
            let lector_link = row.select(&sel.lector_anchor).next();
            let is_info_row = row
                .value()
                .classes()
                .any(|c| c == sel.markers.info_row_class.as_str());

            if let (Some(link), true) = (lector_link, is_info_row) {
                scan.current_lector = Some(collapsed_text(link));
                return scan;
            }

            if let (Some(mine), Some(current)) = (my_lector, scan.current_lector.as_deref()) {
                if current.to_lowercase() != mine.to_lowercase() {
                    return scan;
                }
            }

            if let Some(entry) = material_from_row(row, sel) {
                scan.out.push(entry);
            }
            scan
        },
    );

    scan.out
}

fn material_from_row(row: ElementRef<'_>, sel: &PortalSelectors) -> Option<MaterialEntry> {
    let cells: Vec<_> = row.select(&CELL).collect();
    if cells.is_empty() {
        return None;
    }

    let name = collapsed_text(cells[0]);
    if name.is_empty() {
        return None;
    }

    let url = cells[0]
        .select(&sel.uploads_anchor)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| sel.absolutize(href));

    let external_url = cells
        .get(1)
        .and_then(|cell| cell.select(&ANCHOR).next())
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| sel.absolutize(href));

    Some(MaterialEntry {
        name,
        url,
        external_url,
    })
}
