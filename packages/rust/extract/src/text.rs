//! Text-node collection helpers matching the portal's rendered whitespace.

use scraper::ElementRef;

/// All text under an element with each segment trimmed, joined without a
/// separator. Matches how cell values render in the portal tables.
pub(crate) fn collapsed_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("")
}

/// Like [`collapsed_text`] but segments are joined with a single space.
/// Used for headings where adjacent inline elements carry separate words.
pub(crate) fn spaced_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
