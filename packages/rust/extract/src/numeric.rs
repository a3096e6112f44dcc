//! Locale-aware numeric normalization.

use classgrab_shared::NumericOrText;

/// Parse locale-formatted numeric text (comma decimal separator) into a
/// number, falling back to the trimmed text itself when it is not numeric.
///
/// The fallback is deliberate: non-numeric labels ("pass", "განთ.") flow
/// through the same cells as grades and must not be lost or reported as
/// errors. Empty or whitespace-only input is absent.
pub fn parse_num(text: &str) -> Option<NumericOrText> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Portal locale uses comma as the decimal separator.
    let normalized = trimmed.replace(',', ".");

    match normalized.parse::<f64>() {
        Ok(n) => Some(NumericOrText::Number(n)),
        Err(_) => Some(NumericOrText::Text(normalized)),
    }
}
