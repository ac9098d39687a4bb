//! Answer normalization for equality comparison.
//!
//! Both the extracted model answer and the ground truth pass through the
//! same canonicalization before being compared, so that formatting noise
//! (comma grouping, currency symbols, stray whitespace) never decides a
//! reward.

use once_cell::sync::Lazy;
use regex::Regex;

/// A signed decimal numeral: optional minus, digits, optional fraction.
static NUMERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\d+\.?\d*").expect("numeral pattern must compile"));

/// Normalize an answer string for comparison.
///
/// Applied in sequence: lowercase; trim; drop all internal whitespace; drop
/// thousands-separator commas; drop `$` and `%`; map the Unicode minus sign
/// (U+2212) to the ASCII hyphen-minus. The first signed-decimal numeral in
/// the cleaned string becomes the normalized form; if none exists the
/// cleaned string is returned as-is (such inputs then fail comparison by
/// construction).
///
/// Total function: every input maps to some output, and normalizing an
/// already-normalized numeral is a no-op.
pub fn normalize_answer(answer: &str) -> String {
    let mut cleaned: String = answer.trim().to_lowercase();
    cleaned.retain(|c| !c.is_whitespace());
    cleaned = cleaned
        .replace(',', "")
        .replace('$', "")
        .replace('%', "")
        .replace('\u{2212}', "-");

    match NUMERAL.find(&cleaned) {
        Some(m) => m.as_str().to_string(),
        None => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numeral_passes_through() {
        assert_eq!(normalize_answer("42"), "42");
        assert_eq!(normalize_answer("-3.5"), "-3.5");
    }

    #[test]
    fn test_strips_commas_and_currency() {
        assert_eq!(normalize_answer("$1,234.50"), "1234.50");
        assert_eq!(normalize_answer("1,000,000"), "1000000");
    }

    #[test]
    fn test_strips_percent_and_whitespace() {
        assert_eq!(normalize_answer("  85 %  "), "85");
        assert_eq!(normalize_answer("1 234"), "1234");
    }

    #[test]
    fn test_unicode_minus_becomes_ascii() {
        assert_eq!(normalize_answer("\u{2212}7"), "-7");
    }

    #[test]
    fn test_lowercases_before_extraction() {
        // Explanatory prefix text is tolerated; the numeral is isolated.
        assert_eq!(normalize_answer("Answer:42"), "42");
    }

    #[test]
    fn test_no_numeral_returns_cleaned_string() {
        assert_eq!(normalize_answer("  None Found "), "nonefound");
        assert_eq!(normalize_answer(""), "");
    }

    #[test]
    fn test_idempotent() {
        for input in ["$1,234.50", "42", "-3.5", "85%", "no numeral at all"] {
            let once = normalize_answer(input);
            assert_eq!(normalize_answer(&once), once, "not idempotent for {input:?}");
        }
    }
}
