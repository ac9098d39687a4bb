//! Final-answer extraction from free-form solution text.
//!
//! The model may declare its final answer in several conventional forms. We
//! try an ordered cascade of pattern strategies, highest-confidence first,
//! and take the first one that matches:
//!
//! 1. **marker** -- a numeral after the `####` delimiter (the GSM8K
//!    convention the prompt asks for).
//! 2. **phrase** -- "the answer is <numeral>", case-insensitive.
//! 3. **trailing-equality** -- a numeral after `=` at the very end of the
//!    text.
//! 4. **bare-trailing** -- any numeral at the very end of the text, as an
//!    unqualified last resort.
//!
//! The priority order is load-bearing: reordering it changes which answer
//! gets extracted and therefore the training signal itself. Numerals that
//! appear mid-explanation in none of these forms are intentionally ignored;
//! the extractor matches the model's *declared* answer, not any number it
//! happened to write.

use once_cell::sync::Lazy;
use regex::Regex;

/// A numeral with optional minus sign, comma-grouped digits, and an optional
/// decimal fraction, as one capture group.
const NUMERAL: &str = r"(-?\d[\d,]*\.?\d*)";

/// A single extraction strategy: a named, compiled pattern whose first
/// capture group is the candidate answer.
pub struct ExtractStrategy {
    name: &'static str,
    pattern: Regex,
}

impl ExtractStrategy {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("extraction pattern must compile"),
        }
    }

    /// A short label identifying this strategy (e.g. `"marker"`).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Apply this strategy to `text`, returning the captured numeral if the
    /// pattern matches.
    pub fn try_extract<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// The ranked strategy cascade, highest priority first.
static STRATEGIES: Lazy<Vec<ExtractStrategy>> = Lazy::new(|| {
    vec![
        ExtractStrategy::new("marker", &format!(r"####\s*{NUMERAL}")),
        ExtractStrategy::new(
            "phrase",
            &format!(r"(?i)(?:the\s+)?answer\s+is[:\s]*{NUMERAL}"),
        ),
        ExtractStrategy::new("trailing-equality", &format!(r"=\s*{NUMERAL}\s*$")),
        ExtractStrategy::new("bare-trailing", &format!(r"{NUMERAL}\s*$")),
    ]
});

/// The ordered list of extraction strategies, for per-strategy testing and
/// introspection. Callers must not depend on trying them in any other order.
pub fn extraction_strategies() -> &'static [ExtractStrategy] {
    &STRATEGIES
}

/// Extract the model's final numeric answer from `solution_str`.
///
/// Tries each strategy in priority order and returns the first capture;
/// `None` when no strategy matches (including the empty string). Never
/// panics on any input.
pub fn extract_final_answer(solution_str: &str) -> Option<&str> {
    extraction_strategies()
        .iter()
        .find_map(|strategy| strategy.try_extract(solution_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy(name: &str) -> &'static ExtractStrategy {
        extraction_strategies()
            .iter()
            .find(|s| s.name() == name)
            .unwrap()
    }

    // ------------------------------------------------------------------
    // Individual strategies
    // ------------------------------------------------------------------

    #[test]
    fn test_marker_strategy() {
        let s = strategy("marker");
        assert_eq!(s.try_extract("The calculation is 5 + 3 = 8. #### 8"), Some("8"));
        assert_eq!(s.try_extract("#### -17"), Some("-17"));
        assert_eq!(s.try_extract("####1,234.50"), Some("1,234.50"));
        assert_eq!(s.try_extract("no marker here"), None);
    }

    #[test]
    fn test_phrase_strategy() {
        let s = strategy("phrase");
        assert_eq!(s.try_extract("The answer is 42."), Some("42"));
        assert_eq!(s.try_extract("THE ANSWER IS: 42"), Some("42"));
        assert_eq!(s.try_extract("answer is 7"), Some("7"));
        assert_eq!(s.try_extract("the answer eludes us"), None);
    }

    #[test]
    fn test_trailing_equality_strategy() {
        let s = strategy("trailing-equality");
        assert_eq!(s.try_extract("5 + 3 = 8"), Some("8"));
        assert_eq!(s.try_extract("total = 96  "), Some("96"));
        // An equality mid-text does not count.
        assert_eq!(s.try_extract("5 + 3 = 8, so we continue"), None);
    }

    #[test]
    fn test_bare_trailing_strategy() {
        let s = strategy("bare-trailing");
        assert_eq!(s.try_extract("After calculation, we get 100"), Some("100"));
        assert_eq!(s.try_extract("ends with words"), None);
    }

    // ------------------------------------------------------------------
    // Cascade priority
    // ------------------------------------------------------------------

    #[test]
    fn test_marker_wins_over_earlier_numerals() {
        // Numbers appear all through the text; the marker-delimited one wins.
        let text = "First 12 eggs, then 3 dozen more, 5 + 3 = 8 anyway. #### 48";
        assert_eq!(extract_final_answer(text), Some("48"));
    }

    #[test]
    fn test_phrase_wins_over_trailing_forms() {
        let text = "The answer is 42, computed as 6 * 7 = 42";
        assert_eq!(extract_final_answer(text), Some("42"));
    }

    #[test]
    fn test_trailing_equality_wins_over_bare_trailing() {
        // Both trailing strategies match here; the equality form is ranked
        // higher and captures the same numeral.
        let text = "so the total comes to = 96";
        assert_eq!(extract_final_answer(text), Some("96"));
    }

    #[test]
    fn test_bare_trailing_as_last_resort() {
        assert_eq!(
            extract_final_answer("After calculation, we get 100"),
            Some("100")
        );
    }

    // ------------------------------------------------------------------
    // Not-found outcomes
    // ------------------------------------------------------------------

    #[test]
    fn test_no_numeral_anywhere() {
        assert_eq!(extract_final_answer("No number here"), None);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_final_answer(""), None);
    }

    #[test]
    fn test_mid_text_numeral_is_ignored() {
        // 12 and 3 appear in the body but in none of the four forms.
        let text = "There are 12 apples and 3 oranges in the basket.";
        assert_eq!(extract_final_answer(text), None);
    }

    #[test]
    fn test_negative_and_decimal_numerals() {
        assert_eq!(extract_final_answer("#### -3.5"), Some("-3.5"));
        assert_eq!(extract_final_answer("the answer is -40"), Some("-40"));
    }
}
