//! Format sniffing for untyped formula strings.
//!
//! Detection looks for the namespace URIs of the two XML vocabularies with a
//! single multi-pattern search. It runs on the raw text before any parsing,
//! since LaTeX is not XML and would fail a parse-first approach.

use super::types::Format;
use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

// Pattern order matters: ids 0-1 are OMML, 2-3 are MathML
const NAMESPACE_PATTERNS: [&str; 4] = [
    "http://schemas.openxmlformats.org/officeDocument/",
    "https://schemas.openxmlformats.org/officeDocument/",
    "http://www.w3.org/1998/Math/MathML",
    "https://www.w3.org/1998/Math/MathML",
];

const OMML_PATTERN_COUNT: usize = 2;

static NAMESPACE_FINDER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::new(NAMESPACE_PATTERNS).expect("Failed to build namespace finder")
});

/// Classify a raw formula string.
///
/// An Office document namespace anywhere in the text means OMML, even if a
/// MathML namespace occurs first. Otherwise a MathML namespace means MathML.
/// Anything else is taken as LaTeX, which has no structural signature.
///
/// # Examples
///
/// ```
/// use formulary::formula::{Format, detect_format};
///
/// assert_eq!(detect_format(r"\frac{1}{2}"), Format::LaTeX);
/// assert_eq!(
///     detect_format(r#"<math xmlns="http://www.w3.org/1998/Math/MathML"><mi>x</mi></math>"#),
///     Format::MathML
/// );
/// ```
pub fn detect_format(raw: &str) -> Format {
    let mut detected = Format::LaTeX;
    for found in NAMESPACE_FINDER.find_iter(raw) {
        if found.pattern().as_usize() < OMML_PATTERN_COUNT {
            return Format::OMML;
        }
        detected = Format::MathML;
    }
    detected
}
