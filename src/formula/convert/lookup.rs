//! Static lookup tables shared by the MathML and OMML stylesheets.

use phf::{phf_map, phf_set};

/// Operators typeset as n-ary constructs (`m:nary`)
pub static NARY_OPERATORS: phf::Set<char> = phf_set! {
    '∑', '∏', '∐',
    '∫', '∬', '∭', '∮', '∯', '∰', '∱', '∲', '∳', '⨌',
    '⋀', '⋁', '⋂', '⋃',
    '⨀', '⨁', '⨂', '⨄', '⨆',
};

/// N-ary operators whose limits default to sub/superscript position
pub static INTEGRALS: phf::Set<char> = phf_set! {
    '∫', '∬', '∭', '∮', '∯', '∰', '∱', '∲', '∳', '⨌',
};

/// Characters that turn an overscript into an accent (`m:acc`)
pub static ACCENTS: phf::Set<char> = phf_set! {
    '^', '\u{302}', 'ˆ',
    '~', '\u{303}', '˜',
    '˙', '\u{307}',
    '¨', '\u{308}',
    'ˇ', '\u{30C}',
    '´', '\u{301}',
    '`', '\u{300}',
    '˘', '\u{306}',
    '→', '\u{20D7}',
    '←', '\u{20D6}',
    '↔', '\u{20E1}',
    '˚', '\u{30A}',
};

/// Characters that turn an over/underscript into a bar (`m:bar`)
pub static BARS: phf::Set<char> = phf_set! {
    '¯', '‾', '\u{305}', '_', '\u{332}',
};

/// Stretchy braces and brackets drawn by `m:groupChr`
pub static GROUP_CHARS: phf::Set<char> = phf_set! {
    '⏞', '⏟', '⏜', '⏝', '⎴', '⎵', '︷', '︸',
};

/// Opening fences recognized when an `mrow` is a delimited group
pub static OPEN_FENCES: phf::Set<char> = phf_set! {
    '(', '[', '{', '⟨', '〈', '|', '‖', '⌈', '⌊', '⟦',
};

/// Closing fences recognized when an `mrow` is a delimited group
pub static CLOSE_FENCES: phf::Set<char> = phf_set! {
    ')', ']', '}', '⟩', '〉', '|', '‖', '⌉', '⌋', '⟧',
};

/// Invisible function application operator
pub const FUNCTION_APPLICATION: char = '\u{2061}';

/// OMML run style matching a MathML `mathvariant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStyle {
    /// `m:scr` value (font family)
    pub script: Option<&'static str>,
    /// `m:sty` value (`p`, `b`, `i`, `bi`)
    pub style: Option<&'static str>,
}

/// MathML `mathvariant` → OMML run style
pub static MATHVARIANT_STYLES: phf::Map<&'static str, RunStyle> = phf_map! {
    "normal" => RunStyle { script: None, style: Some("p") },
    "bold" => RunStyle { script: None, style: Some("b") },
    "italic" => RunStyle { script: None, style: Some("i") },
    "bold-italic" => RunStyle { script: None, style: Some("bi") },
    "double-struck" => RunStyle { script: Some("double-struck"), style: Some("p") },
    "script" => RunStyle { script: Some("script"), style: None },
    "bold-script" => RunStyle { script: Some("script"), style: Some("b") },
    "fraktur" => RunStyle { script: Some("fraktur"), style: None },
    "bold-fraktur" => RunStyle { script: Some("fraktur"), style: Some("b") },
    "sans-serif" => RunStyle { script: Some("sans-serif"), style: Some("p") },
    "bold-sans-serif" => RunStyle { script: Some("sans-serif"), style: Some("b") },
    "monospace" => RunStyle { script: Some("monospace"), style: Some("p") },
};

/// The single character of `text`, if it has exactly one.
#[inline]
pub fn single_char(text: &str) -> Option<char> {
    let mut chars = text.trim().chars();
    let first = chars.next()?;
    chars.next().is_none().then_some(first)
}

/// Reverse of [`MATHVARIANT_STYLES`]: the `mathvariant` for an OMML run.
///
/// Italic is the MathML default for single-letter identifiers, so a run
/// with no style information maps to `None`.
pub fn mathvariant_for(script: Option<&str>, style: Option<&str>) -> Option<&'static str> {
    if script.is_none() && matches!(style, None | Some("i")) {
        return None;
    }
    MATHVARIANT_STYLES
        .entries()
        .find(|(_, run)| run.script == script && run.style == style)
        .map(|(name, _)| *name)
        .or_else(|| {
            // Unknown combination: keep the font family, dropping the weight
            let script = script?;
            [None, Some("p")].into_iter().find_map(|fallback| {
                MATHVARIANT_STYLES
                    .entries()
                    .find(|(_, run)| run.script == Some(script) && run.style == fallback)
                    .map(|(name, _)| *name)
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_tables() {
        assert!(NARY_OPERATORS.contains(&'∑'));
        assert!(NARY_OPERATORS.contains(&'∫'));
        assert!(!NARY_OPERATORS.contains(&'+'));
        assert!(INTEGRALS.contains(&'∮'));
        assert!(!INTEGRALS.contains(&'∑'));
    }

    #[test]
    fn test_single_char() {
        assert_eq!(single_char("∑"), Some('∑'));
        assert_eq!(single_char(" x "), Some('x'));
        assert_eq!(single_char("sin"), None);
        assert_eq!(single_char(""), None);
    }

    #[test]
    fn test_mathvariant_roundtrip() {
        for (name, run) in MATHVARIANT_STYLES.entries() {
            if *name == "italic" {
                continue;
            }
            assert_eq!(mathvariant_for(run.script, run.style), Some(*name));
        }
        assert_eq!(mathvariant_for(None, None), None);
        assert_eq!(mathvariant_for(None, Some("i")), None);
        assert_eq!(mathvariant_for(Some("fraktur"), Some("bi")), Some("fraktur"));
    }
}
