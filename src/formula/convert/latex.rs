//! LaTeX → MathML through the `latex2mathml` crate.

use crate::common::error::{Error, Result};
use crate::common::xml::XmlElement;
use crate::formula::types::{DisplayMode, Format, Representation};
use latex2mathml::DisplayStyle;
use std::borrow::Cow;

const PARSE_ERROR_MARKER: &str = "<mtext>[PARSE ERROR:";

/// Remove the `<mtext>[PARSE ERROR: ...]</mtext>` nodes latex2mathml emits
/// for tokens it does not understand.
fn strip_parse_error_mtext(mathml: &str) -> String {
    let mut out = mathml.to_string();
    let end_pat = "</mtext>";
    while let Some(start) = out.find(PARSE_ERROR_MARKER) {
        let Some(end_rel) = out[start..].find(end_pat) else {
            break;
        };
        out.replace_range(start..start + end_rel + end_pat.len(), "");
    }
    out
}

/// Escape the `<` and `&` characters latex2mathml copies into character
/// data unescaped (`a < b` comes out as `<mo><</mo>`).
///
/// Well-formed tags and entity references are left alone.
fn escape_stray_markup(mathml: &str) -> Cow<'_, str> {
    let bytes = mathml.as_bytes();
    let mut out = String::new();
    let mut copied = 0;
    let mut i = 0;
    while i < bytes.len() {
        let replacement = match bytes[i] {
            b'<' => match tag_len(&mathml[i..]) {
                Some(len) => {
                    i += len;
                    continue;
                },
                None => "&lt;",
            },
            b'&' if !is_reference(&mathml[i..]) => "&amp;",
            _ => {
                i += 1;
                continue;
            },
        };
        out.push_str(&mathml[copied..i]);
        out.push_str(replacement);
        i += 1;
        copied = i;
    }

    if out.is_empty() {
        return Cow::Borrowed(mathml);
    }
    out.push_str(&mathml[copied..]);
    Cow::Owned(out)
}

fn is_name_byte(c: &u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b':' | b'-' | b'_' | b'.')
}

/// Length of the start, end or empty-element tag at the head of `s`.
fn tag_len(s: &str) -> Option<usize> {
    let b = s.as_bytes();
    let closing = b.get(1) == Some(&b'/');
    let start = if closing { 2 } else { 1 };
    if !b.get(start)?.is_ascii_alphabetic() {
        return None;
    }
    let mut i = start;
    while b.get(i).is_some_and(is_name_byte) {
        i += 1;
    }

    loop {
        let before = i;
        while b.get(i).is_some_and(u8::is_ascii_whitespace) {
            i += 1;
        }
        match *b.get(i)? {
            b'>' => return Some(i + 1),
            b'/' if !closing && b.get(i + 1) == Some(&b'>') => return Some(i + 2),
            c if !closing && i > before && c.is_ascii_alphabetic() => {
                while b.get(i).is_some_and(is_name_byte) {
                    i += 1;
                }
                while b.get(i).is_some_and(u8::is_ascii_whitespace) {
                    i += 1;
                }
                if b.get(i) != Some(&b'=') {
                    return None;
                }
                i += 1;
                while b.get(i).is_some_and(u8::is_ascii_whitespace) {
                    i += 1;
                }
                let quote = *b.get(i)?;
                if quote != b'"' && quote != b'\'' {
                    return None;
                }
                let end = s[i + 1..].find(quote as char)?;
                i += end + 2;
            },
            _ => return None,
        }
    }
}

/// Whether `s` starts with an entity or character reference.
fn is_reference(s: &str) -> bool {
    let body = &s[1..];
    let body = body.strip_prefix('#').unwrap_or(body);
    let len = body.bytes().take_while(u8::is_ascii_alphanumeric).count();
    len > 0 && body.as_bytes().get(len) == Some(&b';')
}

/// Convert a LaTeX slot value to a MathML tree.
///
/// The display mode selects the `display` attribute of the `<math>` root.
/// Commands latex2mathml does not support are dropped and the rest of the
/// formula is kept. LaTeX it cannot parse at all fails with
/// [`Error::Conversion`].
pub fn latex_to_mathml(value: &Representation, display: DisplayMode) -> Result<Representation> {
    let latex = value.as_text().ok_or_else(|| Error::MalformedMarkup {
        format: Format::LaTeX,
        reason: "expected LaTeX text, got an XML tree".to_string(),
    })?;

    let style = match display {
        DisplayMode::Inline => DisplayStyle::Inline,
        DisplayMode::Block => DisplayStyle::Block,
    };
    let mathml = latex2mathml::latex_to_mathml(latex, style)?;
    let cleaned = strip_parse_error_mtext(&mathml);
    if cleaned.contains("[PARSE ERROR:") {
        return Err(Error::conversion(
            Format::LaTeX,
            Format::MathML,
            "unsupported LaTeX command or token",
        ));
    }

    let tree = XmlElement::parse(&escape_stray_markup(&cleaned))
        .map_err(|e| Error::conversion(Format::LaTeX, Format::MathML, e.to_string()))?;
    Ok(Representation::Tree(tree))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction() {
        let out = latex_to_mathml(&r"\frac{1}{2}".into(), DisplayMode::Inline).unwrap();
        let tree = out.as_tree().unwrap();
        assert_eq!(tree.local_name(), "math");
        let frac = tree.find("mfrac").expect("fraction element");
        assert_eq!(frac.text(), "12");
    }

    #[test]
    fn test_display_mode_reaches_root() {
        let inline = latex_to_mathml(&"x".into(), DisplayMode::Inline).unwrap();
        let block = latex_to_mathml(&"x".into(), DisplayMode::Block).unwrap();
        assert_eq!(inline.as_tree().unwrap().attr("display"), Some("inline"));
        assert_eq!(block.as_tree().unwrap().attr("display"), Some("block"));
    }

    #[test]
    fn test_rejects_tree_input() {
        let err = latex_to_mathml(
            &Representation::Tree(XmlElement::new("math")),
            DisplayMode::Inline,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedMarkup { format: Format::LaTeX, .. }));
    }

    #[test]
    fn test_less_than_is_escaped() {
        for latex in ["a < b", r"a \lt b"] {
            let out = latex_to_mathml(&latex.into(), DisplayMode::Inline).unwrap();
            let tree = out.as_tree().unwrap();
            assert!(tree.text().contains('<'), "{latex}");
            assert!(tree.to_xml().contains("<mo>&lt;</mo>"), "{latex}");

            let omml = crate::formula::convert::mathml_to_omml(&out, DisplayMode::Inline).unwrap();
            let omml = omml.as_tree().unwrap();
            assert!(has_run_with(omml, "<"), "{latex}");
        }
    }

    fn has_run_with(element: &XmlElement, text: &str) -> bool {
        (element.local_name() == "r" && element.child("t").is_some_and(|t| t.text() == text))
            || element.elements().any(|e| has_run_with(e, text))
    }

    #[test]
    fn test_escape_stray_markup() {
        assert_eq!(
            escape_stray_markup("<math><mo><</mo><mtext>a<b</mtext></math>"),
            "<math><mo>&lt;</mo><mtext>a&lt;b</mtext></math>"
        );
        assert_eq!(
            escape_stray_markup("<mtext>x<y z</mtext>"),
            "<mtext>x&lt;y z</mtext>"
        );
        assert_eq!(
            escape_stray_markup("<mo>&amp;</mo><mo>&#x2061;</mo><mtext>R&D</mtext>"),
            "<mo>&amp;</mo><mo>&#x2061;</mo><mtext>R&amp;D</mtext>"
        );
        let clean = r#"<math display="block"><mi>x</mi><mspace width="1em"/></math>"#;
        assert!(matches!(escape_stray_markup(clean), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_parse_error_marker() {
        let raw = "<math><mtext>[PARSE ERROR: bad]</mtext><mi>Z</mi></math>";
        assert_eq!(strip_parse_error_mtext(raw), "<math><mi>Z</mi></math>");
    }
}
