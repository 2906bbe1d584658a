//! Presentation MathML → OMML.
//!
//! A rule-based rendition of the MML2OMML stylesheet that ships with Word,
//! covering the presentation elements LaTeX converters and equation editors
//! actually produce. Elements without a rule are unwrapped: their children
//! are converted in place.

use super::lookup::{
    ACCENTS, BARS, CLOSE_FENCES, FUNCTION_APPLICATION, GROUP_CHARS, INTEGRALS, MATHVARIANT_STYLES,
    NARY_OPERATORS, OPEN_FENCES, RunStyle, single_char,
};
use super::stylesheet::Stylesheet;
use crate::common::error::{Error, Result};
use crate::common::xml::{OMML_NS, XmlElement};
use crate::formula::types::{DisplayMode, Format};

/// MathML to OMML stylesheet.
#[derive(Debug, Clone, Copy, Default)]
pub struct MmlToOmml;

impl Stylesheet for MmlToOmml {
    /// The result is a bare `m:oMath`; block placement is applied when the
    /// formula is inserted into a document.
    fn apply(&self, tree: &XmlElement, _display: DisplayMode) -> Result<XmlElement> {
        if tree.local_name() != "math" {
            return Err(Error::MalformedMarkup {
                format: Format::MathML,
                reason: format!("expected a <math> root, found <{}>", tree.name()),
            });
        }

        let mut omath = XmlElement::new("m:oMath").with_attr("xmlns:m", OMML_NS);
        let children: Vec<&XmlElement> = tree.elements().collect();
        for node in convert_row(&children) {
            omath.append(node);
        }
        Ok(omath)
    }
}

#[inline]
fn m(name: &str) -> XmlElement {
    XmlElement::new(format!("m:{}", name))
}

#[inline]
fn m_val(name: &str, value: &str) -> XmlElement {
    m(name).with_attr("m:val", value)
}

/// `m:<name>` holding the converted content of `source`.
fn arg(name: &str, source: Option<&XmlElement>) -> XmlElement {
    let mut wrapper = m(name);
    if let Some(source) = source {
        for node in convert_node(source) {
            wrapper.append(node);
        }
    }
    wrapper
}

/// `m:<name>` holding the converted content of several siblings.
fn arg_row(name: &str, items: &[&XmlElement]) -> XmlElement {
    let mut wrapper = m(name);
    for node in convert_row(items) {
        wrapper.append(node);
    }
    wrapper
}

fn run(text: &str, style: Option<RunStyle>, normal_text: bool) -> XmlElement {
    let mut r = m("r");
    let mut props = m("rPr");
    if let Some(style) = style {
        if let Some(script) = style.script {
            props.append(m_val("scr", script));
        }
        if let Some(sty) = style.style {
            props.append(m_val("sty", sty));
        }
    }
    if normal_text {
        props.append(m("nor"));
    }
    if !props.is_empty() {
        r.append(props);
    }

    let mut t = m("t");
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        t.set_attr("xml:space", "preserve");
    }
    t.push_text(text);
    r.append(t);
    r
}

/// Convert a sequence of sibling elements.
///
/// N-ary operators absorb the following sibling as their operand, and an
/// identifier followed by the function-application operator becomes an
/// `m:func` with the next sibling as argument.
fn convert_row(items: &[&XmlElement]) -> Vec<XmlElement> {
    let mut out = Vec::with_capacity(items.len());
    let mut i = 0;
    while i < items.len() {
        let item = items[i];

        if let Some(parts) = nary_parts(item) {
            let body = items.get(i + 1).copied();
            out.push(nary(&parts, body));
            i += if body.is_some() { 2 } else { 1 };
            continue;
        }

        if is_function_name(item)
            && items
                .get(i + 1)
                .is_some_and(|next| is_operator(next, FUNCTION_APPLICATION))
        {
            let argument = items.get(i + 2).copied();
            out.push(
                m("func")
                    .with_child(arg("fName", Some(item)))
                    .with_child(arg("e", argument)),
            );
            i += if argument.is_some() { 3 } else { 2 };
            continue;
        }

        out.extend(convert_node(item));
        i += 1;
    }
    out
}

fn convert_node(el: &XmlElement) -> Vec<XmlElement> {
    let children: Vec<&XmlElement> = el.elements().collect();
    match el.local_name() {
        "mi" | "mn" | "mo" | "mtext" | "ms" => token(el).into_iter().collect(),
        "mrow" => match fenced_row(&children) {
            Some(delimited) => vec![delimited],
            None => convert_row(&children),
        },
        "mfrac" => vec![fraction(el, &children)],
        "msqrt" => vec![
            m("rad")
                .with_child(m("radPr").with_child(m_val("degHide", "1")))
                .with_child(m("deg"))
                .with_child(arg_row("e", &children)),
        ],
        "mroot" => vec![
            m("rad")
                .with_child(arg("deg", children.get(1).copied()))
                .with_child(arg("e", children.first().copied())),
        ],
        "msub" => vec![
            m("sSub")
                .with_child(arg("e", children.first().copied()))
                .with_child(arg("sub", children.get(1).copied())),
        ],
        "msup" => vec![
            m("sSup")
                .with_child(arg("e", children.first().copied()))
                .with_child(arg("sup", children.get(1).copied())),
        ],
        "msubsup" => vec![
            m("sSubSup")
                .with_child(arg("e", children.first().copied()))
                .with_child(arg("sub", children.get(1).copied()))
                .with_child(arg("sup", children.get(2).copied())),
        ],
        "munder" | "mover" | "munderover" => vec![under_over(el, &children)],
        "mmultiscripts" => vec![multiscripts(&children)],
        "mfenced" => vec![mfenced(el, &children)],
        "mtable" => vec![matrix(&children)],
        "mphantom" => vec![m("phant").with_child(arg_row("e", &children))],
        "menclose" => vec![m("borderBox").with_child(arg_row("e", &children))],
        "semantics" => children.first().map(|c| convert_node(c)).unwrap_or_default(),
        "mspace" | "none" | "mprescripts" | "annotation" | "annotation-xml" => Vec::new(),
        // mstyle, mpadded, merror, maction and anything unknown
        _ => convert_row(&children),
    }
}

fn token(el: &XmlElement) -> Option<XmlElement> {
    let text = el.text();
    if text.is_empty() {
        return None;
    }

    let variant = el
        .attr("mathvariant")
        .and_then(|v| MATHVARIANT_STYLES.get(v).copied());
    match el.local_name() {
        "mi" => {
            // Multi-letter identifiers are upright in MathML
            let style = variant.or_else(|| {
                if text.chars().count() > 1 {
                    MATHVARIANT_STYLES.get("normal").copied()
                } else {
                    None
                }
            });
            Some(run(&text, style, false))
        },
        "mtext" => Some(run(&text, variant, true)),
        "ms" => {
            let open = el.attr("lquote").unwrap_or("\"");
            let close = el.attr("rquote").unwrap_or("\"");
            Some(run(&format!("{}{}{}", open, text, close), variant, true))
        },
        _ => Some(run(&text, variant, false)),
    }
}

fn fraction(el: &XmlElement, children: &[&XmlElement]) -> XmlElement {
    let mut f = m("f");
    let kind = if el.attr("linethickness").is_some_and(is_zero_thickness) {
        Some("noBar")
    } else if el.attr("bevelled") == Some("true") {
        Some("skw")
    } else {
        None
    };
    if let Some(kind) = kind {
        f.append(m("fPr").with_child(m_val("type", kind)));
    }
    f.with_child(arg("num", children.first().copied()))
        .with_child(arg("den", children.get(1).copied()))
}

fn is_zero_thickness(value: &str) -> bool {
    let digits = value.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    digits.parse::<f64>().is_ok_and(|v| v == 0.0)
}

fn operator_char(el: &XmlElement) -> Option<char> {
    (el.local_name() == "mo")
        .then(|| single_char(&el.text()))
        .flatten()
}

fn is_operator(el: &XmlElement, ch: char) -> bool {
    operator_char(el) == Some(ch)
}

fn is_function_name(el: &XmlElement) -> bool {
    el.local_name() == "mi" && el.text().chars().count() > 1
}

/// Pieces of an n-ary operator expressed in MathML.
struct NaryParts<'a> {
    chr: char,
    sub: Option<&'a XmlElement>,
    sup: Option<&'a XmlElement>,
    under_over: bool,
}

fn nary_parts(el: &XmlElement) -> Option<NaryParts<'_>> {
    let name = el.local_name();
    if name == "mo" {
        let chr = operator_char(el).filter(|c| NARY_OPERATORS.contains(c))?;
        return Some(NaryParts {
            chr,
            sub: None,
            sup: None,
            under_over: !INTEGRALS.contains(&chr),
        });
    }

    let children: Vec<&XmlElement> = el.elements().collect();
    let base = children.first()?;
    let chr = operator_char(base).filter(|c| NARY_OPERATORS.contains(c))?;
    let (sub, sup, under_over) = match name {
        "msub" => (children.get(1).copied(), None, false),
        "msup" => (None, children.get(1).copied(), false),
        "msubsup" => (children.get(1).copied(), children.get(2).copied(), false),
        "munder" => (children.get(1).copied(), None, true),
        "mover" => (None, children.get(1).copied(), true),
        "munderover" => (children.get(1).copied(), children.get(2).copied(), true),
        _ => return None,
    };
    Some(NaryParts {
        chr,
        sub,
        sup,
        under_over,
    })
}

fn nary(parts: &NaryParts<'_>, body: Option<&XmlElement>) -> XmlElement {
    let mut props = m("naryPr")
        .with_child(m_val("chr", parts.chr.encode_utf8(&mut [0u8; 4])))
        .with_child(m_val(
            "limLoc",
            if parts.under_over { "undOvr" } else { "subSup" },
        ));
    if parts.sub.is_none() {
        props.append(m_val("subHide", "1"));
    }
    if parts.sup.is_none() {
        props.append(m_val("supHide", "1"));
    }
    m("nary")
        .with_child(props)
        .with_child(arg("sub", parts.sub))
        .with_child(arg("sup", parts.sup))
        .with_child(arg("e", body))
}

fn under_over(el: &XmlElement, children: &[&XmlElement]) -> XmlElement {
    let base = children.first().copied();
    let script = children.get(1).copied();
    match el.local_name() {
        "mover" => {
            let mark = script.and_then(operator_char);
            let accent = el.attr("accent") == Some("true");
            match mark {
                Some(c) if BARS.contains(&c) => bar(base, "top"),
                Some(c) if GROUP_CHARS.contains(&c) => group_char(base, c, "top"),
                Some(c) if accent || ACCENTS.contains(&c) => m("acc")
                    .with_child(m("accPr").with_child(m_val("chr", c.encode_utf8(&mut [0u8; 4]))))
                    .with_child(arg("e", base)),
                _ => m("limUpp")
                    .with_child(arg("e", base))
                    .with_child(arg("lim", script)),
            }
        },
        "munder" => match script.and_then(operator_char) {
            Some(c) if BARS.contains(&c) => bar(base, "bot"),
            Some(c) if GROUP_CHARS.contains(&c) => group_char(base, c, "bot"),
            _ => m("limLow")
                .with_child(arg("e", base))
                .with_child(arg("lim", script)),
        },
        // munderover without an n-ary base: stacked limits
        _ => {
            let lower = m("limLow")
                .with_child(arg("e", base))
                .with_child(arg("lim", script));
            m("limUpp")
                .with_child(m("e").with_child(lower))
                .with_child(arg("lim", children.get(2).copied()))
        },
    }
}

fn bar(base: Option<&XmlElement>, pos: &str) -> XmlElement {
    m("bar")
        .with_child(m("barPr").with_child(m_val("pos", pos)))
        .with_child(arg("e", base))
}

fn group_char(base: Option<&XmlElement>, chr: char, pos: &str) -> XmlElement {
    let vert = if pos == "top" { "bot" } else { "top" };
    m("groupChr")
        .with_child(
            m("groupChrPr")
                .with_child(m_val("chr", chr.encode_utf8(&mut [0u8; 4])))
                .with_child(m_val("pos", pos))
                .with_child(m_val("vertJc", vert)),
        )
        .with_child(arg("e", base))
}

fn delimiter(beg: &str, end: &str, sep: Option<&str>, parts: Vec<XmlElement>) -> XmlElement {
    let mut props = m("dPr")
        .with_child(m_val("begChr", beg))
        .with_child(m_val("endChr", end));
    if let Some(sep) = sep {
        props.append(m_val("sepChr", sep));
    }
    let mut d = m("d").with_child(props);
    for part in parts {
        d.append(part);
    }
    d
}

/// An `mrow` that opens and closes with fence operators becomes `m:d`.
fn fenced_row(children: &[&XmlElement]) -> Option<XmlElement> {
    let (first, rest) = children.split_first()?;
    let (last, inner) = rest.split_last()?;
    let open = operator_char(first).filter(|c| OPEN_FENCES.contains(c));
    let close = operator_char(last).filter(|c| CLOSE_FENCES.contains(c));
    // \left. and \right. produce empty operators
    let open_empty = first.local_name() == "mo" && first.text().trim().is_empty();
    let close_empty = last.local_name() == "mo" && last.text().trim().is_empty();
    if (open.is_none() && !open_empty) || (close.is_none() && !close_empty) {
        return None;
    }
    if open.is_none() && close.is_none() {
        return None;
    }

    let beg = open.map(String::from).unwrap_or_default();
    let end = close.map(String::from).unwrap_or_default();
    Some(delimiter(&beg, &end, None, vec![arg_row("e", inner)]))
}

fn mfenced(el: &XmlElement, children: &[&XmlElement]) -> XmlElement {
    let open = el.attr("open").unwrap_or("(");
    let close = el.attr("close").unwrap_or(")");
    // OMML's default separator is the bar, MathML's the comma
    let sep = el
        .attr("separators")
        .unwrap_or(",")
        .trim()
        .chars()
        .next()
        .filter(|c| *c != '|')
        .map(String::from);
    let parts = children.iter().map(|c| arg("e", Some(c))).collect();
    delimiter(open, close, sep.as_deref(), parts)
}

fn matrix(rows: &[&XmlElement]) -> XmlElement {
    let mut mat = m("m");
    for row in rows {
        let cells: Vec<&XmlElement> = match row.local_name() {
            "mtr" => row.elements().collect(),
            // First cell of a labeled row is the label
            "mlabeledtr" => row.elements().skip(1).collect(),
            _ => continue,
        };
        let mut mr = m("mr");
        for cell in cells {
            let content: Vec<&XmlElement> = cell.elements().collect();
            mr.append(arg_row("e", &content));
        }
        mat.append(mr);
    }
    mat
}

/// `mmultiscripts`: base, post (sub, sup) pairs, `mprescripts`, pre pairs.
fn multiscripts(children: &[&XmlElement]) -> XmlElement {
    let Some((base, scripts)) = children.split_first() else {
        return m("sSubSup");
    };
    let split = scripts.iter().position(|c| c.local_name() == "mprescripts");
    let (post, pre) = match split {
        Some(idx) => (&scripts[..idx], &scripts[idx + 1..]),
        None => (scripts, &scripts[scripts.len()..]),
    };

    let script_arg = |name: &str, el: Option<&&XmlElement>| {
        arg(name, el.copied().filter(|e| e.local_name() != "none"))
    };

    let mut core = arg("e", Some(base));
    if !post.is_empty() {
        core = m("e").with_child(
            m("sSubSup")
                .with_child(core)
                .with_child(script_arg("sub", post.first()))
                .with_child(script_arg("sup", post.get(1))),
        );
    }
    if pre.is_empty() {
        // Only post scripts: unwrap the helper m:e
        return core.elements().next().cloned().unwrap_or_else(|| m("sSubSup"));
    }
    m("sPre")
        .with_child(script_arg("sub", pre.first()))
        .with_child(script_arg("sup", pre.get(1)))
        .with_child(core)
}
