//! OMML → presentation MathML.
//!
//! The reverse of [`MmlToOmml`](super::MmlToOmml), following the structure
//! of Word's OMML2MML stylesheet. Property elements (`*Pr`) are read where
//! they change the meaning of a construct and otherwise skipped.

use super::lookup::{FUNCTION_APPLICATION, INTEGRALS, mathvariant_for, single_char};
use super::stylesheet::Stylesheet;
use crate::common::error::{Error, Result};
use crate::common::xml::{MATHML_NS, XmlElement};
use crate::formula::types::{DisplayMode, Format};

/// OMML to MathML stylesheet.
#[derive(Debug, Clone, Copy, Default)]
pub struct OmmlToMml;

impl Stylesheet for OmmlToMml {
    fn apply(&self, tree: &XmlElement, display: DisplayMode) -> Result<XmlElement> {
        let (display, content) = match tree.local_name() {
            // A math paragraph is displayed whatever the caller asked for
            "oMathPara" => {
                let formulas: Vec<XmlElement> = tree
                    .elements()
                    .filter(|e| e.local_name() == "oMath")
                    .map(|e| row(convert_children(e)))
                    .collect();
                (DisplayMode::Block, formulas)
            },
            "oMath" => (display, convert_children(tree)),
            _ => {
                return Err(Error::MalformedMarkup {
                    format: Format::OMML,
                    reason: format!("expected an <m:oMath> root, found <{}>", tree.name()),
                });
            },
        };

        let mut math = XmlElement::new("math")
            .with_attr("xmlns", MATHML_NS)
            .with_attr("display", display.as_mathml());
        for node in content {
            math.append(node);
        }
        Ok(math)
    }
}

/// Value of `<pr>/<name m:val="..."/>` under `el`.
fn prop<'a>(el: &'a XmlElement, pr: &str, name: &str) -> Option<&'a str> {
    el.child(pr)?.child(name)?.attr_local("val")
}

/// OMML on/off property: present without a value means on.
fn flag(el: &XmlElement, pr: &str, name: &str) -> bool {
    match el.child(pr).and_then(|p| p.child(name)) {
        Some(toggle) => !matches!(toggle.attr_local("val"), Some("0" | "off" | "false")),
        None => false,
    }
}

/// Character property, falling back to the OMML default when absent.
fn chr_prop(el: &XmlElement, pr: &str, name: &str, default: &str) -> String {
    prop(el, pr, name).unwrap_or(default).to_string()
}

fn mml(name: &str) -> XmlElement {
    XmlElement::new(name)
}

fn mo(text: &str) -> XmlElement {
    mml("mo").with_text(text)
}

/// Wrap converted nodes as a single MathML element.
fn row(mut nodes: Vec<XmlElement>) -> XmlElement {
    if nodes.len() == 1 {
        return nodes.remove(0);
    }
    let mut mrow = mml("mrow");
    for node in nodes {
        mrow.append(node);
    }
    mrow
}

/// Converted content of the child argument `name` (`m:e`, `m:sub`, ...).
fn arg(el: &XmlElement, name: &str) -> XmlElement {
    match el.child(name) {
        Some(child) => row(convert_children(child)),
        None => mml("mrow"),
    }
}

fn is_empty_arg(el: &XmlElement, name: &str) -> bool {
    el.child(name)
        .is_none_or(|child| child.elements().all(|c| c.local_name().ends_with("Pr")))
}

fn convert_children(el: &XmlElement) -> Vec<XmlElement> {
    el.elements()
        .filter(|child| !child.local_name().ends_with("Pr"))
        .flat_map(convert_node)
        .collect()
}

fn convert_node(el: &XmlElement) -> Vec<XmlElement> {
    match el.local_name() {
        "r" => run(el),
        "f" => vec![fraction(el)],
        "rad" => {
            if flag(el, "radPr", "degHide") || is_empty_arg(el, "deg") {
                let mut sqrt = mml("msqrt");
                if let Some(e) = el.child("e") {
                    for node in convert_children(e) {
                        sqrt.append(node);
                    }
                }
                vec![sqrt]
            } else {
                vec![
                    mml("mroot")
                        .with_child(arg(el, "e"))
                        .with_child(arg(el, "deg")),
                ]
            }
        },
        "sSub" => vec![mml("msub").with_child(arg(el, "e")).with_child(arg(el, "sub"))],
        "sSup" => vec![mml("msup").with_child(arg(el, "e")).with_child(arg(el, "sup"))],
        "sSubSup" => vec![
            mml("msubsup")
                .with_child(arg(el, "e"))
                .with_child(arg(el, "sub"))
                .with_child(arg(el, "sup")),
        ],
        "sPre" => vec![
            mml("mmultiscripts")
                .with_child(arg(el, "e"))
                .with_child(mml("mprescripts"))
                .with_child(arg(el, "sub"))
                .with_child(arg(el, "sup")),
        ],
        "nary" => vec![nary(el)],
        "d" => vec![delimiter(el)],
        "func" => vec![
            mml("mrow")
                .with_child(arg(el, "fName"))
                .with_child(mo(FUNCTION_APPLICATION.encode_utf8(&mut [0u8; 4])))
                .with_child(arg(el, "e")),
        ],
        "limLow" => vec![mml("munder").with_child(arg(el, "e")).with_child(arg(el, "lim"))],
        "limUpp" => vec![mml("mover").with_child(arg(el, "e")).with_child(arg(el, "lim"))],
        "acc" => vec![
            mml("mover")
                .with_attr("accent", "true")
                .with_child(arg(el, "e"))
                .with_child(mo(&chr_prop(el, "accPr", "chr", "\u{302}"))),
        ],
        "bar" => {
            // OMML bars sit below the base unless told otherwise
            if prop(el, "barPr", "pos") == Some("top") {
                vec![
                    mml("mover")
                        .with_attr("accent", "true")
                        .with_child(arg(el, "e"))
                        .with_child(mo("¯")),
                ]
            } else {
                vec![
                    mml("munder")
                        .with_attr("accentunder", "true")
                        .with_child(arg(el, "e"))
                        .with_child(mo("_")),
                ]
            }
        },
        "groupChr" => {
            let chr = chr_prop(el, "groupChrPr", "chr", "⏟");
            let tag = if prop(el, "groupChrPr", "pos") == Some("top") {
                "mover"
            } else {
                "munder"
            };
            vec![mml(tag).with_child(arg(el, "e")).with_child(mo(&chr))]
        },
        "m" => vec![matrix(el)],
        "eqArr" => {
            let mut table = mml("mtable");
            for e in el.elements().filter(|c| c.local_name() == "e") {
                table.append(mml("mtr").with_child(mml("mtd").with_child(row(convert_children(e)))));
            }
            vec![table]
        },
        "borderBox" => vec![
            mml("menclose")
                .with_attr("notation", "box")
                .with_child(arg(el, "e")),
        ],
        "phant" => vec![mml("mphantom").with_child(arg(el, "e"))],
        // box, nested oMath, bare arguments and anything unknown
        _ => convert_children(el),
    }
}

/// Split run text into MathML tokens.
///
/// Digit sequences (with decimal points) become `mn`, letters `mi`, and
/// everything else `mo`. Upright runs keep consecutive letters together as
/// one identifier, the way function names are written.
fn run(el: &XmlElement) -> Vec<XmlElement> {
    let text: String = el
        .elements()
        .filter(|c| c.local_name() == "t")
        .map(|t| t.text())
        .collect();
    if text.is_empty() {
        return Vec::new();
    }

    if el.child("rPr").is_some_and(|p| p.child("nor").is_some()) {
        return vec![mml("mtext").with_text(&text)];
    }

    let script = prop(el, "rPr", "scr");
    let style = prop(el, "rPr", "sty");
    let variant = mathvariant_for(script, style);
    let upright = style == Some("p");

    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        if c.is_ascii_digit() {
            let mut number = String::from(c);
            while let Some(&next) = chars.peek() {
                if next.is_ascii_digit() || next == '.' {
                    number.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(mml("mn").with_text(&number));
        } else if c.is_alphabetic() {
            let mut name = String::from(c);
            if upright {
                while let Some(&next) = chars.peek() {
                    if next.is_alphabetic() {
                        name.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
            }
            let mut mi = mml("mi").with_text(&name);
            match variant {
                // Multi-letter identifiers are already upright
                Some("normal") if name.chars().count() > 1 => {},
                Some(v) => mi.set_attr("mathvariant", v),
                None => {},
            }
            tokens.push(mi);
        } else {
            tokens.push(mo(c.encode_utf8(&mut [0u8; 4])));
        }
    }
    tokens
}

fn fraction(el: &XmlElement) -> XmlElement {
    let mut frac = mml("mfrac");
    match prop(el, "fPr", "type") {
        Some("noBar") => frac.set_attr("linethickness", "0"),
        Some("skw") | Some("lin") => frac.set_attr("bevelled", "true"),
        _ => {},
    }
    frac.with_child(arg(el, "num")).with_child(arg(el, "den"))
}

fn nary(el: &XmlElement) -> XmlElement {
    let chr = chr_prop(el, "naryPr", "chr", "∫");
    let under_over = match prop(el, "naryPr", "limLoc") {
        Some(loc) => loc == "undOvr",
        None => !single_char(&chr).is_some_and(|c| INTEGRALS.contains(&c)),
    };
    let show_sub = !flag(el, "naryPr", "subHide") && !is_empty_arg(el, "sub");
    let show_sup = !flag(el, "naryPr", "supHide") && !is_empty_arg(el, "sup");

    let op = mo(&chr);
    let operator = match (show_sub, show_sup) {
        (false, false) => op,
        (true, false) => mml(if under_over { "munder" } else { "msub" })
            .with_child(op)
            .with_child(arg(el, "sub")),
        (false, true) => mml(if under_over { "mover" } else { "msup" })
            .with_child(op)
            .with_child(arg(el, "sup")),
        (true, true) => mml(if under_over { "munderover" } else { "msubsup" })
            .with_child(op)
            .with_child(arg(el, "sub"))
            .with_child(arg(el, "sup")),
    };
    mml("mrow").with_child(operator).with_child(arg(el, "e"))
}

fn delimiter(el: &XmlElement) -> XmlElement {
    let beg = chr_prop(el, "dPr", "begChr", "(");
    let end = chr_prop(el, "dPr", "endChr", ")");
    let sep = chr_prop(el, "dPr", "sepChr", "|");

    let mut mrow = mml("mrow");
    if !beg.is_empty() {
        mrow.append(mo(&beg).with_attr("fence", "true"));
    }
    for (i, e) in el.elements().filter(|c| c.local_name() == "e").enumerate() {
        if i > 0 {
            mrow.append(mo(&sep).with_attr("separator", "true"));
        }
        mrow.append(row(convert_children(e)));
    }
    if !end.is_empty() {
        mrow.append(mo(&end).with_attr("fence", "true"));
    }
    mrow
}

fn matrix(el: &XmlElement) -> XmlElement {
    let mut table = mml("mtable");
    for mr in el.elements().filter(|c| c.local_name() == "mr") {
        let mut tr = mml("mtr");
        for e in mr.elements().filter(|c| c.local_name() == "e") {
            tr.append(mml("mtd").with_child(row(convert_children(e))));
        }
        table.append(tr);
    }
    table
}
