//! Core value types: formats, display modes, transform keys and slot values.

use crate::common::error::{Error, Result};
use crate::common::xml::XmlElement;
use std::fmt;
use std::str::FromStr;

/// The three interchangeable formula notations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(clippy::upper_case_acronyms)]
pub enum Format {
    /// Textual TeX math markup
    LaTeX,
    /// Presentation MathML
    MathML,
    /// Office Math Markup Language, native to WordprocessingML
    OMML,
}

impl Format {
    /// All formats in slot order.
    pub const ALL: [Format; 3] = [Format::LaTeX, Format::MathML, Format::OMML];

    /// Slot index of this format.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Format::LaTeX => 0,
            Format::MathML => 1,
            Format::OMML => 2,
        }
    }

    /// Whether values of this format are XML trees.
    #[inline]
    pub const fn is_xml(self) -> bool {
        !matches!(self, Format::LaTeX)
    }

    /// The format that is neither `self` nor `other`.
    ///
    /// Returns `None` when both are the same format.
    pub fn third(self, other: Format) -> Option<Format> {
        if self == other {
            return None;
        }
        Format::ALL.into_iter().find(|f| *f != self && *f != other)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::LaTeX => "LaTeX",
            Format::MathML => "MathML",
            Format::OMML => "OMML",
        })
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latex" | "tex" => Ok(Format::LaTeX),
            "mathml" | "mml" => Ok(Format::MathML),
            "omml" => Ok(Format::OMML),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

/// How a formula sits in the surrounding text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayMode {
    /// Flows with the text of its paragraph
    #[default]
    Inline,
    /// Set apart as its own math paragraph
    Block,
}

impl DisplayMode {
    #[inline]
    pub const fn is_block(self) -> bool {
        matches!(self, DisplayMode::Block)
    }

    /// Value of the MathML `display` attribute.
    pub const fn as_mathml(self) -> &'static str {
        match self {
            DisplayMode::Inline => "inline",
            DisplayMode::Block => "block",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_mathml())
    }
}

impl FromStr for DisplayMode {
    type Err = Error;

    /// Strict parsing: unrecognized names are rejected rather than treated
    /// as block.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" | "in-line" => Ok(DisplayMode::Inline),
            "block" | "display" | "non-in-line" => Ok(DisplayMode::Block),
            _ => Err(Error::UnknownDisplayMode(s.to_string())),
        }
    }
}

/// Ordered (source, target) pair identifying a converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransformKey {
    source: Format,
    target: Format,
}

impl TransformKey {
    /// Create a key; identity pairs are rejected.
    pub fn new(source: Format, target: Format) -> Result<Self> {
        if source == target {
            return Err(Error::InvalidTransformKey {
                from: source,
                to: target,
            });
        }
        Ok(Self { source, target })
    }

    /// Key for a pair known at compile time to differ.
    pub(crate) const fn of(source: Format, target: Format) -> Self {
        Self { source, target }
    }

    #[inline]
    pub const fn source(&self) -> Format {
        self.source
    }

    #[inline]
    pub const fn target(&self) -> Format {
        self.target
    }
}

impl fmt::Display for TransformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// A formula value held in one slot of a [`Formula`](super::Formula).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Representation {
    /// Raw markup text (LaTeX)
    Text(String),
    /// Parsed XML tree (MathML, OMML)
    Tree(XmlElement),
}

impl Representation {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Representation::Text(s) => Some(s),
            Representation::Tree(_) => None,
        }
    }

    pub fn as_tree(&self) -> Option<&XmlElement> {
        match self {
            Representation::Tree(t) => Some(t),
            Representation::Text(_) => None,
        }
    }

    /// Markup text of the value, serializing trees.
    pub fn to_markup(&self) -> String {
        match self {
            Representation::Text(s) => s.clone(),
            Representation::Tree(t) => t.to_xml(),
        }
    }

    /// Shape a raw value for storage in `format`'s slot.
    ///
    /// XML formats hold trees, so text is parsed; LaTeX holds text only.
    pub(crate) fn into_slot(self, format: Format) -> Result<Representation> {
        match (format.is_xml(), self) {
            (true, Representation::Text(text)) => XmlElement::parse(&text)
                .map(Representation::Tree)
                .map_err(|e| e.into_malformed(format)),
            (false, Representation::Tree(tree)) => Err(Error::MalformedMarkup {
                format,
                reason: format!("expected markup text, got an XML <{}> tree", tree.name()),
            }),
            (_, value) => Ok(value),
        }
    }
}

impl From<XmlElement> for Representation {
    fn from(tree: XmlElement) -> Self {
        Representation::Tree(tree)
    }
}

impl From<String> for Representation {
    fn from(text: String) -> Self {
        Representation::Text(text)
    }
}

impl From<&str> for Representation {
    fn from(text: &str) -> Self {
        Representation::Text(text.to_string())
    }
}
