//! Minimal XML layer: an owned element tree, a quick-xml backed parser and
//! escaping helpers.

pub mod escape;
pub mod node;
pub mod reader;

pub use escape::{escape_attr, escape_text, resolve_entity, unescape_with_char_refs, unescape_xml};
pub use node::{XmlElement, XmlNode, local_part};

/// Office Math Markup namespace
pub const OMML_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/math";
/// MathML namespace
pub const MATHML_NS: &str = "http://www.w3.org/1998/Math/MathML";
/// WordprocessingML main namespace
pub const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
