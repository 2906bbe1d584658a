//! Tree-to-tree transforms between the two XML vocabularies.

use crate::common::error::Result;
use crate::common::xml::XmlElement;
use crate::formula::types::DisplayMode;

/// A whole-tree transform from one XML math vocabulary to another.
///
/// This is the contract an XSLT stylesheet fulfils for MathML ↔ OMML. The
/// crate ships rule-based implementations ([`MmlToOmml`](super::MmlToOmml),
/// [`OmmlToMml`](super::OmmlToMml)); callers with their own transform engine
/// can plug it in through
/// [`TransformRegistry::register_stylesheet`](crate::formula::TransformRegistry::register_stylesheet).
pub trait Stylesheet: Send + Sync {
    /// Transform `tree`, producing a new root element.
    fn apply(&self, tree: &XmlElement, display: DisplayMode) -> Result<XmlElement>;
}

impl<F> Stylesheet for F
where
    F: Fn(&XmlElement, DisplayMode) -> Result<XmlElement> + Send + Sync,
{
    fn apply(&self, tree: &XmlElement, display: DisplayMode) -> Result<XmlElement> {
        self(tree, display)
    }
}
