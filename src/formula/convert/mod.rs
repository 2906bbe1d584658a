//! Built-in converters between the formula formats.
//!
//! - LaTeX → MathML is delegated to `latex2mathml` (feature `latex`).
//! - MathML ↔ OMML are native [`Stylesheet`]s over the crate's XML tree.
//!
//! Each converter is exposed both as a plain function with the
//! [`Converter`](super::Converter) signature and, for the stylesheets, as a
//! type that can be re-registered under a custom key.

#[cfg(feature = "latex")]
mod latex;
pub mod lookup;
mod mml2omml;
mod omml2mml;
pub mod stylesheet;

#[cfg(feature = "latex")]
pub use latex::latex_to_mathml;
pub use mml2omml::MmlToOmml;
pub use omml2mml::OmmlToMml;
pub use stylesheet::Stylesheet;

use super::registry::Converter;
use super::types::{DisplayMode, Format, Representation, TransformKey};
use crate::common::error::Result;
use crate::common::xml::XmlElement;
use std::borrow::Cow;
use std::sync::Arc;

/// Tree view of an XML slot value, parsing text on demand.
fn tree_input(value: &Representation, format: Format) -> Result<Cow<'_, XmlElement>> {
    match value {
        Representation::Tree(tree) => Ok(Cow::Borrowed(tree)),
        Representation::Text(text) => XmlElement::parse(text)
            .map(Cow::Owned)
            .map_err(|e| e.into_malformed(format)),
    }
}

fn apply_stylesheet<S: Stylesheet + ?Sized>(
    sheet: &S,
    source: Format,
    value: &Representation,
    display: DisplayMode,
) -> Result<Representation> {
    let tree = tree_input(value, source)?;
    sheet.apply(&tree, display).map(Representation::Tree)
}

/// Convert a MathML slot value to an `m:oMath` tree.
pub fn mathml_to_omml(value: &Representation, display: DisplayMode) -> Result<Representation> {
    apply_stylesheet(&MmlToOmml, Format::MathML, value, display)
}

/// Convert an OMML slot value to a `<math>` tree.
pub fn omml_to_mathml(value: &Representation, display: DisplayMode) -> Result<Representation> {
    apply_stylesheet(&OmmlToMml, Format::OMML, value, display)
}

/// Wrap a stylesheet reading `source` markup as a registry converter.
pub(crate) fn stylesheet_converter<S>(source: Format, sheet: S) -> Converter
where
    S: Stylesheet + 'static,
{
    Arc::new(move |value: &Representation, display: DisplayMode| {
        apply_stylesheet(&sheet, source, value, display)
    })
}

/// The converters installed by
/// [`TransformRegistry::register_defaults`](super::TransformRegistry::register_defaults).
pub(crate) fn default_converters() -> Vec<(TransformKey, Converter)> {
    let mut converters: Vec<(TransformKey, Converter)> = Vec::with_capacity(3);
    #[cfg(feature = "latex")]
    converters.push((
        TransformKey::of(Format::LaTeX, Format::MathML),
        Arc::new(latex_to_mathml),
    ));
    converters.push((
        TransformKey::of(Format::MathML, Format::OMML),
        Arc::new(mathml_to_omml),
    ));
    converters.push((
        TransformKey::of(Format::OMML, Format::MathML),
        Arc::new(omml_to_mathml),
    ));
    converters
}
