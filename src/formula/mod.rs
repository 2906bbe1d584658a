// Formula Module - Formula Representation and Format Conversion
//
// A formula is held in up to three interchangeable formats:
//
// - **LaTeX**: textual TeX math markup
// - **MathML**: presentation MathML, as an XML tree
// - **OMML** (Office Math Markup Language): the XML math vocabulary of
//   WordprocessingML documents
//
// Conversions are looked up in a `TransformRegistry`. A format without a
// direct converter is reached through the third format, and every derived
// format is cached on the formula.
//
// # Example
//
// ```ignore
// use formulary::formula::{DisplayMode, Formula, TransformRegistry};
//
// let registry = TransformRegistry::with_defaults();
// let mut formula = Formula::new(r"\frac{1}{2}", DisplayMode::Block)?;
// let omml = formula.omml(&registry, false)?;
// ```

/// Built-in converters
///
/// LaTeX to MathML through `latex2mathml`, and rule-based stylesheets for
/// MathML to OMML and back.
pub mod convert;
/// Format Detection
///
/// Classifies untyped markup by the namespace URIs it mentions.
pub mod detection;
/// Formula Entity
pub mod entity;
/// Transform Registry
///
/// Table of converters keyed by ordered (source, target) format pairs.
pub mod registry;
/// Conversion Resolver
///
/// Direct and two-hop path search with per-formula caching.
pub mod resolver;
/// Core value types
pub mod types;

// Re-export public API
pub use convert::{MmlToOmml, OmmlToMml, Stylesheet, mathml_to_omml, omml_to_mathml};
#[cfg(feature = "latex")]
pub use convert::latex_to_mathml;
pub use detection::detect_format;
pub use entity::Formula;
pub use registry::{Converter, TransformRegistry};
pub use resolver::resolve;
pub use types::{DisplayMode, Format, Representation, TransformKey};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_omml_source_to_mathml() {
        let registry = TransformRegistry::with_defaults();
        let omml = r#"<m:oMath xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math"><m:sSup><m:e><m:r><m:t>e</m:t></m:r></m:e><m:sup><m:r><m:t>x</m:t></m:r></m:sup></m:sSup></m:oMath>"#;
        let mut formula = Formula::new(omml, DisplayMode::Inline).unwrap();
        assert_eq!(formula.source_format(), Format::OMML);

        let mathml = formula.to_markup(&registry, Format::MathML, true).unwrap();
        assert!(mathml.starts_with(r#"<math xmlns="http://www.w3.org/1998/Math/MathML""#));
        assert!(mathml.contains("<msup><mi>e</mi><mi>x</mi></msup>"));
    }

    #[test]
    fn test_latex_target_needs_custom_converter() {
        let registry = TransformRegistry::with_defaults();
        let mut formula =
            Formula::with_format("<math><mi>x</mi></math>", Format::MathML, DisplayMode::Inline)
                .unwrap();
        assert!(formula.latex(&registry, false).is_err());

        registry
            .register(Format::MathML, Format::LaTeX, |value, _| {
                let tree = value.as_tree().map(|t| t.text()).unwrap_or_default();
                Ok(Representation::Text(tree))
            })
            .unwrap();
        assert_eq!(formula.latex(&registry, true).unwrap(), "x");
    }
}
