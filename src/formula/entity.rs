//! The formula entity: one mathematical expression held in up to three
//! formats at once.

use super::detection::detect_format;
use super::registry::TransformRegistry;
use super::resolver;
use super::types::{DisplayMode, Format, Representation};
use crate::common::error::{Error, Result};
use crate::common::xml::XmlElement;
use smallvec::SmallVec;

/// A formula with its source value and every format derived from it so far.
///
/// Each slot is written at most once: the source slot at construction, the
/// others by the resolver the first time a format is requested. A formula
/// owns its values outright and never refers back to the registry that
/// produced them.
///
/// # Example
///
/// ```
/// use formulary::formula::{DisplayMode, Format, Formula};
///
/// let formula = Formula::new(r"\frac{a}{b}", DisplayMode::Inline).unwrap();
/// assert_eq!(formula.source_format(), Format::LaTeX);
/// assert!(formula.cached(Format::OMML).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Formula {
    pub(super) slots: [Option<Representation>; 3],
    source_format: Format,
    display: DisplayMode,
}

impl Formula {
    /// Create a formula, detecting the format of `raw`.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedMarkup`] if `raw` is detected as MathML or OMML but
    /// does not parse.
    pub fn new(raw: impl Into<String>, display: DisplayMode) -> Result<Self> {
        let raw = raw.into();
        let format = detect_format(&raw);
        Self::with_format(raw, format, display)
    }

    /// Create a formula from markup in a known format.
    ///
    /// LaTeX is stored as given. MathML and OMML are parsed straight away.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedMarkup`] if XML markup does not parse.
    pub fn with_format(raw: impl Into<String>, format: Format, display: DisplayMode) -> Result<Self> {
        let value = Representation::Text(raw.into()).into_slot(format)?;
        Ok(Self::seeded(value, format, display))
    }

    /// Create a formula from an already parsed MathML or OMML tree.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedMarkup`] if `format` is LaTeX.
    pub fn from_tree(tree: XmlElement, format: Format, display: DisplayMode) -> Result<Self> {
        let value = Representation::Tree(tree).into_slot(format)?;
        Ok(Self::seeded(value, format, display))
    }

    fn seeded(value: Representation, format: Format, display: DisplayMode) -> Self {
        let mut slots: [Option<Representation>; 3] = Default::default();
        slots[format.index()] = Some(value);
        Self {
            slots,
            source_format: format,
            display,
        }
    }

    /// Format the formula was created from.
    #[inline]
    pub fn source_format(&self) -> Format {
        self.source_format
    }

    #[inline]
    pub fn display_mode(&self) -> DisplayMode {
        self.display
    }

    /// Value already held for `format`, without converting anything.
    pub fn cached(&self, format: Format) -> Option<&Representation> {
        self.slots[format.index()].as_ref()
    }

    /// Formats currently held, in LaTeX, MathML, OMML order.
    pub fn available_formats(&self) -> SmallVec<[Format; 3]> {
        Format::ALL
            .into_iter()
            .filter(|format| self.slots[format.index()].is_some())
            .collect()
    }

    /// Value in `target` format, converting and caching it if needed.
    ///
    /// See [`resolver::resolve`] for the path search. With `safe` set only
    /// a direct converter may be used.
    pub fn resolve(
        &mut self,
        registry: &TransformRegistry,
        target: Format,
        safe: bool,
    ) -> Result<&Representation> {
        resolver::resolve(self, registry, target, safe)
    }

    /// LaTeX text of the formula.
    pub fn latex(&mut self, registry: &TransformRegistry, safe: bool) -> Result<&str> {
        let value = self.resolve(registry, Format::LaTeX, safe)?;
        value.as_text().ok_or_else(|| shape_error(Format::LaTeX))
    }

    /// MathML tree of the formula.
    pub fn mathml(&mut self, registry: &TransformRegistry, safe: bool) -> Result<&XmlElement> {
        let value = self.resolve(registry, Format::MathML, safe)?;
        value.as_tree().ok_or_else(|| shape_error(Format::MathML))
    }

    /// OMML tree of the formula.
    pub fn omml(&mut self, registry: &TransformRegistry, safe: bool) -> Result<&XmlElement> {
        let value = self.resolve(registry, Format::OMML, safe)?;
        value.as_tree().ok_or_else(|| shape_error(Format::OMML))
    }

    /// Formula in `format`, serialized to markup text.
    pub fn to_markup(
        &mut self,
        registry: &TransformRegistry,
        format: Format,
        safe: bool,
    ) -> Result<String> {
        self.resolve(registry, format, safe).map(Representation::to_markup)
    }
}

// Slots are shaped on the way in, so this only guards the accessors.
fn shape_error(format: Format) -> Error {
    Error::MalformedMarkup {
        format,
        reason: "slot holds a value of the wrong shape".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATHML: &str = r#"<math xmlns="http://www.w3.org/1998/Math/MathML"><mi>x</mi></math>"#;

    #[test]
    fn test_new_detects_and_parses() {
        let formula = Formula::new(MATHML, DisplayMode::Block).unwrap();
        assert_eq!(formula.source_format(), Format::MathML);
        assert_eq!(formula.display_mode(), DisplayMode::Block);
        let tree = formula.cached(Format::MathML).and_then(|v| v.as_tree()).unwrap();
        assert_eq!(tree.name(), "math");
    }

    #[test]
    fn test_latex_is_stored_verbatim() {
        let formula = Formula::new(r"  x^2 ", DisplayMode::Inline).unwrap();
        assert_eq!(formula.source_format(), Format::LaTeX);
        assert_eq!(
            formula.cached(Format::LaTeX).and_then(|v| v.as_text()),
            Some("  x^2 ")
        );
    }

    #[test]
    fn test_malformed_xml_fails_construction() {
        let err = Formula::with_format("<math><mi>x</math>", Format::MathML, DisplayMode::Inline)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedMarkup { format: Format::MathML, .. }));

        let err = Formula::with_format("x + 1", Format::OMML, DisplayMode::Inline).unwrap_err();
        assert!(matches!(err, Error::MalformedMarkup { format: Format::OMML, .. }));
    }

    #[test]
    fn test_from_tree_rejects_latex() {
        let err = Formula::from_tree(XmlElement::new("math"), Format::LaTeX, DisplayMode::Inline)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedMarkup { format: Format::LaTeX, .. }));
    }

    #[test]
    fn test_available_formats() {
        let formula = Formula::with_format("a+b", Format::LaTeX, DisplayMode::Inline).unwrap();
        assert_eq!(formula.available_formats().as_slice(), &[Format::LaTeX]);
    }

    #[test]
    fn test_typed_accessors() {
        let registry = TransformRegistry::with_defaults();
        let mut formula = Formula::new(MATHML, DisplayMode::Inline).unwrap();
        assert_eq!(formula.omml(&registry, true).unwrap().name(), "m:oMath");
        assert_eq!(formula.mathml(&registry, true).unwrap().name(), "math");
        assert!(formula.to_markup(&registry, Format::OMML, true).unwrap().starts_with("<m:oMath"));
        assert!(matches!(
            formula.latex(&registry, false),
            Err(Error::UnresolvableFormat { to: Format::LaTeX, .. })
        ));
        assert_eq!(
            formula.available_formats().as_slice(),
            &[Format::MathML, Format::OMML]
        );
    }
}
