/// Placing formulas into document content.
use super::doc::Document;
use super::paragraph::Paragraph;
use crate::common::error::{Error, Result};
use crate::common::xml::{OMML_NS, WORDML_NS, XmlElement};
use crate::formula::{DisplayMode, Format, Formula, TransformRegistry};
use tracing::debug;

/// Where a formula is inserted.
///
/// Raw elements are accepted for callers that hold a parsed
/// `word/document.xml`: a `w:p` behaves like a [`Paragraph`] and a `w:body`
/// like a [`Document`]. Any other element is rejected.
#[derive(Debug)]
pub enum InsertTarget<'a> {
    Paragraph(&'a mut Paragraph),
    Document(&'a mut Document),
    Element(&'a mut XmlElement),
}

impl<'a> From<&'a mut Paragraph> for InsertTarget<'a> {
    fn from(para: &'a mut Paragraph) -> Self {
        InsertTarget::Paragraph(para)
    }
}

impl<'a> From<&'a mut Document> for InsertTarget<'a> {
    fn from(doc: &'a mut Document) -> Self {
        InsertTarget::Document(doc)
    }
}

impl<'a> From<&'a mut XmlElement> for InsertTarget<'a> {
    fn from(element: &'a mut XmlElement) -> Self {
        InsertTarget::Element(element)
    }
}

impl Formula {
    /// Insert the formula's OMML into a paragraph or document.
    ///
    /// Block formulas are wrapped in an `m:oMathPara`; inline formulas are
    /// appended as a bare `m:oMath`. Inserting into a document appends a new
    /// paragraph first. The document receives a copy; the formula keeps its
    /// cached OMML.
    ///
    /// Returns the paragraph element the formula was appended to.
    ///
    /// # Errors
    ///
    /// - [`Error::UnresolvableFormat`] if no OMML can be derived
    /// - [`Error::UnsupportedTarget`] for a raw element that is neither a
    ///   `w:p` nor a `w:body`
    ///
    /// # Example
    ///
    /// ```
    /// use formulary::document::Document;
    /// use formulary::formula::{DisplayMode, Formula, TransformRegistry};
    ///
    /// let registry = TransformRegistry::with_defaults();
    /// let mut formula = Formula::new(
    ///     r#"<math xmlns="http://www.w3.org/1998/Math/MathML"><mi>x</mi></math>"#,
    ///     DisplayMode::Block,
    /// )
    /// .unwrap();
    ///
    /// let mut doc = Document::new();
    /// formula.add_to(&registry, &mut doc).unwrap();
    /// assert_eq!(doc.paragraphs()[0].math_count(), 1);
    /// ```
    pub fn add_to<'t>(
        &mut self,
        registry: &TransformRegistry,
        target: impl Into<InsertTarget<'t>>,
    ) -> Result<&'t mut XmlElement> {
        let mode = self.display_mode();
        let content = math_content(self.omml(registry, false)?, mode);

        let paragraph = match target.into() {
            InsertTarget::Paragraph(para) => para.element_mut(),
            InsertTarget::Document(doc) => doc.add_paragraph().element_mut(),
            InsertTarget::Element(element) => paragraph_node(element)?,
        };
        debug!(mode = %mode, zones = content.len(), "Inserting formula");
        for zone in content {
            paragraph.append(zone);
        }
        Ok(paragraph)
    }
}

/// Build a formula from markup and insert it in one step.
///
/// `format` of `None` detects the format of `raw`.
pub fn insert_formula<'t>(
    registry: &TransformRegistry,
    raw: &str,
    format: Option<Format>,
    display: DisplayMode,
    target: impl Into<InsertTarget<'t>>,
) -> Result<&'t mut XmlElement> {
    let mut formula = match format {
        Some(format) => Formula::with_format(raw, format, display)?,
        None => Formula::new(raw, display)?,
    };
    formula.add_to(registry, target)
}

/// Math zones to append for an OMML tree in the given display mode.
fn math_content(omml: &XmlElement, display: DisplayMode) -> Vec<XmlElement> {
    let is_para = omml.local_name() == "oMathPara";
    match (display, is_para) {
        (DisplayMode::Block, true) | (DisplayMode::Inline, false) => vec![omml.clone()],
        (DisplayMode::Block, false) => vec![
            XmlElement::new("m:oMathPara")
                .with_attr("xmlns:m", OMML_NS)
                .with_child(omml.clone()),
        ],
        (DisplayMode::Inline, true) => omml
            .elements()
            .filter(|e| e.local_name() == "oMath")
            .cloned()
            .collect(),
    }
}

fn is_wordml(element: &XmlElement) -> bool {
    element.prefix() == Some("w") || element.attr("xmlns") == Some(WORDML_NS)
}

/// Paragraph node for a raw element target.
fn paragraph_node(element: &mut XmlElement) -> Result<&mut XmlElement> {
    if !is_wordml(element) {
        return Err(Error::UnsupportedTarget(format!("<{}>", element.name())));
    }
    match element.local_name() {
        "p" => Ok(element),
        // Body-level section properties stay last
        "body" => Ok(element.insert_before("sectPr", XmlElement::new("w:p"))),
        _ => Err(Error::UnsupportedTarget(format!("<{}>", element.name()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATHML: &str = r#"<math xmlns="http://www.w3.org/1998/Math/MathML"><msup><mi>x</mi><mn>2</mn></msup></math>"#;
    const OMML_PARA: &str = r#"<m:oMathPara xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math"><m:oMath><m:r><m:t>a</m:t></m:r></m:oMath><m:oMath><m:r><m:t>b</m:t></m:r></m:oMath></m:oMathPara>"#;

    #[test]
    fn test_inline_appends_bare_omath() {
        let registry = TransformRegistry::with_defaults();
        let mut formula = Formula::new(MATHML, DisplayMode::Inline).unwrap();
        let mut para = Paragraph::with_text("Area: ");

        let node = formula.add_to(&registry, &mut para).unwrap();
        assert_eq!(node.name(), "w:p");
        let last = para.element().elements().last().unwrap();
        assert_eq!(last.name(), "m:oMath");
        assert!(last.find("sSup").is_some());
        assert_eq!(para.math_count(), 1);
        assert_eq!(para.text(), "Area: ");
    }

    #[test]
    fn test_block_wraps_in_math_paragraph() {
        let registry = TransformRegistry::with_defaults();
        let mut formula = Formula::new(MATHML, DisplayMode::Block).unwrap();
        let mut para = Paragraph::new();
        formula.add_to(&registry, &mut para).unwrap();

        let zone = para.element().elements().next().unwrap();
        assert_eq!(zone.name(), "m:oMathPara");
        assert_eq!(zone.elements().next().map(|e| e.name()), Some("m:oMath"));
        // The cached OMML is left unwrapped
        assert_eq!(formula.cached(Format::OMML).and_then(|v| v.as_tree()).map(|t| t.name()), Some("m:oMath"));
    }

    #[test]
    fn test_document_gets_new_paragraph() {
        let registry = TransformRegistry::with_defaults();
        let mut doc = Document::new();
        doc.add_paragraph_with_text("intro");
        let mut formula = Formula::new(MATHML, DisplayMode::Block).unwrap();

        formula
            .add_to(&registry, &mut doc)
            .unwrap()
            .append(XmlElement::new("w:r"));
        assert_eq!(doc.paragraph_count(), 2);
        let para = &doc.paragraphs()[1];
        assert_eq!(para.math_count(), 1);
        assert_eq!(para.element().elements().count(), 2);
        assert!(doc.to_xml().contains("<m:oMathPara"));
    }

    #[test]
    fn test_existing_math_paragraph_not_wrapped_twice() {
        let registry = TransformRegistry::new();
        let mut block = Formula::new(OMML_PARA, DisplayMode::Block).unwrap();
        let mut para = Paragraph::new();
        block.add_to(&registry, &mut para).unwrap();
        let zone = para.element().elements().next().unwrap();
        assert_eq!(zone.name(), "m:oMathPara");
        assert!(zone.elements().all(|e| e.name() == "m:oMath"));

        let mut inline = Formula::new(OMML_PARA, DisplayMode::Inline).unwrap();
        let mut para = Paragraph::new();
        inline.add_to(&registry, &mut para).unwrap();
        let names: Vec<_> = para.element().elements().map(|e| e.name()).collect();
        assert_eq!(names, ["m:oMath", "m:oMath"]);
    }

    #[test]
    fn test_raw_body_element() {
        let registry = TransformRegistry::with_defaults();
        let mut body = XmlElement::parse(
            r#"<w:body xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:p/><w:sectPr/></w:body>"#,
        )
        .unwrap();
        insert_formula(&registry, MATHML, None, DisplayMode::Inline, &mut body).unwrap();

        let names: Vec<_> = body.elements().map(|e| e.name()).collect();
        assert_eq!(names, ["w:p", "w:p", "w:sectPr"]);
        assert!(body.elements().nth(1).unwrap().child("oMath").is_some());
    }

    #[test]
    fn test_raw_paragraph_element() {
        let registry = TransformRegistry::with_defaults();
        let mut p = XmlElement::new("w:p");
        insert_formula(&registry, MATHML, Some(Format::MathML), DisplayMode::Block, &mut p)
            .unwrap();
        assert_eq!(p.child("oMathPara").map(|e| e.elements().count()), Some(1));
    }

    #[test]
    fn test_unsupported_target() {
        let registry = TransformRegistry::with_defaults();
        let mut formula = Formula::new(MATHML, DisplayMode::Inline).unwrap();

        let mut table = XmlElement::new("w:tbl");
        let err = formula.add_to(&registry, &mut table).unwrap_err();
        assert!(matches!(err, Error::UnsupportedTarget(ref name) if name == "<w:tbl>"));
        assert!(table.is_empty());

        let mut foreign = XmlElement::new("p");
        assert!(matches!(
            formula.add_to(&registry, &mut foreign),
            Err(Error::UnsupportedTarget(_))
        ));
    }

    #[test]
    fn test_unresolvable_formula_is_not_inserted() {
        let registry = TransformRegistry::new();
        let mut formula = Formula::new("x^2", DisplayMode::Inline).unwrap();
        let mut doc = Document::new();
        let err = formula.add_to(&registry, &mut doc).unwrap_err();
        assert!(matches!(
            err,
            Error::UnresolvableFormat {
                from: Format::LaTeX,
                to: Format::OMML,
                safe: false
            }
        ));
        assert_eq!(doc.paragraph_count(), 0);
    }

    #[cfg(feature = "latex")]
    #[test]
    fn test_insert_latex() {
        let registry = TransformRegistry::with_defaults();
        let mut doc = Document::new();
        insert_formula(&registry, r"\sqrt{2}", None, DisplayMode::Inline, &mut doc).unwrap();
        let para = &doc.paragraphs()[0];
        assert!(para.element().find("rad").is_some());
    }
}
