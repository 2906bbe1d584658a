/// Document body implementation.
use super::paragraph::Paragraph;
use crate::common::xml::{OMML_NS, WORDML_NS, XmlElement};

/// A WordprocessingML document body: an ordered list of paragraphs.
///
/// This is the content tree formulas are inserted into. It serializes to
/// the `word/document.xml` part of a package; packaging itself is left to
/// the caller.
#[derive(Debug, Clone, Default)]
pub struct Document {
    paragraphs: Vec<Paragraph>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new empty paragraph to the end of the document.
    pub fn add_paragraph(&mut self) -> &mut Paragraph {
        self.paragraphs.push(Paragraph::new());
        let last = self.paragraphs.len() - 1;
        &mut self.paragraphs[last]
    }

    /// Add a paragraph with text.
    pub fn add_paragraph_with_text(&mut self, text: &str) -> &mut Paragraph {
        let para = self.add_paragraph();
        para.add_run(text);
        para
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraphs_mut(&mut self) -> &mut [Paragraph] {
        &mut self.paragraphs
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    /// Concatenated paragraph text, one line per paragraph.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The `w:body` element with every paragraph.
    pub fn body(&self) -> XmlElement {
        let mut body = XmlElement::new("w:body");
        for para in &self.paragraphs {
            body.append(para.element().clone());
        }
        body
    }

    /// Serialize as the `word/document.xml` part.
    pub fn to_xml(&self) -> String {
        let root = XmlElement::new("w:document")
            .with_attr("xmlns:w", WORDML_NS)
            .with_attr("xmlns:m", OMML_NS)
            .with_child(self.body());

        let mut xml = String::with_capacity(1024);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        root.write_xml(&mut xml);
        xml
    }
}
