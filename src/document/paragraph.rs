/// Paragraph type for the WordprocessingML body model.
use crate::common::xml::XmlElement;

/// A `w:p` paragraph.
///
/// The paragraph is a thin handle over its XML node, so text runs and math
/// zones are kept in document order exactly as they will be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    element: XmlElement,
}

impl Paragraph {
    /// Create an empty paragraph.
    pub fn new() -> Self {
        Self {
            element: XmlElement::new("w:p"),
        }
    }

    /// Create a paragraph holding one run of text.
    pub fn with_text(text: &str) -> Self {
        let mut para = Self::new();
        para.add_run(text);
        para
    }

    /// Append a `w:r` run with text and return it.
    pub fn add_run(&mut self, text: &str) -> &mut XmlElement {
        let mut t = XmlElement::new("w:t");
        if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
            t.set_attr("xml:space", "preserve");
        }
        t.push_text(text);
        self.element.append_and_get(XmlElement::new("w:r").with_child(t))
    }

    /// The `w:p` node.
    pub fn element(&self) -> &XmlElement {
        &self.element
    }

    /// Mutable `w:p` node, where content such as math zones is appended.
    pub fn element_mut(&mut self) -> &mut XmlElement {
        &mut self.element
    }

    pub fn into_element(self) -> XmlElement {
        self.element
    }

    /// Text of the paragraph's runs, excluding math.
    pub fn text(&self) -> String {
        self.element
            .elements()
            .filter(|e| e.local_name() == "r")
            .flat_map(|r| r.elements().filter(|t| t.local_name() == "t"))
            .map(|t| t.text())
            .collect()
    }

    /// Number of math zones (`m:oMath` or `m:oMathPara`) in the paragraph.
    pub fn math_count(&self) -> usize {
        self.element
            .elements()
            .filter(|e| matches!(e.local_name(), "oMath" | "oMathPara"))
            .count()
    }
}

impl Default for Paragraph {
    fn default() -> Self {
        Self::new()
    }
}
