//! WordprocessingML content model.
//!
//! A minimal body model that formulas are inserted into:
//! - `Document`: ordered paragraphs, serialized as `word/document.xml`
//! - `Paragraph`: a `w:p` node holding text runs and math zones
//! - `InsertTarget`: where [`Formula::add_to`](crate::formula::Formula::add_to)
//!   places a formula
//!
//! # Example
//!
//! ```rust
//! use formulary::document::{Document, insert_formula};
//! use formulary::formula::{DisplayMode, Format, TransformRegistry};
//!
//! let registry = TransformRegistry::with_defaults();
//! let mut doc = Document::new();
//! doc.add_paragraph_with_text("The identity matrix:");
//!
//! let mathml = r#"<math xmlns="http://www.w3.org/1998/Math/MathML">
//!   <mtable><mtr><mtd><mn>1</mn></mtd><mtd><mn>0</mn></mtd></mtr>
//!   <mtr><mtd><mn>0</mn></mtd><mtd><mn>1</mn></mtd></mtr></mtable>
//! </math>"#;
//! insert_formula(&registry, mathml, Some(Format::MathML), DisplayMode::Block, &mut doc)?;
//!
//! assert_eq!(doc.paragraph_count(), 2);
//! assert!(doc.to_xml().contains("<m:m>"));
//! # Ok::<(), formulary::common::Error>(())
//! ```
mod doc;
pub mod insert;
mod paragraph;

pub use doc::Document;
pub use insert::{InsertTarget, insert_formula};
pub use paragraph::Paragraph;
