//! Formulary - mathematical formula conversion for Word documents
//!
//! This library holds a formula in LaTeX, MathML and OMML (Office Math Markup
//! Language) and converts between them on demand, then places the OMML into a
//! WordprocessingML paragraph as inline or display math.
//!
//! # Features
//!
//! - **Format detection**: untyped markup is classified by its namespace URIs
//! - **Transform registry**: converters keyed by (source, target) format,
//!   replaceable at runtime
//! - **Lazy resolution**: each format is derived once and cached, directly or
//!   through the third format
//! - **Native stylesheets**: MathML ↔ OMML without an XSLT engine
//! - **LaTeX input** via `latex2mathml` (cargo feature `latex`, on by default)
//!
//! # Example - LaTeX to OMML
//!
//! ```
//! # #[cfg(feature = "latex")]
//! # fn main() -> Result<(), formulary::Error> {
//! use formulary::{DisplayMode, Formula, TransformRegistry};
//!
//! let registry = TransformRegistry::with_defaults();
//! let mut formula = Formula::new(r"x^2 + y^2 = z^2", DisplayMode::Inline)?;
//!
//! let omml = formula.omml(&registry, false)?;
//! assert_eq!(omml.name(), "m:oMath");
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "latex"))]
//! # fn main() {}
//! ```
//!
//! # Example - Inserting into a document
//!
//! ```
//! use formulary::document::Document;
//! use formulary::{DisplayMode, Formula, TransformRegistry};
//!
//! # fn main() -> Result<(), formulary::Error> {
//! let registry = TransformRegistry::with_defaults();
//! let mut doc = Document::new();
//!
//! let mut formula = Formula::new(
//!     r#"<math xmlns="http://www.w3.org/1998/Math/MathML"><mfrac><mi>a</mi><mi>b</mi></mfrac></math>"#,
//!     DisplayMode::Block,
//! )?;
//! formula.add_to(&registry, &mut doc)?;
//!
//! let xml = doc.to_xml();
//! assert!(xml.contains("<m:oMathPara"));
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Custom converter
//!
//! ```
//! use formulary::{Format, Representation, TransformRegistry};
//!
//! let registry = TransformRegistry::with_defaults();
//! registry
//!     .register(Format::MathML, Format::LaTeX, |value, _display| {
//!         // A real converter would walk the tree
//!         Ok(Representation::Text(value.to_markup()))
//!     })
//!     .unwrap();
//! assert!(registry.contains(Format::MathML, Format::LaTeX));
//! ```

/// Common types and utilities
///
/// The crate error type and the XML tree shared by every module.
pub mod common;

/// WordprocessingML content model
///
/// Documents and paragraphs that formulas are inserted into.
pub mod document;

/// Formula representation and conversion
///
/// Formats, the transform registry, the formula entity and the resolver.
pub mod formula;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use formula::{DisplayMode, Format, Formula, Representation, TransformRegistry};
