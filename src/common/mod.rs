//! Common types and utilities shared across the crate.
//!
//! This module provides the unified error type and the XML tree used to hold
//! MathML and OMML formulas and document content.

// Submodule declarations
pub mod error;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};
pub use xml::{XmlElement, XmlNode};
