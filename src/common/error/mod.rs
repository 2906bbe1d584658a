//! Unified error types for formulary.
//!
//! Every fallible operation in the crate reports one [`Error`], whether it
//! comes from parsing markup, registering converters, resolving a format or
//! inserting a formula into a document.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
