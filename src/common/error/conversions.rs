//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert from external
//! error types to the unified Error type.

use super::types::Error;

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(format!("Invalid attribute: {}", err))
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::Xml(format!("UTF-8 decoding error: {}", err))
    }
}

#[cfg(feature = "latex")]
impl From<latex2mathml::LatexError> for Error {
    fn from(err: latex2mathml::LatexError) -> Self {
        Error::conversion(
            crate::formula::Format::LaTeX,
            crate::formula::Format::MathML,
            err.to_string(),
        )
    }
}
