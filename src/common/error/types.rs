//! Error type shared by the conversion engine and the document model.
use crate::formula::Format;
use thiserror::Error;

/// Main error type for formulary operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Input declared as MathML/OMML does not parse, or a converter produced
    /// a value that does not fit the target format
    #[error("Malformed {format} markup: {reason}")]
    MalformedMarkup { format: Format, reason: String },

    /// A converter was registered for a pair the registry cannot hold
    #[error("Invalid transform key: {from} -> {to}")]
    InvalidTransformKey { from: Format, to: Format },

    /// Neither a direct nor a permitted two-hop path exists
    #[error("Cannot convert {from} formula to {to}{}", safe_suffix(.safe))]
    UnresolvableFormat { from: Format, to: Format, safe: bool },

    /// Insertion target is neither a paragraph nor a document
    #[error("Unsupported insertion target: {0}")]
    UnsupportedTarget(String),

    /// Format name not recognized
    #[error("Unknown formula format: '{0}'")]
    UnknownFormat(String),

    /// Display mode name not recognized
    #[error("Unknown display mode: '{0}'")]
    UnknownDisplayMode(String),

    /// A registered converter failed
    #[error("Conversion {from} -> {to} failed: {reason}")]
    Conversion { from: Format, to: Format, reason: String },

    /// XML parsing or writing error
    #[error("XML error: {0}")]
    Xml(String),
}

impl Error {
    /// Shorthand for a converter failure.
    pub fn conversion(from: Format, to: Format, reason: impl Into<String>) -> Self {
        Error::Conversion {
            from,
            to,
            reason: reason.into(),
        }
    }

    /// Attach a format to a low-level XML error raised while parsing input
    /// declared as `format`.
    pub(crate) fn into_malformed(self, format: Format) -> Self {
        match self {
            Error::Xml(reason) => Error::MalformedMarkup { format, reason },
            other => other,
        }
    }
}

fn safe_suffix(safe: &bool) -> &'static str {
    if *safe { " (safe mode)" } else { "" }
}

/// Result type for formulary operations.
pub type Result<T> = std::result::Result<T, Error>;
