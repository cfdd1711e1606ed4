//! Error and result type for YARRRML conversion.
//!
//! These errors never escape [`Converter::convert`](crate::Converter::convert):
//! they are turned into [`Logger`](crate::Logger) entries.

use crate::template::TemplateError;
use thiserror::Error;

/// Type alias for `Result` with default error `ConvertError`.
pub type Result<T, E = ConvertError> = std::result::Result<T, E>;

/// Problems found while reading a YARRRML document.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The text is not valid YAML
    #[error("YAML syntax error: {0}")]
    Yaml(#[from] yaml_rust::ScanError),
    /// The text contains no YAML document
    #[error("empty YARRRML document")]
    EmptyDocument,
    /// The root of the document is not a YAML mapping
    #[error("the root of a YARRRML document must be a mapping")]
    RootNotMapping,
    /// The document declares no mapping
    #[error("no mappings found in the document")]
    NoMappings,
    /// A key has a value of the wrong shape
    #[error("invalid value for '{key}': {message}")]
    InvalidValue {
        /// The offending key
        key: String,
        /// What was expected
        message: String,
    },
    /// A value template is malformed
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// A mapping refers to a source that is not declared
    #[error("unknown source '{0}'")]
    UnknownSource(String),
    /// A source uses an unsupported reference formulation
    #[error("unknown reference formulation '{0}'")]
    UnknownFormulation(String),
    /// A source has no explicit reference formulation, and none can be guessed
    #[error("cannot guess the reference formulation of '{0}'")]
    UnguessableFormulation(String),
    /// A mapping has no source
    #[error("mapping '{0}' has no sources")]
    MissingSources(String),
    /// A join refers to a mapping that does not exist (or failed to convert)
    #[error("unknown mapping '{0}' referenced in a join")]
    UnknownMapping(String),
    /// A join condition uses a function other than `equal`
    #[error("unsupported join function '{0}', only 'equal' is supported")]
    UnsupportedJoinFunction(String),
    /// A join parameter is not a single reference
    #[error("join parameter '{0}' must be a single reference")]
    InvalidJoinParameter(String),
    /// A constant IRI is invalid
    #[error("invalid IRI '{0}'")]
    InvalidIri(String),
    /// Valid YARRRML that this converter does not handle
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl ConvertError {
    /// Build an [`InvalidValue`](ConvertError::InvalidValue) error.
    pub fn invalid<K: Into<String>, M: Into<String>>(key: K, message: M) -> Self {
        ConvertError::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}
