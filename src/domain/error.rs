//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors raised while configuring schemas, reading node attributes
/// or building a forest.
///
/// Malformed parent references are not errors: unresolved parents and
/// parent cycles become roots, duplicate ids resolve last-write-wins.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("invalid schema: {role} key must not be blank (got {key:?})")]
    InvalidSchema { role: &'static str, key: String },

    #[error("attribute '{key}' holds {found}, expected {expected}")]
    Cast {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("missing attribute '{key}'")]
    MissingAttribute { key: String },

    /// Raised by record mappers for records they cannot convert.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// A mapper failed; `index` is the record's position in the input.
    #[error("cannot map record #{index}: {source}")]
    Mapping {
        index: usize,
        #[source]
        source: Box<DomainError>,
    },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
