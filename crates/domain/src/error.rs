//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A path template has an unterminated or empty placeholder.
    #[error("invalid path template: {0}")]
    InvalidPathTemplate(String),

    /// A path template references an identifier that was never captured.
    #[error("identifier '{0}' has not been captured")]
    MissingIdentifier(String),

    /// An identifier was captured twice.
    #[error("identifier '{0}' is already captured")]
    IdentifierAlreadyCaptured(String),

    /// An identifier name or value is empty.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
