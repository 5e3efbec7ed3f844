//! Application error types

use storecheck_domain::{AuthError, DomainError};
use thiserror::Error;

use crate::ports::HttpClientError;

/// Application-level errors. Every variant aborts the run.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// A session could not be opened.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpClientError),

    /// A role's session could not be established.
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// A prerequisite resource could not be created.
    #[error("failed to create {resource}: {detail}")]
    Seed {
        /// Logical resource name, e.g. `product`.
        resource: String,
        /// Observed status, absent on transport failure.
        status: Option<u16>,
        /// Cause and response excerpt.
        detail: String,
    },
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
