//! HTTP session port

use std::future::Future;
use std::pin::Pin;

use storecheck_domain::{ApiRequest, ResponseSpec, Role};
use thiserror::Error;

/// Transport-level failures: the request produced no HTTP response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpClientError {
    /// The base URL joined with the request path is not a valid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The body could not be encoded.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// The request timed out.
    #[error("request timed out")]
    Timeout,

    /// The host name could not be resolved.
    #[error("DNS lookup failed for {host}: {message}")]
    DnsError {
        /// Host that failed to resolve.
        host: String,
        /// Underlying message.
        message: String,
    },

    /// Nothing listens on the target port.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The connection failed for another reason.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The redirect limit was exceeded.
    #[error("too many redirects (max {max})")]
    TooManyRedirects {
        /// Configured limit.
        max: usize,
    },

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Boxed future returned by [`ApiSession::execute`].
pub type SessionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ResponseSpec, HttpClientError>> + Send + 'a>>;

/// Port for one role's HTTP session.
///
/// A session owns its cookie state: whatever the server sets on one call is
/// sent on the next. Paths in [`ApiRequest`] are relative to the base URL the
/// session was opened with.
pub trait ApiSession: Send + Sync {
    /// Role this session is bound to.
    fn role(&self) -> Role;

    /// Executes a request and returns the response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received.
    fn execute<'a>(&'a self, request: &'a ApiRequest) -> SessionFuture<'a>;
}

/// Port for opening fresh, unauthenticated sessions.
pub trait SessionFactory: Send + Sync {
    /// Session type produced by this factory.
    type Session: ApiSession;

    /// Opens a session with an empty cookie jar.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be built.
    fn open(&self, role: Role) -> Result<Self::Session, HttpClientError>;
}
