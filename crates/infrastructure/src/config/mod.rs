//! Runner configuration: the vars file and the settings derived from it.

mod runner;
mod vars;

use std::path::PathBuf;

use thiserror::Error;

pub use runner::{
    RunnerConfig, DEFAULT_ADMIN_NAME, DEFAULT_BASE_URL, DEFAULT_CUSTOMER_NAME, DEFAULT_VARS_FILE,
};
pub use vars::VarsFile;

/// Errors that prevent a run from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The vars file could not be read.
    #[error("cannot read vars file {}: {source}", path.display())]
    Read {
        /// File that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A required key is absent or empty.
    #[error("missing required key {key} in {}", path.display())]
    MissingKey {
        /// Key name.
        key: &'static str,
        /// File that was searched.
        path: PathBuf,
    },

    /// The base URL is not an absolute http(s) URL.
    #[error("invalid BASE_URL {url:?}: {reason}")]
    InvalidBaseUrl {
        /// Offending value.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}
