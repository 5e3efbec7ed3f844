//! Settings of one smoke run.

use std::path::Path;

use storecheck_domain::{Credentials, Role};
use url::Url;

use super::{ConfigError, VarsFile};

/// Vars file read when none is given.
pub const DEFAULT_VARS_FILE: &str = "pyvars.txt";
/// API root used when `BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
/// Display name of the admin identity when `ADMIN_NAME` is not set.
pub const DEFAULT_ADMIN_NAME: &str = "Alice Admin";
/// Display name of the customer identity when `CUSTOMER_NAME` is not set.
pub const DEFAULT_CUSTOMER_NAME: &str = "Joe Customer";

/// Everything a run needs: where the API lives and who logs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// API root without trailing slash.
    pub base_url: String,
    /// Admin identity.
    pub admin: Credentials,
    /// Customer identity.
    pub customer: Credentials,
}

impl RunnerConfig {
    /// Loads the vars file at `path`; `base_url` overrides `BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a required key is
    /// missing, or the base URL is invalid.
    pub fn load(path: impl AsRef<Path>, base_url: Option<&str>) -> Result<Self, ConfigError> {
        let vars = VarsFile::load(path)?;
        Self::from_vars(&vars, base_url)
    }

    /// Builds the settings from parsed vars.
    ///
    /// # Errors
    ///
    /// Returns an error if a required key is missing or the base URL is
    /// invalid.
    pub fn from_vars(vars: &VarsFile, base_url: Option<&str>) -> Result<Self, ConfigError> {
        let base_url = base_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .or_else(|| vars.get("BASE_URL"))
            .unwrap_or(DEFAULT_BASE_URL);
        let base_url = normalize_base_url(base_url)?;

        let admin = Credentials::new(
            Role::Admin,
            vars.require("ADMIN_EMAIL")?,
            vars.require("ADMIN_PASSWORD")?,
            vars.get("ADMIN_NAME").unwrap_or(DEFAULT_ADMIN_NAME),
        );
        let customer = Credentials::new(
            Role::Customer,
            vars.require("CUSTOMER_EMAIL")?,
            vars.require("CUSTOMER_PASSWORD")?,
            vars.get("CUSTOMER_NAME").unwrap_or(DEFAULT_CUSTOMER_NAME),
        );

        Ok(Self {
            base_url,
            admin,
            customer,
        })
    }

    /// Credentials of `role`.
    #[must_use]
    pub const fn credentials(&self, role: Role) -> &Credentials {
        match role {
            Role::Admin => &self.admin,
            Role::Customer => &self.customer,
        }
    }
}

/// Strips trailing slashes and checks for an absolute http(s) URL.
fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("no host".to_string()));
    }
    Ok(trimmed.to_string())
}
