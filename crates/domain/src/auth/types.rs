//! Authentication handshake types

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::response::ResponseSpec;
use crate::role::Role;

/// Field names accepted for the anti-forgery token in the token response.
pub const CSRF_TOKEN_FIELDS: [&str; 2] = ["csrfToken", "csrf_token"];

/// One way of submitting credentials to the login callback.
///
/// Strategies are tried in [`LoginStrategy::ordered`] order; after each one
/// the session endpoint decides whether the login took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginStrategy {
    /// Form-encoded credentials plus token, redirects not followed.
    FormNoRedirect,
    /// Same form, redirects followed.
    FormFollowRedirects,
    /// JSON credentials to the `?json=true` callback.
    JsonFallback,
}

impl LoginStrategy {
    /// All strategies in the order they are attempted.
    #[must_use]
    pub const fn ordered() -> [Self; 3] {
        [
            Self::FormNoRedirect,
            Self::FormFollowRedirects,
            Self::JsonFallback,
        ]
    }

    /// Short label used in logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FormNoRedirect => "form redirect=false",
            Self::FormFollowRedirects => "form w/ redirects",
            Self::JsonFallback => "json fallback",
        }
    }

    /// Returns whether this strategy needs the anti-forgery token.
    #[must_use]
    pub const fn needs_csrf_token(self) -> bool {
        matches!(self, Self::FormNoRedirect | Self::FormFollowRedirects)
    }
}

impl fmt::Display for LoginStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What one credential submission returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginAttempt {
    /// Strategy used.
    pub strategy: LoginStrategy,
    /// Status of the submission, absent on transport failure.
    pub status: Option<u16>,
    /// `Location` header or final URL, when present.
    pub location: Option<String>,
}

impl LoginAttempt {
    fn status_label(&self) -> String {
        self.status
            .map_or_else(|| "error".to_string(), |s| s.to_string())
    }
}

/// Identity reported by the session endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Email of the logged-in user, if reported.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name, if reported.
    #[serde(default)]
    pub name: Option<String>,
    /// Role claim, if reported.
    #[serde(default)]
    pub role: Option<String>,
}

impl SessionInfo {
    /// Reads the session endpoint response.
    ///
    /// # Errors
    ///
    /// Returns a description of why the response does not represent a
    /// logged-in session: non-200 status, non-object body, or no `user`.
    pub fn from_response(response: &ResponseSpec) -> Result<Self, String> {
        if response.status != 200 {
            return Err(format!("session {}: {}", response.status, response.excerpt(200)));
        }
        let Some(body) = response.body_as_json().filter(serde_json::Value::is_object) else {
            return Err(format!("session not JSON: {}", response.excerpt(200)));
        };
        match body.get("user") {
            Some(user) if user.as_object().is_some_and(|u| !u.is_empty()) => {
                serde_json::from_value(user.clone()).map_err(|e| format!("malformed user: {e}"))
            }
            _ => Err(format!("no user in session: {body}")),
        }
    }
}

/// Reads the anti-forgery token from the token endpoint response.
///
/// # Errors
///
/// Returns a description of the failure: non-200 status, non-JSON body, or
/// no token field.
pub fn csrf_token_from(response: &ResponseSpec) -> Result<String, String> {
    if response.status != 200 {
        return Err(format!("CSRF {}: {}", response.status, response.excerpt(200)));
    }
    let Some(body) = response.body_as_json().filter(serde_json::Value::is_object) else {
        return Err(format!("CSRF not JSON: {}", response.excerpt(200)));
    };
    CSRF_TOKEN_FIELDS
        .iter()
        .find_map(|field| body.get(*field).and_then(serde_json::Value::as_str))
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| format!("No csrfToken in response: {body}"))
}

/// Errors that end the bootstrap of a role's session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The anti-forgery token could not be obtained.
    #[error("{role}: cannot fetch CSRF token: {reason}")]
    CsrfUnavailable {
        /// Role being bootstrapped.
        role: Role,
        /// What went wrong.
        reason: String,
    },

    /// Every login strategy ran and no session exists.
    #[error("{role}: CredentialsSignin (last statuses: {})", format_statuses(.attempts))]
    CredentialsRejected {
        /// Role being bootstrapped.
        role: Role,
        /// Submissions in the order they were made.
        attempts: Vec<LoginAttempt>,
    },

    /// Account creation failed for a reason other than a duplicate account.
    #[error("{role}: signup refused ({}): {message}", describe_status(.status))]
    SignupRefused {
        /// Role being bootstrapped.
        role: Role,
        /// Status, absent on transport failure.
        status: Option<u16>,
        /// Server message or transport error.
        message: String,
    },
}

impl AuthError {
    /// Role whose bootstrap failed.
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::CsrfUnavailable { role, .. }
            | Self::CredentialsRejected { role, .. }
            | Self::SignupRefused { role, .. } => *role,
        }
    }
}

#[allow(clippy::ref_option)]
fn describe_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "no response".to_string(), |s| s.to_string())
}

fn format_statuses(attempts: &[LoginAttempt]) -> String {
    attempts
        .iter()
        .map(LoginAttempt::status_label)
        .collect::<Vec<_>>()
        .join("/")
}
