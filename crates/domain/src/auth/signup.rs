//! Classification of account-creation responses

use serde::Serialize;

use crate::response::ResponseSpec;

/// Error codes that mark a duplicate account.
const CONFLICT_CODES: [&str; 3] = ["CONFLICT", "USER_EXISTS", "P2002"];

/// Message fragments that mark a duplicate account when no code is given.
const CONFLICT_HINTS: [&str; 3] = ["exists", "unique", "409"];

/// Result of a signup call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SignupOutcome {
    /// The account was created.
    Created,
    /// The account exists from an earlier run.
    AlreadyExists,
    /// The server refused for another reason.
    Refused {
        /// Response status.
        status: u16,
        /// Extracted error message.
        message: String,
    },
}

impl SignupOutcome {
    /// Classifies a signup response.
    ///
    /// Structured signals are checked first (2xx, 409, a known `error.code`);
    /// the error message is only searched for duplicate-account wording when
    /// neither applies.
    #[must_use]
    pub fn classify(response: &ResponseSpec) -> Self {
        if response.is_success() {
            return Self::Created;
        }
        if response.status == 409 {
            return Self::AlreadyExists;
        }

        let body = response.body_as_json();
        let code = body.as_ref().and_then(error_code);
        if code.is_some_and(|c| CONFLICT_CODES.iter().any(|known| c.eq_ignore_ascii_case(known))) {
            return Self::AlreadyExists;
        }

        let message = body
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| response.body.clone());
        let lowered = message.to_lowercase();
        if CONFLICT_HINTS.iter().any(|hint| lowered.contains(hint)) {
            Self::AlreadyExists
        } else {
            Self::Refused {
                status: response.status,
                message,
            }
        }
    }
}

/// `error` as a string, or `error.message` when `error` is an object.
fn error_message(body: &serde_json::Value) -> Option<String> {
    match body.get("error")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(obj) => obj
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(ToString::to_string),
        _ => None,
    }
}

fn error_code(body: &serde_json::Value) -> Option<&str> {
    body.get("error")?.get("code")?.as_str()
}
