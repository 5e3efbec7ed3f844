//! Authentication domain types

mod signup;
mod types;

pub use signup::SignupOutcome;
pub use types::{
    csrf_token_from, AuthError, LoginAttempt, LoginStrategy, SessionInfo, CSRF_TOKEN_FIELDS,
};
