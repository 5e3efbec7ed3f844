//! Test identity credentials

use std::fmt;

use crate::role::Role;

/// Login identity for one role, immutable for the run.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account email, also the login name.
    pub email: String,
    /// Plain-text password sent to signup and login.
    pub password: String,
    /// Display name used at signup.
    pub display_name: String,
    /// Role requested at signup and checked by the API.
    pub role: Role,
}

impl Credentials {
    /// Creates credentials for the given role.
    #[must_use]
    pub fn new(
        role: Role,
        email: impl Into<String>,
        password: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            display_name: display_name.into(),
            role,
        }
    }
}

// Keeps passwords out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .field("display_name", &self.display_name)
            .field("role", &self.role)
            .finish()
    }
}
