//! Guidance printed when a session cannot be established.

use storecheck_domain::AuthError;

use super::bootstrap::{CALLBACK_PATH, CSRF_PATH, SESSION_PATH};

/// Returns troubleshooting lines for a bootstrap failure.
#[must_use]
pub fn troubleshooting_tips(error: &AuthError) -> Vec<String> {
    let mut tips = Vec::new();
    if let AuthError::CsrfUnavailable { .. } = error {
        tips.push(format!(
            "GET {CSRF_PATH} must answer 200 with a JSON object carrying 'csrfToken' (or 'csrf_token'). Is the auth route mounted under /api/auth?"
        ));
    }
    tips.extend([
        "Check the server log during these attempts; the auth provider prints the exact error (e.g. CredentialsSignin).".to_string(),
        "Ensure NEXTAUTH_URL matches BASE_URL in the vars file and NEXTAUTH_SECRET is set, then restart the dev server.".to_string(),
        format!("Credentials are posted to {CALLBACK_PATH}; confirm the provider's field names are 'email' and 'password'."),
        "In authorize(), log the incoming credentials to ensure it receives them, and compare the password hash correctly.".to_string(),
        format!("A login only counts once GET {SESSION_PATH} returns a JSON object with a 'user'."),
    ]);
    tips
}
