//! Session bootstrap: login, or sign up and log in.
//!
//! Login is a handshake against the credentials provider: fetch the
//! anti-forgery token, then submit the credentials with each
//! [`LoginStrategy`] in turn. Only the session endpoint decides whether a
//! strategy worked; the status of the submission itself never does, since
//! the callback answers with a redirect or 200 on failure too.

use serde_json::json;
use storecheck_domain::auth::csrf_token_from;
use storecheck_domain::{
    ApiRequest, AuthError, Credentials, LoginAttempt, LoginStrategy, RequestBody, SessionInfo,
    SignupOutcome,
};

use crate::error::ApplicationResult;
use crate::ports::{ApiSession, SessionFactory};

/// Anti-forgery token endpoint.
pub const CSRF_PATH: &str = "/api/auth/csrf";
/// Session introspection endpoint.
pub const SESSION_PATH: &str = "/api/auth/session";
/// Provider listing endpoint.
pub const PROVIDERS_PATH: &str = "/api/auth/providers";
/// Credentials callback.
pub const CALLBACK_PATH: &str = "/api/auth/callback/credentials";
/// Account creation endpoint.
pub const SIGNUP_PATH: &str = "/api/auth/signup";

/// Establishes authenticated sessions.
pub struct SessionBootstrap<'a, F: SessionFactory> {
    factory: &'a F,
}

impl<'a, F: SessionFactory> SessionBootstrap<'a, F> {
    /// Creates a bootstrap that opens sessions with `factory`.
    #[must_use]
    pub const fn new(factory: &'a F) -> Self {
        Self { factory }
    }

    /// Returns a logged-in session for `credentials`.
    ///
    /// Tries a direct login first. If no session results, signs up (a
    /// duplicate account counts as provisioned) and logs in again.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Http` if the session cannot be opened and
    /// `ApplicationError::Auth` if the account cannot be provisioned or no
    /// login strategy yields a session.
    pub async fn establish(&self, credentials: &Credentials) -> ApplicationResult<F::Session> {
        let role = credentials.role;
        let session = self.factory.open(role)?;
        log_providers(&session).await;

        match login(&session, credentials).await {
            Ok(info) => {
                tracing::info!(%role, email = ?info.email, "reusing existing account");
                return Ok(session);
            }
            Err(AuthError::CredentialsRejected { .. }) => {
                tracing::info!(%role, "direct login failed, provisioning account");
            }
            Err(other) => return Err(other.into()),
        }

        let outcome = signup(&session, credentials).await?;
        tracing::info!(%role, ?outcome, "signup finished");

        let info = login(&session, credentials).await?;
        tracing::info!(%role, email = ?info.email, "session ready");
        Ok(session)
    }
}

/// Runs the login handshake on `session`.
///
/// # Errors
///
/// Returns `AuthError::CsrfUnavailable` if the token cannot be fetched and
/// `AuthError::CredentialsRejected` if no strategy yields a session.
pub async fn login<S: ApiSession>(
    session: &S,
    credentials: &Credentials,
) -> Result<SessionInfo, AuthError> {
    let role = credentials.role;
    let token = fetch_csrf_token(session)
        .await
        .map_err(|reason| AuthError::CsrfUnavailable { role, reason })?;

    let mut attempts = Vec::with_capacity(LoginStrategy::ordered().len());
    for (index, strategy) in LoginStrategy::ordered().into_iter().enumerate() {
        let request = login_request(strategy, credentials, &token);
        let attempt = match session.execute(&request).await {
            Ok(response) => LoginAttempt {
                strategy,
                status: Some(response.status),
                location: response
                    .location()
                    .map(ToString::to_string)
                    .or_else(|| response.final_url.clone()),
            },
            Err(e) => {
                tracing::warn!(%role, %strategy, error = %e, "login submission failed");
                LoginAttempt {
                    strategy,
                    status: None,
                    location: None,
                }
            }
        };
        tracing::info!(
            %role,
            attempt = index + 1,
            %strategy,
            status = ?attempt.status,
            location = ?attempt.location,
            "login attempt"
        );
        attempts.push(attempt);

        match check_session(session).await {
            Ok(info) => {
                tracing::info!(%role, %strategy, "logged in");
                return Ok(info);
            }
            Err(reason) => tracing::debug!(%role, %strategy, %reason, "no session yet"),
        }
    }

    Err(AuthError::CredentialsRejected { role, attempts })
}

/// Creates the account, treating a duplicate as success.
///
/// # Errors
///
/// Returns `AuthError::SignupRefused` when the server refuses for any other
/// reason or does not answer.
pub async fn signup<S: ApiSession>(
    session: &S,
    credentials: &Credentials,
) -> Result<SignupOutcome, AuthError> {
    let role = credentials.role;
    let request = ApiRequest::post(SIGNUP_PATH).with_json(json!({
        "email": credentials.email,
        "password": credentials.password,
        "role": role.as_str(),
        "name": credentials.display_name,
    }));

    let response = session
        .execute(&request)
        .await
        .map_err(|e| AuthError::SignupRefused {
            role,
            status: None,
            message: e.to_string(),
        })?;

    match SignupOutcome::classify(&response) {
        SignupOutcome::Refused { status, message } => Err(AuthError::SignupRefused {
            role,
            status: Some(status),
            message,
        }),
        outcome => Ok(outcome),
    }
}

/// Asks the session endpoint who is logged in.
///
/// # Errors
///
/// Returns a description when nobody is logged in or the endpoint is
/// unreachable.
pub async fn check_session<S: ApiSession>(session: &S) -> Result<SessionInfo, String> {
    let request = ApiRequest::get(SESSION_PATH).without_redirects();
    let response = session.execute(&request).await.map_err(|e| e.to_string())?;
    SessionInfo::from_response(&response)
}

async fn fetch_csrf_token<S: ApiSession>(session: &S) -> Result<String, String> {
    let request = ApiRequest::get(CSRF_PATH).without_redirects();
    let response = session
        .execute(&request)
        .await
        .map_err(|e| format!("CSRF request failed: {e}"))?;
    csrf_token_from(&response)
}

/// Logs the configured providers; diagnostics only, never fails.
async fn log_providers<S: ApiSession>(session: &S) {
    let names: Vec<String> = match session.execute(&ApiRequest::get(PROVIDERS_PATH)).await {
        Ok(response) => response
            .body_as_json()
            .and_then(|v| v.as_object().map(|o| o.keys().cloned().collect()))
            .unwrap_or_default(),
        Err(e) => {
            tracing::debug!(error = %e, "provider listing unavailable");
            Vec::new()
        }
    };
    let credentials_enabled = names.iter().any(|n| n == "credentials");
    tracing::info!(
        role = %session.role(),
        providers = ?names,
        credentials_enabled,
        "auth providers"
    );
}

fn login_request(strategy: LoginStrategy, credentials: &Credentials, token: &str) -> ApiRequest {
    if !strategy.needs_csrf_token() {
        return ApiRequest::post(format!("{CALLBACK_PATH}?json=true"))
            .with_header("Accept", "application/json")
            .with_json(json!({
                "email": credentials.email,
                "password": credentials.password,
            }))
            .without_redirects();
    }

    let request = ApiRequest::post(CALLBACK_PATH)
        .with_header("Accept", "application/json")
        .with_body(RequestBody::form([
            ("csrfToken", token),
            ("email", credentials.email.as_str()),
            ("password", credentials.password.as_str()),
            ("redirect", "false"),
            ("callbackUrl", "/"),
        ]));
    if strategy == LoginStrategy::FormNoRedirect {
        request.without_redirects()
    } else {
        request
    }
}
