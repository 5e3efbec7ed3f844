//! In-memory storefront used by the use-case tests.
//!
//! Mirrors the remote API closely enough for the bootstrap, seeding and
//! execution paths: credentials provider handshake, signup, role checks on
//! admin-only routes, and `{"data": ...}` envelopes on success.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use storecheck_domain::{
    ApiRequest, Credentials, HttpMethod, LoginStrategy, RequestBody, ResponseSpec, Role,
};

use crate::auth::{CALLBACK_PATH, CSRF_PATH, PROVIDERS_PATH, SESSION_PATH, SIGNUP_PATH};
use crate::ports::{ApiSession, Clock, HttpClientError, SessionFactory, SessionFuture};

const CSRF_TOKEN: &str = "tok";

#[derive(Debug, Clone)]
struct Account {
    password: String,
    name: String,
    role: Role,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<String, Account>,
    logins_to_reject: usize,
    reject_all_logins: bool,
    accepted_strategy: Option<LoginStrategy>,
    broken_csrf: bool,
    signup_refusal: Option<(u16, String)>,
    last_signup_status: Option<u16>,
    empty_wishlist: bool,
    overrides: HashMap<(HttpMethod, String), u16>,
    unreachable: HashSet<(HttpMethod, String)>,
    calls: Vec<(HttpMethod, String)>,
    logged_in: HashMap<usize, String>,
    wishlist: Vec<String>,
    next_session: usize,
    next_id: u64,
}

/// Shared fake server; clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct FakeServer {
    state: Arc<Mutex<State>>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("fake server state")
    }

    pub fn with_account(self, credentials: &Credentials) -> Self {
        self.state().accounts.insert(
            credentials.email.clone(),
            Account {
                password: credentials.password.clone(),
                name: credentials.display_name.clone(),
                role: credentials.role,
            },
        );
        self
    }

    /// Rejects the next `count` credential submissions regardless of strategy.
    pub fn rejecting_first_logins(self, count: usize) -> Self {
        self.state().logins_to_reject = count;
        self
    }

    pub fn accepting_only(self, strategy: LoginStrategy) -> Self {
        self.state().accepted_strategy = Some(strategy);
        self
    }

    pub fn rejecting_all_logins(self) -> Self {
        self.state().reject_all_logins = true;
        self
    }

    pub fn with_broken_csrf(self) -> Self {
        self.state().broken_csrf = true;
        self
    }

    pub fn refusing_signup(self, status: u16, message: &str) -> Self {
        self.state().signup_refusal = Some((status, message.to_string()));
        self
    }

    /// Wishlist adds are accepted but the listing stays empty.
    pub fn with_empty_wishlist(self) -> Self {
        self.state().empty_wishlist = true;
        self
    }

    /// Answers `method path` with `status` and an error body.
    pub fn responding(self, method: HttpMethod, path: &str, status: u16) -> Self {
        self.state()
            .overrides
            .insert((method, path.to_string()), status);
        self
    }

    /// Fails `method path` with a refused connection.
    pub fn unreachable(self, method: HttpMethod, path: &str) -> Self {
        self.state().unreachable.insert((method, path.to_string()));
        self
    }

    pub fn calls_to(&self, method: HttpMethod, path: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|(m, p)| *m == method && p == path)
            .count()
    }

    /// Every call made, in order.
    pub fn calls(&self) -> Vec<(HttpMethod, String)> {
        self.state().calls.clone()
    }

    pub fn has_account(&self, email: &str) -> bool {
        self.state().accounts.contains_key(email)
    }

    pub fn last_signup_status(&self) -> Option<u16> {
        self.state().last_signup_status
    }

    fn open_session(&self) -> usize {
        let mut state = self.state();
        state.next_session += 1;
        state.next_session
    }

    fn handle(&self, session: usize, request: &ApiRequest) -> Result<ResponseSpec, HttpClientError> {
        let mut state = self.state();
        let key = (request.method, request.path.clone());
        state.calls.push(key.clone());

        if state.unreachable.contains(&key) {
            return Err(HttpClientError::ConnectionRefused {
                host: "localhost".to_string(),
                port: 3000,
            });
        }
        if let Some(status) = state.overrides.get(&key) {
            return Ok(ResponseSpec::json(
                *status,
                &json!({"error": {"message": "forced by test"}}),
            ));
        }

        let (path, json_flag) = match request.path.split_once('?') {
            Some((path, query)) => (path, query == "json=true"),
            None => (request.path.as_str(), false),
        };

        Ok(match (request.method, path) {
            (HttpMethod::Get, CSRF_PATH) if state.broken_csrf => {
                ResponseSpec::new(500, HashMap::new(), b"<html>oops</html>", std::time::Duration::ZERO)
            }
            (HttpMethod::Get, CSRF_PATH) => ResponseSpec::json(200, &json!({"csrfToken": CSRF_TOKEN})),
            (HttpMethod::Get, PROVIDERS_PATH) => {
                ResponseSpec::json(200, &json!({"credentials": {"id": "credentials"}}))
            }
            (HttpMethod::Get, SESSION_PATH) => session_response(&state, session),
            (HttpMethod::Post, CALLBACK_PATH) => {
                let strategy = match (&request.body, json_flag) {
                    (_, true) => LoginStrategy::JsonFallback,
                    (RequestBody::Form(_), false) if !request.follow_redirects => {
                        LoginStrategy::FormNoRedirect
                    }
                    _ => LoginStrategy::FormFollowRedirects,
                };
                callback(&mut state, session, strategy, &request.body)
            }
            (HttpMethod::Post, SIGNUP_PATH) => signup(&mut state, &request.body),
            (method, path) if path.starts_with("/api/") => resource(&mut state, session, method, path),
            _ => ResponseSpec::json(404, &json!({"error": {"message": "not found"}})),
        })
    }
}

fn field<'a>(body: &'a RequestBody, name: &str) -> Option<&'a str> {
    match body {
        RequestBody::Json(value) => value.get(name).and_then(Value::as_str),
        RequestBody::Form(pairs) => pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str()),
        RequestBody::None => None,
    }
}

fn session_response(state: &State, session: usize) -> ResponseSpec {
    let user = state
        .logged_in
        .get(&session)
        .and_then(|email| state.accounts.get(email).map(|a| (email, a)));
    match user {
        Some((email, account)) => ResponseSpec::json(
            200,
            &json!({"user": {"email": email, "name": account.name, "role": account.role.as_str()}}),
        ),
        None => ResponseSpec::json(200, &json!({})),
    }
}

fn callback(
    state: &mut State,
    session: usize,
    strategy: LoginStrategy,
    body: &RequestBody,
) -> ResponseSpec {
    let email = field(body, "email").unwrap_or_default().to_string();
    let password = field(body, "password").unwrap_or_default();
    let token_ok = !strategy.needs_csrf_token() || field(body, "csrfToken") == Some(CSRF_TOKEN);
    let password_ok = state
        .accounts
        .get(&email)
        .is_some_and(|a| a.password == password);
    let strategy_ok = state.accepted_strategy.is_none_or(|s| s == strategy);

    let mut accepted = token_ok && password_ok && strategy_ok && !state.reject_all_logins;
    if state.logins_to_reject > 0 {
        state.logins_to_reject -= 1;
        accepted = false;
    }
    if accepted {
        state.logged_in.insert(session, email);
    }

    let target = if accepted {
        "/"
    } else {
        "/api/auth/error?error=CredentialsSignin"
    };
    match strategy {
        LoginStrategy::FormNoRedirect => {
            let mut headers = HashMap::new();
            headers.insert("location".to_string(), target.to_string());
            ResponseSpec::new(302, headers, b"", std::time::Duration::ZERO)
        }
        LoginStrategy::FormFollowRedirects => {
            ResponseSpec::json(200, &json!({})).with_final_url(format!("http://localhost:3000{target}"))
        }
        LoginStrategy::JsonFallback if accepted => ResponseSpec::json(200, &json!({"url": target})),
        LoginStrategy::JsonFallback => {
            ResponseSpec::json(401, &json!({"error": "CredentialsSignin", "url": target}))
        }
    }
}

fn signup(state: &mut State, body: &RequestBody) -> ResponseSpec {
    let response = if let Some((status, message)) = state.signup_refusal.clone() {
        ResponseSpec::json(status, &json!({"error": {"message": message}}))
    } else {
        let email = field(body, "email").unwrap_or_default().to_string();
        let role = match field(body, "role") {
            Some("ADMIN") => Some(Role::Admin),
            Some("CUSTOMER") => Some(Role::Customer),
            _ => None,
        };
        match role {
            _ if state.accounts.contains_key(&email) => ResponseSpec::json(
                409,
                &json!({"error": {"code": "CONFLICT", "message": "User already exists"}}),
            ),
            None => ResponseSpec::json(
                400,
                &json!({"error": {"message": "Role must be ADMIN or CUSTOMER"}}),
            ),
            Some(role) => {
                state.accounts.insert(
                    email.clone(),
                    Account {
                        password: field(body, "password").unwrap_or_default().to_string(),
                        name: field(body, "name").unwrap_or_default().to_string(),
                        role,
                    },
                );
                ResponseSpec::json(201, &json!({"success": true, "data": {"email": email}}))
            }
        }
    };
    state.last_signup_status = Some(response.status);
    response
}

fn admin_only(method: HttpMethod, path: &str) -> bool {
    match method {
        HttpMethod::Get => path == "/api/admin/stats",
        HttpMethod::Post => {
            path == "/api/categories"
                || path == "/api/products"
                || path.starts_with("/api/shipments/")
                || path.starts_with("/api/receipts/")
        }
        HttpMethod::Patch => {
            path.starts_with("/api/categories/")
                || path.starts_with("/api/products/")
                || path.starts_with("/api/shipments/")
        }
        HttpMethod::Delete => path.starts_with("/api/products/"),
    }
}

fn creates(method: HttpMethod, path: &str) -> bool {
    method == HttpMethod::Post && !path.starts_with("/api/orders/cancel/")
}

fn resource(state: &mut State, session: usize, method: HttpMethod, path: &str) -> ResponseSpec {
    let role = state
        .logged_in
        .get(&session)
        .and_then(|email| state.accounts.get(email))
        .map(|a| a.role);
    let Some(role) = role else {
        return ResponseSpec::json(401, &json!({"error": {"message": "Unauthorized"}}));
    };
    if role != Role::Admin && admin_only(method, path) {
        return ResponseSpec::json(403, &json!({"error": {"message": "Forbidden"}}));
    }

    if creates(method, path) {
        state.next_id += 1;
        let id = format!("id-{}", state.next_id);
        if path == "/api/wishlist" && !state.empty_wishlist {
            state.wishlist.push(id.clone());
        }
        return ResponseSpec::json(201, &json!({"success": true, "data": {"id": id}}));
    }
    if method == HttpMethod::Get && path == "/api/wishlist" {
        let items: Vec<Value> = state.wishlist.iter().map(|id| json!({"id": id})).collect();
        return ResponseSpec::json(200, &json!({"success": true, "data": items}));
    }
    ResponseSpec::json(200, &json!({"success": true, "data": {}}))
}

/// Session bound to one role on a [`FakeServer`].
#[derive(Debug, Clone)]
pub struct FakeSession {
    server: FakeServer,
    role: Role,
    id: usize,
}

impl ApiSession for FakeSession {
    fn role(&self) -> Role {
        self.role
    }

    fn execute<'a>(&'a self, request: &'a ApiRequest) -> SessionFuture<'a> {
        Box::pin(async move { self.server.handle(self.id, request) })
    }
}

/// Opens [`FakeSession`]s on a shared server.
#[derive(Debug, Clone)]
pub struct FakeSessionFactory {
    server: FakeServer,
}

impl FakeSessionFactory {
    pub const fn new(server: FakeServer) -> Self {
        Self { server }
    }
}

impl SessionFactory for FakeSessionFactory {
    type Session = FakeSession;

    fn open(&self, role: Role) -> Result<FakeSession, HttpClientError> {
        Ok(FakeSession {
            server: self.server.clone(),
            role,
            id: self.server.open_session(),
        })
    }
}

/// Clock that advances by a fixed step on every reading.
#[derive(Debug)]
pub struct SteppingClock {
    step_ms: i64,
    readings: Mutex<i64>,
}

impl SteppingClock {
    pub const fn new(step_ms: i64) -> Self {
        Self {
            step_ms,
            readings: Mutex::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let mut readings = self.readings.lock().expect("clock readings");
        let offset = *readings * self.step_ms;
        *readings += 1;
        Utc.timestamp_millis_opt(1_700_000_000_000 + offset).unwrap()
    }
}
