//! Sequential case execution.
//!
//! Each case runs on the session bound to its role and is awaited to
//! completion before the next starts. Later cases depend on identifiers
//! captured by earlier ones, so order is significant.

use storecheck_domain::{ApiRequest, CapturedIds, ResponseSpec, ResultRow, Role, TestCase};

use crate::ports::ApiSession;

/// Body characters kept in failure logs.
const EXCERPT_CHARS: usize = 300;

/// The two logged-in sessions of a run.
#[derive(Debug)]
pub struct Sessions<S> {
    /// Session of the admin identity.
    pub admin: S,
    /// Session of the customer identity.
    pub customer: S,
}

impl<S: ApiSession> Sessions<S> {
    /// Returns the session bound to `role`.
    #[must_use]
    pub const fn get(&self, role: Role) -> &S {
        match role {
            Role::Admin => &self.admin,
            Role::Customer => &self.customer,
        }
    }
}

/// Runs cases in order, recording a row for each and collecting captures.
pub struct CaseExecutor<'a, S: ApiSession> {
    sessions: &'a Sessions<S>,
    ids: CapturedIds,
    rows: Vec<ResultRow>,
}

impl<'a, S: ApiSession> CaseExecutor<'a, S> {
    /// Creates an executor with no captured identifiers.
    #[must_use]
    pub fn new(sessions: &'a Sessions<S>) -> Self {
        Self {
            sessions,
            ids: CapturedIds::new(),
            rows: Vec::new(),
        }
    }

    /// Identifiers captured so far.
    #[must_use]
    pub const fn ids(&self) -> &CapturedIds {
        &self.ids
    }

    /// Rows recorded so far.
    #[must_use]
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// Runs `case`, records its row and returns it with the response.
    ///
    /// The response is absent when the case was skipped or the call failed
    /// at the transport level.
    pub async fn run(&mut self, case: &TestCase) -> (ResultRow, Option<ResponseSpec>) {
        let (row, response) = self.dispatch(case).await;
        log_row(&row, response.as_ref());
        self.rows.push(row.clone());
        (row, response)
    }

    /// Runs every case in order.
    pub async fn run_all(&mut self, cases: &[TestCase]) {
        for case in cases {
            self.run(case).await;
        }
    }

    /// Consumes the executor, returning rows and captured identifiers.
    #[must_use]
    pub fn into_parts(self) -> (Vec<ResultRow>, CapturedIds) {
        (self.rows, self.ids)
    }

    async fn dispatch(&mut self, case: &TestCase) -> (ResultRow, Option<ResponseSpec>) {
        let request = match self.prepare(case) {
            Ok(request) => request,
            Err(row) => return (row, None),
        };

        let session = self.sessions.get(case.role);
        let response = match session.execute(&request).await {
            Ok(response) => response,
            Err(e) => {
                let row = ResultRow::transport_failure(
                    case.method,
                    request.path,
                    case.role,
                    case.expected.clone(),
                    e.to_string(),
                );
                return (row, None);
            }
        };

        let row = ResultRow::from_status(
            case.method,
            request.path,
            case.role,
            case.expected.clone(),
            response.status,
        );
        if row.passed() {
            self.capture(case, &response);
        }
        (row, Some(response))
    }

    /// Renders the request, or returns the row for a case that cannot run.
    fn prepare(&self, case: &TestCase) -> Result<ApiRequest, ResultRow> {
        match case.path.first_missing(&self.ids) {
            Ok(Some(name)) => {
                return Err(ResultRow::skipped(case, format!("{name} was never captured")));
            }
            Ok(None) => {}
            Err(e) => {
                return Err(ResultRow::transport_failure(
                    case.method,
                    case.path.as_str(),
                    case.role,
                    case.expected.clone(),
                    e.to_string(),
                ));
            }
        }
        case.to_request(&self.ids).map_err(|e| {
            ResultRow::transport_failure(
                case.method,
                case.path.as_str(),
                case.role,
                case.expected.clone(),
                e.to_string(),
            )
        })
    }

    fn capture(&mut self, case: &TestCase, response: &ResponseSpec) {
        let Some(rule) = &case.capture else {
            return;
        };
        match rule.extract(response) {
            Some(value) => {
                tracing::info!(name = %rule.name, %value, "captured identifier");
                if let Err(e) = self.ids.capture(rule.name.clone(), value) {
                    tracing::warn!(error = %e, "capture ignored");
                }
            }
            None => tracing::warn!(
                name = %rule.name,
                body = %response.excerpt(EXCERPT_CHARS),
                "no identifier in response"
            ),
        }
    }
}

fn log_row(row: &ResultRow, response: Option<&ResponseSpec>) {
    if row.passed() {
        tracing::info!(
            method = %row.method,
            path = %row.path,
            role = %row.role,
            outcome = ?row.outcome,
            elapsed_ms = response.map(ResponseSpec::elapsed_ms),
            "case passed"
        );
    } else if row.is_skipped() {
        tracing::warn!(
            method = %row.method,
            path = %row.path,
            role = %row.role,
            outcome = ?row.outcome,
            "case skipped"
        );
    } else {
        tracing::warn!(
            method = %row.method,
            path = %row.path,
            role = %row.role,
            outcome = ?row.outcome,
            elapsed_ms = response.map(ResponseSpec::elapsed_ms),
            body = %response.map(|r| r.excerpt(EXCERPT_CHARS)).unwrap_or_default(),
            "case failed"
        );
    }
}
