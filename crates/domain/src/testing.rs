//! Test cases, status expectations and result rows.
//!
//! A [`TestCase`] describes one call of the smoke suite: which session makes
//! it, where it goes, and which statuses count as a pass. Running it yields
//! a [`ResultRow`] that is appended to the run log and never changed.

use serde::{Deserialize, Serialize};

use crate::captured::{CapturedIds, PathTemplate};
use crate::error::DomainResult;
use crate::request::{ApiRequest, HttpMethod, RequestBody};
use crate::response::{identifier_of, ResponseSpec};
use crate::role::Role;

/// Expected status code value or set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum StatusExpectation {
    /// Exact status code.
    Exact(u16),
    /// One of multiple status codes.
    OneOf(Vec<u16>),
}

impl StatusExpectation {
    /// Check if a status code matches this expectation.
    #[must_use]
    pub fn matches(&self, status: u16) -> bool {
        match self {
            Self::Exact(expected) => status == *expected,
            Self::OneOf(codes) => codes.contains(&status),
        }
    }

    /// Get description of the expectation, e.g. `200` or `200,201`.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Exact(code) => code.to_string(),
            Self::OneOf(codes) => codes
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Create an exact status expectation.
    #[must_use]
    pub const fn exact(code: u16) -> Self {
        Self::Exact(code)
    }

    /// `200` or `201`, the outcomes of a create call.
    #[must_use]
    pub fn created() -> Self {
        Self::OneOf(vec![200, 201])
    }

    /// `403`, the outcome of a call the role is not allowed to make.
    #[must_use]
    pub const fn forbidden() -> Self {
        Self::Exact(403)
    }
}

impl Default for StatusExpectation {
    fn default() -> Self {
        Self::exact(200)
    }
}

/// Where a capture rule finds the identifier in a response payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureSource {
    /// The `id` of the payload object.
    Object,
    /// The `id` of the first element of the payload array.
    FirstListItem,
}

/// Stores an identifier from a successful response under a logical name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRule {
    /// Name later path templates refer to.
    pub name: String,
    /// Location of the identifier.
    pub source: CaptureSource,
}

impl CaptureRule {
    /// Captures the payload object's `id`.
    #[must_use]
    pub fn object(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: CaptureSource::Object,
        }
    }

    /// Captures the first list element's `id`.
    #[must_use]
    pub fn first_item(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: CaptureSource::FirstListItem,
        }
    }

    /// Extracts the identifier from an (envelope-unwrapped) response payload.
    #[must_use]
    pub fn extract(&self, response: &ResponseSpec) -> Option<String> {
        let payload = response.payload()?;
        match self.source {
            CaptureSource::Object => identifier_of(&payload),
            CaptureSource::FirstListItem => payload.as_array()?.first().and_then(identifier_of),
        }
    }
}

/// One call of the smoke suite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestCase {
    /// Session that issues the call.
    pub role: Role,
    /// HTTP method.
    pub method: HttpMethod,
    /// Path, possibly referencing captured identifiers.
    pub path: PathTemplate,
    /// Optional JSON body.
    pub body: Option<serde_json::Value>,
    /// Statuses that count as a pass.
    pub expected: StatusExpectation,
    /// Identifier to capture from a passing response.
    pub capture: Option<CaptureRule>,
}

impl TestCase {
    /// Creates a case without body or capture.
    #[must_use]
    pub fn new(
        role: Role,
        method: HttpMethod,
        path: impl Into<PathTemplate>,
        expected: StatusExpectation,
    ) -> Self {
        Self {
            role,
            method,
            path: path.into(),
            body: None,
            expected,
            capture: None,
        }
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Captures an identifier from a passing response.
    #[must_use]
    pub fn capturing(mut self, rule: CaptureRule) -> Self {
        self.capture = Some(rule);
        self
    }

    /// Builds the concrete request, substituting captured identifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if the path references an identifier that was not
    /// captured.
    pub fn to_request(&self, ids: &CapturedIds) -> DomainResult<ApiRequest> {
        let body = self
            .body
            .clone()
            .map_or(RequestBody::None, RequestBody::Json);
        Ok(ApiRequest::new(self.method, self.path.render(ids)?).with_body(body))
    }
}

/// Outcome of a single case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CaseOutcome {
    /// Status was in the expected set.
    Passed {
        /// Observed status.
        status: u16,
    },
    /// Status was outside the expected set, or the call never completed.
    Failed {
        /// Observed status, absent on transport failure.
        status: Option<u16>,
        /// Human-readable cause.
        reason: String,
    },
    /// Not dispatched because a referenced identifier was never captured.
    Skipped {
        /// Human-readable cause.
        reason: String,
    },
}

/// One line of the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    /// HTTP method.
    pub method: HttpMethod,
    /// Rendered path, or the template for skipped cases.
    pub path: String,
    /// Session that issued the call.
    pub role: Role,
    /// Expected statuses.
    pub expected: StatusExpectation,
    /// What happened.
    pub outcome: CaseOutcome,
}

impl ResultRow {
    /// Creates a row, deriving pass/fail from the observed status.
    #[must_use]
    pub fn from_status(
        method: HttpMethod,
        path: impl Into<String>,
        role: Role,
        expected: StatusExpectation,
        status: u16,
    ) -> Self {
        let outcome = if expected.matches(status) {
            CaseOutcome::Passed { status }
        } else {
            CaseOutcome::Failed {
                status: Some(status),
                reason: format!("expected {}, got {status}", expected.description()),
            }
        };
        Self {
            method,
            path: path.into(),
            role,
            expected,
            outcome,
        }
    }

    /// Creates a failed row for a call that never produced a response.
    #[must_use]
    pub fn transport_failure(
        method: HttpMethod,
        path: impl Into<String>,
        role: Role,
        expected: StatusExpectation,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            role,
            expected,
            outcome: CaseOutcome::Failed {
                status: None,
                reason: reason.into(),
            },
        }
    }

    /// Creates a skipped row.
    #[must_use]
    pub fn skipped(case: &TestCase, reason: impl Into<String>) -> Self {
        Self {
            method: case.method,
            path: case.path.to_string(),
            role: case.role,
            expected: case.expected.clone(),
            outcome: CaseOutcome::Skipped {
                reason: reason.into(),
            },
        }
    }

    /// Returns true if the case passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self.outcome, CaseOutcome::Passed { .. })
    }

    /// Returns true if the case was skipped.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self.outcome, CaseOutcome::Skipped { .. })
    }
}

/// Results from running the suite.
#[derive(Debug, Clone, Serialize)]
pub struct TestResults {
    /// Rows in call order.
    pub rows: Vec<ResultRow>,
    /// Number of rows.
    pub total: usize,
    /// Number of passed rows.
    pub passed: usize,
    /// Number of failed rows.
    pub failed: usize,
    /// Number of skipped rows.
    pub skipped: usize,
    /// Execution time in milliseconds.
    pub duration_ms: u64,
}

impl TestResults {
    /// Create new test results.
    #[must_use]
    pub fn new(rows: Vec<ResultRow>, duration_ms: u64) -> Self {
        let total = rows.len();
        let passed = rows.iter().filter(|r| r.passed()).count();
        let skipped = rows.iter().filter(|r| r.is_skipped()).count();
        let failed = total - passed - skipped;

        Self {
            rows,
            total,
            passed,
            failed,
            skipped,
            duration_ms,
        }
    }

    /// Check if all cases passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }
}
