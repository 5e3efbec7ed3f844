//! Storecheck Domain - Core types
//!
//! This crate defines the domain model of the API smoke tester:
//! roles and credentials, request and response specs, test cases,
//! captured identifiers and result rows.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod captured;
pub mod credentials;
pub mod error;
pub mod request;
pub mod response;
pub mod role;
pub mod testing;

pub use auth::{AuthError, LoginAttempt, LoginStrategy, SessionInfo, SignupOutcome};
pub use captured::{CapturedIds, PathTemplate};
pub use credentials::Credentials;
pub use error::{DomainError, DomainResult};
pub use request::{ApiRequest, HttpMethod, RequestBody};
pub use response::ResponseSpec;
pub use role::Role;
pub use testing::{
    CaptureRule, CaptureSource, CaseOutcome, ResultRow, StatusExpectation, TestCase, TestResults,
};
