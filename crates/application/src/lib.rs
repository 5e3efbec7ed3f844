//! Storecheck Application - Use cases and ports
//!
//! This crate defines the application layer with:
//! - Port traits (HTTP sessions, clock)
//! - Session bootstrap, resource seeding and sequential case execution
//! - Run orchestration and application-level error handling

pub mod auth;
pub mod error;
pub mod executor;
pub mod ports;
pub mod run;
pub mod seeding;
pub mod suite;

#[cfg(test)]
mod test_support;

pub use auth::{troubleshooting_tips, SessionBootstrap};
pub use error::{ApplicationError, ApplicationResult};
pub use executor::{CaseExecutor, Sessions};
pub use ports::{ApiSession, Clock, HttpClientError, SessionFactory, SessionFuture};
pub use run::{RunPhase, RunReport, SmokeRun};
pub use seeding::seed_resources;
pub use suite::{storefront_cases, SeedCase, SuiteBuilder};
