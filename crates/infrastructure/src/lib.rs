//! Storecheck Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, the vars-file configuration
//! loader and the console report.

pub mod adapters;
pub mod config;
pub mod report;

pub use adapters::{ReqwestSession, ReqwestSessionFactory, SystemClock};
pub use config::{ConfigError, RunnerConfig, VarsFile};
pub use report::render_report;
