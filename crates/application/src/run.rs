//! Smoke run orchestration.
//!
//! `Init → BootstrapSessions → SeedResources → ExecuteCases → Report → Done`.
//! Bootstrap and seeding abort the run on failure; case failures are only
//! recorded.

use std::fmt;

use chrono::{DateTime, Utc};
use storecheck_domain::{CapturedIds, Credentials, TestResults};

use crate::auth::SessionBootstrap;
use crate::error::ApplicationResult;
use crate::executor::{CaseExecutor, Sessions};
use crate::ports::{Clock, SessionFactory};
use crate::seeding::seed_resources;
use crate::suite::storefront_cases;

/// Stage of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Nothing done yet.
    Init,
    /// Logging in both identities.
    BootstrapSessions,
    /// Creating prerequisite resources.
    SeedResources,
    /// Running the suite.
    ExecuteCases,
    /// Summarising results.
    Report,
    /// Finished.
    Done,
}

impl RunPhase {
    /// Returns the phase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::BootstrapSessions => "bootstrap_sessions",
            Self::SeedResources => "seed_resources",
            Self::ExecuteCases => "execute_cases",
            Self::Report => "report",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Seed and case rows in call order.
    pub results: TestResults,
    /// Identifiers captured during the run.
    pub captured: CapturedIds,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the last case finished.
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Wall time of the run.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }
}

/// Runs the storefront smoke suite end to end.
pub struct SmokeRun<F: SessionFactory, C: Clock> {
    factory: F,
    clock: C,
    phase: RunPhase,
}

impl<F: SessionFactory, C: Clock> SmokeRun<F, C> {
    /// Creates a run that opens sessions with `factory`.
    #[must_use]
    pub const fn new(factory: F, clock: C) -> Self {
        Self {
            factory,
            clock,
            phase: RunPhase::Init,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Logs both identities in, seeds resources and runs every case.
    ///
    /// # Errors
    ///
    /// Returns an error if a session cannot be established or a required
    /// resource cannot be created. Failing cases are reported in the
    /// returned [`RunReport`] instead.
    pub async fn execute(
        &mut self,
        admin: &Credentials,
        customer: &Credentials,
    ) -> ApplicationResult<RunReport> {
        let started_at = self.clock.now();

        self.enter(RunPhase::BootstrapSessions);
        let bootstrap = SessionBootstrap::new(&self.factory);
        let sessions = Sessions {
            admin: bootstrap.establish(admin).await?,
            customer: bootstrap.establish(customer).await?,
        };

        self.enter(RunPhase::SeedResources);
        let mut executor = CaseExecutor::new(&sessions);
        seed_resources(&mut executor).await?;

        self.enter(RunPhase::ExecuteCases);
        let cases = storefront_cases(executor.ids())?;
        tracing::info!(cases = cases.len(), "running suite");
        executor.run_all(&cases).await;

        self.enter(RunPhase::Report);
        let finished_at = self.clock.now();
        let duration_ms = u64::try_from((finished_at - started_at).num_milliseconds()).unwrap_or(0);
        let (rows, captured) = executor.into_parts();
        let results = TestResults::new(rows, duration_ms);
        tracing::info!(
            total = results.total,
            passed = results.passed,
            failed = results.failed,
            skipped = results.skipped,
            duration_ms,
            "run finished"
        );

        self.enter(RunPhase::Done);
        Ok(RunReport {
            results,
            captured,
            started_at,
            finished_at,
        })
    }

    fn enter(&mut self, next: RunPhase) {
        tracing::info!(from = %self.phase, to = %next, "phase transition");
        self.phase = next;
    }
}
