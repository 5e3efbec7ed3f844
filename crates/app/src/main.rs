//! Storecheck - Main Entry Point
//!
//! Loads the vars file, logs both identities in, seeds resources, runs the
//! storefront suite and prints the result table. Failing cases do not change
//! the exit status; configuration, login and seeding failures do.

mod cli;

use anyhow::Context;
use clap::Parser;
use storecheck_application::{troubleshooting_tips, ApplicationError, SmokeRun};
use storecheck_infrastructure::{render_report, ReqwestSessionFactory, RunnerConfig, SystemClock};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the report.
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = RunnerConfig::load(&cli.vars, cli.base_url.as_deref())
        .with_context(|| format!("cannot load configuration from {}", cli.vars.display()))?;

    tracing::info!(
        base_url = %config.base_url,
        admin = %config.admin.email,
        customer = %config.customer.email,
        "Starting storecheck v{}",
        env!("CARGO_PKG_VERSION")
    );

    let factory = ReqwestSessionFactory::new(&config.base_url)?;
    let mut run = SmokeRun::new(factory, SystemClock::new());

    let report = match run.execute(&config.admin, &config.customer).await {
        Ok(report) => report,
        Err(ApplicationError::Auth(error)) => {
            eprintln!("\nTroubleshooting:");
            for tip in troubleshooting_tips(&error) {
                eprintln!("  - {tip}");
            }
            return Err(error).context("cannot establish sessions");
        }
        Err(error) => {
            return Err(error).with_context(|| format!("run aborted during {}", run.phase()));
        }
    };

    print!("{}", render_report(&report.results, report.elapsed()));
    Ok(())
}
