//! CLI Argument Parsing

use std::path::PathBuf;

use clap::Parser;
use storecheck_infrastructure::config::DEFAULT_VARS_FILE;

/// Storecheck - smoke-tests a storefront API as an admin and a customer
#[derive(Parser, Debug)]
#[command(name = "storecheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Vars file with BASE_URL and the two identities' credentials
    #[arg(long, default_value = DEFAULT_VARS_FILE)]
    pub vars: PathBuf,

    /// API root; overrides BASE_URL from the vars file
    #[arg(long)]
    pub base_url: Option<String>,

    /// Verbosity level (-v, -vv); ignored when RUST_LOG is set
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is unset.
    #[must_use]
    pub const fn default_log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
