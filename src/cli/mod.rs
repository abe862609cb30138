// CLI module - Arguments of the scheduled invocation wrapper

use crate::certificates::HTTPS_PORT;
use crate::config::DEFAULT_TIMEOUT_SECS;
use clap::Parser;

/// certwatch - warn through a notification topic before a TLS certificate expires
///
/// The target, destination and warning window are read from DOMAIN_NAME,
/// NOTIFICATION_CHANNEL and BUFFER_IN_DAYS. The options below only tune how the
/// check runs.
#[derive(Parser, Debug, Clone)]
#[command(name = "certwatch", version, about, long_about = None)]
pub struct Args {
    /// Timeout in seconds for the TLS dial and for the publish request
    #[arg(long, value_name = "SECS", env = "CHECK_TIMEOUT_SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// TLS port to dial on the target
    #[arg(long, value_name = "PORT", env = "CHECK_PORT", default_value_t = HTTPS_PORT)]
    pub port: u16,

    /// Log the warning instead of publishing it
    #[arg(long)]
    pub dry_run: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

impl Args {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout)
    }
}
