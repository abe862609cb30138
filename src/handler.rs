// Check handler - Run the full pipeline for one invocation
//
// ResolvingConfig -> Connecting -> Evaluating -> Healthy
//                                             -> Composing -> Publishing -> Published
// Any stage may fail; the first failure ends the invocation. Nothing is retried.

use crate::certificates::{TlsDialer, connect, evaluate, peer_expiration};
use crate::config::Configuration;
use crate::error::CheckError;
use crate::notify::{Publisher, compose, publish};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{error, info, warn};

/// Successful result of one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Expiry lies beyond the warning window; nothing was published
    Healthy {
        domain_name: String,
        expiration: DateTime<Utc>,
        days_remaining: i64,
    },
    /// A warning was published and acknowledged
    Notified {
        domain_name: String,
        expiration: DateTime<Utc>,
        days_remaining: i64,
        acknowledgment: String,
    },
}

impl Outcome {
    /// Empty when healthy, `"MessageID: <id>"` once a warning was sent
    pub fn message(&self) -> &str {
        match self {
            Outcome::Healthy { .. } => "",
            Outcome::Notified { acknowledgment, .. } => acknowledgment,
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, Outcome::Healthy { .. })
    }
}

/// JSON report of one invocation, as printed by `--json`
pub fn report_json(result: &Result<Outcome, CheckError>) -> serde_json::Result<Value> {
    match result {
        Ok(outcome) => serde_json::to_value(outcome),
        Err(e) => Ok(json!({
            "status": "failed",
            "stage": e.stage(),
            "error": e.to_string(),
        })),
    }
}

/// Entry point for a scheduler: resolve configuration through `lookup` and run the check
pub async fn handle<F>(
    lookup: F,
    dialer: &dyn TlsDialer,
    publisher: &dyn Publisher,
) -> Result<Outcome, CheckError>
where
    F: Fn(&str) -> Option<String>,
{
    let config = resolve(lookup)?;
    run(&config, Utc::now, dialer, publisher).await
}

/// Same as [`handle`] with a fixed evaluation time
pub async fn handle_at<F>(
    lookup: F,
    now: DateTime<Utc>,
    dialer: &dyn TlsDialer,
    publisher: &dyn Publisher,
) -> Result<Outcome, CheckError>
where
    F: Fn(&str) -> Option<String>,
{
    let config = resolve(lookup)?;
    run(&config, || now, dialer, publisher).await
}

fn resolve<F>(lookup: F) -> Result<Configuration, CheckError>
where
    F: Fn(&str) -> Option<String>,
{
    Configuration::from_lookup(lookup).map_err(|e| {
        error!("{}", e);
        CheckError::from(e)
    })
}

/// Run the check for an already resolved configuration.
///
/// `clock` is read once, after the certificate has been fetched.
pub async fn run<C>(
    config: &Configuration,
    clock: C,
    dialer: &dyn TlsDialer,
    publisher: &dyn Publisher,
) -> Result<Outcome, CheckError>
where
    C: Fn() -> DateTime<Utc>,
{
    let domain_name = &config.domain_name;

    let mut connection = connect(dialer, domain_name).await.map_err(|e| {
        error!("{}", e);
        CheckError::from(e)
    })?;

    // Released before the read result is inspected so every path closes exactly once
    let expiration = peer_expiration(&*connection);
    connection.close().await;
    drop(connection);

    let expiration = expiration.map_err(|e| {
        error!("{}: {}", domain_name, e);
        CheckError::from(e)
    })?;

    let cert = evaluate(clock(), config.buffer_days, expiration);

    if cert.is_healthy() {
        info!(
            "{} days left till {} expiration > {} days",
            cert.days_remaining, domain_name, config.buffer_days
        );
        return Ok(Outcome::Healthy {
            domain_name: domain_name.clone(),
            expiration: cert.expiration,
            days_remaining: cert.days_remaining,
        });
    }

    warn!(
        "Certificate for {} expires in {} days (buffer {} days)",
        domain_name, cert.days_remaining, config.buffer_days
    );

    let input = compose(config, &cert);
    let acknowledgment = publish(publisher, input).await?;

    Ok(Outcome::Notified {
        domain_name: domain_name.clone(),
        expiration: cert.expiration,
        days_remaining: cert.days_remaining,
        acknowledgment,
    })
}
