// Check configuration resolved from the process environment

use crate::error::ConfigError;
use serde::Serialize;

/// Hostname of the certificate to check
pub const DOMAIN_NAME_VAR: &str = "DOMAIN_NAME";
/// Destination topic for the expiry warning
pub const NOTIFICATION_CHANNEL_VAR: &str = "NOTIFICATION_CHANNEL";
/// Size of the warning window in days
pub const BUFFER_DAYS_VAR: &str = "BUFFER_IN_DAYS";

/// Default bound, in seconds, on the TLS dial and on the publish request
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Immutable settings for one check invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Configuration {
    pub domain_name: String,
    pub notification_channel: String,
    pub buffer_days: i64,
}

impl Configuration {
    /// Resolve from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve through an arbitrary variable lookup.
    ///
    /// Variables are checked in a fixed order (domain, channel, buffer) and the
    /// first missing one is reported. An empty value counts as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let domain_name = required(DOMAIN_NAME_VAR).ok_or(ConfigError::MissingDomainName)?;
        let notification_channel =
            required(NOTIFICATION_CHANNEL_VAR).ok_or(ConfigError::MissingNotificationChannel)?;
        let buffer_raw = required(BUFFER_DAYS_VAR).ok_or(ConfigError::MissingBufferDays)?;

        let buffer_days = parse_buffer_days(&buffer_raw)?;

        Ok(Self {
            domain_name,
            notification_channel,
            buffer_days,
        })
    }
}

fn parse_buffer_days(raw: &str) -> Result<i64, ConfigError> {
    let value = raw
        .parse::<i64>()
        .map_err(|source| ConfigError::BufferDaysNotInteger {
            value: raw.to_string(),
            source,
        })?;

    if value < 0 {
        return Err(ConfigError::NegativeBufferDays { value });
    }

    Ok(value)
}
