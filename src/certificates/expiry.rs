// Expiry Evaluator - Compare the certificate expiry against the warning window

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Expiry facts derived from one certificate read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CertificateInfo {
    /// "Not after" of the leaf certificate
    pub expiration: DateTime<Utc>,
    /// `now + buffer_days`
    pub buffer_threshold: DateTime<Utc>,
    /// Whole days until expiration, truncated toward zero; negative once expired
    pub days_remaining: i64,
}

impl CertificateInfo {
    /// No warning is needed while expiration is strictly after the threshold
    pub fn is_healthy(&self) -> bool {
        self.expiration > self.buffer_threshold
    }
}

pub fn evaluate(now: DateTime<Utc>, buffer_days: i64, expiration: DateTime<Utc>) -> CertificateInfo {
    // Absurdly large windows saturate instead of overflowing
    let buffer_threshold = Duration::try_days(buffer_days)
        .and_then(|buffer| now.checked_add_signed(buffer))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let days_remaining = (expiration - now).num_hours() / 24;

    CertificateInfo {
        expiration,
        buffer_threshold,
        days_remaining,
    }
}
