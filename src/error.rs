// Error types for certwatch
//
// One error enum per pipeline stage, wrapped by `CheckError` so every stage can
// propagate with `?` while callers can still match on the stage that failed.

use std::io;
use std::num::ParseIntError;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single certificate check invocation
#[derive(Debug, Error)]
pub enum CheckError {
    /// Required configuration missing or malformed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// TLS connection to the target could not be established
    #[error("Connection error: {0}")]
    Connect(#[from] ConnectError),

    /// Peer certificate could not be read from an established connection
    #[error("Certificate error: {0}")]
    Certificate(#[from] CertificateError),

    /// Notification backend rejected or never acknowledged the message
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),
}

impl CheckError {
    /// Short stage label for log fields
    pub fn stage(&self) -> &'static str {
        match self {
            CheckError::Config(_) => "config",
            CheckError::Connect(_) => "connect",
            CheckError::Certificate(_) => "certificate",
            CheckError::Publish(_) => "publish",
        }
    }
}

/// Configuration errors raised while reading the process environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DOMAIN_NAME is not defined")]
    MissingDomainName,

    #[error("NOTIFICATION_CHANNEL is not defined")]
    MissingNotificationChannel,

    #[error("BUFFER_IN_DAYS is not defined")]
    MissingBufferDays,

    /// Buffer value is not a base-10 integer
    #[error("BUFFER_IN_DAYS is not an integer: {value:?}: {source}")]
    BufferDaysNotInteger {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("BUFFER_IN_DAYS must not be negative: {value}")]
    NegativeBufferDays { value: i64 },
}

/// Transport-level failures while dialing the target
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Hostname is not usable as a TLS server name
    #[error("Invalid server name: {name}")]
    InvalidServerName { name: String },

    #[error("Connection to {addr} timed out after {duration:?}")]
    Timeout { addr: String, duration: Duration },

    /// DNS failure, refused or reset connection
    #[error("Connection to {addr} failed: {source}")]
    Io {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("TLS handshake with {addr} failed: {source}")]
    Handshake {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// TLS client configuration could not be built
    #[error("TLS configuration error: {0}")]
    TlsConfig(#[from] rustls::Error),
}

/// Errors reading the leaf certificate from an open connection
#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("Server completed the handshake without presenting a certificate")]
    NoCertificatePresented,

    #[error("Certificate parsing error: {details}")]
    Malformed { details: String },

    #[error("Certificate expiry timestamp out of range: {timestamp}")]
    InvalidTimestamp { timestamp: i64 },
}

/// Messaging backend failures
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Notification backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed acknowledgment: {details}")]
    MalformedResponse { details: String },

    #[error("Publish timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Backend-specific rejection (authorization, throttling)
    #[error("{0}")]
    Backend(String),
}
