// certwatch - Scheduled TLS certificate expiry check
// Copyright (C) 2025 certwatch contributors
// Licensed under GPL-3.0

//! certwatch opens a TLS connection to a domain, reads the leaf certificate's
//! expiry and, when it falls inside a configured window, publishes a warning
//! to a notification topic.
//!
//! The TLS dialer and the messaging backend are capabilities
//! ([`TlsDialer`], [`Publisher`]) passed into [`handle`], so the whole
//! pipeline runs against in-memory stubs in tests.

pub mod certificates;
pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod notify;

// Re-export commonly used types
pub use crate::certificates::{CertificateInfo, RustlsDialer, TlsConnection, TlsDialer};
pub use crate::cli::Args;
pub use crate::config::Configuration;
pub use crate::error::{CertificateError, CheckError, ConfigError, ConnectError, PublishError};
pub use crate::handler::{Outcome, handle, handle_at, report_json, run};
pub use crate::notify::{DryRunPublisher, HttpTopicPublisher, PublishInput, Publisher};

/// Result type for top-level certwatch operations
pub type Result<T> = anyhow::Result<T>;
