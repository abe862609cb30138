// Shared fixtures: self-signed certificates and in-memory collaborators
#![allow(dead_code)]

use async_trait::async_trait;
use certwatch::{ConnectError, PublishError, PublishInput, Publisher, TlsConnection, TlsDialer};
use chrono::{DateTime, Utc};
use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, MsbOption};
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::{X509, X509NameBuilder};
use rustls_pki_types::CertificateDer;
use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Self-signed X.509 v3 certificate for `common_name` expiring at `not_after`
pub fn self_signed(common_name: &str, not_after: DateTime<Utc>) -> (Vec<u8>, PKey<Private>) {
    self_signed_version(common_name, not_after, 2)
}

/// Self-signed certificate with an explicit X.509 version field (0 = v1, 2 = v3)
pub fn self_signed_version(
    common_name: &str,
    not_after: DateTime<Utc>,
    version: i32,
) -> (Vec<u8>, PKey<Private>) {
    let rsa = Rsa::generate(2048).unwrap();
    let pkey = PKey::from_rsa(rsa).unwrap();

    let mut builder = X509::builder().unwrap();
    builder.set_version(version).unwrap();

    let mut serial = BigNum::new().unwrap();
    serial.rand(64, MsbOption::MAYBE_ZERO, false).unwrap();
    builder
        .set_serial_number(&serial.to_asn1_integer().unwrap())
        .unwrap();

    let mut name_builder = X509NameBuilder::new().unwrap();
    name_builder.append_entry_by_text("O", "certwatch test").unwrap();
    name_builder.append_entry_by_text("CN", common_name).unwrap();
    let name = name_builder.build();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();

    let not_after = not_after.timestamp();
    builder
        .set_not_before(&Asn1Time::from_unix(not_after - 86_400 * 365).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::from_unix(not_after).unwrap())
        .unwrap();

    builder.set_pubkey(&pkey).unwrap();
    builder.sign(&pkey, MessageDigest::sha256()).unwrap();

    (builder.build().to_der().unwrap(), pkey)
}

pub fn leaf_expiring_at(not_after: DateTime<Utc>) -> CertificateDer<'static> {
    CertificateDer::from(self_signed("example.com", not_after).0)
}

/// Dialer handing out connections that present a fixed chain
pub struct StubDialer {
    chain: Option<Vec<CertificateDer<'static>>>,
    pub dials: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
    pub dialed: Mutex<Vec<String>>,
}

impl StubDialer {
    pub fn presenting(chain: Vec<CertificateDer<'static>>) -> Self {
        Self {
            chain: Some(chain),
            dials: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
            dialed: Mutex::new(Vec::new()),
        }
    }

    /// Every dial fails with a refused connection
    pub fn refusing() -> Self {
        Self {
            chain: None,
            ..Self::presenting(Vec::new())
        }
    }

    pub fn dial_count(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TlsDialer for StubDialer {
    async fn dial(&self, domain_name: &str) -> Result<Box<dyn TlsConnection>, ConnectError> {
        self.dials.fetch_add(1, Ordering::SeqCst);
        self.dialed.lock().unwrap().push(domain_name.to_string());

        match &self.chain {
            Some(chain) => Ok(Box::new(StubConnection {
                chain: chain.clone(),
                closes: self.closes.clone(),
            })),
            None => Err(ConnectError::Io {
                addr: format!("{}:443", domain_name),
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            }),
        }
    }
}

struct StubConnection {
    chain: Vec<CertificateDer<'static>>,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl TlsConnection for StubConnection {
    fn peer_certificates(&self) -> &[CertificateDer<'static>] {
        &self.chain
    }

    async fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// How a [`RecordingPublisher`] answers
pub enum Reply {
    Ack(&'static str),
    /// Acknowledge with the subject and message, to inspect what was sent
    Echo,
    Fail,
}

/// Publisher that records every input it receives
pub struct RecordingPublisher {
    reply: Reply,
    pub calls: Mutex<Vec<PublishInput>>,
}

impl RecordingPublisher {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<PublishInput> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, input: &PublishInput) -> Result<String, PublishError> {
        self.calls.lock().unwrap().push(input.clone());

        match self.reply {
            Reply::Ack(id) => Ok(id.to_string()),
            Reply::Echo => Ok(format!("{} | {}", input.subject, input.message)),
            Reply::Fail => Err(PublishError::Backend("Throttling: Rate exceeded".to_string())),
        }
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Environment lookup over fixed values
pub fn env(
    domain: &'static str,
    channel: &'static str,
    buffer: &'static str,
) -> impl Fn(&str) -> Option<String> {
    move |key: &str| match key {
        "DOMAIN_NAME" => Some(domain.to_string()),
        "NOTIFICATION_CHANNEL" => Some(channel.to_string()),
        "BUFFER_IN_DAYS" => Some(buffer.to_string()),
        _ => None,
    }
}
