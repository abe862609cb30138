// Certificate Fetcher - Dial the target over TLS and read the leaf certificate expiry
//
// Chain validation is deliberately disabled: the check reads the expiry of whatever
// certificate the server presents, including private-CA and self-signed ones. The
// connection is never used to exchange application data, so nothing relies on the
// peer identity being authenticated.

use crate::error::{CertificateError, ConnectError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, WebPkiSupportedAlgorithms};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tracing::debug;
use x509_parser::prelude::*;

/// Standard HTTPS port
pub const HTTPS_PORT: u16 = 443;

/// Default bound on TCP connect and TLS handshake, each
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS);

/// Capability that opens a TLS connection to a host
#[async_trait]
pub trait TlsDialer: Send + Sync {
    async fn dial(&self, domain_name: &str) -> Result<Box<dyn TlsConnection>, ConnectError>;
}

/// An established TLS connection
#[async_trait]
pub trait TlsConnection: Send {
    /// Peer certificate chain as negotiated, leaf first
    fn peer_certificates(&self) -> &[CertificateDer<'static>];

    /// Release the connection
    async fn close(&mut self);
}

/// Dial `domain_name` through `dialer`
pub async fn connect(
    dialer: &dyn TlsDialer,
    domain_name: &str,
) -> Result<Box<dyn TlsConnection>, ConnectError> {
    debug!("Dialing {}", domain_name);
    let connection = dialer.dial(domain_name).await?;
    debug!(
        "Connected to {} ({} peer certificates)",
        domain_name,
        connection.peer_certificates().len()
    );
    Ok(connection)
}

/// "Not after" timestamp of the leaf certificate presented on `connection`
pub fn peer_expiration(connection: &dyn TlsConnection) -> Result<DateTime<Utc>, CertificateError> {
    let leaf = connection
        .peer_certificates()
        .first()
        .ok_or(CertificateError::NoCertificatePresented)?;

    leaf_expiration(leaf.as_ref())
}

/// Parse a DER certificate and return its "not after" timestamp
pub fn leaf_expiration(der_bytes: &[u8]) -> Result<DateTime<Utc>, CertificateError> {
    let (_, cert) =
        X509Certificate::from_der(der_bytes).map_err(|e| CertificateError::Malformed {
            details: format!("{:?}", e),
        })?;

    let timestamp = cert.validity().not_after.timestamp();
    DateTime::from_timestamp(timestamp, 0).ok_or(CertificateError::InvalidTimestamp { timestamp })
}

/// Production dialer backed by tokio + rustls
pub struct RustlsDialer {
    config: Arc<ClientConfig>,
    port: u16,
    timeout: Duration,
}

impl RustlsDialer {
    /// Create a dialer for port 443 with the given connect/handshake timeout
    pub fn new(dial_timeout: Duration) -> Result<Self, ConnectError> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());

        let config = ClientConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(ExpiryOnlyVerifier::new(&provider)))
            .with_no_client_auth();

        Ok(Self {
            config: Arc::new(config),
            port: HTTPS_PORT,
            timeout: dial_timeout,
        })
    }

    /// Dial a port other than 443
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

#[async_trait]
impl TlsDialer for RustlsDialer {
    async fn dial(&self, domain_name: &str) -> Result<Box<dyn TlsConnection>, ConnectError> {
        let addr = format!("{}:{}", domain_name, self.port);

        let server_name = ServerName::try_from(domain_name.to_string()).map_err(|_| {
            ConnectError::InvalidServerName {
                name: domain_name.to_string(),
            }
        })?;

        let stream = timeout(self.timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| ConnectError::Timeout {
                addr: addr.clone(),
                duration: self.timeout,
            })?
            .map_err(|source| ConnectError::Io {
                addr: addr.clone(),
                source,
            })?;

        let connector = TlsConnector::from(self.config.clone());
        let tls_stream = timeout(self.timeout, connector.connect(server_name, stream))
            .await
            .map_err(|_| ConnectError::Timeout {
                addr: addr.clone(),
                duration: self.timeout,
            })?
            .map_err(|source| ConnectError::Handshake {
                addr: addr.clone(),
                source,
            })?;

        Ok(Box::new(RustlsConnection {
            stream: tls_stream,
            addr,
            close_timeout: self.timeout,
        }))
    }
}

struct RustlsConnection {
    stream: TlsStream<TcpStream>,
    addr: String,
    close_timeout: Duration,
}

#[async_trait]
impl TlsConnection for RustlsConnection {
    fn peer_certificates(&self) -> &[CertificateDer<'static>] {
        let (_, session) = self.stream.get_ref();
        session.peer_certificates().unwrap_or(&[])
    }

    async fn close(&mut self) {
        // Sends close_notify; failures only mean the peer already went away
        match timeout(self.close_timeout, self.stream.shutdown()).await {
            Ok(Ok(())) => debug!("Closed connection to {}", self.addr),
            Ok(Err(e)) => debug!("Error closing connection to {}: {}", self.addr, e),
            Err(_) => debug!("Timed out closing connection to {}", self.addr),
        }
    }
}

/// Accepts whatever the server presents, including X.509 v1 leaves and leaves
/// with unknown critical extensions, without checking handshake signatures.
/// Only the advertised signature schemes come from the crypto provider.
#[derive(Debug)]
struct ExpiryOnlyVerifier {
    algorithms: WebPkiSupportedAlgorithms,
}

impl ExpiryOnlyVerifier {
    fn new(provider: &CryptoProvider) -> Self {
        Self {
            algorithms: provider.signature_verification_algorithms,
        }
    }
}

impl ServerCertVerifier for ExpiryOnlyVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}
