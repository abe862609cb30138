// Certificates module - Leaf certificate retrieval and expiry evaluation

pub mod expiry;
pub mod fetcher;

pub use expiry::{CertificateInfo, evaluate};
pub use fetcher::{
    HTTPS_PORT, RustlsDialer, TlsConnection, TlsDialer, connect, leaf_expiration,
    peer_expiration,
};
