//! TLS certificate inspection
//!
//! Connects to HTTPS sites, records the leaf certificate they present and accepts it whatever
//! its trust status, so expired, self-signed or mismatched certificates can still be reported.
//!
//! # Module Organization
//!
//! - `probe` - Handshake and best-effort page fetch for one site over a dedicated reqwest client
//! - `verifier` - Certificate verifier that captures the leaf certificate and accepts it
//!
//! The accepting verifier is only ever installed on clients built by `probe`. The client that
//! delivers the report keeps regular certificate verification.
//!
//! # Example
//!
//! ```rust,ignore
//! use certpulse::tls::probe_site;
//! use std::time::Duration;
//!
//! let url = url::Url::parse("https://example.com")?;
//! let interception = probe_site(&url, Duration::from_secs(10)).await;
//! if let Ok(certificate) = interception.certificate {
//!     println!("{} expires {}", certificate.subject, certificate.valid_to);
//! }
//! ```

pub mod probe;
pub mod verifier;

// Re-export commonly used types
pub use probe::{
    Interception, build_client_config, build_http_client, ensure_crypto_provider, probe_site,
};
pub use verifier::{CertCapturingVerifier, extract_certificate};
