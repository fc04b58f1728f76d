use super::verifier::CertCapturingVerifier;
use crate::site::Certificate;
use anyhow::{Context, Result};
use rustls::ClientConfig;
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

static CRYPTO_PROVIDER_INIT: OnceLock<()> = OnceLock::new();

/// Ensure the rustls crypto provider is installed as the process default
///
/// Safe to call multiple times, installation only happens once.
pub fn ensure_crypto_provider() {
    CRYPTO_PROVIDER_INIT.get_or_init(|| {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            debug!("rustls crypto provider already installed");
        }
    });
}

/// Result of inspecting one connection, handed back to the caller to merge
#[derive(Debug)]
pub struct Interception {
    /// URL actually requested, including the path separator the configured URL may lack
    pub live_url: Url,
    /// Leaf certificate captured during the handshake, or why none was captured
    pub certificate: Result<Certificate, String>,
    /// HTTP status of the best-effort fetch
    pub status: Option<u16>,
    /// Connection, handshake or fetch failure
    pub error: Option<String>,
}

/// Connect to `url`, capture the presented leaf certificate and fetch the page.
///
/// Every certificate is accepted. The fetch only exists to drive the handshake to completion;
/// only its status is kept and its failure never discards a certificate captured before it.
/// `limit` bounds the whole connection.
pub async fn probe_site(url: &Url, limit: Duration) -> Interception {
    let verifier = Arc::new(CertCapturingVerifier::new());

    let outcome = match timeout(limit, fetch_status(url, Arc::clone(&verifier))).await {
        Ok(Ok(status)) => Ok(status),
        Ok(Err(e)) => Err(format!("{e:#}")),
        Err(_) => Err(format!("timed out after {}s", limit.as_secs_f32())),
    };

    let (status, error) = match outcome {
        Ok(status) => (Some(status), None),
        Err(e) => (None, Some(e)),
    };

    let certificate = match verifier.take_captured() {
        Some(captured) => captured,
        None => Err(error
            .clone()
            .unwrap_or_else(|| "no certificate presented".to_string())),
    };

    Interception {
        live_url: url.clone(),
        certificate,
        status,
        error,
    }
}

/// `GET` the page and return its status without reading the body
async fn fetch_status(url: &Url, verifier: Arc<CertCapturingVerifier>) -> Result<u16> {
    let client = build_http_client(verifier)?;

    let response = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("failed to fetch {url}"))?;

    let status = response.status();
    if !status.is_success() {
        warn!(url = %url, status = status.as_u16(), "site answered with a non-success status");
    }

    Ok(status.as_u16())
}

/// Build a TLS client configuration that accepts any server certificate through `verifier`
///
/// # Errors
///
/// Returns an error if the crypto provider supports no safe protocol version
pub fn build_client_config(verifier: Arc<CertCapturingVerifier>) -> Result<ClientConfig> {
    let mut config = ClientConfig::builder_with_provider(verifier.provider())
        .with_safe_default_protocol_versions()
        .context("failed to select TLS protocol versions")?
        .dangerous()
        .with_custom_certificate_verifier(verifier)
        .with_no_client_auth();

    config.alpn_protocols = vec![b"http/1.1".to_vec()];

    Ok(config)
}

/// Single-site HTTP client whose connections go through `verifier`
///
/// Redirects are not followed so the captured certificate always belongs to the configured host.
///
/// # Errors
///
/// Returns an error if the TLS configuration or the client cannot be built
pub fn build_http_client(verifier: Arc<CertCapturingVerifier>) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .use_preconfigured_tls(build_client_config(verifier)?)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .build()
        .context("failed to build inspection client")
}
