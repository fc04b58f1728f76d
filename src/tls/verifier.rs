use crate::site::Certificate;
use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use rustls::{
    DigitallySignedStruct, Error as TlsError, SignatureScheme,
    client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier},
    crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature},
    pki_types::{CertificateDer, ServerName, UnixTime},
};
use std::{
    fmt,
    sync::{Arc, Mutex},
};
use tracing::debug;
use x509_parser::prelude::{FromDer, X509Certificate};

/// Outcome of parsing the leaf certificate seen during a handshake
pub type Captured = Result<Certificate, String>;

/// A certificate verifier that records the presented leaf certificate and accepts it.
///
/// Chain, expiry and hostname checks are deliberately skipped: the point of inspection is to
/// observe expired, self-signed or mismatched certificates instead of rejecting them. Handshake
/// signatures are still verified against the presented certificate, so the peer must hold the
/// matching private key.
///
/// # Security
///
/// - Only used by the inspection connector built in `tls::probe`
/// - One instance per connection, never shared between sites
/// - Any other client in the process keeps its default `WebPKI` verification
pub struct CertCapturingVerifier {
    captured: Mutex<Option<Captured>>,
    provider: Arc<CryptoProvider>,
}

impl fmt::Debug for CertCapturingVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertCapturingVerifier")
            .field("captured", &self.captured)
            .field("provider", &"ring")
            .finish()
    }
}

impl Default for CertCapturingVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl CertCapturingVerifier {
    /// Create a verifier backed by the ring crypto provider
    #[must_use]
    pub fn new() -> Self {
        Self::with_provider(Arc::new(rustls::crypto::ring::default_provider()))
    }

    #[must_use]
    pub const fn with_provider(provider: Arc<CryptoProvider>) -> Self {
        Self {
            captured: Mutex::new(None),
            provider,
        }
    }

    #[must_use]
    pub fn provider(&self) -> Arc<CryptoProvider> {
        Arc::clone(&self.provider)
    }

    /// Take the captured certificate, leaving nothing behind
    ///
    /// Returns `None` if the handshake never reached certificate verification
    #[must_use]
    pub fn take_captured(&self) -> Option<Captured> {
        self.captured.lock().ok()?.take()
    }

    fn capture(&self, captured: Captured) {
        if let Ok(mut slot) = self.captured.lock()
            && slot.is_none()
        {
            *slot = Some(captured);
        }
    }
}

/// Extract subject, issuer and validity window from a DER-encoded certificate
///
/// # Errors
///
/// Returns an error if the certificate cannot be parsed or carries an out-of-range timestamp
pub fn extract_certificate(cert_der: &[u8]) -> Result<Certificate> {
    let (_, cert) = X509Certificate::from_der(cert_der)
        .map_err(|e| anyhow!("failed to parse certificate: {e}"))?;

    let not_before = cert.validity().not_before.to_datetime();
    let not_after = cert.validity().not_after.to_datetime();

    Ok(Certificate {
        subject: cert.subject().to_string(),
        issuer: cert.issuer().to_string(),
        valid_from: to_utc(not_before.unix_timestamp(), not_before.nanosecond())?,
        valid_to: to_utc(not_after.unix_timestamp(), not_after.nanosecond())?,
    })
}

fn to_utc(seconds: i64, nanos: u32) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(seconds, nanos)
        .ok_or_else(|| anyhow!("invalid certificate timestamp"))
}

impl ServerCertVerifier for CertCapturingVerifier {
    /// Record the leaf certificate and accept it regardless of trust
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, TlsError> {
        let captured = extract_certificate(end_entity.as_ref()).map_err(|e| format!("{e:#}"));

        match &captured {
            Ok(certificate) => debug!(
                server = ?server_name,
                subject = %certificate.subject,
                not_after = %certificate.valid_to,
                "captured leaf certificate"
            ),
            Err(e) => debug!(server = ?server_name, error = %e, "unparseable leaf certificate"),
        }

        self.capture(captured);

        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
