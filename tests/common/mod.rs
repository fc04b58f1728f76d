#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]

use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};
use rustls::{
    ServerConfig,
    pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer},
};
use std::{net::SocketAddr, sync::Arc};
use time::{Duration as TimeDuration, OffsetDateTime};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    time::{Duration, sleep},
};
use tokio_rustls::TlsAcceptor;

/// How the local server treats each connection
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// Complete the handshake and answer with this status code
    Respond(u16),
    /// Answer with a complete response but keep the connection open
    KeepAlive(u16),
    /// Complete the handshake and close without answering
    HangUp,
    /// Accept TCP but never speak TLS
    Silent,
}

/// Self-signed certificate for `localhost` valid between the given offsets from now
pub struct TestCertificate {
    pub der: CertificateDer<'static>,
    pub key: Vec<u8>,
    pub not_after: OffsetDateTime,
}

pub fn certificate(common_name: &str, valid_from_days: i64, valid_to_days: i64) -> TestCertificate {
    let now = OffsetDateTime::now_utc();
    let mut params = CertificateParams::new(vec!["localhost".to_string()]).unwrap();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    params.distinguished_name = dn;
    params.not_before = now + TimeDuration::days(valid_from_days);
    params.not_after = now + TimeDuration::days(valid_to_days);
    let not_after = params.not_after;

    let key_pair = KeyPair::generate().unwrap();
    let cert = params.self_signed(&key_pair).unwrap();

    TestCertificate {
        der: cert.der().clone(),
        key: key_pair.serialize_der(),
        not_after,
    }
}

/// Start a TLS server on an ephemeral loopback port and return its address
pub async fn serve(certificate: &TestCertificate, behavior: Behavior) -> SocketAddr {
    let config = ServerConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .unwrap()
    .with_no_client_auth()
    .with_single_cert(
        vec![certificate.der.clone()],
        PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(certificate.key.clone())),
    )
    .unwrap();

    let acceptor = TlsAcceptor::from(Arc::new(config));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let acceptor = acceptor.clone();

            tokio::spawn(async move {
                let (status, connection) = match behavior {
                    Behavior::Silent => {
                        sleep(Duration::from_secs(60)).await;
                        drop(stream);
                        return;
                    }
                    Behavior::HangUp => (None, "close"),
                    Behavior::Respond(status) => (Some(status), "close"),
                    Behavior::KeepAlive(status) => (Some(status), "keep-alive"),
                };

                let Ok(mut tls) = acceptor.accept(stream).await else {
                    return;
                };

                let mut request: Vec<u8> = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match tls.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                if let Some(status) = status {
                    let response = format!(
                        "HTTP/1.1 {status} Test\r\nContent-Length: 2\r\nConnection: {connection}\r\n\r\nok"
                    );
                    let _ = tls.write_all(response.as_bytes()).await;
                    let _ = tls.flush().await;
                }
                if connection == "keep-alive" {
                    sleep(Duration::from_secs(60)).await;
                }
                let _ = tls.shutdown().await;
            });
        }
    });

    addr
}

/// Loopback address with nothing listening on it
pub async fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn site_url(addr: SocketAddr) -> String {
    format!("https://{addr}")
}
