//! Rendezvous log stream
//!
//! One-off dynos created with `attach: true` expose their output through a
//! rendezvous endpoint: a TLS socket that starts streaming once the client
//! sends the secret from the attach URL. Streaming is best-effort
//! observability; callers decide whether a failure here matters.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rustls::pki_types::ServerName;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::debug;
use url::Url;

use crate::errors::HelperError;

/// How long to wait for output before abandoning the attach
pub const DEFAULT_ACTIVITY_TIMEOUT: Duration = Duration::from_secs(600);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_RENDEZVOUS_PORT: u16 = 5000;

/// Live output stream for a remote one-off command
#[async_trait]
pub trait LogStream: Send + Sync {
    /// Attach to `attach_url` and copy the command's output to the
    /// operator's console. Fails on transport errors or when no data
    /// arrives within `activity_timeout`.
    async fn attach(&self, attach_url: &str, activity_timeout: Duration)
        -> Result<(), HelperError>;
}

/// `LogStream` over the rendezvous TLS protocol
pub struct Rendezvous;

#[async_trait]
impl LogStream for Rendezvous {
    async fn attach(
        &self,
        attach_url: &str,
        activity_timeout: Duration,
    ) -> Result<(), HelperError> {
        let url = Url::parse(attach_url)
            .map_err(|e| HelperError::StreamError(format!("bad attach url: {}", e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| HelperError::StreamError("attach url has no host".to_string()))?
            .to_string();
        let port = url.port().unwrap_or(DEFAULT_RENDEZVOUS_PORT);
        let secret = url.path().trim_start_matches('/').to_string();

        debug!("Attaching to rendezvous endpoint {}:{}", host, port);
        let tcp = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect((host.as_str(), port)))
            .await
            .map_err(|_| {
                HelperError::StreamError(format!("timed out connecting to {}:{}", host, port))
            })??;

        let connector = TlsConnector::from(Arc::new(tls_config()?));
        let server_name = ServerName::try_from(host.clone())
            .map_err(|e| HelperError::StreamError(format!("invalid server name: {}", e)))?;
        let mut stream = connector.connect(server_name, tcp).await?;

        stream.write_all(secret.as_bytes()).await?;
        stream.write_all(b"\n").await?;
        stream.flush().await?;

        let mut stdout = tokio::io::stdout();
        let mut buf = [0u8; 4096];
        loop {
            let n = tokio::time::timeout(activity_timeout, stream.read(&mut buf))
                .await
                .map_err(|_| {
                    HelperError::StreamError(format!(
                        "no output for {}s, abandoning attach",
                        activity_timeout.as_secs()
                    ))
                })??;
            if n == 0 {
                break;
            }
            stdout.write_all(&buf[..n]).await?;
            stdout.flush().await?;
        }

        Ok(())
    }
}

fn tls_config() -> Result<rustls::ClientConfig, HelperError> {
    let mut root_cert_store = rustls::RootCertStore::empty();
    let certs = rustls_native_certs::load_native_certs()
        .map_err(|e| HelperError::StreamError(format!("cannot load system roots: {}", e)))?;
    for cert in certs {
        let _ = root_cert_store.add(cert);
    }

    Ok(rustls::ClientConfig::builder()
        .with_root_certificates(root_cert_store)
        .with_no_client_auth())
}
