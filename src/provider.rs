//! Network side of the session: the quote API request and the
//! connectivity probe consulted when that request fails.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Client;
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::config::{NetworkConfig, QuotesConfig};
use crate::error::FetchError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Performs the single GET for a new quote and hands back the raw body.
pub trait QuoteProvider: Send + Sync {
    fn fetch(&self) -> BoxFuture<'_, Result<Vec<u8>, FetchError>>;
}

/// Answers whether the machine currently has a network route.
pub trait ConnectivityProbe: Send + Sync {
    fn is_connected(&self) -> BoxFuture<'_, bool>;
}

pub struct HttpQuoteProvider {
    endpoint: String,
    client: Client,
}

impl HttpQuoteProvider {
    pub fn new(config: &QuotesConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }

    async fn fetch_body(&self) -> Result<Vec<u8>, FetchError> {
        debug!("Requesting quote from {}", self.endpoint);

        let resp = self.client.get(&self.endpoint).send().await.map_err(|e| {
            if e.is_connect() {
                warn!("Cannot connect to quote API at {}", self.endpoint);
            } else if e.is_timeout() {
                warn!("Quote request timed out");
            } else {
                warn!("Quote request failed: {e}");
            }
            FetchError::Network(e.to_string())
        })?;

        // Error pages are still handed to the decoder, which reports them.
        if !resp.status().is_success() {
            warn!("Quote API returned status {}", resp.status());
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| FetchError::Network(format!("failed to read body: {e}")))?;
        debug!("Received {} bytes", body.len());

        Ok(body.to_vec())
    }
}

impl QuoteProvider for HttpQuoteProvider {
    fn fetch(&self) -> BoxFuture<'_, Result<Vec<u8>, FetchError>> {
        Box::pin(self.fetch_body())
    }
}

/// Treats the network as reachable when a TCP connection to a well-known
/// address succeeds within the timeout.
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(config: &NetworkConfig) -> Self {
        Self {
            addr: config.probe_addr.clone(),
            timeout: config.probe_timeout(),
        }
    }
}

impl ConnectivityProbe for TcpProbe {
    fn is_connected(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            match tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr)).await {
                Ok(Ok(_)) => true,
                Ok(Err(e)) => {
                    debug!("Connectivity probe to {} failed: {e}", self.addr);
                    false
                }
                Err(_) => {
                    debug!("Connectivity probe to {} timed out", self.addr);
                    false
                }
            }
        })
    }
}
