//! Upstream event feed client.
//!
//! [`EventSource`] is the seam between the scheduler and the network;
//! [`UpstreamClient`] is the production implementation backed by
//! `reqwest`.

use std::future::Future;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;

use crate::config::GatewayConfig;
use crate::error::SyncError;

/// Something that can produce a serialized feature collection covering
/// the window ending at `end_date`.
pub trait EventSource: Send + Sync + 'static {
    /// Fetches one snapshot. Returns the response body verbatim.
    fn fetch(&self, end_date: NaiveDate)
    -> impl Future<Output = Result<Vec<u8>, SyncError>> + Send;
}

/// HTTP client for an FDSN-style event query endpoint.
///
/// Every request carries the same query shape: `format=geojson`, a fixed
/// `starttime`, an `endtime` supplied per call and a `minmagnitude` floor.
/// Clone is cheap; `reqwest::Client` pools connections internally.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: String,
    start_date: NaiveDate,
    min_magnitude: f64,
}

impl UpstreamClient {
    /// Creates a client with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Network`] if the TLS backend cannot be
    /// initialised.
    pub fn new(
        base_url: impl Into<String>,
        start_date: NaiveDate,
        min_magnitude: f64,
        timeout: Duration,
    ) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            start_date,
            min_magnitude,
        })
    }

    /// Creates a client from the gateway configuration.
    ///
    /// # Errors
    ///
    /// See [`UpstreamClient::new`].
    pub fn from_config(config: &GatewayConfig) -> Result<Self, SyncError> {
        Self::new(
            config.upstream_url.clone(),
            config.fetch_start_date,
            config.fetch_min_magnitude,
            config.fetch_timeout(),
        )
    }

    /// Query parameters for a window ending at `end_date`.
    #[must_use]
    pub fn query_params(&self, end_date: NaiveDate) -> [(&'static str, String); 4] {
        [
            ("format", "geojson".to_string()),
            ("starttime", self.start_date.format("%Y-%m-%d").to_string()),
            ("endtime", end_date.format("%Y-%m-%d").to_string()),
            ("minmagnitude", self.min_magnitude.to_string()),
        ]
    }
}

impl EventSource for UpstreamClient {
    async fn fetch(&self, end_date: NaiveDate) -> Result<Vec<u8>, SyncError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&self.query_params(end_date))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status(status.as_u16()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn start_date() -> NaiveDate {
        let Some(start) = NaiveDate::from_ymd_opt(2025, 7, 12) else {
            panic!("valid date");
        };
        start
    }

    /// Binds a loopback listener and returns it with its query URL.
    async fn local_upstream() -> (TcpListener, String) {
        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        (listener, format!("http://{addr}/query"))
    }

    #[test]
    fn query_params_follow_fixed_shape() {
        let Some(start) = NaiveDate::from_ymd_opt(2025, 7, 12) else {
            panic!("valid date");
        };
        let Some(end) = NaiveDate::from_ymd_opt(2025, 10, 3) else {
            panic!("valid date");
        };
        let Ok(client) = UpstreamClient::new(
            "http://localhost/query",
            start,
            4.5,
            Duration::from_secs(15),
        ) else {
            panic!("client build failed");
        };

        let params = client.query_params(end);
        assert_eq!(params[0], ("format", "geojson".to_string()));
        assert_eq!(params[1], ("starttime", "2025-07-12".to_string()));
        assert_eq!(params[2], ("endtime", "2025-10-03".to_string()));
        assert_eq!(params[3], ("minmagnitude", "4.5".to_string()));
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_network_error() {
        let Some(start) = NaiveDate::from_ymd_opt(2025, 7, 12) else {
            panic!("valid date");
        };
        // Port 9 (discard) on loopback is closed on test hosts.
        let Ok(client) =
            UpstreamClient::new("http://127.0.0.1:9/query", start, 4.5, Duration::from_secs(2))
        else {
            panic!("client build failed");
        };
        assert!(matches!(
            client.fetch(start).await,
            Err(SyncError::Network(_))
        ));
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let (listener, url) = local_upstream().await;
        let server = tokio::spawn(async move {
            let Ok((mut socket, _)) = listener.accept().await else {
                panic!("accept failed");
            };
            let mut request = [0_u8; 1024];
            let _ = socket.read(&mut request).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                )
                .await;
        });

        let Ok(client) = UpstreamClient::new(url, start_date(), 4.5, Duration::from_secs(5)) else {
            panic!("client build failed");
        };
        assert!(matches!(
            client.fetch(start_date()).await,
            Err(SyncError::Status(503))
        ));
        assert!(server.await.is_ok());
    }

    #[tokio::test]
    async fn silent_upstream_times_out() {
        let (listener, url) = local_upstream().await;
        let server = tokio::spawn(async move {
            let Ok((socket, _)) = listener.accept().await else {
                panic!("accept failed");
            };
            // Hold the connection open without answering.
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        });

        let Ok(client) =
            UpstreamClient::new(url, start_date(), 4.5, Duration::from_millis(500))
        else {
            panic!("client build failed");
        };
        let started = tokio::time::Instant::now();
        let outcome = client.fetch(start_date()).await;
        assert!(matches!(outcome, Err(SyncError::Network(_))));
        assert!(started.elapsed() < Duration::from_secs(10));
        server.abort();
    }
}
