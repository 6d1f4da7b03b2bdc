//! HTTP sink - POSTs transformed payloads as JSON.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, info};

use crate::error::DeliveryError;
use crate::message::OutboundPayload;

use super::Sink;

/// Sink backed by a shared `reqwest::Client`.
///
/// The endpoint passed to `deliver` is appended to `base_url`.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpSink {
    /// Create a sink with its own pooled client.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().pool_max_idle_per_host(100).build()?;
        Ok(Self::with_client(client, base_url, timeout))
    }

    /// Create a sink reusing an existing client.
    pub fn with_client(client: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Request timeout in whole milliseconds, saturating at `u64::MAX`.
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Full URL for an endpoint path.
    pub fn url_for(&self, endpoint: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if endpoint.is_empty() {
            base.to_string()
        } else if endpoint.starts_with('/') {
            format!("{base}{endpoint}")
        } else {
            format!("{base}/{endpoint}")
        }
    }
}

#[async_trait]
impl Sink for HttpSink {
    async fn deliver(&self, endpoint: &str, payload: &OutboundPayload) -> Result<(), DeliveryError> {
        let url = self.url_for(endpoint);

        info!(
            url = %url,
            event_id = %payload.event_id,
            timeout_seconds = self.timeout.as_secs_f64(),
            "sink_delivery_starting"
        );

        let result = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await;

        match result {
            Ok(resp) => {
                let status = resp.status().as_u16();
                if resp.status().is_success() {
                    info!(
                        url = %url,
                        event_id = %payload.event_id,
                        status_code = status,
                        "sink_delivery_complete"
                    );
                    Ok(())
                } else {
                    error!(
                        url = %url,
                        event_id = %payload.event_id,
                        status_code = status,
                        "sink_delivery_rejected"
                    );
                    Err(DeliveryError::Status {
                        endpoint: endpoint.to_string(),
                        status,
                    })
                }
            }
            Err(e) if e.is_timeout() => {
                error!(
                    url = %url,
                    timeout_seconds = self.timeout.as_secs_f64(),
                    error = %e,
                    "sink_delivery_timeout"
                );
                Err(DeliveryError::Timeout {
                    endpoint: endpoint.to_string(),
                    timeout_ms: self.timeout_ms(),
                })
            }
            Err(e) => {
                error!(url = %url, error = %e, "sink_delivery_error");
                Err(DeliveryError::Request {
                    endpoint: endpoint.to_string(),
                    source: e,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::UserData;

    fn payload() -> OutboundPayload {
        OutboundPayload {
            event_id: "1".to_string(),
            event_type: "user_action".to_string(),
            event_timestamp: "t".to_string(),
            user_data: UserData {
                action: "login".to_string(),
                user_id: "u".to_string(),
            },
        }
    }

    #[test]
    fn test_url_for() {
        let sink = HttpSink::with_client(Client::new(), "http://localhost:3000/", Duration::from_secs(1));
        assert_eq!(sink.url_for("/process-data"), "http://localhost:3000/process-data");
        assert_eq!(sink.url_for("process-data"), "http://localhost:3000/process-data");
        assert_eq!(sink.url_for(""), "http://localhost:3000");
    }

    #[test]
    fn test_timeout_ms_saturates() {
        let sink = HttpSink::with_client(Client::new(), "http://localhost", Duration::from_millis(8000));
        assert_eq!(sink.timeout_ms(), 8000);

        let huge = HttpSink::with_client(Client::new(), "http://localhost", Duration::MAX);
        assert_eq!(huge.timeout_ms(), u64::MAX);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let sink = HttpSink::with_client(
            Client::new(),
            "http://127.0.0.1:9",
            Duration::from_millis(500),
        );

        let result = sink.deliver("/process-data", &payload()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        use axum::{http::StatusCode, routing::post, Router};

        let app = Router::new().route("/reject", post(|| async { StatusCode::SERVICE_UNAVAILABLE }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let sink = HttpSink::with_client(Client::new(), format!("http://{addr}"), Duration::from_secs(5));
        let err = sink.deliver("/reject", &payload()).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_success_posts_json_body() {
        use axum::{routing::post, Json, Router};
        use tokio::sync::mpsc;

        let (tx, mut rx) = mpsc::unbounded_channel::<serde_json::Value>();
        let app = Router::new().route(
            "/process-data",
            post(move |Json(body): Json<serde_json::Value>| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(body);
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let sink = HttpSink::with_client(Client::new(), format!("http://{addr}"), Duration::from_secs(5));
        sink.deliver("/process-data", &payload()).await.unwrap();

        let body = rx.recv().await.unwrap();
        assert_eq!(body["eventId"], "1");
        assert_eq!(body["userData"]["userId"], "u");
    }
}
