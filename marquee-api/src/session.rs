//! Session socket monitor with reconnect backoff.
//!
//! Keeps a WebSocket open to the server and publishes whether it is
//! currently connected. Messages on the socket are not interpreted here;
//! only liveness matters to the request coordinator.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures_util::StreamExt;
use marquee_core::ApiError;
use serde::Deserialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::transport::ClientCredentials;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconnectConfig {
    pub initial_ms: u64,
    pub max_ms: u64,
    pub multiplier: f64,
    pub jitter_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_ms: 500,
            max_ms: 30_000,
            multiplier: 2.0,
            jitter_ms: 250,
        }
    }
}

impl ReconnectConfig {
    /// Delay that follows `current` in the backoff sequence.
    pub fn next_backoff(&self, current: u64) -> u64 {
        let next = (current as f64 * self.multiplier) as u64;
        next.min(self.max_ms)
    }
}

#[derive(Clone)]
pub struct WsClient {
    endpoint: String,
    credentials: ClientCredentials,
    reconnect: ReconnectConfig,
}

impl WsClient {
    pub fn new(endpoint: impl Into<String>, credentials: ClientCredentials, reconnect: ReconnectConfig) -> Self {
        Self {
            endpoint: endpoint.into(),
            credentials,
            reconnect,
        }
    }

    pub async fn connect(
        &self,
    ) -> Result<WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>, ApiError> {
        let mut request = self
            .endpoint
            .as_str()
            .into_client_request()
            .map_err(ws_error)?;
        let headers = request.headers_mut();
        if let Some(api_key) = &self.credentials.api_key {
            headers.insert(
                HeaderName::from_static("x-api-key"),
                HeaderValue::from_str(api_key).map_err(|e| ApiError::Transport {
                    reason: e.to_string(),
                })?,
            );
        }
        if let Some(token) = &self.credentials.token {
            headers.insert(
                HeaderName::from_static("authorization"),
                HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| ApiError::Transport {
                    reason: e.to_string(),
                })?,
            );
        }
        let (stream, _) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(ws_error)?;
        Ok(stream)
    }

    pub fn reconnect_config(&self) -> &ReconnectConfig {
        &self.reconnect
    }
}

fn ws_error(err: tokio_tungstenite::tungstenite::Error) -> ApiError {
    ApiError::Transport {
        reason: err.to_string(),
    }
}

/// Drive `connected` from the socket's state until every receiver is gone.
pub fn spawn_session_monitor(ws: WsClient, connected: watch::Sender<bool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut backoff = ws.reconnect_config().initial_ms;
        while !connected.is_closed() {
            match ws.connect().await {
                Ok(mut stream) => {
                    tracing::info!(endpoint = %ws.endpoint, "Session socket connected");
                    connected.send_replace(true);
                    backoff = ws.reconnect_config().initial_ms;

                    while let Some(message) = stream.next().await {
                        match message {
                            Ok(Message::Close(_)) => break,
                            Ok(_) => {}
                            Err(err) => {
                                tracing::warn!(error = %err, "Session socket error");
                                break;
                            }
                        }
                    }

                    connected.send_replace(false);
                    tracing::info!("Session socket disconnected");
                }
                Err(err) => {
                    tracing::warn!(error = %err, backoff_ms = backoff, "Session socket connect failed");
                }
            }

            let delay = jittered_backoff(backoff, ws.reconnect_config().jitter_ms);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            backoff = ws.reconnect_config().next_backoff(backoff);
        }
    })
}

fn jittered_backoff(base_ms: u64, jitter_ms: u64) -> u64 {
    if jitter_ms == 0 {
        return base_ms;
    }
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_nanos(0))
        .subsec_nanos() as u64;
    let jitter = nanos % jitter_ms;
    base_ms.saturating_add(jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_and_caps() {
        let config = ReconnectConfig {
            initial_ms: 100,
            max_ms: 350,
            multiplier: 2.0,
            jitter_ms: 0,
        };
        assert_eq!(config.next_backoff(100), 200);
        assert_eq!(config.next_backoff(200), 350);
        assert_eq!(config.next_backoff(350), 350);
    }

    #[test]
    fn test_jitter_stays_in_range() {
        assert_eq!(jittered_backoff(100, 0), 100);
        let delay = jittered_backoff(100, 50);
        assert!((100..150).contains(&delay));
    }

    #[tokio::test]
    async fn test_monitor_reports_disconnected_when_unreachable() {
        let ws = WsClient::new(
            "ws://127.0.0.1:9/socket",
            ClientCredentials::default(),
            ReconnectConfig {
                initial_ms: 10,
                max_ms: 10,
                multiplier: 1.0,
                jitter_ms: 0,
            },
        );
        let (tx, rx) = watch::channel(false);
        let handle = spawn_session_monitor(ws, tx);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!*rx.borrow());
        drop(rx);
        handle.abort();
    }
}
