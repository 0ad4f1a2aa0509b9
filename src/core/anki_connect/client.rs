//! HTTP client for the AnkiConnect add-on.
//!
//! One `reqwest::Client` is built per process and reused for every call so
//! connections are pooled. Calls are gated by a semaphore because Anki
//! processes requests one at a time and stalls under a burst.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::error::{AnkiConnectError, AnkiConnectResult};
use super::retry::{RetryPolicy, Sleeper, tokio_sleeper, with_retry};
use super::types::{RemoteCall, RemoteReply};
use super::AnkiApi;
use crate::core::config::AnkiConnectConfig;

/// Client for the AnkiConnect JSON API.
pub struct AnkiConnectClient {
    http: reqwest::Client,
    url: String,
    version: u32,
    policy: RetryPolicy,
    sleeper: Sleeper,
    gate: Arc<Semaphore>,
}

impl AnkiConnectClient {
    /// Build a client from configuration.
    ///
    /// Fails on timeout settings that cannot be represented as durations.
    pub fn new(config: &AnkiConnectConfig) -> crate::core::error::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connection_timeout()?)
            .timeout(config.request_timeout()?)
            .pool_max_idle_per_host(config.max_concurrent_requests)
            .build()
            .map_err(|e| {
                AnkiConnectError::connection(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            url: config.url.clone(),
            version: config.version,
            policy: RetryPolicy::new(config.max_retries, config.retry_delay()?),
            sleeper: tokio_sleeper(),
            gate: Arc::new(Semaphore::new(config.max_concurrent_requests.max(1))),
        })
    }

    /// Replace the delay function used between retries.
    pub fn with_sleeper(mut self, sleeper: Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// The AnkiConnect endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Check that AnkiConnect answers, returning its API version.
    pub async fn test_connection(&self) -> AnkiConnectResult<u32> {
        match self.invoke("version", Value::Null).await {
            Ok(version) => {
                let version = version.as_u64().unwrap_or_default() as u32;
                info!("Connected to AnkiConnect at {} (API v{})", self.url, version);
                Ok(version)
            }
            Err(e) => {
                warn!("AnkiConnect is not reachable at {}: {}", self.url, e);
                Err(e)
            }
        }
    }

    /// Perform a single HTTP round trip.
    async fn send_once(&self, action: &str, params: &Value) -> AnkiConnectResult<Value> {
        let empty = Value::Object(Default::default());
        let params = if params.is_null() { &empty } else { params };
        let body = RemoteCall {
            action,
            version: self.version,
            params,
        };

        let response = self.http.post(&self.url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnkiConnectError::Http {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        debug!("AnkiConnect '{}' answered with {} bytes", action, bytes.len());

        let reply: RemoteReply = serde_json::from_slice(&bytes)
            .map_err(|e| AnkiConnectError::invalid_response(format!("JSON parse error: {e}")))?;

        if let Some(message) = reply.error_message() {
            return Err(AnkiConnectError::Remote(message));
        }

        Ok(reply.result)
    }
}

#[async_trait]
impl AnkiApi for AnkiConnectClient {
    async fn invoke(&self, action: &str, params: Value) -> AnkiConnectResult<Value> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| AnkiConnectError::connection("request gate closed"))?;

        let this = self;
        let params = &params;
        with_retry(&self.policy, &self.sleeper, action, move |_| {
            this.send_once(action, params)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    fn config_for(url: String, max_retries: u32) -> AnkiConnectConfig {
        AnkiConnectConfig {
            url,
            max_retries,
            retry_delay_secs: 0.0,
            request_timeout_secs: 2.0,
            connection_timeout_secs: 1.0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_invoke_returns_result() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({"result": ["Default", "Japanese"], "error": null}));
            })
            .await;

        let client = AnkiConnectClient::new(&config_for(server.url("/"), 3)).unwrap();
        let result = client.invoke("deckNames", Value::Null).await.unwrap();

        assert_eq!(result, json!(["Default", "Japanese"]));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_remote_error_is_surfaced_without_retry() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/");
                then.status(200)
                    .json_body(json!({"result": null, "error": "deck was not found: Missing"}));
            })
            .await;

        let client = AnkiConnectClient::new(&config_for(server.url("/"), 3)).unwrap();
        let err = client
            .invoke("getDeckStats", json!({"decks": ["Missing"]}))
            .await
            .unwrap_err();

        assert_eq!(err, AnkiConnectError::remote("deck was not found: Missing"));
        // Exactly one request reached the server.
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_undecodable_body_is_invalid_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/");
                then.status(200).body("<html>not json</html>");
            })
            .await;

        let client = AnkiConnectClient::new(&config_for(server.url("/"), 1)).unwrap();
        let err = client.invoke("version", Value::Null).await.unwrap_err();
        assert!(matches!(err, AnkiConnectError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_retries_then_fails() {
        // Nothing listens on port 9 locally; connections are refused.
        let delays = Arc::new(Mutex::new(Vec::new()));
        let recorded = delays.clone();
        let sleeper: Sleeper = Arc::new(move |d: Duration| {
            recorded.lock().unwrap().push(d);
            Box::pin(async {})
        });

        let client = AnkiConnectClient::new(&config_for("http://127.0.0.1:9".to_string(), 3))
            .unwrap()
            .with_sleeper(sleeper);

        let err = client.invoke("version", Value::Null).await.unwrap_err();
        assert!(err.is_transient(), "expected transient error, got {err:?}");
        // Three attempts means two waits in between.
        assert_eq!(delays.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_test_connection_reports_version() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/");
                then.status(200).json_body(json!({"result": 6, "error": null}));
            })
            .await;

        let client = AnkiConnectClient::new(&config_for(server.url("/"), 1)).unwrap();
        assert_eq!(client.test_connection().await, Ok(6));
    }

    #[tokio::test]
    async fn test_slow_service_times_out_and_is_retried() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/");
                then.status(200)
                    .delay(Duration::from_secs(1))
                    .json_body(json!({"result": 6, "error": null}));
            })
            .await;

        let config = AnkiConnectConfig {
            request_timeout_secs: 0.2,
            ..config_for(server.url("/"), 2)
        };
        let client = AnkiConnectClient::new(&config).unwrap();
        let err = client.invoke("version", Value::Null).await.unwrap_err();

        assert!(matches!(err, AnkiConnectError::Timeout(_)), "got {err:?}");
        assert_eq!(mock.calls_async().await, 2);
    }

    #[tokio::test]
    async fn test_server_error_is_retried_until_exhausted() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/");
                then.status(503);
            })
            .await;

        let client = AnkiConnectClient::new(&config_for(server.url("/"), 3)).unwrap();
        let err = client.invoke("sync", Value::Null).await.unwrap_err();

        assert_eq!(err, AnkiConnectError::Http { status: 503 });
        assert_eq!(mock.calls_async().await, 3);
    }

    #[tokio::test]
    async fn test_client_error_status_is_not_retried() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/");
                then.status(403);
            })
            .await;

        let client = AnkiConnectClient::new(&config_for(server.url("/"), 3)).unwrap();
        let err = client.invoke("deckNames", Value::Null).await.unwrap_err();

        assert_eq!(err, AnkiConnectError::Http { status: 403 });
        assert_eq!(mock.calls_async().await, 1);
    }

    #[tokio::test]
    async fn test_single_slot_gate_serializes_calls() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/");
                then.status(200)
                    .delay(Duration::from_millis(300))
                    .json_body(json!({"result": [], "error": null}));
            })
            .await;

        let config = AnkiConnectConfig {
            max_concurrent_requests: 1,
            ..config_for(server.url("/"), 1)
        };
        let client = AnkiConnectClient::new(&config).unwrap();

        let started = std::time::Instant::now();
        let (first, second) = tokio::join!(
            client.invoke("deckNames", Value::Null),
            client.invoke("modelNames", Value::Null)
        );

        assert!(first.is_ok() && second.is_ok());
        // One slot: the second request only starts once the first answered.
        assert!(
            started.elapsed() >= Duration::from_millis(600),
            "calls overlapped: {:?}",
            started.elapsed()
        );
        assert_eq!(mock.calls_async().await, 2);
    }

    #[test]
    fn test_unrepresentable_timeout_is_a_config_error() {
        let config = AnkiConnectConfig {
            request_timeout_secs: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(
            AnkiConnectClient::new(&config),
            Err(crate::core::Error::Config(_))
        ));
    }
}
