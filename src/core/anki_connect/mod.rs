//! AnkiConnect integration.
//!
//! - `client.rs` - pooled HTTP client with retry and a concurrency gate
//! - `retry.rs` - exponential backoff loop with an injectable sleeper
//! - `types.rs` - typed response shapes
//! - `error.rs` - call failures and their retry classification
//!
//! Tools talk to AnkiConnect only through the [`AnkiApi`] trait so they can
//! be exercised against a scripted fake.

mod client;
mod error;
pub mod retry;
pub mod types;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use client::AnkiConnectClient;
pub use error::{AnkiConnectError, AnkiConnectResult};
pub use retry::{RetryPolicy, Sleeper};

/// A remote method-call interface to AnkiConnect.
#[async_trait]
pub trait AnkiApi: Send + Sync {
    /// Call `action` with `params` and return the raw `result` value.
    async fn invoke(&self, action: &str, params: Value) -> AnkiConnectResult<Value>;
}

impl<'a> dyn AnkiApi + 'a {
    /// Call `action` and decode its result into `T`.
    pub async fn invoke_as<T: DeserializeOwned>(
        &self,
        action: &str,
        params: Value,
    ) -> AnkiConnectResult<T> {
        let raw = self.invoke(action, params).await?;
        serde_json::from_value(raw).map_err(|e| {
            AnkiConnectError::invalid_response(format!("unexpected '{}' result: {}", action, e))
        })
    }
}
