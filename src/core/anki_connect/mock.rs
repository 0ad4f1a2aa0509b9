//! Scripted in-memory AnkiConnect for tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{AnkiApi, AnkiConnectError, AnkiConnectResult};

type Responder = Box<dyn Fn(&Value) -> AnkiConnectResult<Value> + Send + Sync>;

/// Fake AnkiConnect answering from per-action responders and recording calls.
#[derive(Default)]
pub struct MockAnki {
    responders: HashMap<String, Responder>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockAnki {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer `action` with `result`.
    pub fn on(self, action: &str, result: Value) -> Self {
        self.respond(action, move |_| Ok(result.clone()))
    }

    /// Always fail `action` with `error`.
    pub fn fail(self, action: &str, error: AnkiConnectError) -> Self {
        self.respond(action, move |_| Err(error.clone()))
    }

    /// Answer `action` by inspecting its params.
    pub fn respond<F>(mut self, action: &str, responder: F) -> Self
    where
        F: Fn(&Value) -> AnkiConnectResult<Value> + Send + Sync + 'static,
    {
        self.responders
            .insert(action.to_string(), Box::new(responder));
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    /// Params of every call to `action`, in order.
    pub fn calls_to(&self, action: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|(a, _)| a == action)
            .map(|(_, p)| p)
            .collect()
    }
}

#[async_trait]
impl AnkiApi for MockAnki {
    async fn invoke(&self, action: &str, params: Value) -> AnkiConnectResult<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((action.to_string(), params.clone()));

        match self.responders.get(action) {
            Some(responder) => responder(&params),
            None => Err(AnkiConnectError::remote(format!(
                "unsupported action: {}",
                action
            ))),
        }
    }
}
