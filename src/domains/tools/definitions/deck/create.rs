//! Deck creation tool.
//!
//! Creating a deck that already exists is not an error: AnkiConnect returns
//! the existing deck's id, and a "duplicate"/"already exists" answer from
//! older versions is treated as success as well.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::super::common::require_text;
use crate::domains::tools::envelope::{ErrorDetail, Idempotency, ResultEnvelope};
use crate::domains::tools::handlers::{AnkiTool, ToolContext};

/// Parameters for deck creation.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeckCreateParams {
    /// Name of the deck; use `::` for subdecks (e.g. "Japanese::Verbs").
    #[schemars(description = "Deck name; use '::' to create subdecks")]
    pub deck_name: String,
}

/// Creates a deck.
pub struct DeckCreateTool;

#[async_trait]
impl AnkiTool for DeckCreateTool {
    const NAME: &'static str = "anki_create_deck";
    const DESCRIPTION: &'static str = "Create a new deck. Succeeds without changes if the deck already exists.";

    type Params = DeckCreateParams;

    async fn run(ctx: &ToolContext, params: DeckCreateParams) -> Result<ResultEnvelope, ErrorDetail> {
        let deck_name = require_text(&params.deck_name, "deck_name")?;
        info!("Creating deck '{}'", deck_name);

        let raw = ctx
            .anki()
            .invoke("createDeck", json!({ "deck": deck_name }))
            .await;

        let envelope = ResultEnvelope::normalize_with(Self::NAME, raw, Idempotency::EnsureExists);
        if !envelope.success {
            return Ok(envelope.with_echo("deck_name", deck_name));
        }

        let deck_id = envelope.data.clone();
        Ok(envelope
            .with_message(format!("Deck '{}' is ready", deck_name))
            .with_value(json!({ "deck_name": deck_name, "deck_id": deck_id }))
            .with_echo("deck_name", deck_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::anki_connect::AnkiConnectError;
    use crate::core::anki_connect::mock::MockAnki;
    use crate::domains::tools::definitions::common::test_context;
    use crate::domains::tools::envelope::ErrorKind;
    use crate::domains::tools::handlers::dispatch;

    #[tokio::test]
    async fn test_create_deck() {
        let (ctx, mock) = test_context(MockAnki::new().on("createDeck", json!(1651445861967i64)));
        let envelope = dispatch::<DeckCreateTool>(&ctx, json!({"deck_name": "Spanish"})).await;

        assert!(envelope.success);
        assert_eq!(envelope.data.as_ref().unwrap()["deck_id"], json!(1651445861967i64));
        assert_eq!(mock.calls_to("createDeck"), vec![json!({"deck": "Spanish"})]);
    }

    #[tokio::test]
    async fn test_create_twice_is_success() {
        // AnkiConnect returns the existing id the second time.
        let (ctx, _) = test_context(MockAnki::new().on("createDeck", json!(7)));
        let first = dispatch::<DeckCreateTool>(&ctx, json!({"deck_name": "Spanish"})).await;
        let second = dispatch::<DeckCreateTool>(&ctx, json!({"deck_name": "Spanish"})).await;
        assert!(first.success);
        assert!(second.success);
    }

    #[tokio::test]
    async fn test_duplicate_error_is_success() {
        let (ctx, _) = test_context(
            MockAnki::new().fail("createDeck", AnkiConnectError::remote("deck already exists")),
        );
        let envelope = dispatch::<DeckCreateTool>(&ctx, json!({"deck_name": "Spanish"})).await;
        assert!(envelope.success);
        assert_eq!(envelope.echo["already_existed"], json!(true));
    }

    #[tokio::test]
    async fn test_other_remote_errors_fail() {
        let (ctx, _) = test_context(
            MockAnki::new().fail("createDeck", AnkiConnectError::remote("collection is not available")),
        );
        let envelope = dispatch::<DeckCreateTool>(&ctx, json!({"deck_name": "Spanish"})).await;
        assert!(!envelope.success);
        assert_eq!(envelope.error_kind(), Some(ErrorKind::Remote));
        assert_eq!(envelope.echo["deck_name"], "Spanish");
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let (ctx, mock) = test_context(MockAnki::new());
        let envelope = dispatch::<DeckCreateTool>(&ctx, json!({"deck_name": "  "})).await;
        assert_eq!(envelope.error_kind(), Some(ErrorKind::Validation));
        assert!(mock.calls().is_empty());
    }
}
