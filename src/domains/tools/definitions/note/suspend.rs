//! Suspend or resume the cards of notes.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::super::common::{default_true, require_ids};
use super::cards_of_notes;
use crate::domains::tools::envelope::{ErrorDetail, ResultEnvelope};
use crate::domains::tools::handlers::{AnkiTool, ToolContext};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SuspendNotesParams {
    #[schemars(description = "Ids of the notes whose cards are affected")]
    pub note_ids: Vec<i64>,

    #[serde(default = "default_true")]
    #[schemars(description = "true to suspend (default), false to resume")]
    pub suspend: bool,
}

pub struct SuspendNotesTool;

#[async_trait]
impl AnkiTool for SuspendNotesTool {
    const NAME: &'static str = "anki_suspend_notes";
    const DESCRIPTION: &'static str =
        "Suspend (or resume with suspend=false) all cards of the given notes.";

    type Params = SuspendNotesParams;

    async fn run(ctx: &ToolContext, params: SuspendNotesParams) -> Result<ResultEnvelope, ErrorDetail> {
        require_ids(&params.note_ids, "note_ids")?;

        let cards = cards_of_notes(ctx, &params.note_ids).await?;
        let (action, verb) = if params.suspend {
            ("suspend", "Suspended")
        } else {
            ("unsuspend", "Resumed")
        };

        if !cards.is_empty() {
            ctx.anki().invoke(action, json!({ "cards": cards })).await?;
        }
        info!("{} {} cards", verb, cards.len());

        Ok(ResultEnvelope::ok(
            Self::NAME,
            format!(
                "{} {} cards of {} notes",
                verb,
                cards.len(),
                params.note_ids.len()
            ),
        )
        .with_value(json!({
            "affected_note_ids": params.note_ids,
            "affected_card_count": cards.len(),
            "suspended": params.suspend,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::anki_connect::mock::MockAnki;
    use crate::domains::tools::definitions::common::test_context;
    use crate::domains::tools::handlers::dispatch;

    fn mock() -> MockAnki {
        MockAnki::new()
            .on("findCards", json!([10, 11]))
            .on("suspend", json!(true))
            .on("unsuspend", json!(true))
    }

    #[tokio::test]
    async fn test_suspend_by_default() {
        let (ctx, mock) = test_context(mock());
        let envelope = dispatch::<SuspendNotesTool>(&ctx, json!({"note_ids": [3]})).await;

        assert!(envelope.success);
        assert_eq!(mock.calls_to("suspend"), vec![json!({"cards": [10, 11]})]);
        assert!(mock.calls_to("unsuspend").is_empty());
        assert_eq!(envelope.data.clone().unwrap()["suspended"], true);
    }

    #[tokio::test]
    async fn test_resume() {
        let (ctx, mock) = test_context(mock());
        let envelope =
            dispatch::<SuspendNotesTool>(&ctx, json!({"note_ids": [3], "suspend": false})).await;

        assert!(envelope.success);
        assert_eq!(mock.calls_to("unsuspend").len(), 1);
        assert!(envelope.message.starts_with("Resumed 2 cards"));
    }

    #[tokio::test]
    async fn test_notes_without_cards_make_no_change_call() {
        let (ctx, mock) = test_context(MockAnki::new().on("findCards", json!([])));
        let envelope = dispatch::<SuspendNotesTool>(&ctx, json!({"note_ids": [3]})).await;
        assert!(envelope.success);
        assert_eq!(envelope.data.clone().unwrap()["affected_card_count"], 0);
        assert_eq!(mock.calls().len(), 1);
    }
}
