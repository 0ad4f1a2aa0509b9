//! Study progress tool.
//!
//! Cards are bucketed locally by interval: below the "new" threshold a card
//! counts as new (learning cards report negative intervals and land here),
//! below the "mature" threshold as young, mature otherwise.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use super::super::common::{deck_filter, join_query, percentage};
use crate::core::anki_connect::types::CardInfo;
use crate::core::config::AnalyticsConfig;
use crate::domains::tools::envelope::{ErrorDetail, ResultEnvelope};
use crate::domains::tools::handlers::{AnkiTool, ToolContext};

/// Cards requested per `cardsInfo` call.
const CARDS_INFO_CHUNK: usize = 500;

fn default_days() -> u32 {
    7
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct StudyProgressParams {
    #[serde(default)]
    #[schemars(description = "Restrict to this deck (default: all decks)")]
    pub deck_name: Option<String>,

    #[serde(default = "default_days")]
    #[schemars(description = "Look-back period for recent reviews, in days (default 7)")]
    pub days: u32,
}

/// Card counts per maturity bucket with their share of the total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct MaturityBuckets {
    pub total_cards: usize,
    pub new_cards: usize,
    pub young_cards: usize,
    pub mature_cards: usize,
    pub new_percentage: f64,
    pub young_percentage: f64,
    pub mature_percentage: f64,
}

impl MaturityBuckets {
    /// Bucket card intervals (in days) using the configured thresholds.
    pub fn from_intervals(intervals: &[i64], thresholds: &AnalyticsConfig) -> Self {
        let mut buckets = Self {
            total_cards: intervals.len(),
            ..Default::default()
        };
        for &ivl in intervals {
            if ivl < thresholds.new_interval_days {
                buckets.new_cards += 1;
            } else if ivl < thresholds.mature_interval_days {
                buckets.young_cards += 1;
            } else {
                buckets.mature_cards += 1;
            }
        }
        buckets.new_percentage = percentage(buckets.new_cards, buckets.total_cards);
        buckets.young_percentage = percentage(buckets.young_cards, buckets.total_cards);
        buckets.mature_percentage = percentage(buckets.mature_cards, buckets.total_cards);
        buckets
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct StudyProgressResult {
    pub deck_name: String,
    pub analysis_period_days: u32,
    #[serde(flatten)]
    pub buckets: MaturityBuckets,
    /// Cards reviewed within the analysis period.
    pub recent_reviews: usize,
}

impl StudyProgressResult {
    fn render(&self) -> String {
        let b = &self.buckets;
        [
            format!("Total cards: {}", b.total_cards),
            format!("- New: {} ({}%)", b.new_cards, b.new_percentage),
            format!("- Young: {} ({}%)", b.young_cards, b.young_percentage),
            format!("- Mature: {} ({}%)", b.mature_cards, b.mature_percentage),
            format!(
                "Reviewed in the last {} days: {}",
                self.analysis_period_days, self.recent_reviews
            ),
        ]
        .join("\n")
    }
}

/// Reports how far along the cards of a deck (or the collection) are.
pub struct StudyProgressTool;

#[async_trait]
impl AnkiTool for StudyProgressTool {
    const NAME: &'static str = "anki_get_study_progress";
    const DESCRIPTION: &'static str = "Get study progress: new, young and mature card counts and \
        percentages, plus the number of cards reviewed in the last N days.";

    type Params = StudyProgressParams;

    async fn run(ctx: &ToolContext, params: StudyProgressParams) -> Result<ResultEnvelope, ErrorDetail> {
        if params.days == 0 {
            return Err(ErrorDetail::validation("days must be a positive number"));
        }

        let anki = ctx.anki();
        let filter = deck_filter(params.deck_name.as_deref());

        let card_ids: Vec<i64> = anki.invoke_as("findCards", json!({ "query": filter })).await?;

        let mut intervals = Vec::with_capacity(card_ids.len());
        for chunk in card_ids.chunks(CARDS_INFO_CHUNK) {
            debug!("Fetching {} cards", chunk.len());
            let cards: Vec<CardInfo> = anki
                .invoke_as("cardsInfo", json!({ "cards": chunk }))
                .await?;
            intervals.extend(cards.iter().map(|c| c.interval));
        }

        let rated = format!("rated:{}", params.days);
        let recent: Vec<i64> = anki
            .invoke_as("findCards", json!({ "query": join_query(&[&filter, &rated]) }))
            .await?;

        let result = StudyProgressResult {
            deck_name: params
                .deck_name
                .clone()
                .unwrap_or_else(|| "all decks".to_string()),
            analysis_period_days: params.days,
            buckets: MaturityBuckets::from_intervals(&intervals, &ctx.config.analytics),
            recent_reviews: recent.len(),
        };
        info!(
            "Progress for {}: {} cards, {}% mature",
            result.deck_name, result.buckets.total_cards, result.buckets.mature_percentage
        );

        Ok(
            ResultEnvelope::ok(Self::NAME, format!("Study progress for {}:", result.deck_name))
                .with_rendered(result.render())
                .with_data(&result),
        )
    }
}
