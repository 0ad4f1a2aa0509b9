//! Review history tool.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::super::common::{deck_filter, join_query, percentage};
use crate::domains::tools::envelope::{ErrorDetail, ResultEnvelope};
use crate::domains::tools::handlers::{AnkiTool, ToolContext};

/// Longest supported look-back period.
const MAX_DAYS: u32 = 365;

fn default_days() -> u32 {
    30
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReviewHistoryParams {
    #[serde(default)]
    #[schemars(description = "Restrict to this deck (default: all decks)")]
    pub deck_name: Option<String>,

    #[serde(default = "default_days")]
    #[schemars(description = "Look-back period in days, 1 to 365 (default 30)")]
    pub days: u32,
}

/// Review answers per ease rating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, JsonSchema)]
pub struct RatingCounts {
    pub again_count: usize,
    pub hard_count: usize,
    pub good_count: usize,
    pub easy_count: usize,
}

impl RatingCounts {
    pub fn total(&self) -> usize {
        self.again_count + self.hard_count + self.good_count + self.easy_count
    }

    /// Share of good and easy answers, as a percentage rounded to 2 places.
    pub fn success_rate(&self) -> f64 {
        percentage(self.good_count + self.easy_count, self.total())
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ReviewHistoryResult {
    pub deck_name: String,
    pub period_days: u32,
    #[serde(flatten)]
    pub ratings: RatingCounts,
    pub total_reviews: usize,
    pub success_rate_percentage: f64,
    /// Distinct cards reviewed within the period.
    pub reviewed_cards: usize,
    /// Cards that have left the new queue.
    pub total_studied_cards: usize,
}

impl ReviewHistoryResult {
    fn render(&self) -> String {
        let r = &self.ratings;
        [
            format!("Total reviews: {}", self.total_reviews),
            format!("- Again: {}", r.again_count),
            format!("- Hard: {}", r.hard_count),
            format!("- Good: {}", r.good_count),
            format!("- Easy: {}", r.easy_count),
            format!("Success rate: {}%", self.success_rate_percentage),
        ]
        .join("\n")
    }
}

/// Summarizes review answers over a trailing period.
pub struct ReviewHistoryTool;

#[async_trait]
impl AnkiTool for ReviewHistoryTool {
    const NAME: &'static str = "anki_get_review_history";
    const DESCRIPTION: &'static str = "Get review history over the last N days (1-365): answers per \
        rating (again/hard/good/easy) and the success rate (good + easy) / total.";

    type Params = ReviewHistoryParams;

    async fn run(ctx: &ToolContext, params: ReviewHistoryParams) -> Result<ResultEnvelope, ErrorDetail> {
        if params.days == 0 || params.days > MAX_DAYS {
            return Err(ErrorDetail::validation(format!(
                "days must be between 1 and {}",
                MAX_DAYS
            )));
        }

        let anki = ctx.anki();
        let filter = deck_filter(params.deck_name.as_deref());

        let mut counts = [0usize; 4];
        for (rating, slot) in (1..=4).zip(counts.iter_mut()) {
            let term = format!("rated:{}:{}", params.days, rating);
            let ids: Vec<i64> = anki
                .invoke_as("findCards", json!({ "query": join_query(&[&filter, &term]) }))
                .await?;
            *slot = ids.len();
        }
        let ratings = RatingCounts {
            again_count: counts[0],
            hard_count: counts[1],
            good_count: counts[2],
            easy_count: counts[3],
        };

        let term = format!("rated:{}", params.days);
        let reviewed: Vec<i64> = anki
            .invoke_as("findCards", json!({ "query": join_query(&[&filter, &term]) }))
            .await?;
        let studied: Vec<i64> = anki
            .invoke_as("findCards", json!({ "query": join_query(&[&filter, "-is:new"]) }))
            .await?;

        let result = ReviewHistoryResult {
            deck_name: params
                .deck_name
                .clone()
                .unwrap_or_else(|| "all decks".to_string()),
            period_days: params.days,
            total_reviews: ratings.total(),
            success_rate_percentage: ratings.success_rate(),
            ratings,
            reviewed_cards: reviewed.len(),
            total_studied_cards: studied.len(),
        };
        info!(
            "Review history for {}: {} reviews, {}% success",
            result.deck_name, result.total_reviews, result.success_rate_percentage
        );

        Ok(ResultEnvelope::ok(
            Self::NAME,
            format!(
                "Review history for {} (last {} days):",
                result.deck_name, result.period_days
            ),
        )
        .with_rendered(result.render())
        .with_data(&result))
    }
}
