//! Common utilities shared across Anki tools.
//!
//! Parameter validation, Anki search-query builders and plain-text note
//! rendering.

use crate::core::anki_connect::types::NoteInfo;
use crate::domains::tools::envelope::ErrorDetail;

/// Field-name fragments of media fields left out of text renderings.
const MEDIA_FIELD_MARKERS: &[&str] = &["audio", "sound", "image", "picture"];

/// Default page size for note listings.
pub fn default_limit() -> usize {
    20
}

pub fn default_true() -> bool {
    true
}

/// Reject empty or whitespace-only text, returning it trimmed.
pub fn require_text<'a>(value: &'a str, what: &str) -> Result<&'a str, ErrorDetail> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ErrorDetail::validation(format!("{} must not be empty", what)))
    } else {
        Ok(trimmed)
    }
}

/// Reject an empty id list or any non-positive id.
pub fn require_ids(ids: &[i64], what: &str) -> Result<(), ErrorDetail> {
    if ids.is_empty() {
        return Err(ErrorDetail::validation(format!("{} must not be empty", what)));
    }
    if let Some(bad) = ids.iter().find(|id| **id <= 0) {
        return Err(ErrorDetail::validation(format!(
            "{} must be positive integers (got {})",
            what, bad
        )));
    }
    Ok(())
}

/// `deck:"<name>"` search term with quotes escaped.
pub fn deck_term(deck_name: &str) -> String {
    format!("deck:\"{}\"", deck_name.replace('"', "\\\""))
}

/// Search prefix restricting to a deck, or empty for the whole collection.
pub fn deck_filter(deck_name: Option<&str>) -> String {
    match deck_name.map(str::trim).filter(|d| !d.is_empty()) {
        Some(deck) => deck_term(deck),
        None => String::new(),
    }
}

/// Join search terms, skipping empty ones.
pub fn join_query(terms: &[&str]) -> String {
    terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `nid:1,2,3` search term selecting the cards of the given notes.
pub fn nid_term(note_ids: &[i64]) -> String {
    let ids: Vec<String> = note_ids.iter().map(|id| id.to_string()).collect();
    format!("nid:{}", ids.join(","))
}

/// Whether a field is left out of text renderings.
pub fn should_filter_field(name: &str, value: &str) -> bool {
    let lower = name.to_lowercase();
    MEDIA_FIELD_MARKERS.iter().any(|m| lower.contains(m))
        || name == "Add Reverse"
        || value.trim().is_empty()
}

/// Render a note as a `<note id=...>` block.
pub fn format_note(note: &NoteInfo) -> String {
    let id = note
        .note_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let mut lines = vec![format!("<note id={}>", id)];
    for (name, value) in note.ordered_fields() {
        if should_filter_field(name, value) {
            continue;
        }
        lines.push(format!("{}: {}", name, value));
    }
    lines.push("</note>".to_string());
    lines.join("\n")
}

/// Render several notes separated by blank lines.
pub fn format_notes(notes: &[NoteInfo]) -> String {
    notes
        .iter()
        .map(format_note)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part` as a percentage of `total`, rounded; zero when `total` is zero.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(part as f64 / total as f64 * 100.0)
    }
}

/// Tool context backed by a scripted AnkiConnect.
#[cfg(test)]
pub fn test_context(
    mock: crate::core::anki_connect::mock::MockAnki,
) -> (
    crate::domains::tools::handlers::ToolContext,
    std::sync::Arc<crate::core::anki_connect::mock::MockAnki>,
) {
    use crate::core::config::Config;
    use std::sync::Arc;

    let mock = Arc::new(mock);
    let ctx = crate::domains::tools::handlers::ToolContext::new(
        Arc::new(Config::default()),
        mock.clone(),
    );
    (ctx, mock)
}
