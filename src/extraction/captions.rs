//! Timed-text caption parsing.
//!
//! Both the primary loader and the transcript service download captions in
//! YouTube's `json3` timed-text format.

use serde::Deserialize;

use super::transcript::TranscriptEntry;
use crate::error::Result;

#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimedTextEvent {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Vec<TimedTextSegment>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSegment {
    #[serde(default)]
    utf8: String,
}

/// Parse a `json3` document into transcript entries, dropping empty events.
pub fn parse_json3(body: &str) -> Result<Vec<TranscriptEntry>> {
    let timed: TimedText = serde_json::from_str(body)?;

    let entries = timed
        .events
        .into_iter()
        .filter_map(|event| {
            let raw: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
            let text = collapse_whitespace(&raw);
            if text.is_empty() {
                return None;
            }
            Some(TranscriptEntry {
                text,
                start: event.t_start_ms as f64 / 1000.0,
                duration: event.d_duration_ms as f64 / 1000.0,
            })
        })
        .collect();

    Ok(entries)
}

/// Join entry texts with single spaces.
pub fn join_entries(entries: &[TranscriptEntry]) -> String {
    entries
        .iter()
        .map(|e| e.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapse runs of whitespace (including newlines) to one space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
