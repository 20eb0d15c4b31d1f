//! Leaderboard snapshot data model and wire format.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::details::{DetailsError, RunDetails};

/// Stable numeric player identity (the archive's `steamId`).
pub type PlayerId = u64;

/// One player's result within one daily snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub rank: u32,
    #[serde(rename = "steamId")]
    pub player_id: PlayerId,
    pub name: String,
    #[serde(rename = "displayScore")]
    pub score: i64,
    /// Canonical `missions:expenses:style:timeSeconds` encoding.
    #[serde(rename = "details")]
    pub raw_details: String,
    // Derived fields the archive may or may not carry. Consumers decode
    // `raw_details` instead of trusting these.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missions: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_secs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_str: Option<String>,
}

impl Entry {
    #[must_use]
    pub fn new(rank: u32, player_id: PlayerId, name: impl Into<String>, score: i64) -> Self {
        Self {
            rank,
            player_id,
            name: name.into(),
            score,
            raw_details: String::from("0:0:0:0"),
            missions: None,
            time_secs: None,
            time_str: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: RunDetails) -> Self {
        self.raw_details = details.to_string();
        self
    }

    /// Decode the run details carried by this entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the details string is not a valid four-field encoding.
    pub fn details(&self) -> Result<RunDetails, DetailsError> {
        self.raw_details.parse()
    }
}

/// One calendar day's leaderboard state. Identity is the date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: NaiveDate,
    #[serde(default)]
    pub leaderboard: String,
    #[serde(rename = "count", default)]
    pub total_count: u32,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl Snapshot {
    /// Build a snapshot, ordering entries by rank ascending.
    #[must_use]
    pub fn new(date: NaiveDate, mut entries: Vec<Entry>) -> Self {
        entries.sort_by_key(|e| e.rank);
        let total_count = u32::try_from(entries.len()).unwrap_or(u32::MAX);
        Self {
            date,
            leaderboard: String::new(),
            total_count,
            entries,
        }
    }

    /// Parse the archive's JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not valid JSON or misses required fields.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut snapshot: Self = serde_json::from_str(json)?;
        snapshot.entries.sort_by_key(|e| e.rank);
        Ok(snapshot)
    }

    #[must_use]
    pub fn entry_for(&self, player_id: PlayerId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.player_id == player_id)
    }

    /// Entries ranked at or above `limit` (rank 1 is best).
    pub fn top(&self, limit: u32) -> impl Iterator<Item = &Entry> {
        self.entries.iter().take_while(move |e| e.rank <= limit)
    }

    #[must_use]
    pub fn scores(&self) -> Vec<i64> {
        self.entries.iter().map(|e| e.score).collect()
    }
}
