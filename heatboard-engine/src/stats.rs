//! Player stats table: parse, search and sort.
use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::PlayerId;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("malformed stats payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStat {
    #[serde(rename = "steamId")]
    pub player_id: PlayerId,
    pub name: String,
    pub appearances: u32,
    pub best_rank: u32,
    pub best_rank_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsData {
    pub last_updated: String,
    #[serde(default)]
    pub players: Vec<PlayerStat>,
}

impl StatsData {
    /// Parse the stats resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a valid stats document.
    pub fn from_json(json: &str) -> Result<Self, StatsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Rows matching `query`, sorted by `sort`.
    #[must_use]
    pub fn rows(&self, query: &str, sort: SortState) -> Vec<&PlayerStat> {
        let needle = query.trim().to_lowercase();
        let mut rows: Vec<&PlayerStat> = self
            .players
            .iter()
            .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
            .collect();
        rows.sort_by(|a, b| sort.compare(a, b));
        rows
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Name,
    Appearances,
    BestRank,
    BestRankDate,
}

impl SortKey {
    /// Direction picked when switching to this column.
    #[must_use]
    pub const fn default_direction(self) -> SortDirection {
        match self {
            Self::Appearances => SortDirection::Descending,
            Self::Name | Self::BestRank | Self::BestRankDate => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self::new(SortKey::BestRank)
    }
}

impl SortState {
    #[must_use]
    pub const fn new(key: SortKey) -> Self {
        Self {
            key,
            direction: key.default_direction(),
        }
    }

    /// Clicking the active column flips it; any other column starts at its default.
    #[must_use]
    pub fn toggle(self, key: SortKey) -> Self {
        if self.key == key {
            Self {
                key,
                direction: self.direction.flipped(),
            }
        } else {
            Self::new(key)
        }
    }

    fn compare(self, a: &PlayerStat, b: &PlayerStat) -> Ordering {
        let ordering = match self.key {
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortKey::Appearances => a.appearances.cmp(&b.appearances),
            SortKey::BestRank => a.best_rank.cmp(&b.best_rank),
            SortKey::BestRankDate => a.best_rank_date.cmp(&b.best_rank_date),
        };
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}
