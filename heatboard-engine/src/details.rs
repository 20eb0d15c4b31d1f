//! Run details codec.
//! Wire format: `<missions>:<expenses>:<style>:<timeSeconds>`, e.g. `2:150:-10:375`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a details string does not follow the four-field encoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetailsError {
    #[error("details must have 4 colon-separated fields (got {found})")]
    FieldCount { found: usize },
    #[error("details field {field} is not a valid number: {value:?}")]
    InvalidField { field: &'static str, value: String },
}

/// Decoded sub-metrics of one leaderboard run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunDetails {
    pub missions: u8,
    pub expenses: i64,
    pub style: i64,
    pub time_seconds: u32,
}

impl RunDetails {
    /// Elapsed time as `m:ss`.
    #[must_use]
    pub fn time_label(&self) -> String {
        format!("{}:{:02}", self.time_seconds / 60, self.time_seconds % 60)
    }

    /// Style delta with an explicit sign for positive values.
    #[must_use]
    pub fn style_label(&self) -> String {
        if self.style > 0 {
            format!("+{}", self.style)
        } else {
            self.style.to_string()
        }
    }
}

fn parse_field<T: FromStr>(field: &'static str, raw: &str) -> Result<T, DetailsError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| DetailsError::InvalidField {
            field,
            value: raw.to_string(),
        })
}

impl FromStr for RunDetails {
    type Err = DetailsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let [missions, expenses, style, time] = parts.as_slice() else {
            return Err(DetailsError::FieldCount { found: parts.len() });
        };
        Ok(Self {
            missions: parse_field("missions", missions)?,
            expenses: parse_field("expenses", expenses)?,
            style: parse_field("style", style)?,
            time_seconds: parse_field("timeSeconds", time)?,
        })
    }
}

impl fmt::Display for RunDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.missions, self.expenses, self.style, self.time_seconds
        )
    }
}
