//! Chart and deployment configuration.
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::histogram::BinningPolicy;
use crate::store::FetchError;

/// Reference palette, in assignment order.
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#e8c96a", "#7ec8e3", "#b57bee", "#e87a5a", "#7be87a", "#e8a06a", "#6ab4e8", "#e86ab5",
    "#a0e86a", "#e86a6a",
];

pub const NEUTRAL_COLOR: &str = "#ffffff";

const DEFAULT_LOCAL_BASE: &str = "http://localhost:8080";
const DEFAULT_REMOTE_BASE: &str =
    "https://raw.githubusercontent.com/piepieonline/heat-signature-leaderboard-history/refs/heads/main";

/// A CSS-style color string such as `#e8c96a`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn neutral() -> Self {
        Self::new(NEUTRAL_COLOR)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors raised when chart configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be at least 1")]
    Zero { field: &'static str },
    #[error("palette must contain at least one color")]
    EmptyPalette,
    #[error("fixed histogram step must be positive (got {step})")]
    FixedStep { step: i64 },
    #[error("fixed histogram max {max} must be a positive multiple of step {step}")]
    FixedMax { max: i64, step: i64 },
}

/// Tunables for the rank-history and distribution charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "ChartConfig::default_window_days")]
    pub window_days: usize,
    #[serde(default = "ChartConfig::default_top_n")]
    pub top_n: u32,
    #[serde(default = "ChartConfig::default_palette")]
    pub palette: Vec<Color>,
    #[serde(default = "Color::neutral")]
    pub neutral_color: Color,
    #[serde(default = "ChartConfig::default_legend_limit")]
    pub legend_limit: usize,
    #[serde(default)]
    pub histogram: BinningPolicy,
}

impl ChartConfig {
    const fn default_window_days() -> usize {
        5
    }

    const fn default_top_n() -> u32 {
        10
    }

    const fn default_legend_limit() -> usize {
        5
    }

    fn default_palette() -> Vec<Color> {
        DEFAULT_PALETTE.iter().copied().map(Color::new).collect()
    }

    /// Check the configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_days == 0 {
            return Err(ConfigError::Zero {
                field: "window_days",
            });
        }
        if self.top_n == 0 {
            return Err(ConfigError::Zero { field: "top_n" });
        }
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        self.histogram.validate()
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            window_days: Self::default_window_days(),
            top_n: Self::default_top_n(),
            palette: Self::default_palette(),
            neutral_color: Color::neutral(),
            legend_limit: Self::default_legend_limit(),
            histogram: BinningPolicy::default(),
        }
    }
}

/// Which addressing scheme the archive is reached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Dev server, `?date=` query endpoint.
    Local,
    /// Static archive, one `<date>.json` object per day.
    #[default]
    Remote,
}

/// Deployment-time choice of snapshot addressing, injected into the sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    #[serde(default)]
    pub mode: DeploymentMode,
    #[serde(default = "Deployment::default_local_base")]
    pub local_base: String,
    #[serde(default = "Deployment::default_remote_base")]
    pub remote_base: String,
    #[serde(default = "Deployment::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Deployment {
    fn default_local_base() -> String {
        DEFAULT_LOCAL_BASE.to_string()
    }

    fn default_remote_base() -> String {
        DEFAULT_REMOTE_BASE.to_string()
    }

    const fn default_timeout_secs() -> u64 {
        10
    }

    #[must_use]
    pub fn new(mode: DeploymentMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    fn base(&self) -> &str {
        match self.mode {
            DeploymentMode::Local => self.local_base.trim_end_matches('/'),
            DeploymentMode::Remote => self.remote_base.trim_end_matches('/'),
        }
    }

    #[must_use]
    pub fn snapshot_url(&self, date: NaiveDate) -> String {
        let date = date.format("%Y-%m-%d");
        match self.mode {
            DeploymentMode::Local => format!("{}/leaderboard?date={date}", self.base()),
            DeploymentMode::Remote => format!("{}/{date}.json", self.base()),
        }
    }

    #[must_use]
    pub fn stats_url(&self) -> String {
        match self.mode {
            DeploymentMode::Local => format!("{}/stats", self.base()),
            DeploymentMode::Remote => format!("{}/stats.json", self.base()),
        }
    }

    /// Map an HTTP status onto the fetch taxonomy. `None` means success.
    ///
    /// Only the archive's 404 means "not cached"; the dev endpoint has no such
    /// signal, so every non-2xx there is a plain error.
    #[must_use]
    pub fn classify_status(&self, status: u16) -> Option<FetchError> {
        match (status, self.mode) {
            (200..=299, _) => None,
            (404, DeploymentMode::Remote) => Some(FetchError::NotCached),
            (status, _) => Some(FetchError::Status(status)),
        }
    }
}

impl Default for Deployment {
    fn default() -> Self {
        Self {
            mode: DeploymentMode::default(),
            local_base: Self::default_local_base(),
            remote_base: Self::default_remote_base(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}
