//! Chart-ready datasets for one window.
use chrono::NaiveDate;
use serde::Serialize;

use crate::config::ChartConfig;
use crate::histogram::Histogram;
use crate::missions::{MissionBucket, mission_buckets};
use crate::model::Snapshot;
use crate::overlap::{OverlapMarker, overlap_markers};
use crate::performers::{Performer, select_performers};
use crate::series::{PlayerSeries, align_rank_series};
use crate::window::DayWindow;

/// Rank history across the present days of a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankChart {
    pub axis_dates: Vec<NaiveDate>,
    pub axis_labels: Vec<String>,
    pub performers: Vec<Performer>,
    pub series: Vec<PlayerSeries>,
    pub overlaps: Vec<OverlapMarker>,
    pub legend_len: usize,
}

impl RankChart {
    /// Recompute every dataset from `window`. Nothing is carried over between calls.
    #[must_use]
    pub fn build(window: &DayWindow, config: &ChartConfig) -> Self {
        let performers = select_performers(window, config);
        let series = align_rank_series(window, &performers, config);
        let overlaps = overlap_markers(&series);
        let legend_len = performers.legend(config.legend_limit).len();
        Self {
            axis_dates: window.axis_dates(),
            axis_labels: window.axis_labels(),
            performers: performers.as_slice().to_vec(),
            series,
            overlaps,
            legend_len,
        }
    }

    #[must_use]
    pub fn legend(&self) -> &[Performer] {
        &self.performers[..self.legend_len]
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.axis_dates.is_empty()
    }
}

/// Single-day views: score histogram and missions buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBreakdown {
    pub date: NaiveDate,
    pub total_count: u32,
    /// `None` when the day has fewer than two scores.
    pub histogram: Option<Histogram>,
    pub missions: Vec<MissionBucket>,
}

impl DayBreakdown {
    #[must_use]
    pub fn build(snapshot: &Snapshot, config: &ChartConfig) -> Self {
        Self {
            date: snapshot.date,
            total_count: snapshot.total_count,
            histogram: Histogram::for_snapshot(snapshot, config.histogram),
            missions: mission_buckets(snapshot),
        }
    }
}
