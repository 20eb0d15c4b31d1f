//! Heatboard Engine
//!
//! Multi-day aggregation and chart-data preparation for a daily competitive
//! leaderboard archive. This crate holds no network or rendering code; callers
//! plug in a [`SnapshotSource`] and draw the datasets it prepares.

pub mod chart;
pub mod config;
pub mod dates;
pub mod details;
pub mod histogram;
pub mod missions;
pub mod model;
pub mod overlap;
pub mod performers;
pub mod series;
pub mod stats;
pub mod store;
pub mod window;

// Re-export commonly used types
pub use chart::{DayBreakdown, RankChart};
pub use config::{ChartConfig, Color, ConfigError, Deployment, DeploymentMode};
pub use dates::{
    initial_date, is_selectable, last_n_dates, parse_date_param, step_date, today_utc,
    weekday_label, yesterday,
};
pub use details::{DetailsError, RunDetails};
pub use histogram::{BinningPolicy, Bucket, Histogram, bin_scores};
pub use missions::{MissionBucket, mission_buckets};
pub use model::{Entry, PlayerId, Snapshot};
pub use overlap::{OverlapKey, OverlapMarker, detect_overlaps, overlap_markers};
pub use performers::{Performer, Performers, select_performers};
pub use series::{PlayerSeries, Segment, SegmentStyle, align_rank_series, align_series};
pub use stats::{PlayerStat, SortDirection, SortKey, SortState, StatsData, StatsError};
pub use store::{
    FetchError, FetchRequestState, SelectTicket, Selection, SnapshotSource, SnapshotStore,
};
pub use window::{DayWindow, PresentDay};
