//! Per-performer series aligned to the present days of a window.
use serde::{Deserialize, Serialize};

use crate::config::{ChartConfig, Color};
use crate::model::{Entry, PlayerId};
use crate::performers::Performers;
use crate::window::DayWindow;

/// How a renderer should draw the line between two present points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentStyle {
    /// Adjacent axis points, both known.
    Solid,
    /// One or more gaps lie between the two points; the value in between is unknown.
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub from: usize,
    pub to: usize,
    pub style: SegmentStyle,
}

/// One performer's values, one slot per present day. `None` is a gap: the day
/// has data but the player is not on the chart that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSeries {
    pub player_id: PlayerId,
    pub name: String,
    pub color: Color,
    pub points: Vec<Option<u32>>,
}

impl PlayerSeries {
    /// Line segments between consecutive known points.
    #[must_use]
    pub fn segments(&self) -> Vec<Segment> {
        let known: Vec<usize> = self
            .points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|_| i))
            .collect();
        known
            .windows(2)
            .map(|pair| Segment {
                from: pair[0],
                to: pair[1],
                style: if pair[1] - pair[0] == 1 {
                    SegmentStyle::Solid
                } else {
                    SegmentStyle::Dashed
                },
            })
            .collect()
    }

    #[must_use]
    pub fn known_points(&self) -> usize {
        self.points.iter().filter(|p| p.is_some()).count()
    }
}

/// Align every performer against the present days, using `value` to extract
/// the plotted value from a player's entry. Absent days are not on the axis.
#[must_use]
pub fn align_series<F>(window: &DayWindow, performers: &Performers, value: F) -> Vec<PlayerSeries>
where
    F: Fn(&Entry) -> Option<u32>,
{
    performers
        .iter()
        .map(|performer| PlayerSeries {
            player_id: performer.player_id,
            name: performer.name.clone(),
            color: performer.color.clone(),
            points: window
                .present()
                .map(|day| {
                    day.snapshot
                        .entry_for(performer.player_id)
                        .and_then(&value)
                })
                .collect(),
        })
        .collect()
}

/// Rank series: the rank when inside the top N that day, otherwise a gap.
#[must_use]
pub fn align_rank_series(
    window: &DayWindow,
    performers: &Performers,
    config: &ChartConfig,
) -> Vec<PlayerSeries> {
    let top_n = config.top_n;
    align_series(window, performers, |entry| {
        (entry.rank <= top_n).then_some(entry.rank)
    })
}
