//! Day-indexed window of possibly-absent snapshots.
use std::sync::Arc;

use chrono::NaiveDate;

use crate::dates::weekday_label;
use crate::model::Snapshot;

/// Ordered dates paired with one `Snapshot | absent` slot per date.
///
/// Absent covers "not fetched yet", "fetch failed" and "archive has nothing";
/// every consumer treats them the same way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayWindow {
    dates: Vec<NaiveDate>,
    days: Vec<Option<Arc<Snapshot>>>,
}

/// A present day together with its position in the window and on the chart axis.
#[derive(Debug, Clone, Copy)]
pub struct PresentDay<'a> {
    /// Position among all window dates.
    pub window_index: usize,
    /// Position among present dates only (chart x-axis).
    pub axis_index: usize,
    pub date: NaiveDate,
    pub snapshot: &'a Snapshot,
}

impl DayWindow {
    /// A window with every slot absent.
    #[must_use]
    pub fn empty(dates: Vec<NaiveDate>) -> Self {
        let days = vec![None; dates.len()];
        Self { dates, days }
    }

    /// Pair dates with slots. Extra slots are dropped and missing ones are absent,
    /// so the result always has exactly one slot per date.
    #[must_use]
    pub fn from_slots(dates: Vec<NaiveDate>, slots: Vec<Option<Snapshot>>) -> Self {
        let mut days: Vec<Option<Arc<Snapshot>>> = slots
            .into_iter()
            .take(dates.len())
            .map(|slot| slot.map(Arc::new))
            .collect();
        days.resize(dates.len(), None);
        Self { dates, days }
    }

    pub(crate) fn from_shared(dates: Vec<NaiveDate>, days: Vec<Option<Arc<Snapshot>>>) -> Self {
        debug_assert_eq!(dates.len(), days.len());
        Self { dates, days }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    #[must_use]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&Snapshot> {
        self.days.get(index).and_then(|d| d.as_deref())
    }

    /// Present snapshot for `date`, if the date is in the window and was loaded.
    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<Arc<Snapshot>> {
        let index = self.dates.iter().position(|d| *d == date)?;
        self.days.get(index).cloned().flatten()
    }

    #[must_use]
    pub fn present_count(&self) -> usize {
        self.days.iter().filter(|d| d.is_some()).count()
    }

    /// Present days in date order; absent dates are skipped entirely.
    pub fn present(&self) -> impl Iterator<Item = PresentDay<'_>> {
        self.dates
            .iter()
            .zip(&self.days)
            .enumerate()
            .filter_map(|(window_index, (date, day))| {
                day.as_deref().map(|snapshot| (window_index, *date, snapshot))
            })
            .enumerate()
            .map(|(axis_index, (window_index, date, snapshot))| PresentDay {
                window_index,
                axis_index,
                date,
                snapshot,
            })
    }

    /// Dates that make up the chart x-axis.
    #[must_use]
    pub fn axis_dates(&self) -> Vec<NaiveDate> {
        self.present().map(|day| day.date).collect()
    }

    /// Weekday labels for the chart x-axis.
    #[must_use]
    pub fn axis_labels(&self) -> Vec<String> {
        self.present().map(|day| weekday_label(day.date)).collect()
    }
}
