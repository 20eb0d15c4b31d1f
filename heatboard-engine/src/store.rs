//! Snapshot fetching, the in-memory window cache and the selected-date state machine.
//!
//! The store never touches the network itself. It drives a [`SnapshotSource`]
//! and turns every outcome into one of the typed states below, so nothing
//! downstream of it ever sees an I/O error.
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::join_all;
use thiserror::Error;

use crate::dates::yesterday;
use crate::model::Snapshot;
use crate::window::DayWindow;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The archive explicitly has no record for the date.
    #[error("no cached leaderboard for this date")]
    NotCached,
    #[error("Server error: {0}")]
    Status(u16),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed snapshot: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Anything that can resolve a calendar date to a snapshot.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch the snapshot for `date`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NotCached`] when the archive has no record for the
    /// date, and another variant for any other failure.
    async fn fetch_snapshot(&self, date: NaiveDate) -> Result<Snapshot, FetchError>;
}

#[async_trait]
impl<T: SnapshotSource + ?Sized> SnapshotSource for Arc<T> {
    async fn fetch_snapshot(&self, date: NaiveDate) -> Result<Snapshot, FetchError> {
        (**self).fetch_snapshot(date).await
    }
}

/// Observable state of the selected-date request.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchRequestState {
    Idle,
    Loading { date: NaiveDate },
    Ready(Arc<Snapshot>),
    NotCached { date: NaiveDate },
    Error { date: NaiveDate, message: String },
}

impl FetchRequestState {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// `NotCached` and `Error` are the states a user can dismiss.
    #[must_use]
    pub const fn is_dismissible(&self) -> bool {
        matches!(self, Self::NotCached { .. } | Self::Error { .. })
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        match self {
            Self::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

/// Handle for one in-flight point fetch. Only the newest ticket can settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectTicket {
    generation: u64,
    date: NaiveDate,
}

impl SelectTicket {
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Result of starting a selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Served from the loaded window with no fetch.
    Cached(Arc<Snapshot>),
    /// A point fetch is required; pass the ticket to `fetch` then `settle`.
    Pending(SelectTicket),
}

pub struct SnapshotStore<S> {
    source: S,
    today: NaiveDate,
    window: DayWindow,
    initial: Option<Arc<Snapshot>>,
    state: FetchRequestState,
    generation: u64,
    displayed: NaiveDate,
    last_good: Option<Arc<Snapshot>>,
}

impl<S: SnapshotSource> SnapshotStore<S> {
    /// A store whose selector starts on yesterday relative to `today`.
    pub fn new(source: S, today: NaiveDate) -> Self {
        Self {
            source,
            today,
            window: DayWindow::default(),
            initial: None,
            state: FetchRequestState::Idle,
            generation: 0,
            displayed: yesterday(today),
            last_good: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn window(&self) -> &DayWindow {
        &self.window
    }

    /// Yesterday's snapshot from the last loaded window, if it was present.
    pub fn initial_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.initial.clone()
    }

    pub fn state(&self) -> &FetchRequestState {
        &self.state
    }

    /// Date the selector currently shows.
    pub fn displayed_date(&self) -> NaiveDate {
        self.displayed
    }

    /// Most recent date that produced a `Ready` result.
    pub fn last_good(&self) -> Option<NaiveDate> {
        self.last_good.as_ref().map(|s| s.date)
    }

    /// Snapshot behind the displayed date. Survives `NotCached` and `Error`.
    pub fn displayed_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.last_good.clone()
    }

    fn mark_ready(&mut self, snapshot: Arc<Snapshot>) {
        self.displayed = snapshot.date;
        self.last_good = Some(Arc::clone(&snapshot));
        self.state = FetchRequestState::Ready(snapshot);
    }

    /// Back to the last `Ready` date, or yesterday when nothing has loaded yet.
    fn revert(&mut self) {
        self.displayed = self.last_good().unwrap_or_else(|| yesterday(self.today));
    }

    /// Fetch every date concurrently and replace the cached window.
    ///
    /// Each failure only empties its own slot; the returned window always has
    /// one slot per input date, in input order.
    pub async fn load_window(&mut self, dates: Vec<NaiveDate>) -> &DayWindow {
        let results = join_all(dates.iter().map(|&date| self.source.fetch_snapshot(date))).await;

        let days: Vec<Option<Arc<Snapshot>>> = dates
            .iter()
            .zip(results)
            .map(|(date, result)| match result {
                Ok(snapshot) => Some(Arc::new(snapshot)),
                Err(err) => {
                    log::warn!("no snapshot for {date}: {err}");
                    None
                }
            })
            .collect();

        self.window = DayWindow::from_shared(dates, days);
        self.initial = self.window.get(yesterday(self.today));
        if self.last_good.is_none() {
            self.last_good.clone_from(&self.initial);
        }
        log::debug!(
            "loaded window of {} dates, {} present",
            self.window.len(),
            self.window.present_count()
        );
        &self.window
    }

    /// Start selecting `date`, superseding any request still in flight.
    ///
    /// The caller guarantees `date` is not after today.
    pub fn begin_select(&mut self, date: NaiveDate) -> Selection {
        self.generation += 1;
        self.displayed = date;
        if let Some(snapshot) = self.window.get(date) {
            self.mark_ready(Arc::clone(&snapshot));
            return Selection::Cached(snapshot);
        }
        self.state = FetchRequestState::Loading { date };
        Selection::Pending(SelectTicket {
            generation: self.generation,
            date,
        })
    }

    /// Point fetch for a pending ticket. Does not touch store state.
    ///
    /// # Errors
    ///
    /// Propagates whatever the source reports.
    pub async fn fetch(&self, ticket: &SelectTicket) -> Result<Snapshot, FetchError> {
        self.source.fetch_snapshot(ticket.date).await
    }

    /// Apply a settled fetch. Returns `false` when the ticket was superseded and
    /// the result discarded.
    pub fn settle(&mut self, ticket: SelectTicket, result: Result<Snapshot, FetchError>) -> bool {
        if ticket.generation != self.generation {
            log::debug!("discarding superseded response for {}", ticket.date);
            return false;
        }
        match result {
            Ok(snapshot) => self.mark_ready(Arc::new(snapshot)),
            Err(FetchError::NotCached) => {
                self.revert();
                self.state = FetchRequestState::NotCached { date: ticket.date };
            }
            Err(err) => {
                log::warn!("fetching {} failed: {err}", ticket.date);
                self.revert();
                self.state = FetchRequestState::Error {
                    date: ticket.date,
                    message: err.to_string(),
                };
            }
        }
        true
    }

    /// Select `date` and wait for its resolution.
    pub async fn select_date(&mut self, date: NaiveDate) -> &FetchRequestState {
        if let Selection::Pending(ticket) = self.begin_select(date) {
            let result = self.fetch(&ticket).await;
            self.settle(ticket, result);
        }
        &self.state
    }

    /// Clear a `NotCached` or `Error` state. Returns whether anything changed.
    pub fn dismiss(&mut self) -> bool {
        if !self.state.is_dismissible() {
            return false;
        }
        self.state = FetchRequestState::Idle;
        self.revert();
        true
    }
}
