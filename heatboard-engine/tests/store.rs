use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use heatboard_engine::{
    Entry, FetchError, FetchRequestState, Selection, Snapshot, SnapshotSource, SnapshotStore,
    last_n_dates,
};

fn ymd(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, d).unwrap()
}

/// Archive stand-in with a per-date latency.
#[derive(Default)]
struct SlowArchive {
    days: HashMap<NaiveDate, (u64, Result<Snapshot, FetchError>)>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl SlowArchive {
    fn day(mut self, date: NaiveDate, delay_ms: u64) -> Self {
        let snapshot = Snapshot::new(date, vec![Entry::new(1, 1, "Ash", 300)]);
        self.days.insert(date, (delay_ms, Ok(snapshot)));
        self
    }

    fn failing(mut self, date: NaiveDate, delay_ms: u64, err: FetchError) -> Self {
        self.days.insert(date, (delay_ms, Err(err)));
        self
    }
}

#[async_trait]
impl SnapshotSource for SlowArchive {
    async fn fetch_snapshot(&self, date: NaiveDate) -> Result<Snapshot, FetchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let (delay, result) = self
            .days
            .get(&date)
            .cloned()
            .unwrap_or((0, Err(FetchError::NotCached)));
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[tokio::test]
async fn window_fetches_run_concurrently_and_keep_order() {
    let archive = Arc::new(
        SlowArchive::default()
            .day(ymd(1), 30)
            .failing(ymd(2), 5, FetchError::Transport("reset".into()))
            .day(ymd(3), 1)
            .failing(ymd(4), 10, FetchError::Malformed("eof".into()))
            .day(ymd(5), 20),
    );
    let mut store = SnapshotStore::new(Arc::clone(&archive), ymd(6));
    let dates = last_n_dates(ymd(5), 5);
    let window = store.load_window(dates.clone()).await;

    assert_eq!(window.dates(), dates.as_slice());
    let present: Vec<bool> = (0..window.len()).map(|i| window.slot(i).is_some()).collect();
    assert_eq!(present, vec![true, false, true, false, true]);
    assert!(archive.peak.load(Ordering::SeqCst) > 1);
    assert_eq!(store.initial_snapshot().map(|s| s.date), Some(ymd(5)));
}

#[tokio::test]
async fn empty_archive_still_yields_full_window() {
    let mut store = SnapshotStore::new(SlowArchive::default(), ymd(6));
    let window = store.load_window(last_n_dates(ymd(5), 3)).await;
    assert_eq!(window.len(), 3);
    assert_eq!(window.present_count(), 0);
    assert!(store.initial_snapshot().is_none());
}

#[tokio::test]
async fn later_selection_wins_regardless_of_completion_order() {
    let archive = SlowArchive::default().day(ymd(1), 40).day(ymd(2), 1);
    let mut store = SnapshotStore::new(archive, ymd(6));

    let Selection::Pending(first) = store.begin_select(ymd(1)) else {
        panic!("expected a point fetch");
    };
    let Selection::Pending(second) = store.begin_select(ymd(2)) else {
        panic!("expected a point fetch");
    };
    let (first_result, second_result) =
        tokio::join!(store.fetch(&first), store.fetch(&second));

    assert!(store.settle(second, second_result));
    assert!(!store.settle(first, first_result));
    assert_eq!(store.state().snapshot().map(|s| s.date), Some(ymd(2)));
    assert_eq!(store.last_good(), Some(ymd(2)));
}

#[tokio::test]
async fn failures_revert_to_last_ready_date() {
    let archive = SlowArchive::default()
        .day(ymd(3), 0)
        .failing(ymd(4), 0, FetchError::Status(500));
    let mut store = SnapshotStore::new(archive, ymd(6));

    assert!(matches!(
        store.select_date(ymd(3)).await,
        FetchRequestState::Ready(_)
    ));

    assert_eq!(
        *store.select_date(ymd(2)).await,
        FetchRequestState::NotCached { date: ymd(2) }
    );
    assert_eq!(store.displayed_date(), ymd(3));

    assert!(matches!(
        store.select_date(ymd(4)).await,
        FetchRequestState::Error { .. }
    ));
    assert_eq!(store.displayed_date(), ymd(3));
    assert_eq!(store.last_good(), Some(ymd(3)));
}

#[tokio::test]
async fn cached_selection_supersedes_pending_fetch() {
    let archive = SlowArchive::default().day(ymd(1), 0).day(ymd(5), 0);
    let mut store = SnapshotStore::new(archive, ymd(6));
    store.load_window(vec![ymd(5)]).await;

    let Selection::Pending(ticket) = store.begin_select(ymd(1)) else {
        panic!("expected a point fetch");
    };
    assert!(matches!(store.begin_select(ymd(5)), Selection::Cached(_)));
    let result = store.fetch(&ticket).await;
    assert!(!store.settle(ticket, result));
    assert_eq!(store.displayed_date(), ymd(5));
}
