//! Calendar helpers for the UTC archive day.
//!
//! The archive is keyed by UTC calendar date. Nothing may be requested past
//! "today"; these helpers are where callers enforce that before asking the
//! store for a date.

use chrono::{Days, NaiveDate, Utc};

/// Current UTC calendar date.
#[must_use]
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

#[must_use]
pub fn yesterday(today: NaiveDate) -> NaiveDate {
    today.pred_opt().unwrap_or(today)
}

/// The `n` dates ending at `end` inclusive, oldest first.
#[must_use]
pub fn last_n_dates(end: NaiveDate, n: usize) -> Vec<NaiveDate> {
    (0..n)
        .rev()
        .filter_map(|back| end.checked_sub_days(Days::new(back as u64)))
        .collect()
}

#[must_use]
pub fn is_selectable(date: NaiveDate, today: NaiveDate) -> bool {
    date <= today
}

/// Move `current` by `delta` days. Returns `None` when the target lies after `today`.
#[must_use]
pub fn step_date(current: NaiveDate, delta: i64, today: NaiveDate) -> Option<NaiveDate> {
    let magnitude = Days::new(delta.unsigned_abs());
    let next = if delta >= 0 {
        current.checked_add_days(magnitude)?
    } else {
        current.checked_sub_days(magnitude)?
    };
    is_selectable(next, today).then_some(next)
}

/// Strictly `YYYY-MM-DD`.
#[must_use]
pub fn parse_date_param(param: &str) -> Option<NaiveDate> {
    let well_formed = regex::Regex::new(r"^\d{4}-\d{2}-\d{2}$")
        .map(|re| re.is_match(param))
        .unwrap_or(false);
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(param, "%Y-%m-%d").ok()
}

/// Bootstrap date: a valid, non-future parameter wins, otherwise yesterday.
#[must_use]
pub fn initial_date(param: Option<&str>, today: NaiveDate) -> NaiveDate {
    param
        .and_then(parse_date_param)
        .filter(|date| is_selectable(*date, today))
        .unwrap_or_else(|| yesterday(today))
}

/// Short weekday label used on chart x-axes (`Mon`, `Tue`, ...).
#[must_use]
pub fn weekday_label(date: NaiveDate) -> String {
    date.format("%a").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn last_n_dates_ends_at_end_oldest_first() {
        let dates = last_n_dates(ymd(2025, 3, 2), 3);
        assert_eq!(dates, vec![ymd(2025, 2, 28), ymd(2025, 3, 1), ymd(2025, 3, 2)]);
        assert!(last_n_dates(ymd(2025, 3, 2), 0).is_empty());
    }

    #[test]
    fn step_date_refuses_future() {
        let today = ymd(2025, 3, 10);
        assert_eq!(step_date(ymd(2025, 3, 9), 1, today), Some(today));
        assert_eq!(step_date(today, 1, today), None);
        assert_eq!(step_date(today, -3, today), Some(ymd(2025, 3, 7)));
    }

    #[test]
    fn initial_date_validates_param() {
        let today = ymd(2025, 3, 10);
        assert_eq!(initial_date(Some("2025-03-01"), today), ymd(2025, 3, 1));
        assert_eq!(initial_date(Some("2025-03-11"), today), ymd(2025, 3, 9));
        assert_eq!(initial_date(Some("2025-3-1"), today), ymd(2025, 3, 9));
        assert_eq!(initial_date(Some("2025-02-30"), today), ymd(2025, 3, 9));
        assert_eq!(initial_date(None, today), ymd(2025, 3, 9));
    }

    #[test]
    fn weekday_label_is_short() {
        assert_eq!(weekday_label(ymd(2025, 3, 10)), "Mon");
    }
}
