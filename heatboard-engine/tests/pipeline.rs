use chrono::NaiveDate;

use heatboard_engine::histogram::BinningPolicy;
use heatboard_engine::{
    ChartConfig, DayBreakdown, DayWindow, Entry, OverlapKey, PlayerId, RankChart, RunDetails,
    Snapshot, align_rank_series, bin_scores, detect_overlaps, select_performers,
};

fn ymd(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
}

fn snapshot(d: u32, rows: &[(u32, PlayerId, i64)]) -> Snapshot {
    Snapshot::new(
        ymd(d),
        rows.iter()
            .map(|&(rank, id, score)| Entry::new(rank, id, format!("p{id}"), score))
            .collect(),
    )
}

fn busy_window() -> DayWindow {
    DayWindow::from_slots(
        vec![ymd(1), ymd(2), ymd(3), ymd(4), ymd(5)],
        vec![
            Some(snapshot(1, &[(1, 1, 900), (2, 2, 850), (3, 3, 700), (12, 4, 100)])),
            None,
            Some(snapshot(3, &[(1, 2, 880), (2, 4, 600), (3, 1, 590)])),
            Some(snapshot(4, &[(1, 1, 870), (2, 5, 500), (9, 2, 200)])),
            None,
        ],
    )
}

#[test]
fn performer_selection_is_deterministic() {
    let window = busy_window();
    let config = ChartConfig::default();
    let first = select_performers(&window, &config);
    let second = select_performers(&window, &config);
    assert_eq!(first, second);
    let ids: Vec<PlayerId> = first.iter().map(|p| p.player_id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[test]
fn single_appearance_never_gets_palette_color() {
    let window = busy_window();
    let config = ChartConfig::default();
    let performers = select_performers(&window, &config);
    for performer in performers.iter() {
        if performer.appearances <= 1 {
            assert_eq!(performer.color, config.neutral_color, "{}", performer.name);
        } else {
            assert!(performer.has_palette_color(&config));
        }
    }
}

#[test]
fn shared_rank_flags_exactly_one_key() {
    // Players 3 and 4 tie at rank 3 on the first day; nothing else coincides.
    let window = DayWindow::from_slots(
        vec![ymd(10), ymd(11)],
        vec![
            Some(snapshot(10, &[(1, 1, 500), (2, 2, 400), (3, 3, 300), (3, 4, 300)])),
            Some(snapshot(11, &[(1, 2, 500), (2, 1, 450), (4, 3, 250), (5, 4, 200)])),
        ],
    );
    let config = ChartConfig::default();
    let performers = select_performers(&window, &config);
    let series = align_rank_series(&window, &performers, &config);

    let overlaps = detect_overlaps(&series);
    assert_eq!(overlaps.len(), 1);
    assert!(overlaps.contains(&OverlapKey {
        day_index: 0,
        value: 3
    }));
}

#[test]
fn adaptive_binning_accounts_for_every_score() {
    let histogram = bin_scores(&[0, 50, 100, 500], BinningPolicy::default()).unwrap();
    assert_eq!(histogram.total(), 4);
    assert!(bin_scores(&[], BinningPolicy::default()).is_none());
    assert!(bin_scores(&[42], BinningPolicy::reference_fixed()).is_none());
}

#[test]
fn rank_chart_and_day_breakdown_from_one_window() {
    let window = busy_window();
    let config = ChartConfig::default();
    let chart = RankChart::build(&window, &config);
    assert_eq!(chart.axis_dates, vec![ymd(1), ymd(3), ymd(4)]);
    assert_eq!(chart.axis_labels.len(), 3);
    assert_eq!(chart.legend().len(), config.legend_limit);

    let day = window.slot(0).unwrap();
    let breakdown = DayBreakdown::build(day, &config);
    assert_eq!(breakdown.histogram.unwrap().total(), 4);
    assert_eq!(breakdown.missions[0].count, 4);
}

#[test]
fn details_round_trip() {
    let details: RunDetails = "2:150:-10:375".parse().unwrap();
    assert_eq!(details.missions, 2);
    assert_eq!(details.expenses, 150);
    assert_eq!(details.style, -10);
    assert_eq!(details.time_seconds, 375);
    assert_eq!(details.to_string(), "2:150:-10:375");
}
