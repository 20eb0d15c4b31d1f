//! Top performer selection and palette assignment across a day window.
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::{ChartConfig, Color};
use crate::model::PlayerId;
use crate::window::DayWindow;

/// A player picked for the rank-history chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Performer {
    pub player_id: PlayerId,
    /// Display name as first seen in the window.
    pub name: String,
    pub color: Color,
    /// Present days on which the player ranked inside the top N.
    pub appearances: usize,
}

impl Performer {
    /// Whether this performer was given a palette color rather than the neutral one.
    #[must_use]
    pub fn has_palette_color(&self, config: &ChartConfig) -> bool {
        self.color != config.neutral_color
    }
}

/// Ordered performers with lookup by player identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Performers {
    ordered: Vec<Performer>,
    index: HashMap<PlayerId, usize>,
}

impl Performers {
    fn from_ordered(ordered: Vec<Performer>) -> Self {
        let index = ordered
            .iter()
            .enumerate()
            .map(|(i, p)| (p.player_id, i))
            .collect();
        Self { ordered, index }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Performer> {
        self.ordered.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Performer] {
        &self.ordered
    }

    #[must_use]
    pub fn get(&self, player_id: PlayerId) -> Option<&Performer> {
        self.index.get(&player_id).map(|&i| &self.ordered[i])
    }

    /// Performers listed in the chart legend.
    #[must_use]
    pub fn legend(&self, limit: usize) -> &[Performer] {
        &self.ordered[..self.ordered.len().min(limit)]
    }
}

struct Tally {
    player_id: PlayerId,
    name: String,
    appearances: usize,
}

/// Select every player who reached the top N on any present day.
///
/// Order is appearance count descending, ties by first appearance (earliest
/// date, then rank within that day). Palette colors go, in that order, only to
/// players seen on more than one day; everyone else, including palette
/// overflow, gets the neutral color.
#[must_use]
pub fn select_performers(window: &DayWindow, config: &ChartConfig) -> Performers {
    let mut tallies: Vec<Tally> = Vec::new();
    let mut seen: HashMap<PlayerId, usize> = HashMap::new();

    for day in window.present() {
        let mut counted_today: HashSet<PlayerId> = HashSet::new();
        for entry in day.snapshot.top(config.top_n) {
            if !counted_today.insert(entry.player_id) {
                continue;
            }
            if let Some(&slot) = seen.get(&entry.player_id) {
                tallies[slot].appearances += 1;
            } else {
                seen.insert(entry.player_id, tallies.len());
                tallies.push(Tally {
                    player_id: entry.player_id,
                    name: entry.name.clone(),
                    appearances: 1,
                });
            }
        }
    }

    // Stable sort keeps first-appearance order among equal counts.
    tallies.sort_by(|a, b| b.appearances.cmp(&a.appearances));

    let mut palette = config.palette.iter();
    let ordered = tallies
        .into_iter()
        .map(|tally| {
            let color = (tally.appearances > 1)
                .then(|| palette.next().cloned())
                .flatten()
                .unwrap_or_else(|| config.neutral_color.clone());
            Performer {
                player_id: tally.player_id,
                name: tally.name,
                color,
                appearances: tally.appearances,
            }
        })
        .collect();

    log::debug!(
        "selected performers across {} present days",
        window.present_count()
    );
    Performers::from_ordered(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entry, Snapshot};
    use chrono::NaiveDate;

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    fn day(d: u32, players: &[(u32, PlayerId)]) -> Option<Snapshot> {
        Some(Snapshot::new(
            ymd(d),
            players
                .iter()
                .map(|&(rank, id)| Entry::new(rank, id, format!("player-{id}"), 100))
                .collect(),
        ))
    }

    #[test]
    fn orders_by_appearances_then_first_seen() {
        let window = DayWindow::from_slots(
            vec![ymd(1), ymd(2), ymd(3)],
            vec![
                day(1, &[(1, 10), (2, 20), (3, 30)]),
                day(2, &[(1, 30), (2, 40)]),
                day(3, &[(1, 40), (2, 30), (11, 10)]),
            ],
        );
        let performers = select_performers(&window, &ChartConfig::default());
        let ids: Vec<PlayerId> = performers.iter().map(|p| p.player_id).collect();
        // 30: 3 days, 40: 2 days, then one-offs 10 and 20 in first-seen order.
        assert_eq!(ids, vec![30, 40, 10, 20]);
        assert_eq!(performers.get(10).unwrap().appearances, 1);
    }

    #[test]
    fn one_off_players_do_not_consume_palette() {
        let window = DayWindow::from_slots(
            vec![ymd(1), ymd(2)],
            vec![day(1, &[(1, 1), (2, 2), (3, 3)]), day(2, &[(1, 3), (2, 1)])],
        );
        let config = ChartConfig::default();
        let performers = select_performers(&window, &config);
        assert_eq!(performers.get(1).unwrap().color, config.palette[0]);
        assert_eq!(performers.get(3).unwrap().color, config.palette[1]);
        assert_eq!(performers.get(2).unwrap().color, config.neutral_color);
        assert!(!performers.get(2).unwrap().has_palette_color(&config));
    }

    #[test]
    fn palette_overflow_degrades_to_neutral() {
        let config = ChartConfig {
            palette: vec![Color::new("#111111"), Color::new("#222222")],
            ..ChartConfig::default()
        };
        let roster: Vec<(u32, PlayerId)> = (1..=4).map(|r| (r, PlayerId::from(r))).collect();
        let window = DayWindow::from_slots(
            vec![ymd(1), ymd(2)],
            vec![day(1, &roster), day(2, &roster)],
        );
        let performers = select_performers(&window, &config);
        let colors: Vec<&str> = performers.iter().map(|p| p.color.as_str()).collect();
        assert_eq!(colors, vec!["#111111", "#222222", "#ffffff", "#ffffff"]);
    }

    #[test]
    fn absent_days_and_empty_windows_yield_no_performers() {
        let window = DayWindow::empty(vec![ymd(1), ymd(2)]);
        assert!(select_performers(&window, &ChartConfig::default()).is_empty());
    }

    #[test]
    fn legend_is_capped() {
        let roster: Vec<(u32, PlayerId)> = (1..=8).map(|r| (r, PlayerId::from(r))).collect();
        let window = DayWindow::from_slots(vec![ymd(1)], vec![day(1, &roster)]);
        let performers = select_performers(&window, &ChartConfig::default());
        assert_eq!(performers.len(), 8);
        assert_eq!(performers.legend(5).len(), 5);
        assert_eq!(performers.legend(20).len(), 8);
    }
}
