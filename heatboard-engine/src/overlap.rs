//! Coincident point detection.
//!
//! Two series claiming the same value on the same axis day would draw on top
//! of each other; those keys get a distinguishing marker at render time.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::Color;
use crate::series::PlayerSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OverlapKey {
    pub day_index: usize,
    pub value: u32,
}

/// Every series color claiming one overlapping key, in claim order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapMarker {
    pub key: OverlapKey,
    pub colors: SmallVec<[Color; 4]>,
}

/// Keys claimed by more than one series.
#[must_use]
pub fn detect_overlaps(series: &[PlayerSeries]) -> BTreeSet<OverlapKey> {
    let mut owners: HashMap<OverlapKey, usize> = HashMap::new();
    let mut overlaps = BTreeSet::new();
    for (series_index, s) in series.iter().enumerate() {
        for (day_index, point) in s.points.iter().enumerate() {
            let Some(value) = *point else { continue };
            let key = OverlapKey { day_index, value };
            match owners.get(&key) {
                Some(&owner) if owner != series_index => {
                    overlaps.insert(key);
                }
                Some(_) => {}
                None => {
                    owners.insert(key, series_index);
                }
            }
        }
    }
    overlaps
}

/// Overlapping keys with the colors of every claimant, ordered by key.
#[must_use]
pub fn overlap_markers(series: &[PlayerSeries]) -> Vec<OverlapMarker> {
    let overlaps = detect_overlaps(series);
    let mut markers: BTreeMap<OverlapKey, SmallVec<[Color; 4]>> = overlaps
        .iter()
        .map(|key| (*key, SmallVec::new()))
        .collect();
    for s in series {
        for (day_index, point) in s.points.iter().enumerate() {
            let Some(value) = *point else { continue };
            if let Some(colors) = markers.get_mut(&OverlapKey { day_index, value }) {
                colors.push(s.color.clone());
            }
        }
    }
    markers
        .into_iter()
        .map(|(key, colors)| OverlapMarker { key, colors })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(id: u64, color: &str, points: Vec<Option<u32>>) -> PlayerSeries {
        PlayerSeries {
            player_id: id,
            name: format!("p{id}"),
            color: Color::new(color),
            points,
        }
    }

    #[test]
    fn flags_single_shared_rank() {
        let all = vec![
            series(1, "#a", vec![Some(1), Some(3)]),
            series(2, "#b", vec![Some(2), Some(3)]),
            series(3, "#c", vec![Some(3), None]),
        ];
        let overlaps = detect_overlaps(&all);
        assert_eq!(overlaps.len(), 1);
        assert!(overlaps.contains(&OverlapKey { day_index: 1, value: 3 }));
    }

    #[test]
    fn gaps_never_overlap() {
        let all = vec![
            series(1, "#a", vec![None, Some(2)]),
            series(2, "#b", vec![None, Some(4)]),
        ];
        assert!(detect_overlaps(&all).is_empty());
        assert!(overlap_markers(&all).is_empty());
    }

    #[test]
    fn markers_list_every_claimant_in_order() {
        let all = vec![
            series(1, "#a", vec![Some(5)]),
            series(2, "#b", vec![Some(5)]),
            series(3, "#c", vec![Some(5)]),
        ];
        let markers = overlap_markers(&all);
        assert_eq!(markers.len(), 1);
        let colors: Vec<&str> = markers[0].colors.iter().map(Color::as_str).collect();
        assert_eq!(colors, vec!["#a", "#b", "#c"]);
    }
}
