//! Missions-completed buckets for one day.
use serde::{Deserialize, Serialize};

use crate::model::Snapshot;

pub const MAX_MISSIONS: u8 = 3;

pub const BUCKET_COLORS: [&str; 4] = ["#4a3f6b", "#7b6fa0", "#b09fd0", "#e8c96a"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionBucket {
    pub missions: u8,
    pub label: String,
    pub color: String,
    pub count: usize,
}

/// Count entries by decoded missions (`0/3` through `3/3`).
///
/// Entries whose details do not decode, or that report more than three
/// missions, are left out.
#[must_use]
pub fn mission_buckets(snapshot: &Snapshot) -> Vec<MissionBucket> {
    let mut counts = [0usize; MAX_MISSIONS as usize + 1];
    let mut skipped = 0usize;
    for entry in &snapshot.entries {
        match entry.details() {
            Ok(details) if details.missions <= MAX_MISSIONS => {
                counts[usize::from(details.missions)] += 1;
            }
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        log::debug!(
            "{skipped} entries on {} had unusable mission details",
            snapshot.date
        );
    }

    (0..=MAX_MISSIONS)
        .zip(counts)
        .zip(BUCKET_COLORS)
        .map(|((missions, count), color)| MissionBucket {
            missions,
            label: format!("{missions}/{MAX_MISSIONS}"),
            color: color.to_string(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Entry;
    use chrono::NaiveDate;

    #[test]
    fn buckets_by_decoded_missions() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let mut rows = vec![
            Entry::new(1, 1, "a", 500),
            Entry::new(2, 2, "b", 400),
            Entry::new(3, 3, "c", 300),
            Entry::new(4, 4, "d", 10),
            Entry::new(5, 5, "e", 0),
        ];
        rows[0].raw_details = "3:0:10:300".to_string();
        rows[1].raw_details = "3:20:0:340".to_string();
        rows[2].raw_details = "2:10:0:500".to_string();
        rows[3].raw_details = "7:0:0:10".to_string();
        rows[4].raw_details = "garbage".to_string();
        let buckets = mission_buckets(&Snapshot::new(date, rows));

        let counts: Vec<usize> = buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![0, 0, 1, 2]);
        assert_eq!(buckets[3].label, "3/3");
        assert_eq!(buckets[3].color, "#e8c96a");
    }
}
