//! Score distribution bucketing.
//!
//! Two policies share one output shape: a fixed layout with an underflow and an
//! overflow bucket around equal-width ranges, and an adaptive layout whose bin
//! width is rounded to a 1/2/5 x 10^k step derived from the observed range.

use num_traits::NumCast;
use num_traits::cast::cast;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::model::Snapshot;

/// Bucketing policy for the score histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum BinningPolicy {
    /// `<0`, then `[0, max)` in `step`-wide ranges, then `>= max`.
    Fixed { step: i64, max: i64 },
    /// Nice-number bins targeting roughly `target_buckets` buckets.
    Adaptive { target_buckets: usize },
}

impl Default for BinningPolicy {
    fn default() -> Self {
        Self::Adaptive { target_buckets: 10 }
    }
}

impl BinningPolicy {
    /// Reference fixed layout: 100-point buckets up to 600.
    #[must_use]
    pub const fn reference_fixed() -> Self {
        Self::Fixed { step: 100, max: 600 }
    }

    /// Check the policy parameters.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero bucket target or an unusable fixed layout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::Adaptive { target_buckets: 0 } => Err(ConfigError::Zero {
                field: "target_buckets",
            }),
            Self::Adaptive { .. } => Ok(()),
            Self::Fixed { step, .. } if step <= 0 => Err(ConfigError::FixedStep { step }),
            Self::Fixed { step, max } if max <= 0 || max % step != 0 => {
                Err(ConfigError::FixedMax { max, step })
            }
            Self::Fixed { .. } => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub label: String,
    /// Inclusive lower edge; `None` for the open-ended underflow bucket.
    pub lower: Option<f64>,
    /// Exclusive upper edge; `None` for the open-ended overflow bucket.
    pub upper: Option<f64>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub policy: BinningPolicy,
    pub buckets: Vec<Bucket>,
}

impl Histogram {
    #[must_use]
    pub fn counts(&self) -> Vec<usize> {
        self.buckets.iter().map(|b| b.count).collect()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }

    /// Histogram of one day's scores, or `None` when fewer than two entries exist.
    #[must_use]
    pub fn for_snapshot(snapshot: &Snapshot, policy: BinningPolicy) -> Option<Self> {
        bin_scores(&snapshot.scores(), policy)
    }
}

/// Bucket `scores` under `policy`.
///
/// Fewer than two scores yields `None` ("no distribution available") rather than
/// a degenerate chart. An invalid policy also yields `None`.
#[must_use]
pub fn bin_scores(scores: &[i64], policy: BinningPolicy) -> Option<Histogram> {
    if scores.len() < 2 || policy.validate().is_err() {
        return None;
    }
    let buckets = match policy {
        BinningPolicy::Fixed { step, max } => fixed_buckets(scores, step, max),
        BinningPolicy::Adaptive { target_buckets } => adaptive_buckets(scores, target_buckets),
    };
    Some(Histogram { policy, buckets })
}

fn fixed_buckets(scores: &[i64], step: i64, max: i64) -> Vec<Bucket> {
    let ranged = usize::try_from(max / step).unwrap_or(0);
    let last = ranged + 1;
    let mut buckets = Vec::with_capacity(ranged + 2);
    buckets.push(Bucket {
        label: "<0".to_string(),
        lower: None,
        upper: Some(0.0),
        count: 0,
    });
    for i in 0..ranged {
        let lo = i64::try_from(i).unwrap_or(0) * step;
        buckets.push(Bucket {
            label: format!("{lo}–{}", lo + step - 1),
            lower: Some(as_f64(lo)),
            upper: Some(as_f64(lo + step)),
            count: 0,
        });
    }
    buckets.push(Bucket {
        label: format!("{max}+"),
        lower: Some(as_f64(max)),
        upper: None,
        count: 0,
    });

    for &score in scores {
        let index = if score < 0 {
            0
        } else if score >= max {
            last
        } else {
            1 + usize::try_from(score / step).unwrap_or(0)
        };
        buckets[index].count += 1;
    }
    buckets
}

fn as_f64<T: NumCast>(value: T) -> f64 {
    cast(value).unwrap_or(0.0)
}

/// Non-negative bucket index; negative or non-finite input maps to 0.
fn as_index(value: f64) -> usize {
    cast(value).unwrap_or(0)
}

fn as_whole(value: f64) -> i64 {
    cast(value.round()).unwrap_or(0)
}

/// Round `raw` up to the next 1, 2, 5 or 10 times a power of ten.
fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let factor = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    magnitude * factor
}

/// Adaptive bin geometry derived from the score range.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AdaptiveLayout {
    bin_min: f64,
    step: f64,
    count: usize,
}

impl AdaptiveLayout {
    fn new(min: i64, max: i64, target_buckets: usize) -> Self {
        let (min, max) = (as_f64(min), as_f64(max));
        let step = nice_step((max - min) / as_f64(target_buckets));
        let bin_min = (min / step).floor() * step;
        let count = as_index(((max - bin_min) / step).ceil()) + 1;
        Self {
            bin_min,
            step,
            count,
        }
    }

    fn index_of(&self, score: i64) -> usize {
        let raw = as_index(((as_f64(score) - self.bin_min) / self.step).floor());
        raw.min(self.count - 1)
    }

    fn label(&self, index: usize) -> String {
        let lo = self.bin_min + self.step * as_f64(index);
        if self.step.fract() == 0.0 {
            let lo_whole = as_whole(lo);
            format!("{lo_whole}–{}", as_whole(lo + self.step) - 1)
        } else {
            format!("{}–{}", trim_float(lo), trim_float(lo + self.step))
        }
    }
}

fn trim_float(value: f64) -> String {
    let text = format!("{value:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn adaptive_buckets(scores: &[i64], target_buckets: usize) -> Vec<Bucket> {
    let min = scores.iter().copied().min().unwrap_or(0);
    let max = scores.iter().copied().max().unwrap_or(0);
    let layout = AdaptiveLayout::new(min, max, target_buckets);

    let mut buckets: Vec<Bucket> = (0..layout.count)
        .map(|i| {
            let lo = layout.bin_min + layout.step * as_f64(i);
            Bucket {
                label: layout.label(i),
                lower: Some(lo),
                upper: Some(lo + layout.step),
                count: 0,
            }
        })
        .collect();

    for &score in scores {
        buckets[layout.index_of(score)].count += 1;
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nice_step_rounds_to_one_two_five() {
        assert_eq!(nice_step(50.0), 50.0);
        assert_eq!(nice_step(13.0), 20.0);
        assert_eq!(nice_step(0.3), 0.5);
        assert_eq!(nice_step(7.0), 10.0);
        assert_eq!(nice_step(100.0), 100.0);
        assert_eq!(nice_step(0.0), 1.0);
    }

    #[test]
    fn adaptive_places_every_score_in_range() {
        let scores = [0, 50, 100, 500];
        let histogram = bin_scores(&scores, BinningPolicy::Adaptive { target_buckets: 10 }).unwrap();
        assert_eq!(histogram.buckets.len(), 11);
        assert_eq!(histogram.total(), 4);
        let counts = histogram.counts();
        assert_eq!(counts[0], 1);
        assert_eq!(counts[1], 1);
        assert_eq!(counts[2], 1);
        assert_eq!(counts[10], 1);
        assert_eq!(histogram.buckets[1].label, "50–99");
    }

    #[test]
    fn adaptive_handles_negative_minimum() {
        let scores = [-35, -10, 12, 140, 260];
        let histogram = bin_scores(&scores, BinningPolicy::default()).unwrap();
        // range 295 -> raw 29.5 -> step 50, bin_min -50
        assert_eq!(histogram.buckets[0].lower, Some(-50.0));
        assert_eq!(histogram.buckets.len(), 8);
        assert_eq!(histogram.total(), scores.len());
        assert_eq!(histogram.counts()[0], 2);
    }

    #[test]
    fn adaptive_survives_identical_scores() {
        let histogram = bin_scores(&[42, 42, 42], BinningPolicy::default()).unwrap();
        assert_eq!(histogram.buckets.len(), 1);
        assert_eq!(histogram.counts(), vec![3]);
    }

    #[test]
    fn adaptive_fractional_step_labels() {
        let histogram = bin_scores(&[0, 3], BinningPolicy::default()).unwrap();
        // raw 0.3 -> step 0.5, seven buckets from 0
        assert_eq!(histogram.buckets.len(), 7);
        assert_eq!(histogram.buckets[1].label, "0.5–1");
        assert_eq!(histogram.total(), 2);
    }

    #[test]
    fn fixed_layout_has_underflow_and_overflow() {
        let scores = [-5, 0, 99, 100, 599, 600, 1200];
        let histogram = bin_scores(&scores, BinningPolicy::reference_fixed()).unwrap();
        let labels: Vec<&str> = histogram.buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["<0", "0–99", "100–199", "200–299", "300–399", "400–499", "500–599", "600+"]
        );
        assert_eq!(histogram.counts(), vec![1, 2, 1, 0, 0, 0, 1, 2]);
    }

    #[test]
    fn fewer_than_two_scores_is_unavailable() {
        assert!(bin_scores(&[], BinningPolicy::default()).is_none());
        assert!(bin_scores(&[10], BinningPolicy::default()).is_none());
        assert!(bin_scores(&[10], BinningPolicy::reference_fixed()).is_none());
    }

    #[test]
    fn invalid_policy_is_unavailable() {
        let policy = BinningPolicy::Adaptive { target_buckets: 0 };
        assert!(bin_scores(&[1, 2, 3], policy).is_none());
    }

    #[test]
    fn policy_deserializes_tagged() {
        let policy: BinningPolicy =
            serde_json::from_str(r#"{"policy":"fixed","step":50,"max":300}"#).unwrap();
        assert_eq!(policy, BinningPolicy::Fixed { step: 50, max: 300 });
    }
}
