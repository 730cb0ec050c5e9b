//! Confidence scoring for detected visits.
//!
//! Total function over valid signals: it never fails, and the result is
//! always in `[0, 1]`. Each factor contributes at most one bucket's
//! bonus/penalty; buckets are evaluated independently, not as cumulative
//! ranges. The caller gates the resolve→rank pipeline on
//! [`RECOMMEND_GATE`] and may re-score the same physical visit later with
//! updated dwell/prior-visit signals.

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::models::VisitSignal;

/// Confidence a visit must reach before acting on it.
pub const RECOMMEND_GATE: f64 = defaults::RECOMMEND_GATE;

/// A bounded trust score for one visit signal. Derived, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceResult {
    pub score: f64,
}

impl ConfidenceResult {
    /// Whether the visit is trustworthy enough to act on.
    pub fn above_gate(&self) -> bool {
        self.score >= RECOMMEND_GATE
    }
}

/// Score a visit signal.
pub fn score(signal: &VisitSignal) -> ConfidenceResult {
    let mut score = 0.5;

    score += prior_visit_bonus(signal.prior_visits);

    if let Some(dwell) = signal.dwell_minutes {
        score += dwell_bonus(dwell);
    }

    if let Some(distance) = signal.distance_meters {
        score -= distance_penalty(distance);
    }

    if is_meal_hour(signal.hour_of_day) {
        score += 0.05;
    }

    ConfidenceResult {
        score: score.clamp(0.0, 1.0),
    }
}

fn prior_visit_bonus(prior_visits: u32) -> f64 {
    match prior_visits {
        v if v >= 5 => 0.3,
        v if v >= 3 => 0.2,
        v if v >= 1 => 0.1,
        _ => 0.0,
    }
}

fn dwell_bonus(dwell_minutes: f64) -> f64 {
    if dwell_minutes > 30.0 {
        0.2
    } else if dwell_minutes > 15.0 {
        0.15
    } else if dwell_minutes > 5.0 {
        0.1
    } else {
        0.0
    }
}

fn distance_penalty(distance_meters: f64) -> f64 {
    if distance_meters > 200.0 {
        0.2
    } else if distance_meters > 120.0 {
        0.15
    } else if distance_meters > 80.0 {
        0.1
    } else {
        0.0
    }
}

/// Breakfast, lunch, and dinner windows (local hour at arrival).
fn is_meal_hour(hour: u8) -> bool {
    matches!(hour, 8..=10 | 12..=14 | 18..=22)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn signal(
        prior_visits: u32,
        dwell_minutes: Option<f64>,
        distance_meters: Option<f64>,
        hour_of_day: u8,
    ) -> VisitSignal {
        VisitSignal {
            latitude: 37.7749,
            longitude: -122.4194,
            arrival_time: Utc::now(),
            distance_meters,
            dwell_minutes,
            prior_visits,
            hour_of_day,
        }
    }

    #[test]
    fn test_base_case_scores_one_half() {
        // No priors, 5 minutes of dwell (below the first bucket), no
        // distance signal, mid-afternoon.
        let result = score(&signal(0, Some(5.0), None, 15));
        assert!((result.score - 0.5).abs() < 0.1);
    }

    #[test]
    fn test_score_is_bounded_for_all_inputs() {
        for prior in [0u32, 1, 2, 3, 4, 5, 50] {
            for dwell in [None, Some(0.0), Some(6.0), Some(16.0), Some(31.0), Some(600.0)] {
                for dist in [None, Some(0.0), Some(81.0), Some(121.0), Some(201.0), Some(9e3)] {
                    for hour in 0u8..24 {
                        let s = score(&signal(prior, dwell, dist, hour)).score;
                        assert!((0.0..=1.0).contains(&s), "score {} out of range", s);
                    }
                }
            }
        }
    }

    #[test]
    fn test_prior_visits_never_decrease_score() {
        let mut last = 0.0;
        for prior in 0..10 {
            let s = score(&signal(prior, Some(20.0), Some(100.0), 15)).score;
            assert!(s >= last, "prior={} decreased score", prior);
            last = s;
        }
    }

    #[test]
    fn test_distance_never_increases_score() {
        let mut last = 1.0;
        for dist in [10.0, 80.0, 81.0, 120.0, 121.0, 200.0, 201.0, 500.0] {
            let s = score(&signal(2, Some(20.0), Some(dist), 15)).score;
            assert!(s <= last, "distance={} increased score", dist);
            last = s;
        }
    }

    #[test]
    fn test_meal_hour_bonus() {
        let afternoon = score(&signal(0, Some(5.0), None, 15)).score;
        let dinner = score(&signal(0, Some(5.0), None, 19)).score;
        assert!(dinner > afternoon);
        assert!((dinner - afternoon - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_meal_windows() {
        for hour in [8, 9, 10, 12, 13, 14, 18, 20, 22] {
            assert!(is_meal_hour(hour), "hour {} should be a meal hour", hour);
        }
        for hour in [0, 7, 11, 15, 16, 17, 23] {
            assert!(!is_meal_hour(hour), "hour {} should not be a meal hour", hour);
        }
    }

    #[test]
    fn test_buckets_are_not_cumulative() {
        // 40 minutes of dwell lands in exactly one bucket: +0.2, not
        // 0.2+0.15+0.1.
        let with_dwell = score(&signal(0, Some(40.0), None, 15)).score;
        let without = score(&signal(0, None, None, 15)).score;
        assert!((with_dwell - without - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_clamped_at_one() {
        // Max bonuses: 0.5 + 0.3 + 0.2 + 0.05 = 1.05, clamped.
        let s = score(&signal(5, Some(45.0), Some(10.0), 19)).score;
        assert_eq!(s, 1.0);
    }

    #[test]
    fn test_gate_threshold() {
        // A regular (5+ visits) with a long dwell clears the gate.
        let strong = score(&signal(5, Some(20.0), Some(50.0), 15));
        assert!(strong.above_gate());

        // A first visit, far from the POI, does not.
        let weak = score(&signal(0, Some(2.0), Some(250.0), 15));
        assert!(!weak.above_gate());
    }
}
