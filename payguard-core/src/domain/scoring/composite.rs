// payguard-core/src/domain/scoring/composite.rs

use std::collections::BTreeMap;
use tracing::debug;

use super::policy::CompositePolicy;
use super::result::round_to;
use crate::domain::check::Dimension;

/// Combines dimension scores into the overall Data Quality Score.
///
/// The weighted mean is capped according to the worst dimension, scaled down
/// when critical dimensions fail, then blended toward the minimum.
#[derive(Debug, Clone, Copy)]
pub struct CompositeScorer<'p> {
    policy: &'p CompositePolicy,
}

impl<'p> CompositeScorer<'p> {
    pub fn new(policy: &'p CompositePolicy) -> Self {
        Self { policy }
    }

    /// Dimensions missing from `weights` count with weight 1.0.
    pub fn compose(
        &self,
        scores: &BTreeMap<Dimension, f64>,
        weights: &BTreeMap<Dimension, f64>,
    ) -> f64 {
        if scores.is_empty() {
            return 0.0;
        }
        let policy = self.policy;

        let mut total_weighted = 0.0;
        let mut total_weight = 0.0;
        let mut min_score = f64::INFINITY;
        let mut problematic = 0usize;
        let mut critical_failing = 0usize;

        for (dimension, score) in scores {
            let weight = weights.get(dimension).copied().unwrap_or(1.0);
            total_weighted += score * weight;
            total_weight += weight;
            min_score = min_score.min(*score);
            if *score < policy.problem_threshold {
                problematic += 1;
            }
            if policy.is_critical(*dimension) && *score < policy.critical_fail_below {
                critical_failing += 1;
            }
        }

        let weighted_avg = if total_weight > 0.0 {
            total_weighted / total_weight
        } else {
            0.0
        };
        let mut composite = weighted_avg;

        if problematic > 0 {
            if let Some(cap) = policy.ceiling_for(min_score) {
                composite = composite.min(cap);
            }
        }

        if let Some(factor) = policy.critical_penalty_for(critical_failing) {
            composite *= factor;
        }

        if min_score < policy.heavy_blend_below {
            let share = policy.heavy_blend_min_share;
            composite = composite * (1.0 - share) + min_score * share;
        } else if min_score < policy.even_blend_below && problematic >= policy.even_blend_min_count {
            composite = (composite + min_score) / 2.0;
        }

        let composite = round_to(composite.clamp(0.0, 100.0), 2);
        debug!(weighted_avg, min_score, problematic, critical_failing, composite, "Composite DQS");
        composite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Dimension::*;

    fn compose(entries: &[(Dimension, f64, f64)]) -> f64 {
        let scores = entries.iter().map(|(d, s, _)| (*d, *s)).collect();
        let weights = entries.iter().map(|(d, _, w)| (*d, *w)).collect();
        CompositeScorer::new(&CompositePolicy::default()).compose(&scores, &weights)
    }

    #[test]
    fn test_no_dimensions() {
        assert_eq!(compose(&[]), 0.0);
    }

    #[test]
    fn test_healthy_dimensions_use_weighted_mean() {
        let dqs = compose(&[
            (Completeness, 90.0, 2.0),
            (Validity, 80.0, 2.5),
            (Timeliness, 100.0, 2.0),
        ]);
        // (180 + 200 + 200) / 6.5
        assert_eq!(dqs, 89.23);
    }

    #[test]
    fn test_one_broken_uniqueness_dominates() {
        let dqs = compose(&[
            (Completeness, 95.0, 2.0),
            (Validity, 96.0, 2.5),
            (Consistency, 97.0, 2.5),
            (Timeliness, 98.0, 2.0),
            (Uniqueness, 10.0, 3.0),
        ]);
        // mean 74.875 -> cap 30 -> x0.8 -> 24 * 0.3 + 10 * 0.7
        assert_eq!(dqs, 14.2);
    }

    #[test]
    fn test_floor_when_everything_else_is_perfect() {
        for min in [0.0, 5.0, 12.5, 19.99] {
            let dqs = compose(&[
                (Completeness, 100.0, 2.0),
                (Timeliness, 100.0, 2.0),
                (Reconciliation, min, 3.0),
                (Integrity, 100.0, 2.5),
            ]);
            assert!(dqs <= 0.3 * 100.0 + 0.7 * min + 1e-9);
            assert!(dqs <= 30.0);
        }
    }

    #[test]
    fn test_two_problem_dimensions_blend_evenly() {
        let dqs = compose(&[
            (Timeliness, 45.0, 2.0),
            (Integrity, 48.0, 2.5),
            (Reconciliation, 100.0, 3.0),
        ]);
        // mean 68 -> cap 55 -> (55 + 45) / 2
        assert_eq!(dqs, 50.0);
    }

    #[test]
    fn test_critical_penalties_stack_by_count() {
        let one = compose(&[(Completeness, 55.0, 2.0), (Timeliness, 100.0, 2.0)]);
        assert_eq!(one, round_to(77.5 * 0.8, 2));

        let three = compose(&[
            (Completeness, 55.0, 2.0),
            (Validity, 55.0, 2.0),
            (Uniqueness, 55.0, 2.0),
        ]);
        assert_eq!(three, 27.5);
    }

    #[test]
    fn test_missing_weight_defaults_to_one() {
        let scores = BTreeMap::from([(Completeness, 80.0), (Validity, 100.0)]);
        let weights = BTreeMap::from([(Completeness, 3.0)]);
        let dqs = CompositeScorer::new(&CompositePolicy::default()).compose(&scores, &weights);
        assert_eq!(dqs, 85.0);
    }

    #[test]
    fn test_bounds() {
        for a in [0.0, 33.3, 50.0, 59.9, 100.0] {
            for b in [0.0, 19.0, 71.0, 100.0] {
                let dqs = compose(&[(Uniqueness, a, 3.0), (Reconciliation, b, 3.0)]);
                assert!((0.0..=100.0).contains(&dqs));
            }
        }
    }
}
