// payguard-core/src/domain/scoring/engine.rs

use chrono::Utc;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{info, instrument};

use super::composite::CompositeScorer;
use super::dimension::DimensionScorer;
use super::policy::ScoringPolicy;
use super::result::ScoringResult;
use crate::domain::check::{CheckResult, Dimension};
use crate::domain::dataset::Profile;

/// Groups checks by dimension, scores the selected dimensions and composes
/// the DQS. Anomaly checks go through the same path as rule-based ones.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    policy: ScoringPolicy,
}

impl ScoringEngine {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Checks whose dimension is not selected are ignored; selected
    /// dimensions without checks score as vacuous.
    #[instrument(skip_all, fields(checks = checks.len(), dimensions = dimensions.len()))]
    pub fn compute_scores(
        &self,
        checks: &[CheckResult],
        profile: &Profile,
        dimensions: &[Dimension],
    ) -> ScoringResult {
        let start = Instant::now();

        let mut by_dimension: BTreeMap<Dimension, Vec<&CheckResult>> = BTreeMap::new();
        for check in checks {
            by_dimension.entry(check.dimension).or_default().push(check);
        }

        let scorer = DimensionScorer::new(&self.policy);
        let mut dimension_scores = BTreeMap::new();
        for dimension in dimensions {
            let group = by_dimension.get(dimension).map(Vec::as_slice).unwrap_or_default();
            dimension_scores.insert(*dimension, scorer.score(*dimension, group.iter().copied(), profile));
        }

        let dimension_weights: BTreeMap<Dimension, f64> = dimension_scores
            .iter()
            .map(|(d, s)| (*d, s.weight))
            .collect();
        let scores: BTreeMap<Dimension, f64> = dimension_scores
            .iter()
            .map(|(d, s)| (*d, s.score))
            .collect();

        let composite_dqs =
            CompositeScorer::new(&self.policy.composite).compose(&scores, &dimension_weights);

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(composite_dqs, duration_ms, "Scoring finished");

        ScoringResult {
            dimension_scores,
            dimension_weights,
            composite_dqs,
            duration_ms,
            scored_at: Utc::now(),
        }
    }
}
