// payguard-core/src/domain/anomaly/zscore.rs

use super::model::{AnomalyError, FeatureMatrix, OutlierModel, median};

/// Scale factor turning a MAD into a consistent estimator of the standard
/// deviation for normally distributed data.
const MAD_TO_SIGMA: f64 = 1.4826;

/// Robust z-score detector: distance to the median in MAD units, maximum
/// over features. A drop-in alternative to the isolation forest that needs no
/// randomness and no tuning.
#[derive(Debug, Clone, Copy, Default)]
pub struct RobustZScore;

impl RobustZScore {
    /// Median and scaled MAD of one feature. A zero MAD falls back to the
    /// mean absolute deviation so constant-heavy columns still score.
    fn center_and_spread(values: &[f64]) -> (f64, f64) {
        let center = median(values);
        let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
        let mad = median(&deviations) * MAD_TO_SIGMA;
        if mad > 1e-12 {
            return (center, mad);
        }
        let mean_abs = deviations.iter().sum::<f64>() / deviations.len().max(1) as f64;
        (center, mean_abs * 1.2533)
    }
}

impl OutlierModel for RobustZScore {
    fn name(&self) -> &'static str {
        "RobustZScore"
    }

    fn fit_and_score(&self, samples: &FeatureMatrix) -> Result<Vec<f64>, AnomalyError> {
        if samples.cols() == 0 {
            return Err(AnomalyError::NoFeatures);
        }
        if samples.rows() < 3 {
            return Err(AnomalyError::InsufficientSamples {
                model: self.name(),
                needed: 3,
                got: samples.rows(),
            });
        }

        let stats: Vec<(f64, f64)> = (0..samples.cols())
            .map(|c| {
                let column: Vec<f64> = samples.column(c).collect();
                Self::center_and_spread(&column)
            })
            .collect();

        let scores = (0..samples.rows())
            .map(|r| {
                samples
                    .row(r)
                    .iter()
                    .zip(&stats)
                    .map(|(x, (center, spread))| {
                        if *spread > 1e-12 {
                            ((x - center) / spread).abs()
                        } else {
                            0.0
                        }
                    })
                    .fold(0.0, f64::max)
            })
            .collect();

        Ok(scores)
    }
}
