// payguard-core/src/domain/anomaly/model.rs

use miette::Diagnostic;
use thiserror::Error;

use crate::domain::error::DomainError;

#[derive(Debug, Error, Diagnostic, PartialEq)]
pub enum AnomalyError {
    #[error("Not enough samples to fit '{model}': need {needed}, got {got}")]
    #[diagnostic(
        code(payguard::anomaly::insufficient_samples),
        help("Columns with fewer values than the model needs are skipped.")
    )]
    InsufficientSamples {
        model: &'static str,
        needed: usize,
        got: usize,
    },
    #[error("Feature matrix has no features")]
    #[diagnostic(code(payguard::anomaly::no_features))]
    NoFeatures,
}

/// Row-major matrix of features. A single column is a matrix with one feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl FeatureMatrix {
    pub fn from_column(values: &[f64]) -> Self {
        Self {
            rows: values.len(),
            cols: 1,
            data: values.to_vec(),
        }
    }

    /// Builds a matrix from equally long feature columns.
    pub fn from_columns(columns: &[Vec<f64>]) -> Result<Self, DomainError> {
        let rows = columns.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = columns.iter().position(|c| c.len() != rows) {
            return Err(DomainError::InvalidFeatureMatrix(format!(
                "feature {} has {} values, expected {}",
                bad,
                columns[bad].len(),
                rows
            )));
        }
        let cols = columns.len();
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            data.extend(columns.iter().map(|c| c[r]));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn column(&self, col: usize) -> impl Iterator<Item = f64> + '_ {
        (0..self.rows).map(move |r| self.get(r, col))
    }
}

/// Unsupervised outlier model.
///
/// `fit_and_score` fits on the given samples and scores those same samples;
/// a higher score means more anomalous. Implementations must be
/// deterministic for a given configuration.
pub trait OutlierModel: Send + Sync {
    fn name(&self) -> &'static str;

    fn fit_and_score(&self, samples: &FeatureMatrix) -> Result<Vec<f64>, AnomalyError>;
}

/// Flags the most anomalous `contamination` fraction of `scores`.
///
/// The cut-off is the `(1 - contamination)` quantile (linear interpolation);
/// only scores strictly above it are flagged, so ties at the cut-off stay
/// unflagged.
pub fn flag_outliers(scores: &[f64], contamination: f64) -> Vec<bool> {
    if scores.is_empty() || contamination <= 0.0 {
        return vec![false; scores.len()];
    }
    let threshold = quantile(scores, 1.0 - contamination.min(1.0));
    scores.iter().map(|s| *s > threshold).collect()
}

/// Quantile with linear interpolation between closest ranks (numpy default).
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    if frac == 0.0 {
        return sorted[lo];
    }
    let gap = sorted[hi] - sorted[lo];
    if gap.is_finite() {
        sorted[lo] + gap * frac
    } else {
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

pub fn median(values: &[f64]) -> f64 {
    quantile(values, 0.5)
}

/// Centers every feature to zero mean and scales to unit (population)
/// variance. Constant features are only centered.
///
/// Moments are taken on values divided by the largest finite magnitude, so
/// columns near `f64::MAX` do not overflow.
pub fn standardize(matrix: &FeatureMatrix) -> FeatureMatrix {
    let n = matrix.rows().max(1) as f64;
    let stats: Vec<(f64, f64, f64)> = (0..matrix.cols())
        .map(|c| {
            let scale = matrix
                .column(c)
                .filter(|x| x.is_finite())
                .fold(0.0, |m: f64, x| m.max(x.abs()));
            let scale = if scale > 0.0 { scale } else { 1.0 };
            let mean = matrix.column(c).map(|x| x / scale).sum::<f64>() / n;
            let var = matrix
                .column(c)
                .map(|x| (x / scale - mean).powi(2))
                .sum::<f64>()
                / n;
            let std = var.sqrt();
            (scale, mean, if std > 0.0 && std.is_finite() { std } else { 1.0 })
        })
        .collect();

    let mut data = Vec::with_capacity(matrix.rows() * matrix.cols());
    for r in 0..matrix.rows() {
        for (c, (scale, mean, std)) in stats.iter().enumerate() {
            data.push((matrix.get(r, c) / scale - mean) / std);
        }
    }
    FeatureMatrix {
        rows: matrix.rows(),
        cols: matrix.cols(),
        data,
    }
}
