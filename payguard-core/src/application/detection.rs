// payguard-core/src/application/detection.rs

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

use crate::domain::anomaly::{AnomalyDetectionEngine, AnomalyReport, DetectorOutput};
use crate::domain::dataset::{Dataset, Profile};

/// Runs the four detectors in parallel on the blocking pool.
///
/// A detector that panics or misses `deadline` contributes nothing; the
/// others are unaffected. Timed-out work is abandoned, not cancelled.
#[instrument(skip_all, fields(rows = dataset.row_count(), deadline_ms = deadline.map(|d| d.as_millis() as u64)))]
pub async fn detect_anomalies(
    engine: &AnomalyDetectionEngine,
    dataset: Arc<Dataset>,
    profile: Arc<Profile>,
    deadline: Option<Duration>,
) -> AnomalyReport {
    let start = Instant::now();

    let numeric = {
        let (engine, dataset, profile) = (engine.clone(), dataset.clone(), profile.clone());
        run_detector("numeric", deadline, move || engine.detect_numeric(&dataset, &profile))
    };
    let categorical = {
        let (engine, dataset, profile) = (engine.clone(), dataset.clone(), profile.clone());
        run_detector("categorical", deadline, move || {
            engine.detect_categorical(&dataset, &profile)
        })
    };
    let text = {
        let (engine, dataset, profile) = (engine.clone(), dataset.clone(), profile.clone());
        run_detector("text", deadline, move || engine.detect_text(&dataset, &profile))
    };
    let rows = {
        let (engine, dataset, profile) = (engine.clone(), dataset, profile);
        run_detector("rows", deadline, move || engine.detect_rows(&dataset, &profile))
    };

    // Aggregation waits for every detector
    let (numeric, categorical, text, rows) = tokio::join!(numeric, categorical, text, rows);

    let report = engine.consolidate(
        numeric,
        categorical,
        text,
        rows,
        start.elapsed().as_millis() as u64,
    );
    info!(
        total_anomalies = report.total_anomalies,
        checks = report.check_results.len(),
        duration_ms = report.duration_ms,
        "Anomaly detection finished"
    );
    report
}

async fn run_detector<F, T>(name: &'static str, deadline: Option<Duration>, job: F) -> DetectorOutput<T>
where
    F: FnOnce() -> DetectorOutput<T> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::task::spawn_blocking(job);

    let joined = match deadline {
        Some(limit) => match tokio::time::timeout(limit, handle).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!(
                    detector = name,
                    deadline_ms = limit.as_millis() as u64,
                    "Detector missed its deadline, output dropped"
                );
                return DetectorOutput::empty();
            }
        },
        None => handle.await,
    };

    match joined {
        Ok(output) => output,
        Err(e) => {
            warn!(detector = name, error = %e, "Detector task failed, output dropped");
            DetectorOutput::empty()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::anomaly::{AnomalyConfig, AnomalyError, FeatureMatrix, OutlierModel};
    use crate::domain::dataset::Column;
    use anyhow::Result;

    struct SlowModel(Duration);

    impl OutlierModel for SlowModel {
        fn name(&self) -> &'static str {
            "Slow"
        }

        fn fit_and_score(&self, samples: &FeatureMatrix) -> Result<Vec<f64>, AnomalyError> {
            std::thread::sleep(self.0);
            Ok(vec![0.0; samples.rows()])
        }
    }

    struct PanickingModel;

    impl OutlierModel for PanickingModel {
        fn name(&self) -> &'static str {
            "Panicking"
        }

        fn fit_and_score(&self, _samples: &FeatureMatrix) -> Result<Vec<f64>, AnomalyError> {
            panic!("model blew up")
        }
    }

    fn dataset() -> Result<Arc<Dataset>> {
        let n = 60;
        let mut currency: Vec<Option<String>> = vec![Some("EUR".into()); n];
        currency[5] = Some("???".into());
        Ok(Arc::new(Dataset::new(vec![
            Column::numeric("amount", (0..n).map(|i| Some((i % 9) as f64 * 10.0)).collect()),
            Column::numeric("fee", (0..n).map(|i| Some((i % 4) as f64)).collect()),
            Column::categorical("currency", currency),
        ])?))
    }

    #[tokio::test]
    async fn test_concurrent_matches_sequential() -> Result<()> {
        let ds = dataset()?;
        let profile = Arc::new(Profile::from_dataset(&ds));
        let engine = AnomalyDetectionEngine::default();

        let sequential = engine.detect(&ds, &profile);
        let concurrent = detect_anomalies(&engine, ds.clone(), profile.clone(), None).await;

        assert_eq!(sequential.check_results, concurrent.check_results);
        assert_eq!(sequential.numeric_anomalies, concurrent.numeric_anomalies);
        assert_eq!(sequential.row_anomalies, concurrent.row_anomalies);
        Ok(())
    }

    #[tokio::test]
    async fn test_deadline_drops_slow_detectors_only() -> Result<()> {
        let ds = dataset()?;
        let engine = AnomalyDetectionEngine::with_model(
            AnomalyConfig::default(),
            Arc::new(SlowModel(Duration::from_millis(400))),
        );

        let report = detect_anomalies(
            &engine,
            ds,
            Arc::new(Profile::default()),
            Some(Duration::from_millis(50)),
        )
        .await;

        assert!(report.numeric_anomalies.is_empty());
        assert!(report.row_anomalies.is_empty());
        assert_eq!(report.categorical_anomalies.len(), 1);
        assert_eq!(report.check_results.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_panicking_detector_is_absorbed() -> Result<()> {
        let ds = dataset()?;
        let engine =
            AnomalyDetectionEngine::with_model(AnomalyConfig::default(), Arc::new(PanickingModel));

        let report = detect_anomalies(&engine, ds, Arc::new(Profile::default()), None).await;

        assert!(report.numeric_anomalies.is_empty());
        assert!(report.row_anomalies.is_empty());
        assert_eq!(report.model, "Panicking");
        assert!(!report.categorical_anomalies.is_empty());
        Ok(())
    }
}
