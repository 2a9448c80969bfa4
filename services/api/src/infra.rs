use loan_risk::assessment::{
    FeatureSchema, IntakeGuard, LinearScorer, RiskAssessmentService, RiskScorer, ScorerHandle,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

/// Logistic artifact shipped with the service, paired with the v1 schema.
pub(crate) const REFERENCE_MODEL: &str = include_str!("../models/reference_model.json");

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Handle that loads `model_path` on first use, or the bundled artifact when none is set.
pub(crate) fn scorer_handle(model_path: Option<PathBuf>) -> ScorerHandle {
    ScorerHandle::new(FeatureSchema::standard(), move || {
        let scorer = match &model_path {
            Some(path) => {
                info!(path = %path.display(), "loading risk scorer artifact");
                LinearScorer::from_path(path)?
            }
            None => LinearScorer::from_reader(Cursor::new(REFERENCE_MODEL))?,
        };
        Ok(Arc::new(scorer) as Arc<dyn RiskScorer>)
    })
}

pub(crate) fn assessment_service(model_path: Option<PathBuf>) -> Arc<RiskAssessmentService> {
    Arc::new(RiskAssessmentService::new(
        IntakeGuard::default(),
        Arc::new(scorer_handle(model_path)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_risk::assessment::ScorerError;

    #[test]
    fn bundled_model_pairs_with_the_standard_schema() {
        let handle = scorer_handle(None);

        let scorer = handle.get().expect("bundled artifact loads");

        assert_eq!(scorer.schema_version(), Some("v1"));
        assert_eq!(scorer.columns().map(<[String]>::len), Some(29));
        assert!(handle.is_loaded());
    }

    #[test]
    fn missing_model_path_leaves_the_handle_unloaded() {
        let handle = scorer_handle(Some(PathBuf::from("./models/absent.json")));

        assert!(matches!(handle.get(), Err(ScorerError::Io(_))));
        assert!(!handle.is_loaded());
    }
}
