use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::assessment::domain::ApplicationForm;
use crate::assessment::intake::IntakeGuard;
use crate::assessment::schema::{FeatureSchema, STANDARD_COLUMNS};
use crate::assessment::scorer::{RawScore, RiskScorer, ScorerError, ScorerHandle};
use crate::assessment::{assessment_router, RiskAssessmentService};

/// The applicant used throughout: salaried BSc holder renting in Lagos, score 650.
pub(super) fn sample_form() -> ApplicationForm {
    ApplicationForm {
        age: 30.0,
        monthly_income: 150_000.0,
        loan_amount: 500_000.0,
        loan_duration_months: 12.0,
        num_dependents: 0.0,
        credit_score: 650.0,
        previous_loans: 0.0,
        previous_defaults: 0.0,
        account_age_months: 24.0,
        education_level: "BSc".to_string(),
        employment_type: "Salary_Earner".to_string(),
        residential_status: "Renting".to_string(),
        state: "Lagos".to_string(),
        has_bank_account: "Yes".to_string(),
    }
}

/// Scorer returning a canned answer regardless of input.
pub(super) struct FixedScorer {
    pub(super) raw: RawScore,
}

impl RiskScorer for FixedScorer {
    fn score(&self, features: &[f64]) -> Result<RawScore, ScorerError> {
        assert_eq!(features.len(), STANDARD_COLUMNS.len());
        Ok(self.raw)
    }
}

/// Scorer that declares a column list, used to exercise pairing checks.
pub(super) struct DeclaredColumnsScorer {
    pub(super) version: String,
    pub(super) columns: Vec<String>,
}

impl RiskScorer for DeclaredColumnsScorer {
    fn score(&self, _features: &[f64]) -> Result<RawScore, ScorerError> {
        Ok(RawScore {
            label: 0,
            probability: 0.1,
        })
    }

    fn columns(&self) -> Option<&[String]> {
        Some(&self.columns)
    }

    fn schema_version(&self) -> Option<&str> {
        Some(&self.version)
    }
}

pub(super) fn fixed_handle(label: u8, probability: f64) -> Arc<ScorerHandle> {
    let scorer: Arc<dyn RiskScorer> = Arc::new(FixedScorer {
        raw: RawScore { label, probability },
    });
    Arc::new(ScorerHandle::ready(FeatureSchema::standard(), scorer).expect("paired scorer"))
}

pub(super) fn service_with(label: u8, probability: f64) -> RiskAssessmentService {
    RiskAssessmentService::new(IntakeGuard::default(), fixed_handle(label, probability))
}

/// Handle whose loader counts invocations and can be told to fail.
pub(super) fn counting_handle(
    loads: Arc<AtomicUsize>,
    failures_before_success: usize,
) -> ScorerHandle {
    ScorerHandle::new(FeatureSchema::standard(), move || {
        let attempt = loads.fetch_add(1, Ordering::SeqCst);
        if attempt < failures_before_success {
            return Err(ScorerError::Unavailable("artifact store offline".to_string()));
        }
        let scorer: Arc<dyn RiskScorer> = Arc::new(FixedScorer {
            raw: RawScore {
                label: 0,
                probability: 0.2,
            },
        });
        Ok(scorer)
    })
}

pub(super) fn router_with(label: u8, probability: f64) -> axum::Router {
    assessment_router(Arc::new(service_with(label, probability)))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Indicator values for every column starting with `prefix`.
pub(super) fn indicator_values(
    vector: &crate::assessment::FeatureVector,
    prefix: &str,
) -> Vec<(String, f64)> {
    vector
        .iter()
        .filter(|(name, _)| name.starts_with(prefix))
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}
