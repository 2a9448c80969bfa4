use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use super::assembler::{FeatureAssembler, FeatureVector, NamedFeature};
use super::domain::{ApplicantProfile, ApplicationForm, AssessmentId, CreditBand};
use super::intake::{IntakeGuard, InvalidInput};
use super::ratios::DerivedRatios;
use super::report::{self, RiskLabel, RiskVerdict};
use super::schema::SchemaMismatch;
use super::scorer::{ScorerError, ScorerHandle};

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),
    #[error("schema mismatch: {0}")]
    SchemaMismatch(#[from] SchemaMismatch),
    #[error(transparent)]
    Scorer(ScorerError),
}

impl From<ScorerError> for AssessmentError {
    fn from(value: ScorerError) -> Self {
        match value {
            ScorerError::Schema(mismatch) => Self::SchemaMismatch(mismatch),
            other => Self::Scorer(other),
        }
    }
}

impl AssessmentError {
    /// Whether the failure is attributable to the submitted form rather than the deployment.
    pub fn is_input_error(&self) -> bool {
        matches!(self, AssessmentError::InvalidInput(_))
    }
}

/// Full trail of one scored submission.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub assessment_id: AssessmentId,
    pub assessed_at: DateTime<Utc>,
    pub profile: ApplicantProfile,
    pub credit_band: CreditBand,
    pub ratios: DerivedRatios,
    pub features: FeatureVector,
    pub verdict: RiskVerdict,
}

impl RiskAssessment {
    pub fn view(&self, include_features: bool) -> RiskAssessmentView {
        RiskAssessmentView {
            assessment_id: self.assessment_id.clone(),
            assessed_at: self.assessed_at,
            label: self.verdict.label,
            headline: self.verdict.label.headline(),
            recommendation: self.verdict.label.recommendation(),
            probability_of_default: self.verdict.probability_of_default,
            probability_display: self.verdict.probability_percent(),
            credit_band: self.credit_band,
            schema_version: self.features.schema_version().to_string(),
            ratios: self.ratios,
            features: include_features.then(|| self.features.named()),
        }
    }
}

/// Public representation of an assessment for API responses and CLI output.
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessmentView {
    pub assessment_id: AssessmentId,
    pub assessed_at: DateTime<Utc>,
    pub label: RiskLabel,
    pub headline: &'static str,
    pub recommendation: &'static str,
    pub probability_of_default: f64,
    pub probability_display: String,
    pub credit_band: CreditBand,
    pub schema_version: String,
    pub ratios: DerivedRatios,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<NamedFeature>>,
}

static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assessment_id() -> AssessmentId {
    let id = ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssessmentId(format!("asm-{id:06}"))
}

/// Service composing intake, feature assembly, the shared scorer and the reporter.
#[derive(Debug)]
pub struct RiskAssessmentService {
    guard: IntakeGuard,
    assembler: FeatureAssembler,
    scorer: Arc<ScorerHandle>,
}

impl RiskAssessmentService {
    /// The assembler is built against the handle's schema so both sides share one contract.
    pub fn new(guard: IntakeGuard, scorer: Arc<ScorerHandle>) -> Self {
        let assembler = FeatureAssembler::new(scorer.schema().clone());
        Self {
            guard,
            assembler,
            scorer,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_assembler(
        guard: IntakeGuard,
        assembler: FeatureAssembler,
        scorer: Arc<ScorerHandle>,
    ) -> Self {
        Self {
            guard,
            assembler,
            scorer,
        }
    }

    pub fn assembler(&self) -> &FeatureAssembler {
        &self.assembler
    }

    pub fn scorer(&self) -> &Arc<ScorerHandle> {
        &self.scorer
    }

    /// Validate and assemble without scoring.
    pub fn preview(&self, form: &ApplicationForm) -> Result<FeatureVector, AssessmentError> {
        let profile = self.guard.profile_from_form(form)?;
        let assembly = self.assembler.assemble_profile(&profile)?;
        Ok(assembly.features)
    }

    /// Score one submission end to end.
    pub fn assess(&self, form: &ApplicationForm) -> Result<RiskAssessment, AssessmentError> {
        let profile = self.guard.profile_from_form(form)?;
        let assembly = self.assembler.assemble_profile(&profile)?;

        let raw = self
            .scorer
            .score(&assembly.features)
            .map_err(AssessmentError::from)
            .inspect_err(log_contract_break)?;
        let verdict = report::report(raw)
            .map_err(AssessmentError::from)
            .inspect_err(log_contract_break)?;

        let assessment = RiskAssessment {
            assessment_id: next_assessment_id(),
            assessed_at: Utc::now(),
            profile,
            credit_band: assembly.credit_band,
            ratios: assembly.ratios,
            features: assembly.features,
            verdict,
        };

        info!(
            assessment_id = %assessment.assessment_id.0,
            band = assessment.credit_band.label(),
            label = verdict.label.code(),
            probability = verdict.probability_of_default,
            "loan application scored"
        );

        Ok(assessment)
    }
}

fn log_contract_break(err: &AssessmentError) {
    if let AssessmentError::SchemaMismatch(mismatch) = err {
        error!(%mismatch, "feature schema and scorer disagree");
    }
}
