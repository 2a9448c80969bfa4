//! Loan applicant risk assessment.
//!
//! A submitted form flows through intake validation, ratio derivation, categorical
//! encoding and credit banding into a schema-ordered feature vector. The vector is scored
//! by a shared [`RiskScorer`] and the raw output is reported as a [`RiskVerdict`].

pub mod assembler;
pub mod banding;
pub mod batch;
pub mod domain;
pub mod encoding;
pub mod intake;
pub mod ratios;
pub mod report;
pub mod router;
pub mod schema;
pub mod scorer;
pub mod service;

#[cfg(test)]
mod tests;

pub use assembler::{Assembly, FeatureAssembler, FeatureVector, NamedFeature};
pub use banding::band_for_score;
pub use batch::{BatchAssessor, BatchError, BatchReport, BatchRow, BatchRowOutcome};
pub use domain::{
    ApplicantProfile, ApplicationForm, AssessmentId, BankAccountStatus, CreditBand,
    EducationLevel, EmploymentType, ResidentialStatus, StateOfResidence,
};
pub use encoding::{DropOneDimension, EncodedCategoricals, Indicator};
pub use intake::{FieldRange, IntakeGuard, IntakeLimits, InvalidInput};
pub use ratios::{DerivedRatios, RatioInputs};
pub use report::{clamp_probability, RiskLabel, RiskVerdict};
pub use router::assessment_router;
pub use schema::{FeatureSchema, SchemaMismatch, STANDARD_COLUMNS, STANDARD_SCHEMA_VERSION};
pub use scorer::{
    LinearScorer, LinearScorerArtifact, RawScore, RiskScorer, ScorerError, ScorerHandle,
};
pub use service::{AssessmentError, RiskAssessment, RiskAssessmentService, RiskAssessmentView};
