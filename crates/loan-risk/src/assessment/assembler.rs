use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::banding::band_for_score;
use super::domain::{ApplicantProfile, CreditBand};
use super::encoding::EncodedCategoricals;
use super::ratios::DerivedRatios;
use super::schema::{self, FeatureSchema, SchemaMismatch};
use super::service::AssessmentError;

/// Schema-ordered numeric features for one profile. Never mutated after assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    schema_version: Arc<str>,
    columns: Arc<[String]>,
    values: Vec<f64>,
}

/// Single named slot, used when a vector is rendered for people.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedFeature {
    pub name: String,
    pub value: f64,
}

impl FeatureVector {
    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values in schema order; this is what a scorer consumes.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|name| name == column)
            .map(|position| self.values[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    pub fn named(&self) -> Vec<NamedFeature> {
        self.iter()
            .map(|(name, value)| NamedFeature {
                name: name.to_string(),
                value,
            })
            .collect()
    }
}

/// Everything derived from one profile on the way to a feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub credit_band: CreditBand,
    pub ratios: DerivedRatios,
    pub features: FeatureVector,
}

/// Writes derived, encoded and raw values into the slots of a fixed schema.
#[derive(Debug, Clone, Default)]
pub struct FeatureAssembler {
    schema: FeatureSchema,
}

impl FeatureAssembler {
    pub fn new(schema: FeatureSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Derive, encode and assemble a validated profile.
    pub fn assemble_profile(&self, profile: &ApplicantProfile) -> Result<Assembly, AssessmentError> {
        let ratios = DerivedRatios::from_profile(profile)?;
        let credit_band = band_for_score(profile.credit_score);
        let encoded = EncodedCategoricals::encode(profile, credit_band);
        let features = self.assemble(profile, &ratios, &encoded)?;

        debug!(
            schema = features.schema_version(),
            band = credit_band.label(),
            values = ?features.values(),
            "assembled feature vector"
        );

        Ok(Assembly {
            credit_band,
            ratios,
            features,
        })
    }

    /// Every slot starts at zero; slots nothing writes to keep representing the dropped
    /// reference categories.
    pub fn assemble(
        &self,
        profile: &ApplicantProfile,
        ratios: &DerivedRatios,
        encoded: &EncodedCategoricals,
    ) -> Result<FeatureVector, SchemaMismatch> {
        let mut values = vec![0.0; self.schema.len()];

        let numeric: [(&str, f64); 16] = [
            (schema::AGE, f64::from(profile.age)),
            (schema::MONTHLY_INCOME, profile.monthly_income),
            (schema::LOAN_AMOUNT, profile.loan_amount),
            (
                schema::LOAN_DURATION_MONTHS,
                f64::from(profile.loan_duration_months),
            ),
            (schema::PREVIOUS_LOANS, f64::from(profile.previous_loans)),
            (schema::PREVIOUS_DEFAULTS, f64::from(profile.previous_defaults)),
            (
                schema::ACCOUNT_AGE_MONTHS,
                f64::from(profile.account_age_months),
            ),
            (schema::NUM_DEPENDENTS, f64::from(profile.num_dependents)),
            (schema::EDUCATION_LEVEL, f64::from(encoded.education_level)),
            (schema::HAS_BANK_ACCOUNT, f64::from(encoded.has_bank_account)),
            (schema::CREDIT_SCORE, f64::from(profile.credit_score)),
            (schema::DEBT_TO_INCOME_RATIO, ratios.debt_to_income_ratio),
            (
                schema::ESTIMATED_MONTHLY_PAYMENT,
                ratios.estimated_monthly_payment,
            ),
            (schema::PAYMENT_TO_INCOME_RATIO, ratios.payment_to_income_ratio),
            (schema::DEFAULT_HISTORY_RATIO, ratios.default_history_ratio),
            (schema::INCOME_PER_DEPENDENT, ratios.income_per_dependent),
        ];

        for (column, value) in numeric {
            values[self.schema.require(column)?] = value;
        }

        for column in encoded.active_columns() {
            values[self.schema.require(column)?] = 1.0;
        }

        Ok(FeatureVector {
            schema_version: self.schema.version().into(),
            columns: self.schema.shared_columns(),
            values,
        })
    }
}
