use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::domain::{CreditBand, EmploymentType, ResidentialStatus, StateOfResidence};
use super::encoding::DropOneDimension;

pub const STANDARD_SCHEMA_VERSION: &str = "v1";

pub const AGE: &str = "age";
pub const MONTHLY_INCOME: &str = "monthly_income";
pub const LOAN_AMOUNT: &str = "loan_amount";
pub const LOAN_DURATION_MONTHS: &str = "loan_duration_months";
pub const PREVIOUS_LOANS: &str = "previous_loans";
pub const PREVIOUS_DEFAULTS: &str = "previous_defaults";
pub const ACCOUNT_AGE_MONTHS: &str = "account_age_months";
pub const NUM_DEPENDENTS: &str = "num_dependents";
pub const EDUCATION_LEVEL: &str = "education_level";
pub const HAS_BANK_ACCOUNT: &str = "has_bank_account";
pub const CREDIT_SCORE: &str = "credit_score";
pub const DEBT_TO_INCOME_RATIO: &str = "debt_to_income_ratio";
pub const ESTIMATED_MONTHLY_PAYMENT: &str = "estimated_monthly_payment";
pub const PAYMENT_TO_INCOME_RATIO: &str = "payment_to_income_ratio";
pub const DEFAULT_HISTORY_RATIO: &str = "default_history_ratio";
pub const INCOME_PER_DEPENDENT: &str = "income_per_dependent";

/// Column order the v1 scorer was trained against. Indicator groups are alphabetical within
/// each dimension, matching how the training frame was dummy-encoded.
pub const STANDARD_COLUMNS: [&str; 29] = [
    AGE,
    MONTHLY_INCOME,
    LOAN_AMOUNT,
    LOAN_DURATION_MONTHS,
    PREVIOUS_LOANS,
    PREVIOUS_DEFAULTS,
    ACCOUNT_AGE_MONTHS,
    NUM_DEPENDENTS,
    EDUCATION_LEVEL,
    HAS_BANK_ACCOUNT,
    CREDIT_SCORE,
    DEBT_TO_INCOME_RATIO,
    ESTIMATED_MONTHLY_PAYMENT,
    PAYMENT_TO_INCOME_RATIO,
    DEFAULT_HISTORY_RATIO,
    INCOME_PER_DEPENDENT,
    "employment_type_Freelancer",
    "employment_type_Salary_Earner",
    "employment_type_Self_Employed",
    "residential_status_Own_House",
    "residential_status_Renting",
    "state_Enugu",
    "state_Ibadan",
    "state_Kano",
    "state_Lagos",
    "state_Port_Harcourt",
    "credit_score_band_Poor",
    "credit_score_band_Good",
    "credit_score_band_Excellent",
];

/// Contract breaks between the encoder, the schema and the scorer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaMismatch {
    #[error("column `{column}` is not declared by feature schema {version}")]
    UnknownColumn { column: String, version: String },
    #[error("feature schema {expected} has {expected_len} columns but scorer expects {found_len}")]
    ColumnCount {
        expected: String,
        expected_len: usize,
        found_len: usize,
    },
    #[error(
        "feature schema {version} column {position} is `{expected}` but scorer expects `{found}`"
    )]
    ColumnOrder {
        version: String,
        position: usize,
        expected: String,
        found: String,
    },
    #[error("feature vector built for schema {found} but scorer is paired with {expected}")]
    VersionMismatch { expected: String, found: String },
    #[error("feature schema must declare at least one column")]
    EmptySchema,
    #[error("feature schema declares column `{0}` more than once")]
    DuplicateColumn(String),
    #[error("risk scorer returned malformed output: {0}")]
    MalformedOutput(String),
}

#[derive(Debug, Deserialize, Serialize)]
struct SchemaManifest {
    version: String,
    columns: Vec<String>,
}

/// Ordered, versioned list of named feature slots.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    version: Arc<str>,
    columns: Arc<[String]>,
    positions: HashMap<String, usize>,
}

impl FeatureSchema {
    pub fn standard() -> Self {
        let columns: Vec<String> = STANDARD_COLUMNS
            .iter()
            .map(|column| column.to_string())
            .collect();
        let positions = columns
            .iter()
            .enumerate()
            .map(|(position, column)| (column.clone(), position))
            .collect();

        Self {
            version: STANDARD_SCHEMA_VERSION.into(),
            columns: columns.into(),
            positions,
        }
    }

    pub fn new(
        version: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, SchemaMismatch> {
        Self::build(version.into(), columns.into_iter().map(Into::into).collect())
    }

    /// Load a `{ "version": ..., "columns": [...] }` manifest.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        let manifest: SchemaManifest = serde_json::from_reader(reader)?;
        Self::build(manifest.version, manifest.columns).map_err(serde::de::Error::custom)
    }

    fn build(version: String, columns: Vec<String>) -> Result<Self, SchemaMismatch> {
        if columns.is_empty() {
            return Err(SchemaMismatch::EmptySchema);
        }

        let mut positions = HashMap::with_capacity(columns.len());
        for (position, column) in columns.iter().enumerate() {
            if positions.insert(column.clone(), position).is_some() {
                return Err(SchemaMismatch::DuplicateColumn(column.clone()));
            }
        }

        Ok(Self {
            version: version.into(),
            columns: columns.into(),
            positions,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub(crate) fn shared_columns(&self) -> Arc<[String]> {
        Arc::clone(&self.columns)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    /// Position of `column`, or a hard failure naming the schema that lacks it.
    pub fn require(&self, column: &str) -> Result<usize, SchemaMismatch> {
        self.position(column)
            .ok_or_else(|| SchemaMismatch::UnknownColumn {
                column: column.to_string(),
                version: self.version.to_string(),
            })
    }

    /// Verify that a scorer's declared columns are exactly this schema, in order.
    pub fn ensure_matches<S: AsRef<str>>(&self, scorer_columns: &[S]) -> Result<(), SchemaMismatch> {
        if scorer_columns.len() != self.columns.len() {
            return Err(SchemaMismatch::ColumnCount {
                expected: self.version.to_string(),
                expected_len: self.columns.len(),
                found_len: scorer_columns.len(),
            });
        }

        for (position, (expected, found)) in self.columns.iter().zip(scorer_columns).enumerate() {
            if expected != found.as_ref() {
                return Err(SchemaMismatch::ColumnOrder {
                    version: self.version.to_string(),
                    position,
                    expected: expected.clone(),
                    found: found.as_ref().to_string(),
                });
            }
        }

        Ok(())
    }

    /// Every indicator column the encoders can emit, grouped per dimension.
    pub fn encoder_indicator_columns() -> Vec<&'static str> {
        let mut columns = EmploymentType::indicator_columns();
        columns.extend(ResidentialStatus::indicator_columns());
        columns.extend(StateOfResidence::indicator_columns());
        columns.extend(CreditBand::indicator_columns());
        columns
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::standard()
    }
}
