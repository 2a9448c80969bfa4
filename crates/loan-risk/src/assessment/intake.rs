use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicantProfile, ApplicationForm, BankAccountStatus, EducationLevel, EmploymentType,
    ResidentialStatus, StateOfResidence,
};

/// Validation errors raised before any feature derivation happens.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidInput {
    #[error("field `{field}` must be a finite number (found {value})")]
    NotFinite { field: &'static str, value: f64 },
    #[error("field `{field}` must be a whole number (found {value})")]
    NotWholeNumber { field: &'static str, value: f64 },
    #[error("field `{field}` is outside the accepted range {min}..={max} (found {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("field `{field}` has unrecognized value `{value}`")]
    UnrecognizedCategory { field: &'static str, value: String },
    #[error("`{field}` is used as a denominator and must be positive (found {value})")]
    ArithmeticGuard { field: &'static str, value: f64 },
}

impl InvalidInput {
    /// Name of the form field that caused the rejection.
    pub fn field(&self) -> &'static str {
        match self {
            InvalidInput::NotFinite { field, .. }
            | InvalidInput::NotWholeNumber { field, .. }
            | InvalidInput::OutOfRange { field, .. }
            | InvalidInput::UnrecognizedCategory { field, .. }
            | InvalidInput::ArithmeticGuard { field, .. } => field,
        }
    }
}

/// Inclusive bounds for one numeric form field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub const fn at_least(min: f64) -> Self {
        Self { min, max: f64::MAX }
    }

    fn check(&self, field: &'static str, value: f64) -> Result<(), InvalidInput> {
        if value < self.min || value > self.max {
            return Err(InvalidInput::OutOfRange {
                field,
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Accepted ranges for the numeric form fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeLimits {
    pub age: FieldRange,
    pub monthly_income: FieldRange,
    pub loan_amount: FieldRange,
    pub loan_duration_months: FieldRange,
    pub num_dependents: FieldRange,
    pub credit_score: FieldRange,
    pub previous_loans: FieldRange,
    pub previous_defaults: FieldRange,
    pub account_age_months: FieldRange,
}

impl Default for IntakeLimits {
    fn default() -> Self {
        Self {
            age: FieldRange::new(18.0, 100.0),
            monthly_income: FieldRange::at_least(1000.0),
            loan_amount: FieldRange::at_least(1000.0),
            loan_duration_months: FieldRange::new(1.0, 120.0),
            num_dependents: FieldRange::new(0.0, 20.0),
            credit_score: FieldRange::new(300.0, 850.0),
            previous_loans: FieldRange::new(0.0, 50.0),
            previous_defaults: FieldRange::new(0.0, 50.0),
            account_age_months: FieldRange::new(0.0, 600.0),
        }
    }
}

/// Guard responsible for producing `ApplicantProfile` instances.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard {
    limits: IntakeLimits,
}

impl IntakeGuard {
    pub fn with_limits(limits: IntakeLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &IntakeLimits {
        &self.limits
    }

    /// Convert a raw form into a validated profile, rejecting the first offending field.
    pub fn profile_from_form(&self, form: &ApplicationForm) -> Result<ApplicantProfile, InvalidInput> {
        let limits = &self.limits;

        let monthly_income = amount("monthly_income", form.monthly_income, limits.monthly_income)?;
        let loan_amount = amount("loan_amount", form.loan_amount, limits.loan_amount)?;
        let loan_duration_months = count(
            "loan_duration_months",
            form.loan_duration_months,
            limits.loan_duration_months,
        )?;
        if loan_duration_months == 0 {
            return Err(InvalidInput::ArithmeticGuard {
                field: "loan_duration_months",
                value: 0.0,
            });
        }

        Ok(ApplicantProfile {
            age: count("age", form.age, limits.age)?,
            monthly_income,
            loan_amount,
            loan_duration_months,
            num_dependents: count("num_dependents", form.num_dependents, limits.num_dependents)?,
            credit_score: count("credit_score", form.credit_score, limits.credit_score)?,
            previous_loans: count("previous_loans", form.previous_loans, limits.previous_loans)?,
            previous_defaults: count(
                "previous_defaults",
                form.previous_defaults,
                limits.previous_defaults,
            )?,
            account_age_months: count(
                "account_age_months",
                form.account_age_months,
                limits.account_age_months,
            )?,
            education_level: form.education_level.parse::<EducationLevel>()?,
            employment_type: form.employment_type.parse::<EmploymentType>()?,
            residential_status: form.residential_status.parse::<ResidentialStatus>()?,
            state: form.state.parse::<StateOfResidence>()?,
            has_bank_account: form.has_bank_account.parse::<BankAccountStatus>()?,
        })
    }
}

fn finite(field: &'static str, value: f64) -> Result<f64, InvalidInput> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InvalidInput::NotFinite { field, value })
    }
}

/// Money fields: strictly positive whatever the configured floor says.
fn amount(field: &'static str, value: f64, range: FieldRange) -> Result<f64, InvalidInput> {
    let value = finite(field, value)?;
    if value <= 0.0 {
        return Err(InvalidInput::ArithmeticGuard { field, value });
    }
    range.check(field, value)?;
    Ok(value)
}

fn count(field: &'static str, value: f64, range: FieldRange) -> Result<u32, InvalidInput> {
    let value = finite(field, value)?;
    if value.fract() != 0.0 {
        return Err(InvalidInput::NotWholeNumber { field, value });
    }
    if value < 0.0 {
        return Err(InvalidInput::OutOfRange {
            field,
            value,
            min: range.min.max(0.0),
            max: range.max,
        });
    }
    range.check(field, value)?;
    if value > u32::MAX as f64 {
        return Err(InvalidInput::OutOfRange {
            field,
            value,
            min: range.min.max(0.0),
            max: u32::MAX as f64,
        });
    }
    Ok(value as u32)
}
