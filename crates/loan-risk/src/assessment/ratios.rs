use serde::{Deserialize, Serialize};

use super::domain::ApplicantProfile;
use super::intake::InvalidInput;

/// Secondary features computed from the raw money and history fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedRatios {
    pub debt_to_income_ratio: f64,
    pub estimated_monthly_payment: f64,
    pub payment_to_income_ratio: f64,
    pub default_history_ratio: f64,
    pub income_per_dependent: f64,
}

impl DerivedRatios {
    pub fn from_profile(profile: &ApplicantProfile) -> Result<Self, InvalidInput> {
        Self::compute(RatioInputs {
            monthly_income: profile.monthly_income,
            loan_amount: profile.loan_amount,
            loan_duration_months: f64::from(profile.loan_duration_months),
            previous_loans: profile.previous_loans,
            previous_defaults: profile.previous_defaults,
            num_dependents: profile.num_dependents,
        })
    }

    /// Income and duration must be positive; history and dependent counts are shifted by one
    /// so their denominators never reach zero.
    pub fn compute(inputs: RatioInputs) -> Result<Self, InvalidInput> {
        let income = guarded("monthly_income", inputs.monthly_income)?;
        let duration = guarded("loan_duration_months", inputs.loan_duration_months)?;
        if !inputs.loan_amount.is_finite() {
            return Err(InvalidInput::NotFinite {
                field: "loan_amount",
                value: inputs.loan_amount,
            });
        }
        if inputs.loan_amount < 0.0 {
            return Err(InvalidInput::OutOfRange {
                field: "loan_amount",
                value: inputs.loan_amount,
                min: 0.0,
                max: f64::MAX,
            });
        }

        let estimated_monthly_payment = finite(
            "loan_duration_months",
            duration,
            inputs.loan_amount / duration,
        )?;

        Ok(Self {
            debt_to_income_ratio: finite("monthly_income", income, inputs.loan_amount / income)?,
            estimated_monthly_payment,
            payment_to_income_ratio: finite(
                "monthly_income",
                income,
                estimated_monthly_payment / income,
            )?,
            default_history_ratio: f64::from(inputs.previous_defaults)
                / (f64::from(inputs.previous_loans) + 1.0),
            income_per_dependent: income / (f64::from(inputs.num_dependents) + 1.0),
        })
    }
}

/// Raw values the ratio calculator reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioInputs {
    pub monthly_income: f64,
    pub loan_amount: f64,
    pub loan_duration_months: f64,
    pub previous_loans: u32,
    pub previous_defaults: u32,
    pub num_dependents: u32,
}

fn guarded(field: &'static str, value: f64) -> Result<f64, InvalidInput> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(InvalidInput::ArithmeticGuard { field, value })
    }
}

/// A positive but tiny denominator can still overflow; blame the denominator's field.
fn finite(field: &'static str, denominator: f64, ratio: f64) -> Result<f64, InvalidInput> {
    if ratio.is_finite() {
        Ok(ratio)
    } else {
        Err(InvalidInput::ArithmeticGuard {
            field,
            value: denominator,
        })
    }
}
