use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::intake::InvalidInput;

/// Identifier wrapper for scored submissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

/// Raw applicant form as entered, before any validation.
///
/// Numbers are kept as entered so intake can report non-finite, fractional or out-of-range
/// values against the field that carried them. Categorical answers stay as the option
/// labels shown on the form (`"Salary_Earner"`, `"Port_Harcourt"`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationForm {
    pub age: f64,
    pub monthly_income: f64,
    pub loan_amount: f64,
    pub loan_duration_months: f64,
    pub num_dependents: f64,
    pub credit_score: f64,
    pub previous_loans: f64,
    pub previous_defaults: f64,
    pub account_age_months: f64,
    pub education_level: String,
    pub employment_type: String,
    pub residential_status: String,
    pub state: String,
    pub has_bank_account: String,
}

/// Validated applicant snapshot. Immutable once produced by the intake guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub age: u32,
    pub monthly_income: f64,
    pub loan_amount: f64,
    pub loan_duration_months: u32,
    pub num_dependents: u32,
    pub credit_score: u32,
    pub previous_loans: u32,
    pub previous_defaults: u32,
    pub account_age_months: u32,
    pub education_level: EducationLevel,
    pub employment_type: EmploymentType,
    pub residential_status: ResidentialStatus,
    pub state: StateOfResidence,
    pub has_bank_account: BankAccountStatus,
}

/// Generates a closed categorical dimension with its form labels and parsing.
macro_rules! categorical {
    (
        $(#[$meta:meta])*
        $name:ident, field = $field:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Form field carrying this dimension.
            pub const FIELD: &'static str = $field;

            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = InvalidInput;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                match raw.trim() {
                    $($label => Ok($name::$variant),)+
                    other => Err(InvalidInput::UnrecognizedCategory {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

categorical! {
    /// Highest completed qualification, ranked.
    EducationLevel, field = "education_level" {
        Secondary => "Secondary",
        Ond => "OND",
        Hnd => "HND",
        Bsc => "BSc",
        Msc => "MSc",
    }
}

categorical! {
    EmploymentType, field = "employment_type" {
        BusinessOwner => "Business_Owner",
        SalaryEarner => "Salary_Earner",
        SelfEmployed => "Self_Employed",
        Freelancer => "Freelancer",
    }
}

categorical! {
    ResidentialStatus, field = "residential_status" {
        LivingWithParents => "Living_with_Parents",
        Renting => "Renting",
        OwnHouse => "Own_House",
    }
}

categorical! {
    /// State the applicant resides in.
    StateOfResidence, field = "state" {
        Abuja => "Abuja",
        Lagos => "Lagos",
        PortHarcourt => "Port_Harcourt",
        Ibadan => "Ibadan",
        Kano => "Kano",
        Enugu => "Enugu",
    }
}

categorical! {
    BankAccountStatus, field = "has_bank_account" {
        Yes => "Yes",
        No => "No",
    }
}

categorical! {
    /// Qualitative bucket derived from the numeric credit score.
    CreditBand, field = "credit_score_band" {
        VeryPoor => "Very_Poor",
        Poor => "Poor",
        Good => "Good",
        Excellent => "Excellent",
    }
}
