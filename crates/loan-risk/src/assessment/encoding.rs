//! Ordinal and drop-one one-hot encoders for the categorical form answers.
//!
//! Every one-hot dimension names its reference value explicitly: it maps to
//! [`Indicator::Reference`] and therefore owns no schema slot. All other values map to the
//! exact schema column they switch on.

use super::domain::{
    ApplicantProfile, BankAccountStatus, CreditBand, EducationLevel, EmploymentType,
    ResidentialStatus, StateOfResidence,
};

/// Drop-one mapping of a single categorical value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// The dimension's dropped value; all of its slots stay at zero.
    Reference,
    /// Schema column set to one.
    Slot(&'static str),
}

/// A categorical dimension encoded with one implicit reference category.
pub trait DropOneDimension: Copy + Eq + 'static {
    /// Column prefix shared by every indicator of the dimension.
    const PREFIX: &'static str;
    const REFERENCE: Self;

    fn variants() -> &'static [Self];

    fn indicator(self) -> Indicator;

    /// Schema columns owned by this dimension, in declaration order.
    fn indicator_columns() -> Vec<&'static str> {
        Self::variants()
            .iter()
            .filter_map(|value| match value.indicator() {
                Indicator::Slot(column) => Some(column),
                Indicator::Reference => None,
            })
            .collect()
    }
}

impl DropOneDimension for EmploymentType {
    const PREFIX: &'static str = "employment_type";
    const REFERENCE: Self = EmploymentType::BusinessOwner;

    fn variants() -> &'static [Self] {
        EmploymentType::ALL
    }

    fn indicator(self) -> Indicator {
        match self {
            EmploymentType::BusinessOwner => Indicator::Reference,
            EmploymentType::SalaryEarner => Indicator::Slot("employment_type_Salary_Earner"),
            EmploymentType::SelfEmployed => Indicator::Slot("employment_type_Self_Employed"),
            EmploymentType::Freelancer => Indicator::Slot("employment_type_Freelancer"),
        }
    }
}

impl DropOneDimension for ResidentialStatus {
    const PREFIX: &'static str = "residential_status";
    const REFERENCE: Self = ResidentialStatus::LivingWithParents;

    fn variants() -> &'static [Self] {
        ResidentialStatus::ALL
    }

    fn indicator(self) -> Indicator {
        match self {
            ResidentialStatus::LivingWithParents => Indicator::Reference,
            ResidentialStatus::Renting => Indicator::Slot("residential_status_Renting"),
            ResidentialStatus::OwnHouse => Indicator::Slot("residential_status_Own_House"),
        }
    }
}

impl DropOneDimension for StateOfResidence {
    const PREFIX: &'static str = "state";
    const REFERENCE: Self = StateOfResidence::Abuja;

    fn variants() -> &'static [Self] {
        StateOfResidence::ALL
    }

    fn indicator(self) -> Indicator {
        match self {
            StateOfResidence::Abuja => Indicator::Reference,
            StateOfResidence::Lagos => Indicator::Slot("state_Lagos"),
            StateOfResidence::PortHarcourt => Indicator::Slot("state_Port_Harcourt"),
            StateOfResidence::Ibadan => Indicator::Slot("state_Ibadan"),
            StateOfResidence::Kano => Indicator::Slot("state_Kano"),
            StateOfResidence::Enugu => Indicator::Slot("state_Enugu"),
        }
    }
}

impl DropOneDimension for CreditBand {
    const PREFIX: &'static str = "credit_score_band";
    const REFERENCE: Self = CreditBand::VeryPoor;

    fn variants() -> &'static [Self] {
        CreditBand::ALL
    }

    fn indicator(self) -> Indicator {
        match self {
            CreditBand::VeryPoor => Indicator::Reference,
            CreditBand::Poor => Indicator::Slot("credit_score_band_Poor"),
            CreditBand::Good => Indicator::Slot("credit_score_band_Good"),
            CreditBand::Excellent => Indicator::Slot("credit_score_band_Excellent"),
        }
    }
}

impl EducationLevel {
    /// Rank used as the ordinal feature value.
    pub const fn ordinal(self) -> u8 {
        match self {
            EducationLevel::Secondary => 1,
            EducationLevel::Ond => 2,
            EducationLevel::Hnd => 3,
            EducationLevel::Bsc => 4,
            EducationLevel::Msc => 5,
        }
    }
}

impl BankAccountStatus {
    pub const fn indicator_value(self) -> u8 {
        match self {
            BankAccountStatus::Yes => 1,
            BankAccountStatus::No => 0,
        }
    }
}

/// Categorical answers of one profile, encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedCategoricals {
    pub education_level: u8,
    pub has_bank_account: u8,
    /// One entry per one-hot dimension, in a fixed dimension order.
    pub indicators: [(&'static str, Indicator); 4],
}

impl EncodedCategoricals {
    pub fn encode(profile: &ApplicantProfile, band: CreditBand) -> Self {
        Self {
            education_level: profile.education_level.ordinal(),
            has_bank_account: profile.has_bank_account.indicator_value(),
            indicators: [
                (EmploymentType::PREFIX, profile.employment_type.indicator()),
                (ResidentialStatus::PREFIX, profile.residential_status.indicator()),
                (StateOfResidence::PREFIX, profile.state.indicator()),
                (CreditBand::PREFIX, band.indicator()),
            ],
        }
    }

    /// Columns switched on by this profile. Reference answers contribute nothing.
    pub fn active_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.indicators
            .iter()
            .filter_map(|(_, indicator)| match indicator {
                Indicator::Slot(column) => Some(*column),
                Indicator::Reference => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_dimension<D: DropOneDimension + std::fmt::Debug>() {
        let columns = D::indicator_columns();
        assert_eq!(columns.len(), D::variants().len() - 1);
        assert_eq!(D::REFERENCE.indicator(), Indicator::Reference);

        for value in D::variants() {
            match value.indicator() {
                Indicator::Reference => assert_eq!(*value, D::REFERENCE),
                Indicator::Slot(column) => {
                    assert!(column.starts_with(D::PREFIX), "{column} under {}", D::PREFIX);
                    assert_eq!(columns.iter().filter(|c| **c == column).count(), 1);
                }
            }
        }
    }

    #[test]
    fn every_dimension_drops_exactly_its_reference() {
        assert_dimension::<EmploymentType>();
        assert_dimension::<ResidentialStatus>();
        assert_dimension::<StateOfResidence>();
        assert_dimension::<CreditBand>();
    }

    #[test]
    fn slot_names_are_prefix_plus_form_label() {
        for value in StateOfResidence::ALL {
            if let Indicator::Slot(column) = value.indicator() {
                assert_eq!(column, format!("state_{}", value.label()));
            }
        }
        for value in EmploymentType::ALL {
            if let Indicator::Slot(column) = value.indicator() {
                assert_eq!(column, format!("employment_type_{}", value.label()));
            }
        }
    }

    #[test]
    fn education_ranks_follow_qualification_order() {
        let ranks: Vec<u8> = EducationLevel::ALL.iter().map(|level| level.ordinal()).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn bank_account_is_a_binary_flag() {
        assert_eq!(BankAccountStatus::Yes.indicator_value(), 1);
        assert_eq!(BankAccountStatus::No.indicator_value(), 0);
    }
}
