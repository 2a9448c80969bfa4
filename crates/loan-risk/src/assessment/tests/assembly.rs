use super::common::*;
use crate::assessment::domain::{
    ApplicantProfile, BankAccountStatus, CreditBand, EducationLevel, EmploymentType,
    ResidentialStatus, StateOfResidence,
};
use crate::assessment::encoding::DropOneDimension;
use crate::assessment::intake::IntakeGuard;
use crate::assessment::schema::{FeatureSchema, SchemaMismatch, STANDARD_COLUMNS};
use crate::assessment::{AssessmentError, FeatureAssembler};

fn sample_profile() -> ApplicantProfile {
    IntakeGuard::default()
        .profile_from_form(&sample_form())
        .expect("sample form is valid")
}

#[test]
fn sample_profile_assembles_to_the_documented_vector() {
    let assembly = FeatureAssembler::default()
        .assemble_profile(&sample_profile())
        .expect("assembles");
    let vector = &assembly.features;

    assert_eq!(assembly.credit_band, CreditBand::Poor);
    assert_eq!(vector.schema_version(), "v1");
    assert_eq!(vector.columns(), &STANDARD_COLUMNS.map(String::from)[..]);

    assert_eq!(vector.get("age"), Some(30.0));
    assert_eq!(vector.get("monthly_income"), Some(150_000.0));
    assert_eq!(vector.get("loan_amount"), Some(500_000.0));
    assert_eq!(vector.get("loan_duration_months"), Some(12.0));
    assert_eq!(vector.get("account_age_months"), Some(24.0));
    assert_eq!(vector.get("credit_score"), Some(650.0));
    assert_eq!(vector.get("education_level"), Some(4.0));
    assert_eq!(vector.get("has_bank_account"), Some(1.0));

    let dti = vector.get("debt_to_income_ratio").expect("dti");
    assert!((dti - 500_000.0 / 150_000.0).abs() < 1e-12);
    let payment = vector.get("estimated_monthly_payment").expect("payment");
    assert!((payment - 500_000.0 / 12.0).abs() < 1e-9);
    assert_eq!(
        vector.get("payment_to_income_ratio"),
        Some(payment / 150_000.0)
    );
    assert_eq!(vector.get("default_history_ratio"), Some(0.0));
    assert_eq!(vector.get("income_per_dependent"), Some(150_000.0));

    assert_eq!(
        indicator_values(vector, "employment_type_"),
        vec![
            ("employment_type_Freelancer".to_string(), 0.0),
            ("employment_type_Salary_Earner".to_string(), 1.0),
            ("employment_type_Self_Employed".to_string(), 0.0),
        ]
    );
    assert_eq!(vector.get("residential_status_Renting"), Some(1.0));
    assert_eq!(vector.get("residential_status_Own_House"), Some(0.0));
    assert_eq!(vector.get("state_Lagos"), Some(1.0));
    assert_eq!(
        indicator_values(vector, "state_")
            .iter()
            .map(|(_, value)| value)
            .sum::<f64>(),
        1.0
    );
    assert_eq!(vector.get("credit_score_band_Poor"), Some(1.0));
    assert_eq!(vector.get("credit_score_band_Good"), Some(0.0));
    assert_eq!(vector.get("credit_score_band_Excellent"), Some(0.0));
}

#[test]
fn every_categorical_combination_keeps_schema_shape_and_drop_one_counts() {
    let assembler = FeatureAssembler::default();
    let base = sample_profile();
    let scores = [420_u32, 600, 700, 800];

    for &employment in EmploymentType::ALL {
        for &residential in ResidentialStatus::ALL {
            for &state in StateOfResidence::ALL {
                for &score in &scores {
                    let profile = ApplicantProfile {
                        employment_type: employment,
                        residential_status: residential,
                        state,
                        credit_score: score,
                        ..base.clone()
                    };
                    let assembly = assembler.assemble_profile(&profile).expect("assembles");
                    let vector = &assembly.features;

                    assert_eq!(vector.len(), STANDARD_COLUMNS.len());
                    assert!(vector
                        .columns()
                        .iter()
                        .zip(STANDARD_COLUMNS)
                        .all(|(actual, expected)| actual == expected));

                    assert_hot_count(
                        vector,
                        "employment_type_",
                        employment == EmploymentType::REFERENCE,
                    );
                    assert_hot_count(
                        vector,
                        "residential_status_",
                        residential == ResidentialStatus::REFERENCE,
                    );
                    assert_hot_count(vector, "state_", state == StateOfResidence::REFERENCE);
                    assert_hot_count(
                        vector,
                        "credit_score_band_",
                        assembly.credit_band == CreditBand::REFERENCE,
                    );
                }
            }
        }
    }
}

fn assert_hot_count(vector: &crate::assessment::FeatureVector, prefix: &str, reference: bool) {
    let values = indicator_values(vector, prefix);
    let ones = values.iter().filter(|(_, value)| *value == 1.0).count();
    let zeros = values.iter().filter(|(_, value)| *value == 0.0).count();
    let expected_ones = if reference { 0 } else { 1 };
    assert_eq!(ones, expected_ones, "{prefix} indicators: {values:?}");
    assert_eq!(ones + zeros, values.len());
}

#[test]
fn reference_answers_leave_all_indicators_at_zero() {
    let profile = ApplicantProfile {
        employment_type: EmploymentType::BusinessOwner,
        residential_status: ResidentialStatus::LivingWithParents,
        state: StateOfResidence::Abuja,
        credit_score: 480,
        has_bank_account: BankAccountStatus::No,
        education_level: EducationLevel::Secondary,
        ..sample_profile()
    };

    let assembly = FeatureAssembler::default()
        .assemble_profile(&profile)
        .expect("assembles");

    for column in FeatureSchema::encoder_indicator_columns() {
        assert_eq!(assembly.features.get(column), Some(0.0), "{column}");
    }
    assert_eq!(assembly.features.get("has_bank_account"), Some(0.0));
    assert_eq!(assembly.features.get("education_level"), Some(1.0));
}

#[test]
fn stale_schema_without_an_indicator_fails_hard() {
    let stale_columns: Vec<&str> = STANDARD_COLUMNS
        .iter()
        .copied()
        .filter(|column| *column != "state_Lagos")
        .collect();
    let schema = FeatureSchema::new("v0", stale_columns).expect("schema builds");

    let error = FeatureAssembler::new(schema)
        .assemble_profile(&sample_profile())
        .expect_err("Lagos indicator has no slot");

    match error {
        AssessmentError::SchemaMismatch(SchemaMismatch::UnknownColumn { column, version }) => {
            assert_eq!(column, "state_Lagos");
            assert_eq!(version, "v0");
        }
        other => panic!("expected schema mismatch, got {other:?}"),
    }
}

#[test]
fn stale_schema_is_not_consulted_for_reference_answers() {
    let stale_columns: Vec<&str> = STANDARD_COLUMNS
        .iter()
        .copied()
        .filter(|column| *column != "state_Lagos")
        .collect();
    let schema = FeatureSchema::new("v0", stale_columns).expect("schema builds");
    let profile = ApplicantProfile {
        state: StateOfResidence::Abuja,
        ..sample_profile()
    };

    let assembly = FeatureAssembler::new(schema)
        .assemble_profile(&profile)
        .expect("no Lagos slot needed");
    assert_eq!(assembly.features.len(), 28);
}

#[test]
fn output_order_follows_the_schema_not_the_write_order() {
    let mut reversed: Vec<&str> = STANDARD_COLUMNS.to_vec();
    reversed.reverse();
    let schema = FeatureSchema::new("v1-reversed", reversed).expect("schema builds");

    let standard = FeatureAssembler::default()
        .assemble_profile(&sample_profile())
        .expect("assembles");
    let flipped = FeatureAssembler::new(schema)
        .assemble_profile(&sample_profile())
        .expect("assembles");

    let mut expected: Vec<f64> = standard.features.values().to_vec();
    expected.reverse();
    assert_eq!(flipped.features.values(), expected.as_slice());
    assert_eq!(flipped.features.columns()[0], "credit_score_band_Excellent");
}

#[test]
fn named_features_render_in_schema_order() {
    let assembly = FeatureAssembler::default()
        .assemble_profile(&sample_profile())
        .expect("assembles");
    let named = assembly.features.named();

    assert_eq!(named.len(), 29);
    assert_eq!(named[0].name, "age");
    assert_eq!(named[8].name, "education_level");
    assert_eq!(named[8].value, 4.0);
}
