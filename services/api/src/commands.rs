use crate::infra::assessment_service;
use clap::Args;
use loan_risk::assessment::{
    ApplicationForm, BatchAssessor, BatchReport, BatchRowOutcome, FeatureSchema,
    RiskAssessmentView,
};
use loan_risk::config::AppConfig;
use loan_risk::error::AppError;
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    #[arg(long, default_value_t = 30.0)]
    pub(crate) age: f64,
    /// Monthly income in naira
    #[arg(long, default_value_t = 150_000.0)]
    pub(crate) monthly_income: f64,
    /// Requested loan amount in naira
    #[arg(long, default_value_t = 500_000.0)]
    pub(crate) loan_amount: f64,
    #[arg(long, default_value_t = 12.0)]
    pub(crate) loan_duration_months: f64,
    #[arg(long, default_value_t = 0.0)]
    pub(crate) num_dependents: f64,
    #[arg(long, default_value_t = 650.0)]
    pub(crate) credit_score: f64,
    #[arg(long, default_value_t = 0.0)]
    pub(crate) previous_loans: f64,
    #[arg(long, default_value_t = 0.0)]
    pub(crate) previous_defaults: f64,
    #[arg(long, default_value_t = 24.0)]
    pub(crate) account_age_months: f64,
    /// Secondary, OND, HND, BSc or MSc
    #[arg(long, default_value = "Secondary")]
    pub(crate) education_level: String,
    /// Business_Owner, Salary_Earner, Self_Employed or Freelancer
    #[arg(long, default_value = "Business_Owner")]
    pub(crate) employment_type: String,
    /// Living_with_Parents, Renting or Own_House
    #[arg(long, default_value = "Living_with_Parents")]
    pub(crate) residential_status: String,
    /// Abuja, Lagos, Port_Harcourt, Ibadan, Kano or Enugu
    #[arg(long, default_value = "Abuja")]
    pub(crate) state: String,
    /// Yes or No
    #[arg(long, default_value = "Yes")]
    pub(crate) has_bank_account: String,
    /// Scorer artifact to use instead of RISK_MODEL_PATH or the bundled model
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Print the assessment as JSON, including the feature vector
    #[arg(long)]
    pub(crate) json: bool,
}

impl AssessArgs {
    pub(crate) fn to_form(&self) -> ApplicationForm {
        ApplicationForm {
            age: self.age,
            monthly_income: self.monthly_income,
            loan_amount: self.loan_amount,
            loan_duration_months: self.loan_duration_months,
            num_dependents: self.num_dependents,
            credit_score: self.credit_score,
            previous_loans: self.previous_loans,
            previous_defaults: self.previous_defaults,
            account_age_months: self.account_age_months,
            education_level: self.education_level.clone(),
            employment_type: self.employment_type.clone(),
            residential_status: self.residential_status.clone(),
            state: self.state.clone(),
            has_bank_account: self.has_bank_account.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV file whose header names the application form fields
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Scorer artifact to use instead of RISK_MODEL_PATH or the bundled model
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Print the full report as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

fn resolve_model(flag: Option<PathBuf>) -> Result<Option<PathBuf>, AppError> {
    match flag {
        Some(path) => Ok(Some(path)),
        None => Ok(AppConfig::load()?.scorer.model_path),
    }
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let form = args.to_form();
    let service = assessment_service(resolve_model(args.model)?);

    let assessment = service.assess(&form)?;
    let view = assessment.view(args.json);

    if args.json {
        let rendered = serde_json::to_string_pretty(&view).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        print!("{}", render_assessment(&view));
    }
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let service = assessment_service(resolve_model(args.model)?);

    let report = BatchAssessor::new(&service).assess_path(&args.csv)?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        print!("{}", render_batch_report(&report));
    }
    Ok(())
}

pub(crate) fn run_schema() -> Result<(), AppError> {
    print!("{}", render_schema(&FeatureSchema::standard()));
    Ok(())
}

pub(crate) fn render_assessment(view: &RiskAssessmentView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Loan risk assessment {}", view.assessment_id.0);
    let _ = writeln!(out, "Result: {}", view.headline);
    let _ = writeln!(out, "{}", view.recommendation);
    let _ = writeln!(out, "Probability of default: {}", view.probability_display);
    let _ = writeln!(out, "Credit band: {}", view.credit_band);
    let _ = writeln!(out, "Key ratios:");
    let _ = writeln!(
        out,
        "  - debt to income {:.2} | payment to income {:.2}",
        view.ratios.debt_to_income_ratio, view.ratios.payment_to_income_ratio
    );
    let _ = writeln!(
        out,
        "  - estimated monthly payment {:.2} | income per dependent {:.2}",
        view.ratios.estimated_monthly_payment, view.ratios.income_per_dependent
    );
    let _ = writeln!(
        out,
        "  - default history {:.2}",
        view.ratios.default_history_ratio
    );
    out
}

pub(crate) fn render_batch_report(report: &BatchReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Batch assessment: {} scored ({} high risk), {} rejected",
        report.scored, report.high_risk, report.rejected
    );
    for row in &report.rows {
        match &row.outcome {
            BatchRowOutcome::Scored { assessment } => {
                let _ = writeln!(
                    out,
                    "  row {:>4}: {} ({})",
                    row.row, assessment.headline, assessment.probability_display
                );
            }
            BatchRowOutcome::Rejected { error, .. } => {
                let _ = writeln!(out, "  row {:>4}: rejected - {}", row.row, error);
            }
        }
    }
    out
}

pub(crate) fn render_schema(schema: &FeatureSchema) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Feature schema {} ({} columns)",
        schema.version(),
        schema.len()
    );
    for (position, column) in schema.columns().iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. {}", position + 1, column);
    }
    out
}
