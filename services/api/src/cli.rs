use crate::commands::{run_assess, run_batch, run_schema, AssessArgs, BatchArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_risk::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Risk Assessor",
    about = "Score loan applicants for default risk over HTTP or from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a single applicant described by flags
    Assess(AssessArgs),
    /// Score every applicant in a CSV file
    Batch(BatchArgs),
    /// Print the feature schema the scorer is paired with
    Schema,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Scorer artifact to load instead of RISK_MODEL_PATH or the bundled model
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assess(args),
        Command::Batch(args) => run_batch(args),
        Command::Schema => run_schema(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["loan-risk-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn serve_accepts_overrides() {
        let cli = Cli::try_parse_from([
            "loan-risk-api",
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--model",
            "models/custom.json",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
                assert_eq!(args.port, Some(8080));
                assert_eq!(args.model, Some(PathBuf::from("models/custom.json")));
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn assess_flags_default_to_the_intake_form() {
        let cli = Cli::try_parse_from(["loan-risk-api", "assess"]).expect("parses");

        match cli.command {
            Some(Command::Assess(args)) => {
                let form = args.to_form();
                assert_eq!(form.age, 30.0);
                assert_eq!(form.monthly_income, 150_000.0);
                assert_eq!(form.loan_amount, 500_000.0);
                assert_eq!(form.credit_score, 650.0);
                assert_eq!(form.education_level, "Secondary");
                assert_eq!(form.employment_type, "Business_Owner");
                assert_eq!(form.residential_status, "Living_with_Parents");
                assert_eq!(form.state, "Abuja");
                assert_eq!(form.has_bank_account, "Yes");
            }
            other => panic!("expected assess, got {other:?}"),
        }
    }

    #[test]
    fn batch_requires_a_csv_path() {
        assert!(Cli::try_parse_from(["loan-risk-api", "batch"]).is_err());
    }
}
