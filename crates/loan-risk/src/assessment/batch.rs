use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::warn;

use super::domain::ApplicationForm;
use super::service::{AssessmentError, RiskAssessmentService};
use super::RiskAssessmentView;

#[derive(Debug)]
pub enum BatchError {
    Io(std::io::Error),
    Csv(csv::Error),
    /// Contract or scorer failure; every later row would fail the same way.
    Aborted { row: usize, source: AssessmentError },
}

impl std::fmt::Display for BatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchError::Io(err) => write!(f, "failed to read applicant batch: {}", err),
            BatchError::Csv(err) => write!(f, "invalid applicant CSV header: {}", err),
            BatchError::Aborted { row, source } => {
                write!(f, "batch aborted at row {}: {}", row, source)
            }
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BatchError::Io(err) => Some(err),
            BatchError::Csv(err) => Some(err),
            BatchError::Aborted { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for BatchError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for BatchError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Result of one CSV row. Rows are numbered from 1, excluding the header.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRow {
    pub row: usize,
    #[serde(flatten)]
    pub outcome: BatchRowOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchRowOutcome {
    Scored { assessment: RiskAssessmentView },
    Rejected { field: Option<String>, error: String },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub rows: Vec<BatchRow>,
    pub scored: usize,
    pub rejected: usize,
    pub high_risk: usize,
}

impl BatchReport {
    fn push(&mut self, row: BatchRow) {
        match &row.outcome {
            BatchRowOutcome::Scored { assessment } => {
                self.scored += 1;
                if assessment.label == super::RiskLabel::HighRisk {
                    self.high_risk += 1;
                }
            }
            BatchRowOutcome::Rejected { .. } => self.rejected += 1,
        }
        self.rows.push(row);
    }
}

/// Scores applicant forms read from CSV, isolating per-row input failures.
pub struct BatchAssessor<'a> {
    service: &'a RiskAssessmentService,
}

impl<'a> BatchAssessor<'a> {
    pub fn new(service: &'a RiskAssessmentService) -> Self {
        Self { service }
    }

    pub fn assess_path<P: AsRef<Path>>(&self, path: P) -> Result<BatchReport, BatchError> {
        let file = std::fs::File::open(path)?;
        self.assess_reader(file)
    }

    pub fn assess_reader<R: Read>(&self, reader: R) -> Result<BatchReport, BatchError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        csv_reader.headers()?;

        let mut report = BatchReport::default();
        for (index, record) in csv_reader.deserialize::<ApplicationForm>().enumerate() {
            let row = index + 1;
            let form = match record {
                Ok(form) => form,
                Err(err) => {
                    warn!(row, %err, "skipping malformed applicant row");
                    report.push(BatchRow {
                        row,
                        outcome: BatchRowOutcome::Rejected {
                            field: None,
                            error: err.to_string(),
                        },
                    });
                    continue;
                }
            };

            match self.service.assess(&form) {
                Ok(assessment) => report.push(BatchRow {
                    row,
                    outcome: BatchRowOutcome::Scored {
                        assessment: assessment.view(false),
                    },
                }),
                Err(AssessmentError::InvalidInput(invalid)) => {
                    warn!(row, field = invalid.field(), %invalid, "rejecting applicant row");
                    report.push(BatchRow {
                        row,
                        outcome: BatchRowOutcome::Rejected {
                            field: Some(invalid.field().to_string()),
                            error: invalid.to_string(),
                        },
                    });
                }
                Err(source) => return Err(BatchError::Aborted { row, source }),
            }
        }

        Ok(report)
    }
}
