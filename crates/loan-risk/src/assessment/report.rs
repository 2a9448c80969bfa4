use serde::{Deserialize, Serialize};
use tracing::warn;

use super::schema::SchemaMismatch;
use super::scorer::RawScore;

/// Verdict label shown to the loan officer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLabel {
    LowRisk,
    HighRisk,
}

impl RiskLabel {
    /// Scorer labels are taken verbatim: 1 is high risk, 0 is low risk.
    pub fn from_scorer_label(label: u8) -> Result<Self, SchemaMismatch> {
        match label {
            0 => Ok(RiskLabel::LowRisk),
            1 => Ok(RiskLabel::HighRisk),
            other => Err(SchemaMismatch::MalformedOutput(format!(
                "label {other} is not a binary class"
            ))),
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            RiskLabel::LowRisk => "LOW_RISK",
            RiskLabel::HighRisk => "HIGH_RISK",
        }
    }

    pub const fn headline(self) -> &'static str {
        match self {
            RiskLabel::LowRisk => "LOW RISK",
            RiskLabel::HighRisk => "HIGH RISK",
        }
    }

    pub const fn recommendation(self) -> &'static str {
        match self {
            RiskLabel::LowRisk => "Approval recommended",
            RiskLabel::HighRisk => "Rejection recommended",
        }
    }
}

/// Label plus the bounded probability of default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskVerdict {
    pub label: RiskLabel,
    pub probability_of_default: f64,
}

impl RiskVerdict {
    /// Two-decimal percentage, e.g. `"35.21%"`.
    pub fn probability_percent(&self) -> String {
        format!("{:.2}%", self.probability_of_default * 100.0)
    }
}

/// Bound a scorer probability into [0, 1]. NaN cannot be bounded and is a contract break.
pub fn clamp_probability(probability: f64) -> Result<f64, SchemaMismatch> {
    if probability.is_nan() {
        return Err(SchemaMismatch::MalformedOutput(
            "probability is NaN".to_string(),
        ));
    }

    let clamped = probability.clamp(0.0, 1.0);
    if clamped != probability {
        warn!(
            raw = probability,
            clamped, "scorer probability drifted outside [0, 1]"
        );
    }
    Ok(clamped)
}

/// Turn raw scorer output into a verdict. The label is never re-derived from the probability.
pub fn report(raw: RawScore) -> Result<RiskVerdict, SchemaMismatch> {
    Ok(RiskVerdict {
        label: RiskLabel::from_scorer_label(raw.label)?,
        probability_of_default: clamp_probability(raw.probability)?,
    })
}
