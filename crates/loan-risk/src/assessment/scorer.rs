use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::assembler::FeatureVector;
use super::schema::{FeatureSchema, SchemaMismatch};

/// Raw classifier output before the decision reporter sees it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawScore {
    pub label: u8,
    pub probability: f64,
}

/// Opaque binary classifier over a schema-ordered feature slice.
pub trait RiskScorer: Send + Sync {
    fn score(&self, features: &[f64]) -> Result<RawScore, ScorerError>;

    /// Columns the scorer was trained against, when the artifact records them.
    fn columns(&self) -> Option<&[String]> {
        None
    }

    fn schema_version(&self) -> Option<&str> {
        None
    }
}

/// Error raised while loading or invoking a scorer.
#[derive(Debug, thiserror::Error)]
pub enum ScorerError {
    #[error("failed to read scorer artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("scorer artifact is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("scorer artifact rejected: {0}")]
    InvalidArtifact(String),
    #[error(transparent)]
    Schema(#[from] SchemaMismatch),
    #[error("risk scorer unavailable: {0}")]
    Unavailable(String),
}

fn default_threshold() -> f64 {
    0.5
}

/// Serialized form of a logistic scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearScorerArtifact {
    pub schema_version: String,
    pub columns: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

/// Logistic model: `p = 1 / (1 + e^-(b + w·x))`, labelled high risk when `p >= threshold`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearScorer {
    schema_version: String,
    columns: Vec<String>,
    intercept: f64,
    coefficients: Vec<f64>,
    threshold: f64,
}

impl LinearScorer {
    pub fn from_artifact(artifact: LinearScorerArtifact) -> Result<Self, ScorerError> {
        let LinearScorerArtifact {
            schema_version,
            columns,
            intercept,
            coefficients,
            threshold,
        } = artifact;

        if columns.is_empty() {
            return Err(ScorerError::InvalidArtifact("no columns declared".to_string()));
        }
        if coefficients.len() != columns.len() {
            return Err(ScorerError::InvalidArtifact(format!(
                "{} coefficients for {} columns",
                coefficients.len(),
                columns.len()
            )));
        }
        if !intercept.is_finite() || coefficients.iter().any(|weight| !weight.is_finite()) {
            return Err(ScorerError::InvalidArtifact(
                "weights must be finite".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ScorerError::InvalidArtifact(format!(
                "threshold {threshold} outside [0, 1]"
            )));
        }

        Ok(Self {
            schema_version,
            columns,
            intercept,
            coefficients,
            threshold,
        })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ScorerError> {
        let artifact: LinearScorerArtifact = serde_json::from_reader(reader)?;
        Self::from_artifact(artifact)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ScorerError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl RiskScorer for LinearScorer {
    fn score(&self, features: &[f64]) -> Result<RawScore, ScorerError> {
        if features.len() != self.coefficients.len() {
            return Err(SchemaMismatch::ColumnCount {
                expected: self.schema_version.clone(),
                expected_len: self.coefficients.len(),
                found_len: features.len(),
            }
            .into());
        }

        let logit = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(weight, value)| weight * value)
                .sum::<f64>();
        let probability = 1.0 / (1.0 + (-logit).exp());

        Ok(RawScore {
            label: u8::from(probability >= self.threshold),
            probability,
        })
    }

    fn columns(&self) -> Option<&[String]> {
        Some(&self.columns)
    }

    fn schema_version(&self) -> Option<&str> {
        Some(&self.schema_version)
    }
}

type ScorerLoader = Box<dyn Fn() -> Result<Arc<dyn RiskScorer>, ScorerError> + Send + Sync>;

/// Process-wide handle to the loaded scorer.
///
/// The loader runs on first use only; concurrent first callers wait on the same
/// initialisation. A failed load leaves the handle empty so a later call can retry.
pub struct ScorerHandle {
    schema: FeatureSchema,
    loader: ScorerLoader,
    scorer: OnceLock<Arc<dyn RiskScorer>>,
    init: Mutex<()>,
}

impl ScorerHandle {
    pub fn new<F>(schema: FeatureSchema, loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn RiskScorer>, ScorerError> + Send + Sync + 'static,
    {
        Self {
            schema,
            loader: Box::new(loader),
            scorer: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// Wrap a scorer that is already loaded, checking its pairing immediately.
    pub fn ready(schema: FeatureSchema, scorer: Arc<dyn RiskScorer>) -> Result<Self, SchemaMismatch> {
        verify_pairing(&schema, scorer.as_ref())?;
        let handle = Self::new(schema, {
            let scorer = Arc::clone(&scorer);
            move || Ok(Arc::clone(&scorer))
        });
        let _ = handle.scorer.set(scorer);
        Ok(handle)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn is_loaded(&self) -> bool {
        self.scorer.get().is_some()
    }

    pub fn get(&self) -> Result<Arc<dyn RiskScorer>, ScorerError> {
        if let Some(scorer) = self.scorer.get() {
            return Ok(Arc::clone(scorer));
        }

        let _guard = self
            .init
            .lock()
            .map_err(|_| ScorerError::Unavailable("initialisation lock poisoned".to_string()))?;
        if let Some(scorer) = self.scorer.get() {
            return Ok(Arc::clone(scorer));
        }

        let scorer = (self.loader)()?;
        verify_pairing(&self.schema, scorer.as_ref())?;
        info!(
            schema = self.schema.version(),
            columns = self.schema.len(),
            "risk scorer loaded"
        );

        let _ = self.scorer.set(Arc::clone(&scorer));
        Ok(scorer)
    }

    /// Score a vector built against this handle's schema.
    pub fn score(&self, vector: &FeatureVector) -> Result<RawScore, ScorerError> {
        if vector.schema_version() != self.schema.version() {
            return Err(SchemaMismatch::VersionMismatch {
                expected: self.schema.version().to_string(),
                found: vector.schema_version().to_string(),
            }
            .into());
        }
        self.schema.ensure_matches(vector.columns())?;

        let scorer = self.get()?;
        scorer.score(vector.values())
    }
}

impl fmt::Debug for ScorerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScorerHandle")
            .field("schema", &self.schema.version())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

fn verify_pairing(schema: &FeatureSchema, scorer: &dyn RiskScorer) -> Result<(), SchemaMismatch> {
    if let Some(version) = scorer.schema_version() {
        if version != schema.version() {
            return Err(SchemaMismatch::VersionMismatch {
                expected: schema.version().to_string(),
                found: version.to_string(),
            });
        }
    }
    if let Some(columns) = scorer.columns() {
        schema.ensure_matches(columns)?;
    }
    Ok(())
}
