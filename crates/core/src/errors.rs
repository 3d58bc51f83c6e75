use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// One offending input field and why it was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub reason: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { field: field.into(), reason: reason.into() }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("validation failed: {}", render_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { issues: vec![FieldIssue::new(field, reason)] }
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.issues.iter().map(|issue| issue.field.as_str())
    }
}

fn render_issues(issues: &[FieldIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("column `{column}` is not a finite float32 value")]
    NonFinite { column: &'static str },
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum InferenceError {
    #[error("classifier expects {expected} inputs, received {actual}")]
    InputDimension { expected: usize, actual: usize },
    #[error("classifier layer {layer} produced {actual} values, expected {expected}")]
    LayerShape { layer: usize, expected: usize, actual: usize },
    #[error("classifier produced a non-finite logit ({0})")]
    NonFiniteLogit(f32),
}

/// Everything that can fail while turning one request payload into a prediction.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl PipelineError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Encoding(_) => "encoding",
            Self::Inference(_) => "inference",
        }
    }
}

/// Startup failures while reading the classifier or scaler artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("could not read artifact `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse artifact `{path}`: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("invalid {artifact} artifact: {message}")]
    Invalid { artifact: &'static str, message: String },
}

impl ArtifactError {
    pub fn invalid(artifact: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid { artifact, message: message.into() }
    }
}
