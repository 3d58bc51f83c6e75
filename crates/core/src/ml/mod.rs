//! Churn Classifier
//!
//! Evaluates a pretrained feed-forward network over the 26-column feature
//! vector and turns its logit into a churn probability. Networks are loaded
//! once from a JSON artifact and never mutated afterwards, so one instance is
//! shared by every request.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::artifact::{read_json, ArtifactSource};
use crate::errors::{ArtifactError, InferenceError};

/// Probabilities strictly above this are labelled `Churn`.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Read-only inference over a feature slice.
pub trait ChurnClassifier: Send + Sync {
    fn version(&self) -> &str;

    fn input_dim(&self) -> usize;

    /// Raw, pre-sigmoid score for one feature row.
    fn logit(&self, features: &[f32]) -> Result<f32, InferenceError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Relu,
    Tanh,
    Identity,
}

impl Activation {
    fn apply(self, value: f32) -> f32 {
        match self {
            Self::Relu => value.max(0.0),
            Self::Tanh => value.tanh(),
            Self::Identity => value,
        }
    }
}

/// Fully connected layer; `weights` is row-major `[out][in]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
    pub activation: Activation,
}

impl DenseLayer {
    fn input_dim(&self) -> usize {
        self.weights.first().map(Vec::len).unwrap_or(0)
    }

    fn output_dim(&self) -> usize {
        self.weights.len()
    }

    fn forward(&self, input: &[f32]) -> Vec<f32> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, bias)| {
                let z: f32 = row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>() + bias;
                self.activation.apply(z)
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedForwardNetwork {
    pub version: String,
    pub input_dim: usize,
    pub layers: Vec<DenseLayer>,
}

impl FeedForwardNetwork {
    pub fn new(
        version: impl Into<String>,
        input_dim: usize,
        layers: Vec<DenseLayer>,
    ) -> Result<Self, ArtifactError> {
        let network = Self { version: version.into(), input_dim, layers };
        network.validate()?;
        Ok(network)
    }

    pub fn load(path: &Path) -> Result<(Self, ArtifactSource), ArtifactError> {
        let (network, source): (Self, ArtifactSource) = read_json(path)?;
        network.validate()?;
        Ok((network, source))
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ArtifactError> {
        let network: Self = serde_json::from_str(raw)
            .map_err(|error| ArtifactError::invalid("classifier", error.to_string()))?;
        network.validate()?;
        Ok(network)
    }

    /// Checks that layers chain from `input_dim` down to a single logit.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.layers.is_empty() {
            return Err(ArtifactError::invalid("classifier", "network has no layers"));
        }

        let mut width = self.input_dim;
        for (index, layer) in self.layers.iter().enumerate() {
            if layer.output_dim() == 0 {
                return Err(ArtifactError::invalid(
                    "classifier",
                    format!("layer {index} has no output units"),
                ));
            }
            if layer.bias.len() != layer.output_dim() {
                return Err(ArtifactError::invalid(
                    "classifier",
                    format!(
                        "layer {index} has {} bias terms for {} units",
                        layer.bias.len(),
                        layer.output_dim()
                    ),
                ));
            }
            if let Some(row) = layer.weights.iter().position(|row| row.len() != width) {
                return Err(ArtifactError::invalid(
                    "classifier",
                    format!(
                        "layer {index} row {row} has {} weights, expected {width}",
                        layer.weights[row].len()
                    ),
                ));
            }
            let finite = layer.weights.iter().flatten().chain(&layer.bias).all(|v| v.is_finite());
            if !finite {
                return Err(ArtifactError::invalid(
                    "classifier",
                    format!("layer {index} contains non-finite parameters"),
                ));
            }
            width = layer.output_dim();
        }

        if width != 1 {
            return Err(ArtifactError::invalid(
                "classifier",
                format!("final layer must produce one logit, produces {width}"),
            ));
        }

        Ok(())
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.input_dim() * layer.output_dim() + layer.bias.len()).sum()
    }
}

impl ChurnClassifier for FeedForwardNetwork {
    fn version(&self) -> &str {
        &self.version
    }

    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn logit(&self, features: &[f32]) -> Result<f32, InferenceError> {
        if features.len() != self.input_dim {
            return Err(InferenceError::InputDimension {
                expected: self.input_dim,
                actual: features.len(),
            });
        }

        let mut activations = features.to_vec();
        for (index, layer) in self.layers.iter().enumerate() {
            activations = layer.forward(&activations);
            if activations.len() != layer.output_dim() {
                return Err(InferenceError::LayerShape {
                    layer: index,
                    expected: layer.output_dim(),
                    actual: activations.len(),
                });
            }
        }

        match activations.as_slice() {
            [logit] if logit.is_finite() => Ok(*logit),
            [logit] => Err(InferenceError::NonFiniteLogit(*logit)),
            other => Err(InferenceError::LayerShape {
                layer: self.layers.len().saturating_sub(1),
                expected: 1,
                actual: other.len(),
            }),
        }
    }
}

/// Logistic squashing: 1 / (1 + e^(-z)), kept inside the open interval (0, 1).
pub fn sigmoid(logit: f32) -> f64 {
    // Clamp to avoid overflow
    let z = f64::from(logit).clamp(-500.0, 500.0);
    let probability = 1.0 / (1.0 + (-z).exp());
    probability.clamp(f64::EPSILON, 1.0 - f64::EPSILON)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChurnLabel {
    #[serde(rename = "Churn")]
    Churn,
    #[serde(rename = "No Churn")]
    NoChurn,
}

impl ChurnLabel {
    pub fn from_probability(probability: f64) -> Self {
        if probability > DECISION_THRESHOLD {
            Self::Churn
        } else {
            Self::NoChurn
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Churn => "Churn",
            Self::NoChurn => "No Churn",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ChurnPrediction {
    pub churn_probability: f64,
    pub prediction: ChurnLabel,
}

impl ChurnPrediction {
    pub fn from_logit(logit: f32) -> Result<Self, InferenceError> {
        if !logit.is_finite() {
            return Err(InferenceError::NonFiniteLogit(logit));
        }
        let churn_probability = sigmoid(logit);
        Ok(Self { churn_probability, prediction: ChurnLabel::from_probability(churn_probability) })
    }
}
