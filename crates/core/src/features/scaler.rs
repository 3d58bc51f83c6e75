use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::artifact::{read_json, ArtifactSource};
use crate::errors::{ArtifactError, EncodingError};
use crate::features::{FeatureVector, SCALED_COLUMNS, SCALED_INDICES};

/// Fitted standardization statistics for tenure, MonthlyCharges and
/// TotalCharges, in that order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScalerParameters {
    #[serde(default = "default_columns")]
    pub columns: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

fn default_columns() -> Vec<String> {
    SCALED_COLUMNS.iter().map(ToString::to_string).collect()
}

impl ScalerParameters {
    pub fn new(mean: [f64; 3], scale: [f64; 3]) -> Result<Self, ArtifactError> {
        let parameters =
            Self { columns: default_columns(), mean: mean.to_vec(), scale: scale.to_vec() };
        parameters.validate()?;
        Ok(parameters)
    }

    pub fn load(path: &Path) -> Result<(Self, ArtifactSource), ArtifactError> {
        let (parameters, source): (Self, ArtifactSource) = read_json(path)?;
        parameters.validate()?;
        Ok((parameters, source))
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ArtifactError> {
        let parameters: Self = serde_json::from_str(raw)
            .map_err(|error| ArtifactError::invalid("scaler", error.to_string()))?;
        parameters.validate()?;
        Ok(parameters)
    }

    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.columns.iter().map(String::as_str).ne(SCALED_COLUMNS) {
            return Err(ArtifactError::invalid(
                "scaler",
                format!("columns must be {:?}, found {:?}", SCALED_COLUMNS, self.columns),
            ));
        }
        if self.mean.len() != SCALED_COLUMNS.len() || self.scale.len() != SCALED_COLUMNS.len() {
            return Err(ArtifactError::invalid(
                "scaler",
                format!(
                    "expected {} means and scales, found {} and {}",
                    SCALED_COLUMNS.len(),
                    self.mean.len(),
                    self.scale.len()
                ),
            ));
        }

        for (column, (mean, scale)) in SCALED_COLUMNS.iter().zip(self.mean.iter().zip(&self.scale)) {
            if !mean.is_finite() {
                return Err(ArtifactError::invalid(
                    "scaler",
                    format!("mean for `{column}` must be finite"),
                ));
            }
            if !scale.is_finite() || *scale == 0.0 {
                return Err(ArtifactError::invalid(
                    "scaler",
                    format!("scale for `{column}` must be finite and non-zero"),
                ));
            }
        }

        Ok(())
    }

    /// Standardizes the continuous columns, leaving the other 23 untouched.
    ///
    /// Centering and division each run in f64 and are narrowed to f32
    /// separately, the way an in-place update of a float32 array with float64
    /// statistics rounds. Rounding once at the end drifts by an ulp.
    pub fn transform(&self, features: &FeatureVector) -> Result<FeatureVector, EncodingError> {
        let mut scaled = *features;

        for (slot, &index) in SCALED_INDICES.iter().enumerate() {
            let raw = f64::from(features.as_slice()[index]);
            let centered = (raw - self.mean[slot]) as f32;
            let value = (f64::from(centered) / self.scale[slot]) as f32;
            if !value.is_finite() {
                return Err(EncodingError::NonFinite { column: SCALED_COLUMNS[slot] });
            }
            scaled.set(index, value);
        }

        Ok(scaled)
    }
}
