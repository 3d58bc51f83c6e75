pub mod artifact;
pub mod config;
pub mod domain;
pub mod errors;
pub mod features;
pub mod ml;
pub mod pipeline;

pub use artifact::{ArtifactSource, Fingerprint};
pub use domain::{CategoryPolicy, CustomerRecord};
pub use errors::{ArtifactError, EncodingError, InferenceError, PipelineError, ValidationError};
pub use features::{FeatureVector, ScalerParameters, FEATURE_COLUMNS, FEATURE_DIM};
pub use ml::{ChurnClassifier, ChurnLabel, ChurnPrediction, FeedForwardNetwork};
pub use pipeline::{ArtifactManifest, ChurnPipeline, EncodedFeatures};
