use std::sync::Arc;

use churnguard_core::config::{AppConfig, ConfigError};
use churnguard_core::{ArtifactError, ChurnPipeline};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub pipeline: Arc<ChurnPipeline>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("model artifacts failed to load: {0}")]
    Artifacts(#[source] ArtifactError),
}

/// Loads config and artifacts in one step. `run()` splits the two so logging
/// is configured before the artifacts are read.
#[cfg(test)]
pub fn bootstrap(
    options: churnguard_core::config::LoadOptions,
) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

/// Loads the classifier and scaler once; the returned pipeline is shared by every request.
pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    let pipeline = ChurnPipeline::load(&config.model, config.features.category_policy)
        .map_err(BootstrapError::Artifacts)?;

    let manifest = pipeline.manifest();
    info!(
        event_name = "system.bootstrap.artifacts_loaded",
        correlation_id = "bootstrap",
        classifier_version = %manifest.classifier_version,
        classifier_path = %config.model.classifier_path.display(),
        classifier_fingerprint = manifest.classifier.fingerprint.short(),
        scaler_path = %config.model.scaler_path.display(),
        scaler_fingerprint = manifest.scaler.fingerprint.short(),
        category_policy = ?pipeline.category_policy(),
        "model artifacts loaded"
    );

    Ok(Application { config, pipeline: Arc::new(pipeline) })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use churnguard_core::config::{ConfigOverrides, LoadOptions};
    use churnguard_core::{ArtifactError, CategoryPolicy, ChurnLabel};
    use tempfile::TempDir;

    use crate::bootstrap::{bootstrap, BootstrapError};
    use crate::test_support::{network, reference_payload, scaler_json};

    fn options(dir: &Path, policy: CategoryPolicy) -> LoadOptions {
        LoadOptions {
            config_path: Some(dir.join("absent.toml")),
            overrides: ConfigOverrides {
                classifier_path: Some(dir.join("classifier.json")),
                scaler_path: Some(dir.join("scaler.json")),
                category_policy: Some(policy),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    fn write_artifacts(dir: &Path) {
        fs::write(
            dir.join("classifier.json"),
            serde_json::to_string(&network()).expect("network serializes"),
        )
        .expect("write classifier");
        fs::write(dir.join("scaler.json"), scaler_json()).expect("write scaler");
    }

    #[test]
    fn bootstrap_fails_fast_when_artifacts_are_missing() {
        let dir = TempDir::new().expect("temp dir");

        let result = bootstrap(options(dir.path(), CategoryPolicy::Lenient));

        let error = result.err().expect("missing artifacts must fail bootstrap");
        assert!(matches!(error, BootstrapError::Artifacts(ArtifactError::ReadFile { .. })));
        assert!(error.to_string().contains("classifier.json"));
    }

    #[test]
    fn bootstrap_rejects_a_malformed_scaler() {
        let dir = TempDir::new().expect("temp dir");
        write_artifacts(dir.path());
        fs::write(dir.path().join("scaler.json"), r#"{"mean":[1.0],"scale":[1.0]}"#)
            .expect("overwrite scaler");

        let result = bootstrap(options(dir.path(), CategoryPolicy::Lenient));
        assert!(matches!(result, Err(BootstrapError::Artifacts(ArtifactError::Invalid { .. }))));
    }

    #[test]
    fn bootstrap_loads_artifacts_and_carries_policy() {
        let dir = TempDir::new().expect("temp dir");
        write_artifacts(dir.path());

        let app = bootstrap(options(dir.path(), CategoryPolicy::Strict))
            .unwrap_or_else(|error| panic!("bootstrap should succeed: {error}"));

        assert_eq!(app.pipeline.category_policy(), CategoryPolicy::Strict);
        assert_eq!(app.pipeline.manifest().classifier_version, "test-v1");
        let prediction = app.pipeline.predict(&reference_payload()).expect("prediction succeeds");
        assert_eq!(prediction.prediction, ChurnLabel::Churn);
    }
}
