use serde::Serialize;
use serde_json::Value;

use crate::artifact::ArtifactSource;
use crate::config::ModelConfig;
use crate::domain::{CategoryPolicy, CustomerRecord};
use crate::errors::{ArtifactError, EncodingError, PipelineError, ValidationError};
use crate::features::{encode, FeatureVector, ScalerParameters, FEATURE_DIM};
use crate::ml::{ChurnClassifier, ChurnPrediction, FeedForwardNetwork};

/// Provenance of the artifacts a pipeline was built from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArtifactManifest {
    pub classifier_version: String,
    pub classifier: ArtifactSource,
    pub scaler: ArtifactSource,
}

/// Raw and scaled views of one encoded record.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EncodedFeatures {
    pub raw: FeatureVector,
    pub scaled: FeatureVector,
}

/// validate -> encode -> scale -> classify, over artifacts loaded once.
///
/// Holds no per-request state; wrap it in an `Arc` and share it.
pub struct ChurnPipeline {
    scaler: ScalerParameters,
    classifier: Box<dyn ChurnClassifier>,
    category_policy: CategoryPolicy,
    manifest: ArtifactManifest,
}

impl ChurnPipeline {
    pub fn new(
        scaler: ScalerParameters,
        classifier: impl ChurnClassifier + 'static,
        category_policy: CategoryPolicy,
        manifest: ArtifactManifest,
    ) -> Result<Self, ArtifactError> {
        if classifier.input_dim() != FEATURE_DIM {
            return Err(ArtifactError::invalid(
                "classifier",
                format!(
                    "classifier expects {} inputs but the encoder produces {FEATURE_DIM}",
                    classifier.input_dim()
                ),
            ));
        }
        scaler.validate()?;

        Ok(Self { scaler, classifier: Box::new(classifier), category_policy, manifest })
    }

    /// Reads both artifacts from the configured paths.
    pub fn load(model: &ModelConfig, category_policy: CategoryPolicy) -> Result<Self, ArtifactError> {
        let (network, classifier_source) = FeedForwardNetwork::load(&model.classifier_path)?;
        let (scaler, scaler_source) = ScalerParameters::load(&model.scaler_path)?;
        let manifest = ArtifactManifest {
            classifier_version: network.version.clone(),
            classifier: classifier_source,
            scaler: scaler_source,
        };

        Self::new(scaler, network, category_policy, manifest)
    }

    pub fn manifest(&self) -> &ArtifactManifest {
        &self.manifest
    }

    pub fn category_policy(&self) -> CategoryPolicy {
        self.category_policy
    }

    pub fn validate(&self, payload: &Value) -> Result<CustomerRecord, ValidationError> {
        CustomerRecord::from_json(payload, self.category_policy)
    }

    pub fn encode(&self, record: &CustomerRecord) -> Result<EncodedFeatures, EncodingError> {
        let raw = encode(record)?;
        let scaled = self.scaler.transform(&raw)?;
        Ok(EncodedFeatures { raw, scaled })
    }

    pub fn predict_record(&self, record: &CustomerRecord) -> Result<ChurnPrediction, PipelineError> {
        let features = self.encode(record)?;
        let logit = self.classifier.logit(features.scaled.as_slice())?;
        Ok(ChurnPrediction::from_logit(logit)?)
    }

    pub fn predict(&self, payload: &Value) -> Result<ChurnPrediction, PipelineError> {
        let record = self.validate(payload)?;
        self.predict_record(&record)
    }

    /// Entry point for raw request bodies; malformed JSON is a validation error.
    pub fn predict_body(&self, body: &[u8]) -> Result<ChurnPrediction, PipelineError> {
        let record = CustomerRecord::from_slice(body, self.category_policy)?;
        self.predict_record(&record)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::{json, Value};
    use tempfile::TempDir;

    use super::{ArtifactManifest, ChurnPipeline};
    use crate::artifact::ArtifactSource;
    use crate::config::ModelConfig;
    use crate::domain::CategoryPolicy;
    use crate::errors::{ArtifactError, PipelineError};
    use crate::features::{ScalerParameters, FEATURE_DIM};
    use crate::ml::{sigmoid, Activation, ChurnLabel, DenseLayer, FeedForwardNetwork};

    fn reference_payload() -> Value {
        json!({
            "gender": "Male",
            "SeniorCitizen": 0,
            "Partner": "Yes",
            "Dependents": "No",
            "tenure": 12.0,
            "PhoneService": "Yes",
            "MultipleLines": "No",
            "InternetService": "Fiber optic",
            "OnlineSecurity": "No",
            "OnlineBackup": "No",
            "DeviceProtection": "No",
            "TechSupport": "No",
            "StreamingTV": "Yes",
            "StreamingMovies": "Yes",
            "Contract": "Month-to-month",
            "PaperlessBilling": "Yes",
            "PaymentMethod": "Electronic check",
            "MonthlyCharges": 85.5,
            "TotalCharges": 1020.0
        })
    }

    fn fiber_month_to_month_network() -> FeedForwardNetwork {
        let mut weights = vec![0.0; FEATURE_DIM];
        weights[4] = -1.0;
        weights[17] = 1.5;
        weights[19] = 1.0;
        FeedForwardNetwork::new(
            "test-v1",
            FEATURE_DIM,
            vec![DenseLayer { weights: vec![weights], bias: vec![-0.5], activation: Activation::Identity }],
        )
        .expect("valid network")
    }

    fn pipeline(policy: CategoryPolicy) -> ChurnPipeline {
        let scaler =
            ScalerParameters::new([32.0, 64.75, 2279.5], [24.5, 30.0, 2266.0]).expect("valid scaler");
        let manifest = ArtifactManifest {
            classifier_version: "test-v1".to_string(),
            classifier: ArtifactSource::in_memory(b"classifier"),
            scaler: ArtifactSource::in_memory(b"scaler"),
        };
        ChurnPipeline::new(scaler, fiber_month_to_month_network(), policy, manifest)
            .expect("pipeline builds")
    }

    #[test]
    fn reference_customer_scores_deterministically() {
        let pipeline = pipeline(CategoryPolicy::Lenient);
        let prediction = pipeline.predict(&reference_payload()).expect("prediction succeeds");

        let scaled_tenure = ((12.0f64 - 32.0) / 24.5) as f32;
        let expected_logit = -scaled_tenure + 1.5 + 1.0 - 0.5;
        assert!((prediction.churn_probability - sigmoid(expected_logit)).abs() < 1e-6);
        assert_eq!(prediction.prediction, ChurnLabel::Churn);

        let again = pipeline.predict(&reference_payload()).expect("prediction succeeds");
        assert_eq!(prediction, again);
    }

    #[test]
    fn encode_exposes_raw_and_scaled_vectors() {
        let pipeline = pipeline(CategoryPolicy::Lenient);
        let record = pipeline.validate(&reference_payload()).expect("valid");
        let features = pipeline.encode(&record).expect("encodes");

        assert_eq!(features.raw.as_slice()[4], 12.0);
        assert_eq!(features.scaled.as_slice()[4], ((12.0f64 - 32.0) / 24.5) as f32);
        assert_eq!(features.raw.as_slice()[17], features.scaled.as_slice()[17]);
    }

    #[test]
    fn probability_and_label_agree() {
        let pipeline = pipeline(CategoryPolicy::Lenient);
        for tenure in [0.0, 6.0, 24.0, 60.0, 72.0, 500.0] {
            let mut payload = reference_payload();
            payload["tenure"] = json!(tenure);
            let prediction = pipeline.predict(&payload).expect("prediction succeeds");

            assert!(prediction.churn_probability > 0.0 && prediction.churn_probability < 1.0);
            assert_eq!(
                prediction.prediction == ChurnLabel::Churn,
                prediction.churn_probability > 0.5,
                "tenure {tenure}"
            );
        }
    }

    #[test]
    fn non_numeric_tenure_is_a_validation_error() {
        let pipeline = pipeline(CategoryPolicy::Lenient);
        let mut payload = reference_payload();
        payload["tenure"] = json!("a long time");

        let error = pipeline.predict(&payload).expect_err("tenure must be numeric");
        assert_eq!(error.error_class(), "validation");
        assert!(error.to_string().contains("tenure"));
    }

    #[test]
    fn overflowing_charges_are_an_encoding_error() {
        let pipeline = pipeline(CategoryPolicy::Lenient);
        let mut payload = reference_payload();
        payload["TotalCharges"] = json!("1e400");

        let error = pipeline.predict(&payload).expect_err("infinite charges rejected");
        assert!(matches!(error, PipelineError::Encoding(_)));
    }

    #[test]
    fn strict_policy_flows_through_the_pipeline() {
        let mut payload = reference_payload();
        payload["Contract"] = json!("Three year");

        let lenient = pipeline(CategoryPolicy::Lenient).predict(&payload);
        assert!(lenient.is_ok(), "lenient pipeline scores unknown contracts");

        let strict = pipeline(CategoryPolicy::Strict).predict(&payload);
        assert!(matches!(strict, Err(PipelineError::Validation(_))));
    }

    #[test]
    fn predict_body_rejects_malformed_json() {
        let error = pipeline(CategoryPolicy::Lenient)
            .predict_body(b"not json")
            .expect_err("malformed body rejected");
        assert_eq!(error.error_class(), "validation");
    }

    #[test]
    fn classifier_width_must_match_encoder() {
        let scaler = ScalerParameters::new([0.0; 3], [1.0; 3]).expect("valid scaler");
        let narrow = FeedForwardNetwork::new(
            "narrow",
            3,
            vec![DenseLayer { weights: vec![vec![1.0; 3]], bias: vec![0.0], activation: Activation::Identity }],
        )
        .expect("valid network");
        let manifest = ArtifactManifest {
            classifier_version: "narrow".to_string(),
            classifier: ArtifactSource::in_memory(b"c"),
            scaler: ArtifactSource::in_memory(b"s"),
        };

        let result = ChurnPipeline::new(scaler, narrow, CategoryPolicy::Lenient, manifest);
        assert!(matches!(result, Err(ArtifactError::Invalid { artifact: "classifier", .. })));
    }

    #[test]
    fn load_reads_both_artifacts_from_disk() {
        let dir = TempDir::new().expect("temp dir");
        let classifier_path = dir.path().join("classifier.json");
        let scaler_path = dir.path().join("scaler.json");
        fs::write(
            &classifier_path,
            serde_json::to_string(&fiber_month_to_month_network()).expect("serializes"),
        )
        .expect("write classifier");
        fs::write(&scaler_path, r#"{"mean":[32.0,64.75,2279.5],"scale":[24.5,30.0,2266.0]}"#)
            .expect("write scaler");

        let loaded = ChurnPipeline::load(
            &ModelConfig { classifier_path: classifier_path.clone(), scaler_path },
            CategoryPolicy::Lenient,
        )
        .expect("pipeline loads");

        assert_eq!(loaded.manifest().classifier_version, "test-v1");
        assert_eq!(loaded.manifest().classifier.path, Some(classifier_path));
        let from_disk = loaded.predict(&reference_payload()).expect("prediction succeeds");
        let in_memory =
            pipeline(CategoryPolicy::Lenient).predict(&reference_payload()).expect("prediction");
        assert_eq!(from_disk, in_memory);
    }

    #[test]
    fn shipped_sample_artifacts_separate_risky_and_loyal_customers() {
        let weights = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../weights");
        let loaded = ChurnPipeline::load(
            &ModelConfig {
                classifier_path: weights.join("churn_classifier.json"),
                scaler_path: weights.join("scaler.json"),
            },
            CategoryPolicy::Strict,
        )
        .expect("sample artifacts load");

        let risky = loaded.predict(&reference_payload()).expect("prediction succeeds");
        assert_eq!(risky.prediction, ChurnLabel::Churn);

        let mut loyal = reference_payload();
        loyal["tenure"] = json!(70);
        loyal["InternetService"] = json!("DSL");
        loyal["Contract"] = json!("Two year");
        loyal["PaymentMethod"] = json!("Mailed check");
        let loyal = loaded.predict(&loyal).expect("prediction succeeds");
        assert_eq!(loyal.prediction, ChurnLabel::NoChurn);
        assert!(loyal.churn_probability < risky.churn_probability);
    }
}
