use std::sync::Arc;

use churnguard_core::config::AppConfig;
use churnguard_core::features::FEATURE_DIM;
use churnguard_core::ml::{Activation, DenseLayer, FeedForwardNetwork};
use churnguard_core::{ArtifactManifest, ArtifactSource, CategoryPolicy, ChurnPipeline, ScalerParameters};
use serde_json::{json, Value};

use crate::bootstrap::Application;

pub fn network() -> FeedForwardNetwork {
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

pub fn scaler_json() -> &'static str {
    r#"{"mean":[32.0,64.75,2279.5],"scale":[24.5,30.0,2266.0]}"#
}

pub fn pipeline(policy: CategoryPolicy) -> Arc<ChurnPipeline> {
    let scaler = ScalerParameters::from_json_str(scaler_json()).expect("valid scaler");
    let manifest = ArtifactManifest {
        classifier_version: "test-v1".to_string(),
        classifier: ArtifactSource::in_memory(b"classifier"),
        scaler: ArtifactSource::in_memory(scaler_json().as_bytes()),
    };
    Arc::new(ChurnPipeline::new(scaler, network(), policy, manifest).expect("pipeline builds"))
}

pub fn application() -> Application {
    Application { config: AppConfig::default(), pipeline: pipeline(CategoryPolicy::Lenient) }
}

pub fn reference_payload() -> Value {
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
