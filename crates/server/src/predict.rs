use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use churnguard_core::{ChurnPipeline, ChurnPrediction, PipelineError, ValidationError};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct PredictState {
    pipeline: Arc<ChurnPipeline>,
}

/// Body of every `/predict` reply; clients tell the two apart by key.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PredictResponse {
    Prediction(ChurnPrediction),
    Failure { error: String },
}

impl From<Result<ChurnPrediction, PipelineError>> for PredictResponse {
    fn from(outcome: Result<ChurnPrediction, PipelineError>) -> Self {
        match outcome {
            Ok(prediction) => Self::Prediction(prediction),
            Err(error) => Self::Failure { error: error.to_string() },
        }
    }
}

pub fn router(pipeline: Arc<ChurnPipeline>) -> Router {
    Router::new().route("/predict", post(predict)).with_state(PredictState { pipeline })
}

/// Scores one customer. Every outcome, including unreadable bodies, is a 200.
pub async fn predict(
    State(state): State<PredictState>,
    body: Result<Bytes, BytesRejection>,
) -> (StatusCode, Json<PredictResponse>) {
    let correlation_id = Uuid::new_v4();

    let outcome = match body {
        Ok(body) => state.pipeline.predict_body(&body),
        Err(rejection) => {
            Err(PipelineError::from(ValidationError::single("body", rejection.body_text())))
        }
    };

    match &outcome {
        Ok(prediction) => info!(
            event_name = "http.predict.scored",
            correlation_id = %correlation_id,
            churn_probability = prediction.churn_probability,
            prediction = prediction.prediction.as_str(),
            "prediction served"
        ),
        Err(error) => warn!(
            event_name = "http.predict.rejected",
            correlation_id = %correlation_id,
            error_class = error.error_class(),
            error = %error,
            "prediction request rejected"
        ),
    }

    (StatusCode::OK, Json(PredictResponse::from(outcome)))
}
