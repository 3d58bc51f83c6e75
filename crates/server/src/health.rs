use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use churnguard_core::{ArtifactSource, CategoryPolicy, ChurnPipeline};
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    pipeline: Arc<ChurnPipeline>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArtifactCheck {
    pub status: &'static str,
    pub detail: String,
    pub fingerprint: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub classifier_version: String,
    pub category_policy: CategoryPolicy,
    pub classifier: ArtifactCheck,
    pub scaler: ArtifactCheck,
    pub checked_at: String,
}

pub fn router(pipeline: Arc<ChurnPipeline>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { pipeline })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let manifest = state.pipeline.manifest();
    let classifier = artifact_check(&manifest.classifier).await;
    let scaler = artifact_check(&manifest.scaler).await;
    let ready = classifier.status == "ready" && scaler.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "churnguard-server runtime initialized".to_string(),
        },
        classifier_version: manifest.classifier_version.clone(),
        category_policy: state.pipeline.category_policy(),
        classifier,
        scaler,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

/// Re-reads the artifact and compares it with what was loaded at startup.
async fn artifact_check(source: &ArtifactSource) -> ArtifactCheck {
    let fingerprint = source.fingerprint.to_string();
    let Some(path) = &source.path else {
        return ArtifactCheck { status: "ready", detail: "loaded from memory".to_string(), fingerprint };
    };

    match tokio::fs::read(path).await {
        Ok(bytes) if source.matches(&bytes) => ArtifactCheck {
            status: "ready",
            detail: format!("{} matches the loaded artifact", path.display()),
            fingerprint,
        },
        Ok(_) => ArtifactCheck {
            status: "degraded",
            detail: format!("{} changed on disk since startup; restart to load it", path.display()),
            fingerprint,
        },
        Err(error) => ArtifactCheck {
            status: "degraded",
            detail: format!("{} is unreadable: {error}", path.display()),
            fingerprint,
        },
    }
}
