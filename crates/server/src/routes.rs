use axum::Router;
use churnguard_core::config::CorsConfig;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::bootstrap::Application;
use crate::{health, predict};

pub fn router(app: &Application) -> Router {
    Router::new()
        .merge(predict::router(app.pipeline.clone()))
        .merge(health::router(app.pipeline.clone()))
        .layer(cors_layer(&app.config.cors))
}

/// Any origin, method and header is accepted. Each is echoed back instead of
/// answered with `*`, since browsers refuse a wildcard on credentialed requests.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(config.allow_credentials)
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::routes::router;
    use crate::test_support::{application, reference_payload};

    async fn send(request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
        let response = router(&application()).oneshot(request).await.expect("router responds");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body reads");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, headers, value)
    }

    fn post_predict(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ORIGIN, "https://dashboard.example.com")
            .body(body.into())
            .expect("request builds")
    }

    #[tokio::test]
    async fn predict_round_trip_returns_probability_and_label() {
        let body = serde_json::to_vec(&reference_payload()).expect("payload serializes");
        let (status, headers, value) = send(post_predict(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["prediction"], "Churn");
        let probability = value["churn_probability"].as_f64().expect("probability is a number");
        assert!(probability > 0.5 && probability < 1.0);
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).map(|v| v.as_bytes()),
            Some(&b"https://dashboard.example.com"[..])
        );
    }

    #[tokio::test]
    async fn invalid_payload_is_an_ok_error_body() {
        let mut payload = reference_payload();
        payload["tenure"] = json!("twelve");
        let body = serde_json::to_vec(&payload).expect("payload serializes");

        let (status, _, value) = send(post_predict(body)).await;

        assert_eq!(status, StatusCode::OK);
        let error = value["error"].as_str().expect("error string");
        assert!(error.contains("tenure"));
        assert!(value.get("prediction").is_none());
    }

    #[tokio::test]
    async fn non_object_and_unparseable_bodies_are_ok_error_bodies() {
        for body in ["[1, 2, 3]", "", "{\"gender\":"] {
            let (status, _, value) = send(post_predict(body.to_string())).await;
            assert_eq!(status, StatusCode::OK, "body {body:?}");
            assert!(value["error"].is_string(), "body {body:?}");
        }
    }

    #[tokio::test]
    async fn preflight_echoes_origin_with_credentials() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/predict")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type,x-trace")
            .body(Body::empty())
            .expect("request builds");

        let (status, headers, _) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        let header_value = |name: header::HeaderName| {
            headers.get(name).and_then(|value| value.to_str().ok()).map(str::to_owned)
        };
        assert_eq!(
            header_value(header::ACCESS_CONTROL_ALLOW_ORIGIN).as_deref(),
            Some("http://localhost:3000")
        );
        assert_eq!(header_value(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).as_deref(), Some("true"));
        assert_eq!(header_value(header::ACCESS_CONTROL_ALLOW_METHODS).as_deref(), Some("POST"));
        assert_eq!(
            header_value(header::ACCESS_CONTROL_ALLOW_HEADERS).as_deref(),
            Some("content-type,x-trace")
        );
    }

    #[tokio::test]
    async fn health_route_is_mounted() {
        let request = Request::builder().uri("/health").body(Body::empty()).expect("request builds");
        let (status, _, value) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["status"], "ready");
        assert_eq!(value["classifier_version"], "test-v1");
    }
}
