use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use sos_dispatch::dispatch::{dispatch_router, DispatchService, EmergencyStore};
use sos_dispatch::overpass::GeodataSource;
use std::sync::Arc;

pub(crate) fn with_dispatch_routes<S, G>(service: Arc<DispatchService<S, G>>) -> axum::Router
where
    S: EmergencyStore + 'static,
    G: GeodataSource + 'static,
{
    dispatch_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use sos_dispatch::config::OverpassConfig;
    use sos_dispatch::dispatch::MemoryStore;
    use sos_dispatch::overpass::OverpassClient;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn app(ready: bool) -> (axum::Router, Arc<AtomicBool>) {
        let readiness = Arc::new(AtomicBool::new(ready));
        let state = AppState {
            readiness: readiness.clone(),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        let geodata = OverpassClient::new(&OverpassConfig {
            endpoint: "http://127.0.0.1:9/api/interpreter".to_string(),
            ..OverpassConfig::default()
        })
        .expect("client builds");
        let service = Arc::new(DispatchService::new(
            Arc::new(MemoryStore::seeded().expect("seed")),
            Arc::new(geodata),
            10_000,
        ));
        (
            with_dispatch_routes(service).layer(Extension(state)),
            readiness,
        )
    }

    async fn get(router: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn readiness_tracks_listener_flag() {
        let (router, readiness) = app(false);

        let (status, body) = get(router.clone(), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload["status"], json!("initializing"));

        readiness.store(true, Ordering::Release);
        let (status, _) = get(router, "/ready").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn dispatch_routes_are_mounted_alongside_health_checks() {
        let (router, _) = app(true);

        let (status, body) = get(router.clone(), "/api/response-teams/available").await;
        assert_eq!(status, StatusCode::OK);
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload.as_array().map(Vec::len), Some(3));

        let (status, _) = get(router, "/metrics").await;
        assert_eq!(status, StatusCode::OK);
    }
}
