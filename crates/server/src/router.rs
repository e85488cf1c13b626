//! HTTP router construction.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(api::status_board))
        .route("/health", get(api::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use silencer_maintenance::testing::{MockGateway, VirtualClock};
    use silencer_maintenance::{
        InMemoryActiveStore, MaintenanceConfig, MaintenanceOrchestrator, StatusBoard,
    };
    use tower::ServiceExt;

    use crate::api::health::HealthResponse;

    const YAML: &str = r#"
maintenances:
  - matchers: [alertname=test1]
    schedule: "* * * * *"
    duration: 50s
  - matchers: ["alertname=test2", "severity!=critical"]
    schedule: "0 3 * * *"
    duration: 30m
"#;

    fn app_with(yaml: &str) -> (Router, Arc<MaintenanceOrchestrator>) {
        let config = MaintenanceConfig::from_yaml_str(yaml).unwrap();
        let clock = VirtualClock::starting_at("2024-01-01T00:00:20Z".parse().unwrap());
        let orchestrator = Arc::new(MaintenanceOrchestrator::new(
            "maintenance service",
            config.maintenances,
            Arc::new(InMemoryActiveStore::new()),
            Arc::new(MockGateway::new()),
            Arc::new(clock),
        ));
        let board = StatusBoard::new(orchestrator.clone(), config.index);
        let state = Arc::new(AppState {
            orchestrator: orchestrator.clone(),
            board,
        });
        (build_router(state), orchestrator)
    }

    async fn get_path(app: Router, path: &str) -> (StatusCode, Option<String>, String) {
        let response = app
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn status_board_lists_every_maintenance() {
        let (app, _) = app_with(YAML);
        let (status, content_type, body) = get_path(app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("text/yaml"));
        assert_eq!(body.matches("isActive: false").count(), 2, "{body}");
        assert!(body.contains("alertname=test1"), "{body}");
        assert!(body.contains("severity!=critical"), "{body}");
        assert!(body.contains("2024-01-01T00:01:00Z"), "{body}");
        assert!(body.contains("---\n"), "{body}");
    }

    #[tokio::test(start_paused = true)]
    async fn status_board_shows_active_after_start() {
        let (app, orchestrator) = app_with(YAML);
        orchestrator.start().await.unwrap();

        let (_, _, body) = get_path(app, "/").await;
        let first = body.split("---\n").next().unwrap();
        assert!(first.contains("isActive: true"), "{body}");

        orchestrator.stop(Duration::from_secs(1)).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn empty_config_renders_empty_body() {
        let (app, _) = app_with("");
        let (status, _, body) = get_path(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn health_reports_counts() {
        let (app, orchestrator) = app_with(YAML);
        orchestrator.start().await.unwrap();

        let (status, _, body) = get_path(app, "/health").await;
        assert_eq!(status, StatusCode::OK);

        let health: HealthResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(health.maintenances, 2);
        assert_eq!(health.active, 1);
        assert_eq!(health.pending_expiries, 1);
        assert!(body.contains("pendingExpiries"), "{body}");
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_path_is_not_found() {
        let (app, _) = app_with(YAML);
        let (status, _, _) = get_path(app, "/silences").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
