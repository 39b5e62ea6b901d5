use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;

use crate::config::Config;
use crate::storage::VisitStore;

use super::handlers::{get_dashboard, health_check, AppState};

pub fn create_api_router(store: Arc<dyn VisitStore>, config: &Config) -> Router {
    let state = Arc::new(AppState {
        store,
        report: config.report.clone(),
        dashboard_timeout: Duration::from_secs(config.dashboard_timeout_secs),
    });

    Router::new()
        .route("/health", get(health_check))
        .route("/api/dashboard", get(get_dashboard))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
