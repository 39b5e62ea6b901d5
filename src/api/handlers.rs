use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::reporting::{
    build_dashboard_with_timeout, DashboardReport, ReportConfig, ReportError, ReportFilter,
};
use crate::storage::VisitStore;

pub struct AppState {
    pub store: Arc<dyn VisitStore>,
    pub report: ReportConfig,
    pub dashboard_timeout: Duration,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

#[derive(Deserialize)]
pub struct DashboardQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub user_id: Option<i64>,
}

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn parse_date(value: &str) -> Result<NaiveDate, (StatusCode, Json<ErrorResponse>)> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| bad_request(format!("invalid date '{value}', expected YYYY-MM-DD")))
}

/// Resolve the request filter: an explicit range needs both ends; with
/// neither, the configured trailing window applies.
fn resolve_filter(
    query: &DashboardQuery,
    report: &ReportConfig,
) -> Result<ReportFilter, (StatusCode, Json<ErrorResponse>)> {
    let filter = match (query.date_from.as_deref(), query.date_to.as_deref()) {
        (Some(from), Some(to)) => {
            ReportFilter::new(parse_date(from)?, parse_date(to)?, query.user_id)
        }
        (None, None) => ReportFilter::trailing_days(report.weekly_window_days, query.user_id),
        _ => return Err(bad_request("date_from and date_to must be given together")),
    };

    filter.map_err(|e| bad_request(e.to_string()))
}

/// Build and return one dashboard for the requested range.
///
/// Filter problems are the only 400s; a degraded report (failed sub-query)
/// still returns 200 with its error banner filled in.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardReport>, (StatusCode, Json<ErrorResponse>)> {
    let filter = resolve_filter(&query, &state.report)?;

    match build_dashboard_with_timeout(
        state.store.as_ref(),
        &filter,
        &state.report,
        state.dashboard_timeout,
    )
    .await
    {
        Ok(report) => Ok(Json(report)),
        Err(ReportError::Cancelled) => Err((
            StatusCode::GATEWAY_TIMEOUT,
            Json(ErrorResponse {
                error: "dashboard build timed out".to_string(),
            }),
        )),
        Err(ReportError::InvalidFilter(e)) => Err(bad_request(e.to_string())),
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}
