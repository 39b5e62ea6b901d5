//! Dashboard assembly: one pass over all metric queries with per-step fault
//! isolation.
//!
//! Every sub-step is a read-only, idempotent query, so a failed step is
//! simply "empty" — never retried. The only failure modes that propagate to
//! the caller are invalid input (rejected before any query runs) and
//! cancellation, which discards the whole in-flight build.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::reporting::badges::{self, BadgeThresholds};
use crate::reporting::filter::{FilterError, ReportFilter};
use crate::reporting::models::DashboardReport;
use crate::reporting::predicate::VisitPredicate;
use crate::reporting::weekly;
use crate::storage::VisitStore;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    InvalidFilter(#[from] FilterError),
    #[error("dashboard build cancelled")]
    Cancelled,
}

/// Report policy knobs: limits, the trailing-window default, and the badge
/// threshold tables. Consumed by the engine, owned by configuration.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub top_sites_limit: i64,
    pub blocked_sites_limit: i64,
    pub weekly_limit: i64,
    pub weekly_window_days: u64,
    pub thresholds: BadgeThresholds,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_sites_limit: 5,
            blocked_sites_limit: 10,
            weekly_limit: 10,
            weekly_window_days: 7,
            thresholds: BadgeThresholds::default(),
        }
    }
}

/// Run one metric step, degrading a storage failure to the empty value plus
/// a sanitized error line. Full detail goes to the operator log only.
async fn run_metric<T, F>(label: &str, fut: F) -> (T, Option<String>)
where
    T: Default,
    F: Future<Output = anyhow::Result<T>>,
{
    match fut.await {
        Ok(value) => (value, None),
        Err(e) => {
            warn!(metric = label, error = %e, "metric query failed, section degraded");
            (T::default(), Some(format!("{label} could not be computed")))
        }
    }
}

/// Build one dashboard for `filter`.
///
/// The six metric queries and the weekly enricher run concurrently against
/// the shared store; none of their failures abort the build. The returned
/// report always renders something — empty sections plus an error banner in
/// the worst case.
pub async fn build_dashboard(
    store: &dyn VisitStore,
    filter: &ReportFilter,
    cfg: &ReportConfig,
) -> DashboardReport {
    info!(
        date_from = %filter.date_from(),
        date_to = %filter.date_to(),
        user_id = ?filter.user_id(),
        "building dashboard"
    );

    let pred = VisitPredicate::compose(filter);
    let weekly_filter = filter.with_trailing_window(cfg.weekly_window_days);

    let (users, user_stats, top_sites, daily_trends, blocked_sites, summary, weekly_report) = tokio::join!(
        run_metric("user directory", store.list_users()),
        run_metric("per-user statistics", store.user_stats(&pred)),
        run_metric("top sites", store.top_sites(&pred, cfg.top_sites_limit)),
        run_metric("daily trends", store.daily_trends(&pred)),
        run_metric(
            "blocked sites",
            store.blocked_sites(&pred, cfg.blocked_sites_limit)
        ),
        run_metric("summary totals", store.summary(&pred)),
        run_metric(
            "weekly report",
            weekly::enrich(store, &weekly_filter, cfg.weekly_limit, &cfg.thresholds)
        ),
    );

    // Fixed step order keeps the error list (and the exposed first line)
    // deterministic.
    let (users, users_err) = users;
    let (user_stats, user_stats_err) = user_stats;
    let (top_sites, top_sites_err) = top_sites;
    let (daily_trends, daily_trends_err) = daily_trends;
    let (blocked_sites, blocked_sites_err) = blocked_sites;
    let (summary, summary_err) = summary;
    let (weekly_report, weekly_err) = weekly_report;

    let errors: Vec<String> = [
        users_err,
        user_stats_err,
        top_sites_err,
        daily_trends_err,
        blocked_sites_err,
        summary_err,
        weekly_err,
    ]
    .into_iter()
    .flatten()
    .collect();

    let highest_block_rate = badges::highest_block_rate(&weekly_report);

    DashboardReport {
        range_label: badges::range_label(filter.date_from(), filter.date_to()),
        users,
        user_stats,
        top_sites,
        daily_trends,
        blocked_sites,
        summary,
        weekly_report,
        highest_block_rate,
        error_message: errors.first().cloned(),
        errors,
    }
}

/// [`build_dashboard`] bounded by a deadline. On expiry the in-flight
/// sub-queries are abandoned and no partial report is returned.
pub async fn build_dashboard_with_timeout(
    store: &dyn VisitStore,
    filter: &ReportFilter,
    cfg: &ReportConfig,
    deadline: Duration,
) -> Result<DashboardReport, ReportError> {
    match tokio::time::timeout(deadline, build_dashboard(store, filter, cfg)).await {
        Ok(report) => Ok(report),
        Err(_) => {
            warn!(timeout_secs = deadline.as_secs(), "dashboard build cancelled by deadline");
            Err(ReportError::Cancelled)
        }
    }
}
