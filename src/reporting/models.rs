//! Result projections for the dashboard engine.
//!
//! Everything here is a read-only projection recomputed on every request;
//! nothing is persisted. Row-shaped types derive `sqlx::FromRow` so the
//! store can decode them straight out of its aggregate statements; derived
//! fields (rates, badges, ranks) are filled in by the reporting layer.

use serde::Serialize;

use crate::reporting::badges::{Activity, Engagement, Risk};

/// Per-user aggregate over the filtered range.
///
/// Invariant: `blocked + allowed == total`; `block_rate` is zero-guarded
/// and rounded to two decimals.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserStat {
    pub user_id: i64,
    pub total: i64,
    pub blocked: i64,
    pub allowed: i64,
    #[sqlx(default)]
    pub block_rate: f64,
    pub first_seen: i64,
    pub last_seen: i64,
    pub unique_sites: i64,
}

/// Per-site visit counts for the top-sites ranking.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SiteStat {
    pub site: String,
    pub visits: i64,
    pub blocked: i64,
    pub allowed: i64,
}

/// Blocked-site leaderboard row. Only sites present in the reason registry
/// appear here (inner-join semantics).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BlockedSiteStat {
    pub site: String,
    pub block_count: i64,
    pub affected_users: i64,
    pub reason: String,
}

/// One calendar date with at least one visit in range. Dates without visits
/// are absent (sparse series); consumers needing a dense series fill gaps
/// themselves.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DailyTrend {
    #[sqlx(rename = "day")]
    pub date: String,
    pub total: i64,
    pub blocked: i64,
    pub allowed: i64,
}

/// Whole-population totals for the filtered range. A zero-visit range yields
/// the all-zero row, never an absent one.
#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct Summary {
    pub total: i64,
    pub blocked: i64,
    pub allowed: i64,
    pub active_users: i64,
    pub unique_sites: i64,
    #[sqlx(default)]
    pub overall_block_rate: f64,
}

/// Raw ranked site totals for the weekly report, before enrichment.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WeeklySiteTotals {
    pub site: String,
    pub total_visits: i64,
    pub unique_users: i64,
    pub blocked: i64,
    pub allowed: i64,
    pub days_active: i64,
    pub first_visit: i64,
    pub last_visit: i64,
}

/// One `(site, date)` cell of the batched daily rollup.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SiteDailyRow {
    pub site: String,
    pub day: String,
    pub visits: i64,
    pub blocked: i64,
}

/// One date of a site's daily breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct DailySlice {
    pub date: String,
    pub visits: i64,
    pub blocked: i64,
}

/// The single busiest date of a site's range history. Ties keep the
/// earliest date.
#[derive(Debug, Clone, Serialize)]
pub struct PeakDay {
    pub date: String,
    pub visits: i64,
    pub day_name: String,
}

/// Fully enriched weekly top-sites entry.
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyReportEntry {
    /// Dense 1-based rank assigned from the result ordering.
    pub rank: i64,
    pub site: String,
    pub total_visits: i64,
    pub unique_users: i64,
    pub blocked: i64,
    pub allowed: i64,
    pub block_rate: f64,
    pub days_active: i64,
    pub first_visit: i64,
    pub last_visit: i64,
    pub daily_breakdown: Vec<DailySlice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_day: Option<PeakDay>,
    pub engagement: Engagement,
    pub risk: Risk,
    pub activity: Activity,
}

/// Weekly entry singled out for the "highest block rate" banner.
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyHighlight {
    pub site: String,
    pub block_rate: f64,
}

/// The assembled dashboard, owned by the orchestrator for the duration of
/// one request. Failed sub-steps leave their section empty/zeroed and add a
/// line to `errors`; `error_message` carries the first line for display.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub range_label: String,
    pub users: Vec<i64>,
    pub user_stats: Vec<UserStat>,
    pub top_sites: Vec<SiteStat>,
    pub daily_trends: Vec<DailyTrend>,
    pub blocked_sites: Vec<BlockedSiteStat>,
    pub summary: Summary,
    pub weekly_report: Vec<WeeklyReportEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_block_rate: Option<WeeklyHighlight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}
