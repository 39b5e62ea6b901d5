use anyhow::Result;
use async_trait::async_trait;

use crate::reporting::models::{
    BlockedSiteStat, DailyTrend, SiteDailyRow, SiteStat, Summary, UserStat, WeeklySiteTotals,
};
use crate::reporting::predicate::VisitPredicate;

/// Read-only query seam between the aggregation engine and the visit log.
///
/// Every aggregate method takes the composed predicate so all numbers in one
/// dashboard build describe the same population. Implementations embed the
/// predicate verbatim and add only their own grouping, ordering and limits.
/// The engine never writes; `init` exists so the owning collaborator can
/// create its schema on startup.
#[async_trait]
pub trait VisitStore: Send + Sync {
    /// Initialize the backing schema (tables, indexes).
    async fn init(&self) -> Result<()>;

    /// Distinct user ids over the whole log, ascending. Deliberately ignores
    /// the filter: this populates a user selector, not a report.
    async fn list_users(&self) -> Result<Vec<i64>>;

    /// Per-user aggregates within the predicate, ordered by user id.
    async fn user_stats(&self, pred: &VisitPredicate) -> Result<Vec<UserStat>>;

    /// Most-visited sites within the predicate, ordered by visit count.
    async fn top_sites(&self, pred: &VisitPredicate, limit: i64) -> Result<Vec<SiteStat>>;

    /// One row per calendar date with at least one visit, ascending.
    async fn daily_trends(&self, pred: &VisitPredicate) -> Result<Vec<DailyTrend>>;

    /// Blocked-visit leaderboard joined against the reason registry; sites
    /// without a registered reason never appear.
    async fn blocked_sites(
        &self,
        pred: &VisitPredicate,
        limit: i64,
    ) -> Result<Vec<BlockedSiteStat>>;

    /// Whole-population totals; a zero-visit range yields the all-zero row.
    async fn summary(&self, pred: &VisitPredicate) -> Result<Summary>;

    /// Ranked per-site totals feeding the weekly report, ordered
    /// `total_visits desc, unique_users desc, site asc`.
    async fn weekly_site_totals(
        &self,
        pred: &VisitPredicate,
        limit: i64,
    ) -> Result<Vec<WeeklySiteTotals>>;

    /// Batched daily rollup over an already-limited site set, ordered by
    /// site then date. One round-trip regardless of how many sites ranked.
    async fn site_daily_rollup(
        &self,
        pred: &VisitPredicate,
        sites: &[String],
    ) -> Result<Vec<SiteDailyRow>>;
}
