//! Analytics aggregation engine.
//!
//! Turns a validated [`ReportFilter`] into one consistent [`DashboardReport`]:
//! per-user summaries, top-site rankings, daily trends, the blocked-site
//! leaderboard, whole-range totals, and the enriched weekly top-sites report.
//! All metric queries share one composed predicate so every number describes
//! the same population, and each sub-query is fault-isolated so a single
//! storage failure degrades one section instead of the whole dashboard.

pub mod badges;
pub mod dashboard;
pub mod filter;
pub mod models;
pub mod predicate;
pub mod weekly;

pub use badges::BadgeThresholds;
pub use dashboard::{build_dashboard, build_dashboard_with_timeout, ReportConfig, ReportError};
pub use filter::{FilterError, ReportFilter};
pub use models::DashboardReport;
pub use predicate::VisitPredicate;
