use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::reporting::badges::percentage;
use crate::reporting::models::{
    BlockedSiteStat, DailyTrend, SiteDailyRow, SiteStat, Summary, UserStat, WeeklySiteTotals,
};
use crate::reporting::predicate::VisitPredicate;
use crate::storage::VisitStore;

pub struct SqliteVisitStore {
    pool: Arc<SqlitePool>,
}

impl SqliteVisitStore {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Wrap an existing pool. Used by tests that seed the same pool directly.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl VisitStore for SqliteVisitStore {
    async fn init(&self) -> Result<()> {
        // Visit log. user_agent and ip_address belong to the write path and
        // are never read by the reporting engine.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS visits (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                site TEXT NOT NULL,
                outcome TEXT NOT NULL CHECK (outcome IN ('allowed', 'blocked')),
                occurred_at INTEGER NOT NULL,
                user_agent TEXT,
                ip_address TEXT
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_visits_occurred_at ON visits(occurred_at)")
            .execute(self.pool.as_ref())
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_visits_user_id ON visits(user_id)")
            .execute(self.pool.as_ref())
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_visits_site ON visits(site)")
            .execute(self.pool.as_ref())
            .await?;

        // Reason registry for blocked sites.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS blocked_sites (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                site TEXT NOT NULL UNIQUE,
                reason TEXT NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<i64>> {
        let users = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT DISTINCT user_id
            FROM visits
            ORDER BY user_id ASC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(users)
    }

    async fn user_stats(&self, pred: &VisitPredicate) -> Result<Vec<UserStat>> {
        let sql = format!(
            r#"
            SELECT user_id,
                   COUNT(*) AS total,
                   SUM(CASE WHEN outcome = 'blocked' THEN 1 ELSE 0 END) AS blocked,
                   SUM(CASE WHEN outcome = 'allowed' THEN 1 ELSE 0 END) AS allowed,
                   MIN(occurred_at) AS first_seen,
                   MAX(occurred_at) AS last_seen,
                   COUNT(DISTINCT site) AS unique_sites
            FROM visits
            WHERE {}
            GROUP BY user_id
            ORDER BY user_id ASC
            "#,
            pred.where_sql()
        );

        let mut query = sqlx::query_as::<_, UserStat>(&sql);
        for param in pred.params() {
            query = query.bind(*param);
        }

        let mut stats = query.fetch_all(self.pool.as_ref()).await?;
        for stat in &mut stats {
            stat.block_rate = percentage(stat.blocked, stat.total);
        }

        Ok(stats)
    }

    async fn top_sites(&self, pred: &VisitPredicate, limit: i64) -> Result<Vec<SiteStat>> {
        let sql = format!(
            r#"
            SELECT site,
                   COUNT(*) AS visits,
                   SUM(CASE WHEN outcome = 'blocked' THEN 1 ELSE 0 END) AS blocked,
                   SUM(CASE WHEN outcome = 'allowed' THEN 1 ELSE 0 END) AS allowed
            FROM visits
            WHERE {}
            GROUP BY site
            ORDER BY visits DESC, site ASC
            LIMIT ?
            "#,
            pred.where_sql()
        );

        let mut query = sqlx::query_as::<_, SiteStat>(&sql);
        for param in pred.params() {
            query = query.bind(*param);
        }
        query = query.bind(limit);

        Ok(query.fetch_all(self.pool.as_ref()).await?)
    }

    async fn daily_trends(&self, pred: &VisitPredicate) -> Result<Vec<DailyTrend>> {
        let sql = format!(
            r#"
            SELECT date(occurred_at, 'unixepoch') AS day,
                   COUNT(*) AS total,
                   SUM(CASE WHEN outcome = 'blocked' THEN 1 ELSE 0 END) AS blocked,
                   SUM(CASE WHEN outcome = 'allowed' THEN 1 ELSE 0 END) AS allowed
            FROM visits
            WHERE {}
            GROUP BY day
            ORDER BY day ASC
            "#,
            pred.where_sql()
        );

        let mut query = sqlx::query_as::<_, DailyTrend>(&sql);
        for param in pred.params() {
            query = query.bind(*param);
        }

        Ok(query.fetch_all(self.pool.as_ref()).await?)
    }

    async fn blocked_sites(
        &self,
        pred: &VisitPredicate,
        limit: i64,
    ) -> Result<Vec<BlockedSiteStat>> {
        // The outcome clause is appended after the composed predicate;
        // predicate columns are unambiguous since the registry carries
        // neither occurred_at nor user_id.
        let sql = format!(
            r#"
            SELECT v.site AS site,
                   COUNT(*) AS block_count,
                   COUNT(DISTINCT v.user_id) AS affected_users,
                   r.reason AS reason
            FROM visits v
            INNER JOIN blocked_sites r ON r.site = v.site
            WHERE {} AND v.outcome = 'blocked'
            GROUP BY v.site, r.reason
            ORDER BY block_count DESC, v.site ASC
            LIMIT ?
            "#,
            pred.where_sql()
        );

        let mut query = sqlx::query_as::<_, BlockedSiteStat>(&sql);
        for param in pred.params() {
            query = query.bind(*param);
        }
        query = query.bind(limit);

        Ok(query.fetch_all(self.pool.as_ref()).await?)
    }

    async fn summary(&self, pred: &VisitPredicate) -> Result<Summary> {
        let sql = format!(
            r#"
            SELECT COUNT(*) AS total,
                   COALESCE(SUM(CASE WHEN outcome = 'blocked' THEN 1 ELSE 0 END), 0) AS blocked,
                   COALESCE(SUM(CASE WHEN outcome = 'allowed' THEN 1 ELSE 0 END), 0) AS allowed,
                   COUNT(DISTINCT user_id) AS active_users,
                   COUNT(DISTINCT site) AS unique_sites
            FROM visits
            WHERE {}
            "#,
            pred.where_sql()
        );

        let mut query = sqlx::query_as::<_, Summary>(&sql);
        for param in pred.params() {
            query = query.bind(*param);
        }

        let mut summary = query.fetch_one(self.pool.as_ref()).await?;
        summary.overall_block_rate = percentage(summary.blocked, summary.total);

        Ok(summary)
    }

    async fn weekly_site_totals(
        &self,
        pred: &VisitPredicate,
        limit: i64,
    ) -> Result<Vec<WeeklySiteTotals>> {
        let sql = format!(
            r#"
            SELECT site,
                   COUNT(*) AS total_visits,
                   COUNT(DISTINCT user_id) AS unique_users,
                   SUM(CASE WHEN outcome = 'blocked' THEN 1 ELSE 0 END) AS blocked,
                   SUM(CASE WHEN outcome = 'allowed' THEN 1 ELSE 0 END) AS allowed,
                   COUNT(DISTINCT date(occurred_at, 'unixepoch')) AS days_active,
                   MIN(occurred_at) AS first_visit,
                   MAX(occurred_at) AS last_visit
            FROM visits
            WHERE {}
            GROUP BY site
            ORDER BY total_visits DESC, unique_users DESC, site ASC
            LIMIT ?
            "#,
            pred.where_sql()
        );

        let mut query = sqlx::query_as::<_, WeeklySiteTotals>(&sql);
        for param in pred.params() {
            query = query.bind(*param);
        }
        query = query.bind(limit);

        Ok(query.fetch_all(self.pool.as_ref()).await?)
    }

    async fn site_daily_rollup(
        &self,
        pred: &VisitPredicate,
        sites: &[String],
    ) -> Result<Vec<SiteDailyRow>> {
        if sites.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; sites.len()].join(", ");
        let sql = format!(
            r#"
            SELECT site,
                   date(occurred_at, 'unixepoch') AS day,
                   COUNT(*) AS visits,
                   SUM(CASE WHEN outcome = 'blocked' THEN 1 ELSE 0 END) AS blocked
            FROM visits
            WHERE {} AND site IN ({})
            GROUP BY site, day
            ORDER BY site ASC, day ASC
            "#,
            pred.where_sql(),
            placeholders
        );

        let mut query = sqlx::query_as::<_, SiteDailyRow>(&sql);
        for param in pred.params() {
            query = query.bind(*param);
        }
        for site in sites {
            query = query.bind(site);
        }

        Ok(query.fetch_all(self.pool.as_ref()).await?)
    }
}
