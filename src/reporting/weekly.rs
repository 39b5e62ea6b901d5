//! Weekly top-sites report enrichment.
//!
//! One ranked totals query plus one batched `GROUP BY site, date` rollup
//! over the already-limited site set; breakdowns and peak days are derived
//! in memory from the rollup, so the query count stays constant as the
//! entry limit grows.

use std::collections::HashMap;

use anyhow::Result;
use tracing::warn;

use crate::reporting::badges::{self, percentage, BadgeThresholds};
use crate::reporting::filter::ReportFilter;
use crate::reporting::models::{DailySlice, PeakDay, WeeklyReportEntry};
use crate::reporting::predicate::VisitPredicate;
use crate::storage::VisitStore;

/// Build the enriched weekly report for `filter`.
///
/// Fails only when the ranked totals query fails; a rollup failure degrades
/// every entry to an empty breakdown and absent peak day but never drops a
/// ranked site.
pub async fn enrich(
    store: &dyn VisitStore,
    filter: &ReportFilter,
    limit: i64,
    thresholds: &BadgeThresholds,
) -> Result<Vec<WeeklyReportEntry>> {
    let pred = VisitPredicate::compose(filter);

    let totals = store.weekly_site_totals(&pred, limit).await?;
    if totals.is_empty() {
        return Ok(Vec::new());
    }

    let sites: Vec<String> = totals.iter().map(|t| t.site.clone()).collect();
    let rollup = match store.site_daily_rollup(&pred, &sites).await {
        Ok(rows) => rows,
        Err(e) => {
            warn!(error = %e, "weekly daily rollup failed, entries keep totals only");
            Vec::new()
        }
    };

    // Rollup rows arrive ordered by site then date, so each site's slice
    // vector is already its ascending daily breakdown.
    let mut breakdowns: HashMap<String, Vec<DailySlice>> = HashMap::new();
    for row in rollup {
        breakdowns.entry(row.site).or_default().push(DailySlice {
            date: row.day,
            visits: row.visits,
            blocked: row.blocked,
        });
    }

    let entries = totals
        .into_iter()
        .enumerate()
        .map(|(i, t)| {
            let daily_breakdown = breakdowns.remove(&t.site).unwrap_or_default();
            let peak_day = peak_of(&daily_breakdown);
            let block_rate = percentage(t.blocked, t.total_visits);

            WeeklyReportEntry {
                rank: i as i64 + 1,
                engagement: thresholds.engagement(t.unique_users),
                risk: thresholds.risk(block_rate),
                activity: thresholds.activity(t.days_active),
                site: t.site,
                total_visits: t.total_visits,
                unique_users: t.unique_users,
                blocked: t.blocked,
                allowed: t.allowed,
                block_rate,
                days_active: t.days_active,
                first_visit: t.first_visit,
                last_visit: t.last_visit,
                daily_breakdown,
                peak_day,
            }
        })
        .collect();

    Ok(entries)
}

/// The breakdown date with the most visits; ties keep the earliest date
/// since slices arrive in ascending date order.
fn peak_of(breakdown: &[DailySlice]) -> Option<PeakDay> {
    let mut peak: Option<&DailySlice> = None;
    for slice in breakdown {
        match peak {
            Some(current) if slice.visits <= current.visits => {}
            _ => peak = Some(slice),
        }
    }
    peak.map(|slice| PeakDay {
        date: slice.date.clone(),
        visits: slice.visits,
        day_name: badges::day_name(&slice.date),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice(date: &str, visits: i64) -> DailySlice {
        DailySlice {
            date: date.to_string(),
            visits,
            blocked: 0,
        }
    }

    #[test]
    fn peak_keeps_earliest_date_on_ties() {
        let breakdown = vec![
            slice("2025-09-01", 3),
            slice("2025-09-02", 5),
            slice("2025-09-03", 5),
        ];
        let peak = peak_of(&breakdown).unwrap();
        assert_eq!(peak.date, "2025-09-02");
        assert_eq!(peak.visits, 5);
        assert_eq!(peak.day_name, "Tuesday");
    }

    #[test]
    fn peak_of_empty_breakdown_is_absent() {
        assert!(peak_of(&[]).is_none());
    }
}
