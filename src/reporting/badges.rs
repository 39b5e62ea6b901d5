//! Derived-metric formatting: percentages, display labels, and the
//! threshold-driven badge tiers.
//!
//! Everything here is a pure transform over already-aggregated counts; the
//! source counts are never mutated. Percentages stay numeric until a display
//! string is explicitly requested.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::reporting::models::{WeeklyHighlight, WeeklyReportEntry};

/// Unique-user engagement tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Engagement {
    High,
    Medium,
    Low,
}

/// Block-rate risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Risk {
    Critical,
    Elevated,
    Minor,
    Clean,
}

/// Activity-span tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    High,
    Medium,
    Low,
}

/// Badge threshold tables. These are display policy, not mechanism, so they
/// are overridable through configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BadgeThresholds {
    pub engagement_high: i64,
    pub engagement_medium: i64,
    pub risk_critical: f64,
    pub risk_elevated: f64,
    pub activity_high: i64,
    pub activity_medium: i64,
}

impl Default for BadgeThresholds {
    fn default() -> Self {
        Self {
            engagement_high: 4,
            engagement_medium: 2,
            risk_critical: 50.0,
            risk_elevated: 20.0,
            activity_high: 6,
            activity_medium: 3,
        }
    }
}

impl BadgeThresholds {
    /// First tier whose lower bound the value reaches, scanning the table in
    /// descending order; values below every bound fall through to low.
    pub fn engagement(&self, unique_users: i64) -> Engagement {
        let table = [
            (self.engagement_high, Engagement::High),
            (self.engagement_medium, Engagement::Medium),
        ];
        table
            .into_iter()
            .find(|(bound, _)| unique_users >= *bound)
            .map(|(_, tier)| tier)
            .unwrap_or(Engagement::Low)
    }

    /// Same descending-table scan; an exact zero is its own tier so a site
    /// with no blocks never reads as "minor".
    pub fn risk(&self, block_rate: f64) -> Risk {
        let table = [
            (self.risk_critical, Risk::Critical),
            (self.risk_elevated, Risk::Elevated),
        ];
        if let Some((_, tier)) = table.into_iter().find(|(bound, _)| block_rate >= *bound) {
            return tier;
        }
        if block_rate > 0.0 {
            Risk::Minor
        } else {
            Risk::Clean
        }
    }

    pub fn activity(&self, days_active: i64) -> Activity {
        let table = [
            (self.activity_high, Activity::High),
            (self.activity_medium, Activity::Medium),
        ];
        table
            .into_iter()
            .find(|(bound, _)| days_active >= *bound)
            .map(|(_, tier)| tier)
            .unwrap_or(Activity::Low)
    }
}

/// Round to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part` as a percentage of `total`, rounded to two decimals. Defined as
/// zero when `total` is zero.
pub fn percentage(part: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    round2(part as f64 * 100.0 / total as f64)
}

/// Display form with the `%` suffix. Never feed this back into arithmetic.
pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// Locale-independent "Mon D, YYYY – Mon D, YYYY" range label.
pub fn range_label(from: NaiveDate, to: NaiveDate) -> String {
    format!("{} – {}", from.format("%b %-d, %Y"), to.format("%b %-d, %Y"))
}

/// English weekday name for a `YYYY-MM-DD` date string; empty when the
/// string does not parse.
pub fn day_name(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%A").to_string())
        .unwrap_or_default()
}

/// The ranked entry with the highest block rate. Ties resolve to the first
/// entry in rank order; the input is never reordered.
pub fn highest_block_rate(entries: &[WeeklyReportEntry]) -> Option<WeeklyHighlight> {
    let mut best: Option<&WeeklyReportEntry> = None;
    for entry in entries {
        match best {
            Some(current) if entry.block_rate <= current.block_rate => {}
            _ => best = Some(entry),
        }
    }
    best.map(|entry| WeeklyHighlight {
        site: entry.site.clone(),
        block_rate: entry.block_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(rank: i64, site: &str, block_rate: f64) -> WeeklyReportEntry {
        WeeklyReportEntry {
            rank,
            site: site.to_string(),
            total_visits: 10,
            unique_users: 1,
            blocked: 0,
            allowed: 10,
            block_rate,
            days_active: 1,
            first_visit: 0,
            last_visit: 0,
            daily_breakdown: Vec::new(),
            peak_day: None,
            engagement: Engagement::Low,
            risk: Risk::Clean,
            activity: Activity::Low,
        }
    }

    #[test]
    fn engagement_tier_boundaries() {
        let t = BadgeThresholds::default();
        assert_eq!(t.engagement(0), Engagement::Low);
        assert_eq!(t.engagement(1), Engagement::Low);
        assert_eq!(t.engagement(2), Engagement::Medium);
        assert_eq!(t.engagement(3), Engagement::Medium);
        assert_eq!(t.engagement(4), Engagement::High);
        assert_eq!(t.engagement(40), Engagement::High);
    }

    #[test]
    fn risk_tier_boundaries() {
        let t = BadgeThresholds::default();
        assert_eq!(t.risk(0.0), Risk::Clean);
        assert_eq!(t.risk(0.01), Risk::Minor);
        assert_eq!(t.risk(19.99), Risk::Minor);
        assert_eq!(t.risk(20.0), Risk::Elevated);
        assert_eq!(t.risk(49.99), Risk::Elevated);
        assert_eq!(t.risk(50.0), Risk::Critical);
        assert_eq!(t.risk(100.0), Risk::Critical);
    }

    #[test]
    fn activity_tier_boundaries() {
        let t = BadgeThresholds::default();
        assert_eq!(t.activity(0), Activity::Low);
        assert_eq!(t.activity(2), Activity::Low);
        assert_eq!(t.activity(3), Activity::Medium);
        assert_eq!(t.activity(5), Activity::Medium);
        assert_eq!(t.activity(6), Activity::High);
        assert_eq!(t.activity(7), Activity::High);
    }

    #[test]
    fn percentage_rounds_and_guards_zero() {
        assert_eq!(percentage(3, 15), 20.0);
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(5, 0), 0.0);
    }

    #[test]
    fn percent_display_has_suffix() {
        assert_eq!(format_percent(20.0), "20.00%");
        assert_eq!(format_percent(33.33), "33.33%");
    }

    #[test]
    fn range_label_is_locale_independent() {
        let from = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 9, 7).unwrap();
        assert_eq!(range_label(from, to), "Sep 1, 2025 – Sep 7, 2025");
    }

    #[test]
    fn day_name_for_breakdown_dates() {
        assert_eq!(day_name("2025-09-01"), "Monday");
        assert_eq!(day_name("2025-09-07"), "Sunday");
        assert_eq!(day_name("not-a-date"), "");
    }

    #[test]
    fn highest_block_rate_keeps_first_on_ties() {
        let entries = vec![
            entry(1, "a.test", 25.0),
            entry(2, "b.test", 40.0),
            entry(3, "c.test", 40.0),
        ];
        let best = highest_block_rate(&entries).unwrap();
        assert_eq!(best.site, "b.test");
        assert_eq!(best.block_rate, 40.0);
    }

    #[test]
    fn highest_block_rate_empty_input() {
        assert!(highest_block_rate(&[]).is_none());
    }
}
