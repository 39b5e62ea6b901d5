use std::str::FromStr;

use crate::reporting::{BadgeThresholds, ReportConfig};

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    /// Deadline for one dashboard build; expiry cancels the whole build.
    pub dashboard_timeout_secs: u64,
    pub report: ReportConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://./sitewatch.db".to_string());
        let max_connections = env_parse("DATABASE_MAX_CONNECTIONS", 5);

        let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let defaults = ReportConfig::default();
        let default_thresholds = BadgeThresholds::default();

        let report = ReportConfig {
            top_sites_limit: env_parse("TOP_SITES_LIMIT", defaults.top_sites_limit),
            blocked_sites_limit: env_parse("BLOCKED_SITES_LIMIT", defaults.blocked_sites_limit),
            weekly_limit: env_parse("WEEKLY_LIMIT", defaults.weekly_limit),
            weekly_window_days: env_parse("WEEKLY_WINDOW_DAYS", defaults.weekly_window_days),
            thresholds: BadgeThresholds {
                engagement_high: env_parse(
                    "BADGE_ENGAGEMENT_HIGH",
                    default_thresholds.engagement_high,
                ),
                engagement_medium: env_parse(
                    "BADGE_ENGAGEMENT_MEDIUM",
                    default_thresholds.engagement_medium,
                ),
                risk_critical: env_parse("BADGE_RISK_CRITICAL", default_thresholds.risk_critical),
                risk_elevated: env_parse("BADGE_RISK_ELEVATED", default_thresholds.risk_elevated),
                activity_high: env_parse("BADGE_ACTIVITY_HIGH", default_thresholds.activity_high),
                activity_medium: env_parse(
                    "BADGE_ACTIVITY_MEDIUM",
                    default_thresholds.activity_medium,
                ),
            },
        };

        Ok(Config {
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            server: ServerConfig { host, port },
            dashboard_timeout_secs: env_parse("DASHBOARD_TIMEOUT_SECS", 30),
            report,
        })
    }
}
