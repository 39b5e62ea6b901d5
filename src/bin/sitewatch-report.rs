use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Parser;
use sitewatch::config::Config;
use sitewatch::reporting::badges::format_percent;
use sitewatch::reporting::{build_dashboard_with_timeout, ReportError, ReportFilter};
use sitewatch::storage::{SqliteVisitStore, VisitStore};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "sitewatch-report")]
#[command(about = "Build a visit-analytics dashboard from the command line", long_about = None)]
struct Cli {
    /// Range start (YYYY-MM-DD); omit both dates for the default trailing window
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Range end (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Restrict the report to a single user id
    #[arg(long)]
    user: Option<i64>,

    /// Print the raw JSON report instead of tables
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let store: Arc<dyn VisitStore> = Arc::new(
        SqliteVisitStore::new(&config.database.url, config.database.max_connections).await?,
    );

    // Ensure database is initialized
    store.init().await?;

    let filter = match (cli.from, cli.to) {
        (Some(from), Some(to)) => ReportFilter::new(from, to, cli.user)?,
        (None, None) => ReportFilter::trailing_days(config.report.weekly_window_days, cli.user)?,
        _ => bail!("--from and --to must be given together"),
    };

    let report = match build_dashboard_with_timeout(
        store.as_ref(),
        &filter,
        &config.report,
        Duration::from_secs(config.dashboard_timeout_secs),
    )
    .await
    {
        Ok(report) => report,
        Err(ReportError::Cancelled) => bail!("dashboard build timed out"),
        Err(e) => return Err(e.into()),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Dashboard for {}", report.range_label);
    if let Some(banner) = &report.error_message {
        println!("⚠ {}", banner);
    }

    println!();
    println!(
        "Totals: {} visits ({} allowed, {} blocked, {} block rate), {} users, {} sites",
        report.summary.total,
        report.summary.allowed,
        report.summary.blocked,
        format_percent(report.summary.overall_block_rate),
        report.summary.active_users,
        report.summary.unique_sites,
    );

    if !report.top_sites.is_empty() {
        println!();
        println!("Top sites:");
        println!("{:<30} {:>8} {:>8} {:>8}", "Site", "Visits", "Allowed", "Blocked");
        println!("{}", "-".repeat(58));
        for site in &report.top_sites {
            println!(
                "{:<30} {:>8} {:>8} {:>8}",
                site.site, site.visits, site.allowed, site.blocked
            );
        }
    }

    if !report.weekly_report.is_empty() {
        println!();
        println!("Weekly top sites:");
        println!(
            "{:<4} {:<30} {:>8} {:>6} {:>8} {:>6} {:<10}",
            "Rank", "Site", "Visits", "Users", "Blocked", "Days", "Peak"
        );
        println!("{}", "-".repeat(78));
        for entry in &report.weekly_report {
            let peak = entry
                .peak_day
                .as_ref()
                .map(|p| p.day_name.clone())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<4} {:<30} {:>8} {:>6} {:>8} {:>6} {:<10}",
                entry.rank,
                entry.site,
                entry.total_visits,
                entry.unique_users,
                entry.blocked,
                entry.days_active,
                peak
            );
        }
        if let Some(highlight) = &report.highest_block_rate {
            println!(
                "Highest block rate: {} ({})",
                highlight.site,
                format_percent(highlight.block_rate)
            );
        }
    }

    Ok(())
}
