use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info};

use crate::activity::{self, ActivityReport};
use crate::chart::{self, BarChart};
use crate::config::ActivityConfig;
use crate::github::{CommitRecord, GithubClient};

/// Fetches commits for the configured window and writes the bar chart.
pub async fn cmd_activity(cfg: &ActivityConfig, now: DateTime<Utc>) -> Result<ActivityReport> {
    let window = activity::window(now, cfg.months);
    let oldest = window.first().context("Activity window is empty")?;
    let since = oldest
        .start()
        .with_context(|| format!("Month {oldest} is outside the supported calendar range"))?;

    let client = GithubClient::new(&cfg.api_url, Some(&cfg.token))?;
    println!("Generating monthly activity for repository: {}", cfg.repository);

    let branch = client.default_branch(&cfg.repository).await?;
    debug!(%branch, "default branch resolved");

    println!(
        "Fetching commits since: {}",
        since.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    let commits = client.commits_since(&cfg.repository, &branch, since).await?;

    let report = activity::bucket(&window, commits.iter().map(CommitRecord::author_date));
    println!(
        "Fetched {} commits (counted {} in range)",
        report.fetched, report.counted
    );
    info!(counts = ?report.counts, "monthly buckets");

    let style = chart::select_style(&cfg.styles);
    println!("Using chart style: {}", style.name());

    let bar_chart = BarChart {
        title: format!("Monthly Activity (commits) - last {} months", cfg.months),
        x_desc: "Month".to_string(),
        y_desc: "Commits".to_string(),
        labels: report.labels(),
        values: report.counts.clone(),
    };
    chart::render(bar_chart, style, &cfg.output).await?;
    println!("Saved monthly activity image to {}", cfg.output.display());

    Ok(report)
}
