use anyhow::{Context, Result};
use chrono::Local;
use tracing::{debug, info, warn};

use crate::config::ReadmeConfig;
use crate::github::GithubClient;
use crate::readme;
use crate::stats::RepoSummary;

/// Recomputes the user's stats and rewrites the marked README section.
///
/// The document is read and its markers checked before any request; it is
/// written only once every request has succeeded.
pub async fn cmd_readme(cfg: &ReadmeConfig) -> Result<()> {
    let path = cfg.readme.display();
    let content = tokio::fs::read_to_string(&cfg.readme)
        .await
        .with_context(|| format!("Failed to read {path}"))?;
    readme::locate_markers(&content, &cfg.start_marker, &cfg.end_marker)
        .with_context(|| format!("{path} has no replaceable stats section"))?;

    if cfg.token.is_none() {
        warn!("GITHUB_TOKEN not set, using unauthenticated requests");
    }
    let client = GithubClient::new(&cfg.api_url, cfg.token.as_deref())?;

    let summary = collect_summary(&client, &cfg.user).await?;
    info!(
        repos = summary.repos,
        stars = summary.stars,
        languages = summary.languages.len(),
        "stats aggregated"
    );
    for entry in &summary.recent_activity {
        debug!(repo = %entry.name, last_commit = %entry.last_commit, "recent activity");
    }

    let updated = Local::now().format("%Y-%m-%d %H:%M").to_string();
    let section = readme::render_section(&cfg.start_marker, &cfg.user, &summary, &updated);
    let new_content = readme::splice(&content, &cfg.start_marker, &cfg.end_marker, &section)?;

    if cfg.dry_run {
        print!("{new_content}");
        return Ok(());
    }

    tokio::fs::write(&cfg.readme, new_content)
        .await
        .with_context(|| format!("Failed to write {path}"))?;
    println!("Updated stats section in {path}");

    Ok(())
}

async fn collect_summary(client: &GithubClient, user: &str) -> Result<RepoSummary> {
    let repos = client.user_repos(user).await?;
    info!(user, count = repos.len(), "repositories listed");

    let mut summary = RepoSummary::default();
    for repo in &repos {
        summary.add_repository(repo.stargazers_count);
        summary.add_languages(client.languages(repo).await?);

        if let Some(commit) = client.latest_commit(repo).await?
            && let Some(date) = commit.committer_date()
        {
            summary.record_latest_commit(&repo.name, date.to_string());
        }
    }

    Ok(summary)
}
