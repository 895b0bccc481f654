//! Run configuration.
//!
//! Each subcommand gets its own explicit config struct. Values come from CLI
//! overrides first, then from an environment lookup function, then from the
//! defaults below. Passing the lookup in keeps tests away from the real
//! process environment.

use crate::error::{ConfigError, ConfigResult};
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_MONTHS: u32 = 12;
/// A century of months.
pub const MAX_MONTHS: u32 = 1200;
pub const DEFAULT_CHART_PATH: &str = "assets/monthly-activity.png";
pub const DEFAULT_README_PATH: &str = "README.md";
pub const DEFAULT_START_MARKER: &str = "## 📊 Real-time Stats";
pub const DEFAULT_END_MARKER: &str = "## 💻 Tech Stack";

/// Chart styles tried in order; the first one known to the renderer wins.
pub const DEFAULT_STYLES: [&str; 4] = ["ggplot", "fivethirtyeight", "classic", "default"];

const ENV_REPOSITORY: &str = "GITHUB_REPOSITORY";
const ENV_TOKEN: &str = "GITHUB_TOKEN";
const ENV_MONTHS: &str = "MONTHS";
const ENV_USER: &str = "GITHUB_USER";
const ENV_REPOSITORY_OWNER: &str = "GITHUB_REPOSITORY_OWNER";
const ENV_API_URL: &str = "GITHUB_API_URL";

/// Reads a variable from the process environment, treating empty values as unset.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Values given on the command line for `activity`.
#[derive(Debug, Default, Clone)]
pub struct ActivityOverrides {
    pub repository: Option<String>,
    pub months: Option<u32>,
    pub output: Option<PathBuf>,
    pub style: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ActivityConfig {
    /// `owner/name`
    pub repository: String,
    pub token: String,
    pub months: u32,
    pub output: PathBuf,
    pub styles: Vec<String>,
    pub api_url: String,
}

impl ActivityConfig {
    pub fn resolve<F>(overrides: ActivityOverrides, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let repository = overrides
            .repository
            .or_else(|| lookup(ENV_REPOSITORY))
            .ok_or(ConfigError::Missing {
                name: ENV_REPOSITORY,
            })?;
        validate_repository(&repository)?;

        let token = lookup(ENV_TOKEN).ok_or(ConfigError::Missing { name: ENV_TOKEN })?;

        let months = match overrides.months {
            Some(n) => check_months(n, n.to_string())?,
            None => match lookup(ENV_MONTHS) {
                Some(raw) => parse_months(&raw)?,
                None => DEFAULT_MONTHS,
            },
        };

        let mut styles: Vec<String> = DEFAULT_STYLES.iter().map(|s| s.to_string()).collect();
        if let Some(style) = overrides.style {
            styles.retain(|s| *s != style);
            styles.insert(0, style);
        }

        Ok(Self {
            repository,
            token,
            months,
            output: overrides
                .output
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CHART_PATH)),
            styles,
            api_url: api_url(&lookup),
        })
    }
}

/// Values given on the command line for `readme`.
#[derive(Debug, Default, Clone)]
pub struct ReadmeOverrides {
    pub user: Option<String>,
    pub readme: Option<PathBuf>,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct ReadmeConfig {
    pub user: String,
    /// Anonymous requests when absent (lower rate limit).
    pub token: Option<String>,
    pub readme: PathBuf,
    pub start_marker: String,
    pub end_marker: String,
    pub dry_run: bool,
    pub api_url: String,
}

impl ReadmeConfig {
    pub fn resolve<F>(overrides: ReadmeOverrides, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let user = overrides
            .user
            .or_else(|| lookup(ENV_USER))
            .or_else(|| lookup(ENV_REPOSITORY_OWNER))
            .ok_or(ConfigError::Missing { name: ENV_USER })?;

        if user.contains('/') || user.trim().is_empty() {
            return Err(ConfigError::Invalid {
                name: ENV_USER,
                value: user,
                reason: "expected a bare user login".to_string(),
            });
        }

        Ok(Self {
            user,
            token: lookup(ENV_TOKEN),
            readme: overrides
                .readme
                .unwrap_or_else(|| PathBuf::from(DEFAULT_README_PATH)),
            start_marker: DEFAULT_START_MARKER.to_string(),
            end_marker: DEFAULT_END_MARKER.to_string(),
            dry_run: overrides.dry_run,
            api_url: api_url(&lookup),
        })
    }
}

fn api_url<F>(lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(ENV_API_URL)
        .map(|u| u.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

fn validate_repository(repository: &str) -> ConfigResult<()> {
    match repository.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(())
        }
        _ => Err(ConfigError::Invalid {
            name: ENV_REPOSITORY,
            value: repository.to_string(),
            reason: "expected owner/name".to_string(),
        }),
    }
}

fn parse_months(raw: &str) -> ConfigResult<u32> {
    let n = raw.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
        name: ENV_MONTHS,
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    check_months(n, raw.to_string())
}

fn check_months(n: u32, raw: String) -> ConfigResult<u32> {
    if n == 0 {
        return Err(ConfigError::Invalid {
            name: ENV_MONTHS,
            value: raw,
            reason: "window must cover at least one month".to_string(),
        });
    }
    if n > MAX_MONTHS {
        return Err(ConfigError::Invalid {
            name: ENV_MONTHS,
            value: raw,
            reason: format!("window may cover at most {MAX_MONTHS} months"),
        });
    }
    Ok(n)
}
