use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{ACCEPT, HeaderMap, LINK};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

const USER_AGENT: &str = concat!("repo-pulse/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";
const PER_PAGE: &str = "100";

#[derive(Clone)]
pub struct GithubClient {
    base_url: Arc<String>,
    token: Option<Arc<String>>,
    http: Arc<Client>,
}

/// One entry of `GET /users/{user}/repos`.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub stargazers_count: u64,
    pub languages_url: String,
    /// API URL of the repository itself.
    pub url: String,
}

/// One entry of `GET /repos/{owner}/{repo}/commits`. Every nested field may
/// be missing; callers skip what they cannot read.
#[derive(Debug, Deserialize)]
pub struct CommitRecord {
    pub commit: Option<CommitDetail>,
}

#[derive(Debug, Deserialize)]
pub struct CommitDetail {
    pub author: Option<Signature>,
    pub committer: Option<Signature>,
}

#[derive(Debug, Deserialize)]
pub struct Signature {
    pub date: Option<String>,
}

impl CommitRecord {
    /// Author date, or `None` when absent or unparseable.
    pub fn author_date(&self) -> Option<DateTime<Utc>> {
        let raw = self.commit.as_ref()?.author.as_ref()?.date.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn committer_date(&self) -> Option<&str> {
        self.commit.as_ref()?.committer.as_ref()?.date.as_deref()
    }
}

impl GithubClient {
    /// REST client for `base_url`. Requests are anonymous without a token.
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_http(base_url, token, http))
    }

    pub fn with_http(base_url: &str, token: Option<&str>, http: Client) -> Self {
        Self {
            base_url: Arc::new(base_url.trim_end_matches('/').to_string()),
            token: token.map(|t| Arc::new(t.to_string())),
            http: Arc::new(http),
        }
    }

    fn request(&self, url: Url) -> RequestBuilder {
        let req = self
            .http
            .get(url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        match &self.token {
            Some(token) => req.bearer_auth(token.as_str()),
            None => req,
        }
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let raw = format!("{}{path}", self.base_url);
        Url::parse_with_params(&raw, params).with_context(|| format!("Invalid API URL {raw}"))
    }

    async fn send(&self, url: Url) -> Result<Response> {
        debug!(%url, "GET");
        self.request(url.clone())
            .send()
            .await
            .with_context(|| format!("Network error requesting {url}"))
    }

    /// Turns non-2xx responses into errors carrying status and body.
    async fn ensure_success(resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let url = resp.url().clone();
        let body = resp
            .text()
            .await
            .unwrap_or_else(|_| "<unable to read response>".to_string());
        Err(anyhow!(
            "GitHub API returned HTTP {} for {url}: {body}",
            status.as_u16()
        ))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let resp = Self::ensure_success(self.send(url.clone()).await?).await?;
        resp.json::<T>()
            .await
            .with_context(|| format!("Failed to parse JSON from {url}"))
    }

    /// Follows `Link: rel="next"` until the last page.
    async fn get_paginated<T: DeserializeOwned>(&self, first: Url) -> Result<Vec<T>> {
        let mut out = Vec::new();
        let mut next = Some(first);

        while let Some(url) = next {
            let resp = Self::ensure_success(self.send(url.clone()).await?).await?;
            next = next_link(resp.headers())
                .map(|raw| Url::parse(&raw))
                .transpose()
                .context("Malformed Link header from GitHub")?;

            let page: Vec<T> = resp
                .json()
                .await
                .with_context(|| format!("Failed to parse JSON page from {url}"))?;
            debug!(items = page.len(), more = next.is_some(), "page fetched");
            out.extend(page);
        }

        Ok(out)
    }

    /// Looks up `owner/name` and returns its default branch.
    pub async fn default_branch(&self, full_name: &str) -> Result<String> {
        #[derive(Deserialize)]
        struct RepoInfo {
            default_branch: String,
        }

        let url = self.endpoint(&format!("/repos/{full_name}"), &[])?;
        let info: RepoInfo = self
            .get_json(url)
            .await
            .with_context(|| format!("Failed to look up repository {full_name}"))?;
        Ok(info.default_branch)
    }

    /// All commits on `branch` authored at or after `since`.
    pub async fn commits_since(
        &self,
        full_name: &str,
        branch: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CommitRecord>> {
        let since = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        let url = self.endpoint(
            &format!("/repos/{full_name}/commits"),
            &[("sha", branch), ("since", since.as_str()), ("per_page", PER_PAGE)],
        )?;
        self.get_paginated(url)
            .await
            .with_context(|| format!("Failed to list commits of {full_name}"))
    }

    /// Repositories owned by `user`, every page.
    pub async fn user_repos(&self, user: &str) -> Result<Vec<Repository>> {
        let url = self.endpoint(&format!("/users/{user}/repos"), &[("per_page", PER_PAGE)])?;
        self.get_paginated(url)
            .await
            .with_context(|| format!("Failed to list repositories of {user}"))
    }

    /// Bytes of code per language for one repository.
    pub async fn languages(&self, repo: &Repository) -> Result<BTreeMap<String, u64>> {
        let url = Url::parse(&repo.languages_url)
            .with_context(|| format!("Invalid languages_url for {}", repo.name))?;
        self.get_json(url)
            .await
            .with_context(|| format!("Failed to fetch languages of {}", repo.name))
    }

    /// Most recent commit on the default branch, `None` for an empty repository.
    pub async fn latest_commit(&self, repo: &Repository) -> Result<Option<CommitRecord>> {
        let raw = format!("{}/commits", repo.url);
        let url = Url::parse_with_params(&raw, &[("per_page", "1")])
            .with_context(|| format!("Invalid API URL {raw}"))?;

        let resp = self.send(url.clone()).await?;
        // GitHub answers 409 Conflict for a repository without any commits
        if resp.status() == StatusCode::CONFLICT {
            return Ok(None);
        }
        let resp = Self::ensure_success(resp)
            .await
            .with_context(|| format!("Failed to fetch latest commit of {}", repo.name))?;
        let commits: Vec<CommitRecord> = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON from {url}"))?;
        Ok(commits.into_iter().next())
    }
}

/// Extracts the `rel="next"` target from a `Link` header.
fn next_link(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(LINK)?.to_str().ok()?;
    parse_next_link(raw)
}

fn parse_next_link(raw: &str) -> Option<String> {
    raw.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|p| {
            let p = p.trim();
            p == r#"rel="next""# || p == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}
