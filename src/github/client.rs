//! GitHub REST API client.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::Config;
use crate::error::GatewayError;
use crate::types::{CommitDetail, CommitRef, Contributor};

use super::RepoGateway;

/// Public GitHub REST API root.
const GITHUB_API_URL: &str = "https://api.github.com";

/// Media type for REST v3 responses.
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// GitHub rejects requests without a User-Agent.
const USER_AGENT: &str = concat!("hubstats/", env!("CARGO_PKG_VERSION"));

/// Page size for list endpoints; the API maximum.
const PER_PAGE: usize = 100;

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`RepoGateway`] implementation backed by the GitHub REST API.
pub struct GithubGateway {
    http: reqwest::Client,
    base_url: String,
}

impl GithubGateway {
    /// Build a gateway against the public GitHub API.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Self::with_base_url(config, GITHUB_API_URL)
    }

    /// Build a gateway against a non-default API root. Lets tests point the
    /// client at a local mock server.
    pub fn with_base_url(config: &Config, base_url: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        if let Some(token) = &config.github_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .context("GITHUB_TOKEN contains characters not valid in a header")?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|source| GatewayError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status { url, status });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| GatewayError::Decode { url, source })
    }

    /// Fetch every page of a list endpoint. Stops after the first page
    /// shorter than [`PER_PAGE`]; fails the whole listing if any page fails.
    async fn get_paged<T: DeserializeOwned>(
        &self,
        url: String,
        base_query: Vec<(&'static str, String)>,
    ) -> Result<Vec<T>, GatewayError> {
        let mut items = Vec::new();
        for page in 1usize.. {
            let mut query = base_query.clone();
            query.push(("per_page", PER_PAGE.to_string()));
            query.push(("page", page.to_string()));

            let mut batch: Vec<T> = self.get_json(url.clone(), &query).await?;
            let batch_len = batch.len();
            items.append(&mut batch);
            if batch_len < PER_PAGE {
                break;
            }
        }
        Ok(items)
    }
}

#[async_trait]
impl RepoGateway for GithubGateway {
    async fn list_contributors(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<Contributor>, GatewayError> {
        let url = format!("{}/repos/{owner}/{repo}/contributors", self.base_url);
        let entries: Vec<WireContributor> = self.get_paged(url, Vec::new()).await?;

        // Anonymous contributor entries have no login and can never seed a
        // roster row.
        Ok(entries
            .into_iter()
            .filter_map(|entry| {
                entry.login.map(|login| Contributor {
                    login,
                    avatar_url: entry.avatar_url.unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<CommitRef>, GatewayError> {
        let url = format!("{}/repos/{owner}/{repo}/commits", self.base_url);
        let query = vec![
            ("since", since.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("until", until.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ];
        let entries: Vec<WireCommit> = self.get_paged(url, query).await?;

        Ok(entries
            .into_iter()
            .map(|entry| CommitRef {
                sha: entry.sha,
                author: entry.author.and_then(|account| account.login),
            })
            .collect())
    }

    async fn commit_detail(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<CommitDetail, GatewayError> {
        let url = format!("{}/repos/{owner}/{repo}/commits/{sha}", self.base_url);
        let entry: WireCommitDetail = self.get_json(url, &[]).await?;

        // Upstream omits `stats` for some commits; that is zero changes, not
        // an error.
        let stats = entry.stats.unwrap_or_default();
        Ok(CommitDetail {
            additions: stats.additions,
            deletions: stats.deletions,
        })
    }
}

/// Contributor entry of `/repos/{owner}/{repo}/contributors`.
#[derive(Debug, Deserialize)]
struct WireContributor {
    login: Option<String>,
    avatar_url: Option<String>,
}

/// Commit entry of `/repos/{owner}/{repo}/commits`.
#[derive(Debug, Deserialize)]
struct WireCommit {
    sha: String,
    author: Option<WireAccount>,
}

/// The account a commit or contributor entry points at.
#[derive(Debug, Deserialize)]
struct WireAccount {
    login: Option<String>,
}

/// Detail payload of `/repos/{owner}/{repo}/commits/{sha}`.
#[derive(Debug, Deserialize)]
struct WireCommitDetail {
    stats: Option<WireStats>,
}

#[derive(Debug, Default, Deserialize)]
struct WireStats {
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
}
