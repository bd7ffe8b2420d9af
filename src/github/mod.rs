//! Remote repository gateway.
//!
//! Wraps the GitHub REST API behind the [`RepoGateway`] trait so the rest of
//! the pipeline can run against an in-memory implementation in tests.

mod client;

pub use client::GithubGateway;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::GatewayError;
use crate::types::{CommitDetail, CommitRef, Contributor};

/// Narrow interface to the commit-hosting API.
///
/// The list calls paginate internally and are all-or-nothing: a failure on
/// any page fails the whole call, never returning a partial sequence.
#[async_trait]
pub trait RepoGateway: Send + Sync {
    /// Fetch the full contributor roster for a repository.
    async fn list_contributors(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<Contributor>, GatewayError>;

    /// Fetch every commit inside the given window. The boundary semantics of
    /// `since`/`until` are the upstream API's and are passed through
    /// unreinterpreted.
    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<CommitRef>, GatewayError>;

    /// Fetch line-change statistics for a single commit.
    async fn commit_detail(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<CommitDetail, GatewayError>;
}
