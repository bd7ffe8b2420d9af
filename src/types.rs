//! # Common Types
//!
//! This module contains the common types used throughout the application for
//! representing repository metadata and per-contributor change statistics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A repository contributor as reported by the hosting API.
///
/// Identity only; change statistics are computed separately from the commit
/// history and merged in later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contributor {
    /// The contributor's account login
    pub login: String,
    /// URL of the contributor's avatar image
    pub avatar_url: String,
}

/// A lightweight reference to one commit, obtained from a list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRef {
    /// The commit SHA
    pub sha: String,
    /// Login of the authoring account, if the commit is attributable to one
    pub author: Option<String>,
}

/// Line-change statistics for a single commit, fetched one commit at a time.
///
/// Attribution always comes from the [`CommitRef`] that requested the detail,
/// so only the counters live here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitDetail {
    /// Lines added by the commit
    pub additions: u64,
    /// Lines removed by the commit
    pub deletions: u64,
}

/// One successfully fetched commit's contribution, attributed to its author.
///
/// Emitted by the aggregation workers and folded by a single consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitChange {
    /// Login the change is attributed to
    pub author: String,
    /// Lines added by the commit
    pub additions: u64,
    /// Lines removed by the commit
    pub deletions: u64,
}

/// Accumulated change statistics for one author login.
///
/// This is the aggregation engine's output row; it never carries identity
/// fields (avatar, display name), which belong to [`Contributor`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeTotals {
    /// Total lines added across all fetched commits
    pub additions: u64,
    /// Total lines removed across all fetched commits
    pub deletions: u64,
    /// Sum of additions and deletions
    pub total: u64,
    /// Number of commits authored in the queried range, independent of how
    /// many detail fetches succeeded
    pub commit_count: u64,
}

/// A single row of the analysis result: statistics plus identity metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserChanges {
    /// The author's account login
    pub username: String,
    /// Avatar URL, present only for authors found in the contributor roster
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Total lines added in the queried range
    pub additions: u64,
    /// Total lines removed in the queried range
    pub deletions: u64,
    /// Sum of additions and deletions
    pub total: u64,
    /// Number of commits authored in the queried range
    pub commit_count: u64,
}

/// The JSON body accepted by the analyze endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// First day of the window, `YYYY-MM-DD`
    pub start_date: String,
    /// Last day of the window, `YYYY-MM-DD`
    pub end_date: String,
}

/// The JSON body produced by the analyze endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// `owner/repo` echo of the analyzed repository
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repository: String,
    /// `start to end` echo of the queried window
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub time_range: String,
    /// Per-login statistics, keyed by account login
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub user_changes: HashMap<String, UserChanges>,
    /// Single user-visible error message, present only on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
