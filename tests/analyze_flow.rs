//! End-to-end tests of the analysis flow against an in-memory gateway.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

use hubstats::analysis::{AnalysisParams, Analyzer};
use hubstats::error::{AnalyzeError, GatewayError};
use hubstats::github::RepoGateway;
use hubstats::types::{CommitDetail, CommitRef, Contributor, UserChanges};

#[derive(Default)]
struct FakeGateway {
    contributors: Vec<Contributor>,
    commits: Vec<CommitRef>,
    details: HashMap<String, CommitDetail>,
    failing_shas: Vec<String>,
    fail_contributors: bool,
    fail_commits: bool,
    commits_listed: AtomicBool,
}

impl FakeGateway {
    fn upstream_error(what: &str) -> GatewayError {
        GatewayError::Status {
            url: format!("https://api.invalid/{what}"),
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[async_trait]
impl RepoGateway for FakeGateway {
    async fn list_contributors(
        &self,
        _owner: &str,
        _repo: &str,
    ) -> Result<Vec<Contributor>, GatewayError> {
        if self.fail_contributors {
            return Err(Self::upstream_error("contributors"));
        }
        Ok(self.contributors.clone())
    }

    async fn list_commits(
        &self,
        _owner: &str,
        _repo: &str,
        _since: DateTime<Utc>,
        _until: DateTime<Utc>,
    ) -> Result<Vec<CommitRef>, GatewayError> {
        self.commits_listed.store(true, Ordering::SeqCst);
        if self.fail_commits {
            return Err(Self::upstream_error("commits"));
        }
        Ok(self.commits.clone())
    }

    async fn commit_detail(
        &self,
        _owner: &str,
        _repo: &str,
        sha: &str,
    ) -> Result<CommitDetail, GatewayError> {
        if self.failing_shas.iter().any(|failing| failing == sha) {
            return Err(Self::upstream_error(sha));
        }
        self.details
            .get(sha)
            .copied()
            .ok_or_else(|| Self::upstream_error(sha))
    }
}

fn contributor(login: &str, avatar: &str) -> Contributor {
    Contributor {
        login: login.to_string(),
        avatar_url: avatar.to_string(),
    }
}

fn commit(sha: &str, author: Option<&str>) -> CommitRef {
    CommitRef {
        sha: sha.to_string(),
        author: author.map(str::to_string),
    }
}

fn params() -> AnalysisParams {
    AnalysisParams {
        owner: "acme".to_string(),
        repo: "widgets".to_string(),
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
    }
}

async fn analyze(gateway: FakeGateway) -> Result<HashMap<String, UserChanges>, AnalyzeError> {
    Analyzer::new(Arc::new(gateway))
        .analyze(params(), CancellationToken::new())
        .await
}

#[tokio::test]
async fn single_contributor_with_one_commit() {
    let result = analyze(FakeGateway {
        contributors: vec![contributor("alice", "a.png")],
        commits: vec![commit("sha1", Some("alice"))],
        details: HashMap::from([(
            "sha1".to_string(),
            CommitDetail {
                additions: 10,
                deletions: 2,
            },
        )]),
        ..FakeGateway::default()
    })
    .await
    .unwrap();

    assert_eq!(
        result["alice"],
        UserChanges {
            username: "alice".to_string(),
            avatar_url: Some("a.png".to_string()),
            additions: 10,
            deletions: 2,
            total: 12,
            commit_count: 1,
        }
    );
    assert_eq!(result.len(), 1);
}

#[tokio::test]
async fn failed_detail_still_counts_the_commit() {
    let result = analyze(FakeGateway {
        commits: vec![commit("sha1", Some("bob")), commit("sha2", Some("bob"))],
        details: HashMap::from([(
            "sha2".to_string(),
            CommitDetail {
                additions: 5,
                deletions: 0,
            },
        )]),
        failing_shas: vec!["sha1".to_string()],
        ..FakeGateway::default()
    })
    .await
    .unwrap();

    assert_eq!(
        result["bob"],
        UserChanges {
            username: "bob".to_string(),
            avatar_url: None,
            additions: 5,
            deletions: 0,
            total: 5,
            commit_count: 2,
        }
    );
}

#[tokio::test]
async fn contributor_without_commits_keeps_zero_row() {
    let result = analyze(FakeGateway {
        contributors: vec![contributor("alice", "a.png"), contributor("bob", "b.png")],
        commits: vec![commit("sha1", Some("bob"))],
        details: HashMap::from([(
            "sha1".to_string(),
            CommitDetail {
                additions: 1,
                deletions: 1,
            },
        )]),
        ..FakeGateway::default()
    })
    .await
    .unwrap();

    assert_eq!(
        result["alice"],
        UserChanges {
            username: "alice".to_string(),
            avatar_url: Some("a.png".to_string()),
            additions: 0,
            deletions: 0,
            total: 0,
            commit_count: 0,
        }
    );
    assert_eq!(result["bob"].total, 2);
    assert_eq!(result["bob"].avatar_url.as_deref(), Some("b.png"));
}

#[tokio::test]
async fn author_outside_roster_gets_default_identity() {
    let result = analyze(FakeGateway {
        contributors: vec![contributor("alice", "a.png")],
        commits: vec![commit("sha1", Some("drive-by"))],
        details: HashMap::from([(
            "sha1".to_string(),
            CommitDetail {
                additions: 3,
                deletions: 4,
            },
        )]),
        ..FakeGateway::default()
    })
    .await
    .unwrap();

    assert_eq!(result.len(), 2);
    let row = &result["drive-by"];
    assert_eq!(row.avatar_url, None);
    assert_eq!(row.username, "drive-by");
    assert_eq!(row.total, 7);
    assert_eq!(row.commit_count, 1);
}

#[tokio::test]
async fn authorless_commits_never_become_rows() {
    let result = analyze(FakeGateway {
        contributors: vec![contributor("alice", "a.png")],
        commits: vec![commit("sha1", None), commit("sha2", None)],
        ..FakeGateway::default()
    })
    .await
    .unwrap();

    assert_eq!(result.len(), 1);
    assert!(!result.contains_key(""));
    assert_eq!(result["alice"].commit_count, 0);
}

#[tokio::test]
async fn contributor_listing_failure_short_circuits() {
    let gateway = Arc::new(FakeGateway {
        fail_contributors: true,
        commits: vec![commit("sha1", Some("alice"))],
        ..FakeGateway::default()
    });

    let result = Analyzer::new(Arc::clone(&gateway))
        .analyze(params(), CancellationToken::new())
        .await;

    assert!(matches!(result, Err(AnalyzeError::Contributors(_))));
    assert!(!gateway.commits_listed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn commit_listing_failure_aborts_analysis() {
    let result = analyze(FakeGateway {
        contributors: vec![contributor("alice", "a.png")],
        fail_commits: true,
        ..FakeGateway::default()
    })
    .await;

    assert!(matches!(result, Err(AnalyzeError::Commits(_))));
}

#[tokio::test]
async fn cancelled_analysis_returns_no_partial_result() {
    let gateway = FakeGateway {
        contributors: vec![contributor("alice", "a.png")],
        commits: vec![commit("sha1", Some("alice"))],
        details: HashMap::from([(
            "sha1".to_string(),
            CommitDetail {
                additions: 1,
                deletions: 0,
            },
        )]),
        ..FakeGateway::default()
    };

    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = Analyzer::new(Arc::new(gateway)).analyze(params(), cancel).await;
    assert!(matches!(result, Err(AnalyzeError::Cancelled)));
}
