//! Repository analysis orchestration.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tokio_util::sync::CancellationToken;

use crate::analysis::engine;
use crate::error::AnalyzeError;
use crate::github::RepoGateway;
use crate::types::UserChanges;

/// Inputs for one repository analysis.
#[derive(Debug, Clone)]
pub struct AnalysisParams {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// First day of the window
    pub start_date: NaiveDate,
    /// Last day of the window
    pub end_date: NaiveDate,
}

/// Runs one analysis end to end: contributor roster, commit listing,
/// concurrent detail aggregation, and the final merge.
pub struct Analyzer<G> {
    gateway: Arc<G>,
}

impl<G> Analyzer<G>
where
    G: RepoGateway + 'static,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Compute per-contributor change statistics for the requested window.
    ///
    /// The result covers the union of the contributor roster and the authors
    /// seen in the commit listing: roster members without commits in range
    /// keep a zero-statistics row with their avatar, and authors missing
    /// from the roster get a row without identity metadata. Either listing
    /// call failing aborts the whole analysis; individual commit-detail
    /// failures do not.
    pub async fn analyze(
        &self,
        params: AnalysisParams,
        cancel: CancellationToken,
    ) -> Result<HashMap<String, UserChanges>, AnalyzeError> {
        let contributors = self
            .gateway
            .list_contributors(&params.owner, &params.repo)
            .await
            .map_err(AnalyzeError::Contributors)?;

        // Seed one zero-valued row per roster member so contributors without
        // commits in range still appear in the result.
        let mut user_changes: HashMap<String, UserChanges> =
            HashMap::with_capacity(contributors.len());
        for contributor in contributors {
            if contributor.login.is_empty() {
                continue;
            }
            user_changes.insert(
                contributor.login.clone(),
                UserChanges {
                    username: contributor.login,
                    avatar_url: Some(contributor.avatar_url),
                    ..UserChanges::default()
                },
            );
        }

        // Midnights of the requested days, passed through to the upstream
        // API without reinterpreting its boundary semantics.
        let since = params.start_date.and_time(NaiveTime::MIN).and_utc();
        let until = params.end_date.and_time(NaiveTime::MIN).and_utc();
        let commits = self
            .gateway
            .list_commits(&params.owner, &params.repo, since, until)
            .await
            .map_err(AnalyzeError::Commits)?;

        tracing::debug!(
            owner = %params.owner,
            repo = %params.repo,
            commits = commits.len(),
            "aggregating commit details"
        );

        let totals = engine::aggregate_commit_stats(
            Arc::clone(&self.gateway),
            &params.owner,
            &params.repo,
            commits,
            cancel,
        )
        .await?;

        for (login, totals) in totals {
            match user_changes.entry(login) {
                Entry::Occupied(mut row) => {
                    // Roster row: overwrite the statistics, keep the identity.
                    let row = row.get_mut();
                    row.additions = totals.additions;
                    row.deletions = totals.deletions;
                    row.total = totals.total;
                    row.commit_count = totals.commit_count;
                }
                Entry::Vacant(slot) => {
                    let username = slot.key().clone();
                    slot.insert(UserChanges {
                        username,
                        avatar_url: None,
                        additions: totals.additions,
                        deletions: totals.deletions,
                        total: totals.total,
                        commit_count: totals.commit_count,
                    });
                }
            }
        }

        Ok(user_changes)
    }
}
