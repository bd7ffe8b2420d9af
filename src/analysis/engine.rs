//! Concurrent commit-statistics aggregation.
//!
//! Turns a sequence of commit references into per-author change totals.
//! Every attributable reference costs one gateway detail call, so the
//! fan-out is bounded: at most [`MAX_IN_FLIGHT`] detail requests are ever in
//! flight for one analysis, no matter how many commits the window contains.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::error::AnalyzeError;
use crate::github::RepoGateway;
use crate::types::{ChangeTotals, CommitChange, CommitRef};

/// Maximum number of commit-detail requests in flight at any instant.
pub const MAX_IN_FLIGHT: usize = 5;

/// Buffer between the fetch workers and the fold loop. The fold drains the
/// channel concurrently with dispatch, so this only smooths bursts; any
/// non-zero capacity is safe, a few results per worker keeps senders from
/// parking on every send.
const CHANNEL_CAPACITY: usize = MAX_IN_FLIGHT * 5;

/// Aggregate per-author change totals for the given commit references.
///
/// References without an attributable author are dropped entirely: they
/// appear neither in the totals nor in any commit count. Commit counts are
/// taken from the reference list itself before any fetching starts, so a
/// failed detail fetch costs its author the additions/deletions contribution
/// of that commit but never the commit itself. Detail failures are logged
/// and skipped; only cancellation aborts the aggregation.
pub async fn aggregate_commit_stats<G>(
    gateway: Arc<G>,
    owner: &str,
    repo: &str,
    commits: Vec<CommitRef>,
    cancel: CancellationToken,
) -> Result<HashMap<String, ChangeTotals>, AnalyzeError>
where
    G: RepoGateway + 'static,
{
    let attributed: Vec<(String, String)> = commits
        .into_iter()
        .filter_map(|commit| commit.author.map(|author| (author, commit.sha)))
        .collect();

    // Counting commits needs no network call; this map is authoritative
    // regardless of how the detail fetches go.
    let mut commit_counts: HashMap<String, u64> = HashMap::new();
    for (author, _) in &attributed {
        *commit_counts.entry(author.clone()).or_insert(0) += 1;
    }

    let semaphore = Arc::new(Semaphore::new(MAX_IN_FLIGHT));
    let (tx, mut rx) = mpsc::channel::<CommitChange>(CHANNEL_CAPACITY);

    // Dispatch and fold must run concurrently: workers park in `send` once
    // the channel fills, and they hold their permits while parked, so a fold
    // that only starts after dispatch would never be reached.
    let dispatch = {
        let cancel = cancel.clone();
        async move {
            let mut workers = Vec::with_capacity(attributed.len());
            for (author, sha) in attributed {
                // Acquiring the permit before spawning keeps dispatch itself
                // within the bound.
                let permit = tokio::select! {
                    _ = cancel.cancelled() => break,
                    permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => break,
                    },
                };

                let gateway = Arc::clone(&gateway);
                let tx = tx.clone();
                let cancel = cancel.clone();
                let owner = owner.to_string();
                let repo = repo.to_string();

                workers.push(tokio::spawn(async move {
                    let _permit = permit;
                    let detail = tokio::select! {
                        _ = cancel.cancelled() => return,
                        detail = gateway.commit_detail(&owner, &repo, &sha) => detail,
                    };
                    match detail {
                        Ok(detail) => {
                            let _ = tx
                                .send(CommitChange {
                                    author,
                                    additions: detail.additions,
                                    deletions: detail.deletions,
                                })
                                .await;
                        }
                        Err(err) => {
                            tracing::warn!(sha = %sha, error = %err, "skipping commit detail");
                        }
                    }
                }));
            }

            // The workers now hold the only senders; the fold ends when the
            // last of them finishes.
            drop(tx);
            workers
        }
    };

    let fold = async {
        let mut totals: HashMap<String, ChangeTotals> = HashMap::new();
        while let Some(change) = rx.recv().await {
            let entry = totals.entry(change.author).or_default();
            entry.additions += change.additions;
            entry.deletions += change.deletions;
            entry.total = entry.additions + entry.deletions;
        }
        totals
    };

    let (workers, mut totals) = tokio::join!(dispatch, fold);

    for joined in futures::future::join_all(workers).await {
        if let Err(err) = joined {
            tracing::error!(error = %err, "aggregation worker panicked");
        }
    }

    if cancel.is_cancelled() {
        return Err(AnalyzeError::Cancelled);
    }

    // Authors whose every detail fetch failed still keep their commit count.
    for (author, count) in commit_counts {
        totals.entry(author).or_default().commit_count = count;
    }

    Ok(totals)
}
