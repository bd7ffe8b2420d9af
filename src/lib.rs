//! # hubstats
//!
//! `hubstats` answers one question for a GitHub repository and a date
//! window: how much did each contributor add, remove, and commit? It lists
//! the repository's contributors and commits, fans out per-commit detail
//! requests with bounded concurrency, aggregates the results by author, and
//! merges them with contributor identity metadata.
//!
//! ## Features
//!
//! - Pagination-aware contributor and commit listing
//! - Bounded-concurrency commit-detail retrieval (at most 5 in flight)
//! - Partial-failure tolerant aggregation: a single failed detail fetch
//!   never aborts the analysis
//! - Roster-seeded results: contributors without commits in range appear
//!   with zero statistics and their avatar
//! - Cancellable end to end via a cancellation token
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use chrono::NaiveDate;
//! use hubstats::analysis::{AnalysisParams, Analyzer};
//! use hubstats::config::Config;
//! use hubstats::github::GithubGateway;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let gateway = Arc::new(GithubGateway::new(&config)?);
//! let analyzer = Analyzer::new(gateway);
//!
//! let params = AnalysisParams {
//!     owner: "rust-lang".to_string(),
//!     repo: "log".to_string(),
//!     start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     end_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
//! };
//! let changes = analyzer.analyze(params, CancellationToken::new()).await?;
//! for (login, row) in &changes {
//!     println!("{login}: +{} -{} over {} commits", row.additions, row.deletions, row.commit_count);
//! }
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod github;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use analysis::{AnalysisParams, Analyzer};
pub use error::{AnalyzeError, GatewayError};
pub use types::{AnalysisRequest, AnalysisResponse, UserChanges};
