//! Error types shared across the analysis pipeline.

use thiserror::Error;

/// A failed call to the remote hosting API.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request could not be sent or failed mid-flight.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success status code.
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The response body could not be decoded.
    #[error("invalid response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// A failure that aborts a whole repository analysis.
///
/// Individual commit-detail fetch failures are absorbed inside the
/// aggregation engine and never surface here; only the two listing calls and
/// cancellation can fail an analysis.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// The contributor listing failed on some page.
    #[error("failed to get contributors: {0}")]
    Contributors(#[source] GatewayError),

    /// The commit listing failed on some page.
    #[error("failed to get commits: {0}")]
    Commits(#[source] GatewayError),

    /// The caller cancelled the analysis before it completed.
    #[error("analysis cancelled")]
    Cancelled,
}
