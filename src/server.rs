//! HTTP request boundary.
//!
//! A deliberately thin layer over the analyzer: validate the request body,
//! run one analysis on the async runtime, and translate the outcome into the
//! JSON response payload. Each analyze request runs on its own thread so the
//! accept loop stays responsive.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tiny_http::{Header, Method, Request, Response, Server};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::analysis::{AnalysisParams, Analyzer};
use crate::error::AnalyzeError;
use crate::github::RepoGateway;
use crate::types::{AnalysisRequest, AnalysisResponse};

/// Dates in request bodies use this format.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// How long the accept loop waits before re-checking for shutdown.
const RECV_TIMEOUT: Duration = Duration::from_millis(500);

/// Run the HTTP server until the shutdown token fires.
///
/// Analyses started before shutdown observe the cancellation through their
/// child tokens and abort promptly.
pub fn serve<G>(
    port: u16,
    analyzer: Arc<Analyzer<G>>,
    handle: Handle,
    shutdown: CancellationToken,
) -> anyhow::Result<()>
where
    G: RepoGateway + 'static,
{
    let addr = format!("0.0.0.0:{port}");
    let server =
        Server::http(&addr).map_err(|err| anyhow::anyhow!("failed to bind {addr}: {err}"))?;
    tracing::info!(%addr, "listening");

    while !shutdown.is_cancelled() {
        let request = match server.recv_timeout(RECV_TIMEOUT) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(err) => {
                tracing::error!(error = %err, "accept failed");
                continue;
            }
        };

        let analyzer = Arc::clone(&analyzer);
        let handle = handle.clone();
        let cancel = shutdown.child_token();
        std::thread::spawn(move || handle_request(request, analyzer, handle, cancel));
    }

    tracing::info!("server stopped");
    Ok(())
}

fn handle_request<G>(
    mut request: Request,
    analyzer: Arc<Analyzer<G>>,
    handle: Handle,
    cancel: CancellationToken,
) where
    G: RepoGateway + 'static,
{
    let method = request.method().clone();
    let url = request.url().to_string();
    tracing::debug!(%method, %url, "request");

    // The query string, if any, plays no part in routing.
    let route = url.split('?').next().unwrap_or_default();

    let response = match (&method, route) {
        (Method::Options, _) => empty_response(204),
        (Method::Get, "/api/ping") => json_response(200, &serde_json::json!({"message": "pong"})),
        (Method::Post, "/api/analyze") => analyze(&mut request, &analyzer, &handle, cancel),
        _ => error_response(404, "not found"),
    };

    if let Err(err) = request.respond(response) {
        tracing::warn!(error = %err, "failed to write response");
    }
}

fn analyze<G>(
    request: &mut Request,
    analyzer: &Analyzer<G>,
    handle: &Handle,
    cancel: CancellationToken,
) -> Response<std::io::Cursor<Vec<u8>>>
where
    G: RepoGateway + 'static,
{
    let mut body = String::new();
    if let Err(err) = request.as_reader().read_to_string(&mut body) {
        return error_response(400, &format!("failed to read request body: {err}"));
    }

    let parsed: AnalysisRequest = match serde_json::from_str(&body) {
        Ok(parsed) => parsed,
        Err(err) => return error_response(400, &format!("invalid request format: {err}")),
    };

    let params = match validate(&parsed) {
        Ok(params) => params,
        Err(message) => return error_response(400, &message),
    };

    match handle.block_on(analyzer.analyze(params, cancel)) {
        Ok(user_changes) => json_response(
            200,
            &AnalysisResponse {
                repository: format!("{}/{}", parsed.owner, parsed.repo),
                time_range: format!("{} to {}", parsed.start_date, parsed.end_date),
                user_changes,
                error: None,
            },
        ),
        Err(err) => {
            tracing::error!(owner = %parsed.owner, repo = %parsed.repo, error = %err, "analysis failed");
            let status = match err {
                AnalyzeError::Contributors(_) | AnalyzeError::Commits(_) => 502,
                AnalyzeError::Cancelled => 500,
            };
            error_response(status, &format!("analysis failed: {err}"))
        }
    }
}

/// Check the request's fields and convert the dates into analysis parameters.
fn validate(request: &AnalysisRequest) -> Result<AnalysisParams, String> {
    if request.owner.trim().is_empty() || request.repo.trim().is_empty() {
        return Err("owner and repo must not be empty".to_string());
    }
    let start_date = parse_date(&request.start_date)?;
    let end_date = parse_date(&request.end_date)?;
    if end_date < start_date {
        return Err("end_date must not precede start_date".to_string());
    }
    Ok(AnalysisParams {
        owner: request.owner.clone(),
        repo: request.repo.clone(),
        start_date,
        end_date,
    })
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| format!("invalid date `{value}`, expected YYYY-MM-DD"))
}

fn json_response<T: serde::Serialize>(status: u16, body: &T) -> Response<std::io::Cursor<Vec<u8>>> {
    let body = serde_json::to_vec(body).unwrap_or_default();
    with_cors(Response::from_data(body).with_status_code(status))
        .with_header(header("Content-Type", "application/json"))
}

fn error_response(status: u16, message: &str) -> Response<std::io::Cursor<Vec<u8>>> {
    json_response(
        status,
        &AnalysisResponse {
            error: Some(message.to_string()),
            ..AnalysisResponse::default()
        },
    )
}

fn empty_response(status: u16) -> Response<std::io::Cursor<Vec<u8>>> {
    with_cors(Response::from_data(Vec::new()).with_status_code(status))
}

fn with_cors(response: Response<std::io::Cursor<Vec<u8>>>) -> Response<std::io::Cursor<Vec<u8>>> {
    response
        .with_header(header("Access-Control-Allow-Origin", "*"))
        .with_header(header("Access-Control-Allow-Methods", "POST, GET, OPTIONS"))
        .with_header(header("Access-Control-Allow-Headers", "Content-Type"))
}

fn header(name: &str, value: &str) -> Header {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).expect("static header is valid")
}
