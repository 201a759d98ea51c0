//! # sharesum-server
//!
//! Upload form and HTTP API for per-account share totals.

mod config;
mod form;
mod upload;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use config::ServerConfig;
use form::FormState;
use serde::{Deserialize, Serialize};
use sharesum_sheet::{process, ProcessRequest, ProcessedWorkbook, ShareSummary, SheetError};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use upload::FormInput;

type AppState = Arc<ServerConfig>;

/// Health check response.
#[derive(Serialize, Deserialize)]
pub struct Health {
    /// Server status ("ok" when healthy).
    pub status: String,
    /// Server version from Cargo.toml.
    pub version: String,
}

/// Error body returned by the JSON API.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    /// `missing_column` or `error`.
    pub kind: String,
    pub message: String,
}

/// Health check endpoint handler.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /`: the idle form.
async fn show_form() -> Html<String> {
    Html(FormState::Idle.render())
}

/// `POST /`: advance the form with the submitted fields.
async fn submit_form(State(config): State<AppState>, multipart: Multipart) -> Response {
    let input = match FormInput::read(multipart).await {
        Ok(input) => input,
        Err(e) => {
            warn!(error = %e, "form submission could not be read");
            let reason = if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                format!(
                    "the upload is larger than the {} byte limit",
                    config.max_upload_bytes
                )
            } else {
                e.body_text()
            };
            let page = FormState::rejected(&reason, &config).render();
            return (e.status(), Html(page)).into_response();
        }
    };

    match tokio::task::spawn_blocking(move || FormState::from_input(input, &config)).await {
        Ok(state) => Html(state.render()).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// A failed API request: the status to answer with and the error to report.
struct Failure {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl Failure {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "error",
            message: message.into(),
        }
    }

    fn into_text(self) -> Response {
        (self.status, self.message).into_response()
    }

    fn into_json(self) -> Response {
        let body = ApiError {
            kind: self.kind.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<SheetError> for Failure {
    fn from(e: SheetError) -> Self {
        if e.is_missing_column() {
            Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                kind: "missing_column",
                message: e.to_string(),
            }
        } else {
            Self::bad_request(e.to_string())
        }
    }
}

/// Read the multipart body, require all three fields and run the transform.
async fn run_request(multipart: Multipart) -> Result<ProcessedWorkbook, Failure> {
    let input = FormInput::read(multipart).await.map_err(|e| Failure {
        status: e.status(),
        kind: "error",
        message: e.body_text(),
    })?;

    let file = input
        .workbook()
        .map_err(|e| Failure::bad_request(e.to_string()))?
        .ok_or_else(|| Failure::bad_request("missing workbook upload"))?;
    let account_column = input
        .account_column
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Failure::bad_request("missing account column name"))?;
    let share_column = input
        .share_column
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Failure::bad_request("missing share column name"))?;

    let request = ProcessRequest::new(file.bytes, account_column, share_column);
    let result = tokio::task::spawn_blocking(move || process(&request))
        .await
        .map_err(|e| Failure {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: "error",
            message: e.to_string(),
        })?;

    match result {
        Ok(output) => {
            info!(file = %file.name, accounts = output.summary.len(), "processed workbook");
            Ok(output)
        }
        Err(e) => {
            warn!(file = %file.name, error = %e, "processing failed");
            Err(e.into())
        }
    }
}

/// `POST /process`: answer with the summary workbook as an attachment.
async fn process_download(multipart: Multipart) -> Response {
    match run_request(multipart).await {
        Ok(output) => (
            [
                (header::CONTENT_TYPE, output.content_type().to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", output.file_name()),
                ),
            ],
            output.bytes,
        )
            .into_response(),
        Err(failure) => failure.into_text(),
    }
}

/// `POST /api/summary`: answer with the summary rows as JSON.
async fn process_summary(multipart: Multipart) -> Response {
    match run_request(multipart).await {
        Ok(output) => Json::<ShareSummary>(output.summary).into_response(),
        Err(failure) => failure.into_json(),
    }
}

/// Create the application router.
///
/// This is separated from `main()` to allow testing.
pub fn create_router(config: ServerConfig) -> Router {
    let body_limit = DefaultBodyLimit::max(config.max_upload_bytes);
    let form_limit = DefaultBodyLimit::max(config.form_body_limit());
    Router::new()
        .route("/", get(show_form).post(submit_form).layer(form_limit))
        .route("/process", post(process_download).layer(body_limit))
        .route("/api/summary", post(process_summary).layer(body_limit))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(config))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::parse();
    let addr = config.bind;
    let app = create_router(config);

    info!("sharesum-server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
