//! HTTP surface: request/response shapes, handlers, and error mapping.
//!
//! Two endpoints mirror the two ways a student reaches the tutor:
//!
//! - `POST /run-code` - compile and run the submission, then generate a
//!   hint from the effective output.
//! - `POST /request-hint` - the caller already has output text; generate a
//!   hint without touching the compiler or sandbox.
//!
//! Error mapping: validation, compile failures and timeouts are 400 (they
//! are the student's to fix), infrastructure failures are 500, and an
//! unreachable hint backend is 503. A runtime failure is *not* an error:
//! its stderr and exit code are the effective output the student needs a
//! hint about, so it flows through the 200 path.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use mentor::hint::{HintContext, HintError, HintGenerator};
use mentor::{Error, Runner};

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Compile-and-run orchestrator. `run` takes `&self`; submissions are
    /// isolated per call.
    pub runner: Arc<Runner>,
    /// Hint backend behind its capability trait.
    pub hints: Arc<dyn HintGenerator>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("runner", &self.runner)
            .finish_non_exhaustive()
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/run-code", post(run_code))
        .route("/request-hint", post(request_hint))
        .with_state(state)
}

/// Body of `POST /run-code`.
///
/// Everything beyond `code` is opaque context forwarded to the hint
/// generator; absent fields default to empty.
#[derive(Debug, Deserialize)]
pub struct RunCodeRequest {
    /// The student's C++ source.
    pub code: String,
    /// The question the student is solving.
    #[serde(default)]
    pub problem_statement: String,
    /// Output the student expects.
    #[serde(default)]
    pub expected_output: String,
    /// Previous tutor/student exchanges.
    #[serde(default)]
    pub conversation_history: String,
}

/// Body of `POST /run-code` responses.
#[derive(Debug, Serialize)]
pub struct RunCodeResponse {
    /// Effective program output (stdout, or stderr + exit code).
    pub output: String,
    /// The generated Socratic hint.
    pub response: String,
}

/// Body of `POST /request-hint`.
#[derive(Debug, Deserialize)]
pub struct RequestHintRequest {
    /// The student's C++ source.
    #[serde(default)]
    pub code: String,
    /// The question the student is solving.
    #[serde(default)]
    pub problem_statement: String,
    /// Output the student expects.
    #[serde(default)]
    pub expected_output: String,
    /// Caller-supplied actual output; replaces a fresh run entirely.
    #[serde(default)]
    pub actual_output: String,
    /// Previous tutor/student exchanges.
    #[serde(default)]
    pub conversation_history: String,
}

/// Body of `POST /request-hint` responses.
#[derive(Debug, Serialize)]
pub struct RequestHintResponse {
    /// The generated Socratic hint.
    pub response: String,
}

/// An error that maps onto an HTTP status plus a `detail` message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::EmptySource => Self::bad_request("No code submitted"),
            Error::Infrastructure { .. } | Error::MissingArtifact => {
                // Raw OS details stay in the log, not the response.
                tracing::error!(error = %err, "infrastructure failure");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    detail: "internal error while running submission".into(),
                }
            }
        }
    }
}

impl From<HintError> for ApiError {
    fn from(err: HintError) -> Self {
        let status = match err {
            HintError::Unreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
            HintError::Api { .. } | HintError::MalformedResponse(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        tracing::error!(error = %err, "hint generation failed");
        Self {
            status,
            detail: "hint service failed".into(),
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

/// Compile and run a submission, then generate a hint from its output.
async fn run_code(
    State(state): State<AppState>,
    Json(req): Json<RunCodeRequest>,
) -> Result<Json<RunCodeResponse>, ApiError> {
    let outcome = state.runner.run(&req.code).await?;

    // Compile failures and timeouts have no program output to hint about;
    // report them to the student directly. Anything else carries effective
    // output, runtime failures included.
    let output = match outcome {
        mentor::RunOutcome::CompileFailed { diagnostics } => {
            return Err(ApiError::bad_request(format!(
                "Compilation error: {diagnostics}"
            )));
        }
        mentor::RunOutcome::TimedOut => {
            return Err(ApiError::bad_request("Code execution timed out"));
        }
        ref done => done.effective_output().unwrap_or_default(),
    };

    let ctx = HintContext {
        problem_statement: req.problem_statement,
        code: req.code,
        expected_output: req.expected_output,
        actual_output: output.clone(),
        conversation_history: req.conversation_history,
    };
    let response = state.hints.generate(&ctx).await?;

    Ok(Json(RunCodeResponse { output, response }))
}

/// Generate a hint from caller-supplied output. Never compiles or runs
/// anything.
async fn request_hint(
    State(state): State<AppState>,
    Json(req): Json<RequestHintRequest>,
) -> Result<Json<RequestHintResponse>, ApiError> {
    let ctx = HintContext {
        problem_statement: req.problem_statement,
        code: req.code,
        expected_output: req.expected_output,
        actual_output: req.actual_output,
        conversation_history: req.conversation_history,
    };
    let response = state.hints.generate(&ctx).await?;

    Ok(Json(RequestHintResponse { response }))
}
