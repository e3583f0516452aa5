// HTTP route handlers for the Pyarena API

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use pyarena_common::types::GradingVerdict;
use pyarena_engine::{grader, GradeError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub challenge_id: String,
    pub title: String,
    #[serde(flatten)]
    pub verdict: GradingVerdict,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeSummary {
    pub id: String,
    pub title: String,
    pub tests: usize,
}

/// POST /challenges/{id}/submit - Grade a submission
///
/// Pass and fail are both 200; failure is a normal grading outcome. The
/// error taxonomy maps onto statuses here and nowhere else.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Path(challenge_id): Path<String>,
    Json(payload): Json<SubmitRequest>,
) -> impl IntoResponse {
    info!(
        challenge_id = %challenge_id,
        source_chars = payload.code.chars().count(),
        "Submission received"
    );

    match state.grader.grade(&challenge_id, &payload.code).await {
        Ok(verdict) => {
            let title = suite_title(&state, &challenge_id);
            info!(
                challenge_id = %challenge_id,
                passed = verdict.passed,
                tests = verdict.tests.len(),
                "Submission graded"
            );
            (
                StatusCode::OK,
                Json(SubmitResponse {
                    challenge_id,
                    title,
                    verdict,
                }),
            )
                .into_response()
        }
        Err(GradeError::Timeout) => {
            let title = suite_title(&state, &challenge_id);
            (
                StatusCode::REQUEST_TIMEOUT,
                Json(SubmitResponse {
                    challenge_id,
                    title,
                    verdict: grader::timeout_verdict(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            let status = status_for(&e);
            let message = user_message(&e);
            // Environment detail was already logged inside the engine
            (status, Json(ErrorResponse { error: message })).into_response()
        }
    }
}

/// GET /challenges - List available challenges
pub async fn list_challenges(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let challenges: Vec<ChallengeSummary> = state
        .grader
        .registry()
        .list()
        .iter()
        .map(|suite| ChallengeSummary {
            id: suite.id.clone(),
            title: suite.title.clone(),
            tests: suite.tests.len(),
        })
        .collect();
    (StatusCode::OK, Json(challenges))
}

/// GET /status - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

fn suite_title(state: &AppState, challenge_id: &str) -> String {
    state
        .grader
        .registry()
        .lookup(challenge_id)
        .map(|suite| suite.title.clone())
        .unwrap_or_else(|| challenge_id.to_string())
}

fn status_for(error: &GradeError) -> StatusCode {
    match error {
        GradeError::EmptySubmission => StatusCode::BAD_REQUEST,
        GradeError::SubmissionTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        GradeError::ChallengeNotFound(_) => StatusCode::NOT_FOUND,
        GradeError::Timeout => StatusCode::REQUEST_TIMEOUT,
        GradeError::EvaluationUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn user_message(error: &GradeError) -> String {
    match error {
        // Internal causes never reach the response body
        GradeError::EvaluationUnavailable(_) => {
            "Grading failed. Please try again later.".to_string()
        }
        other => other.to_string(),
    }
}
