//! Axum route handlers for the Interview API.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::models::{Difficulty, InterviewResults};
use crate::interview::service::{InterviewService, RoundOutcome, StartedInterview};
use crate::models::interview::{InterviewRecord, InterviewSummary};
use crate::state::AppState;

const MAX_ROLE_LEN: usize = 100;
const MAX_ANSWER_LEN: usize = 10_000;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInterviewRequest {
    pub user_id: Uuid,
    pub role: String,
    pub difficulty: Difficulty,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub user_id: Uuid,
    pub answer: String,
}

fn service(state: &AppState) -> InterviewService<'_> {
    InterviewService {
        repository: state.interviews.as_ref(),
        sessions: &state.sessions,
        gateway: state.llm.clone(),
        llm_timeout: state.config.llm_timeout(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews
///
/// Creates the interview and returns its first question.
pub async fn handle_start_interview(
    State(state): State<AppState>,
    payload: Result<Json<StartInterviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StartedInterview>), AppError> {
    let Json(request) = payload?;
    let role = request.role.trim();
    if role.is_empty() {
        return Err(AppError::Validation("role cannot be empty".to_string()));
    }
    if role.chars().count() > MAX_ROLE_LEN {
        return Err(AppError::Validation(format!(
            "role cannot exceed {MAX_ROLE_LEN} characters"
        )));
    }

    let started = service(&state)
        .start_interview(request.user_id, role.to_string(), request.difficulty)
        .await?;

    Ok((StatusCode::CREATED, Json(started)))
}

/// POST /api/v1/interviews/:id/answers
///
/// Evaluates the answer to the outstanding question and asks the next one,
/// or completes the interview after the last round.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<SubmitAnswerRequest>, JsonRejection>,
) -> Result<Json<RoundOutcome>, AppError> {
    let Path(interview_id) = path?;
    let Json(request) = payload?;
    let answer = request.answer.trim();
    if answer.is_empty() {
        return Err(AppError::Validation("answer cannot be empty".to_string()));
    }
    if answer.chars().count() > MAX_ANSWER_LEN {
        return Err(AppError::Validation(format!(
            "answer cannot exceed {MAX_ANSWER_LEN} characters"
        )));
    }

    let outcome = service(&state)
        .submit_answer(request.user_id, interview_id, answer.to_string())
        .await?;

    Ok(Json(outcome))
}

/// GET /api/v1/interviews
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    query: Result<Query<UserIdQuery>, QueryRejection>,
) -> Result<Json<Vec<InterviewSummary>>, AppError> {
    let Query(params) = query?;
    let interviews = state.interviews.list_for_user(params.user_id).await?;
    Ok(Json(interviews))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<UserIdQuery>, QueryRejection>,
) -> Result<Json<InterviewRecord>, AppError> {
    let Path(interview_id) = path?;
    let Query(params) = query?;
    let interview = state
        .interviews
        .find_for_user(interview_id, params.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {interview_id} not found")))?;
    Ok(Json(interview))
}

/// GET /api/v1/interviews/:id/results
pub async fn handle_get_results(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<UserIdQuery>, QueryRejection>,
) -> Result<Json<InterviewResults>, AppError> {
    let Path(interview_id) = path?;
    let Query(params) = query?;
    let results = service(&state)
        .results(params.user_id, interview_id)
        .await?;
    Ok(Json(results))
}
