use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AnswerValue, EngineError, QuestionId, SessionId};
use super::repository::SessionStore;
use super::service::{AssessmentService, ServiceError};

/// Router builder exposing the caller-facing session API over HTTP.
pub fn assessment_router<S>(service: Arc<AssessmentService<S>>) -> Router
where
    S: SessionStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/assessments/:session_id/start",
            post(start_handler::<S>),
        )
        .route(
            "/api/v1/assessments/:session_id/answers",
            post(submit_handler::<S>),
        )
        .route(
            "/api/v1/assessments/:session_id/next",
            post(next_handler::<S>),
        )
        .route(
            "/api/v1/assessments/:session_id/previous",
            post(previous_handler::<S>),
        )
        .route(
            "/api/v1/assessments/:session_id/reset",
            post(reset_handler::<S>),
        )
        .route(
            "/api/v1/assessments/:session_id/question",
            get(question_handler::<S>),
        )
        .route(
            "/api/v1/assessments/:session_id/stage",
            get(stage_handler::<S>),
        )
        .route(
            "/api/v1/assessments/:session_id/result",
            get(result_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRequest {
    pub question_id: String,
    pub value: AnswerValue,
    pub time_spent_ms: u64,
}

pub(crate) async fn start_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.start(SessionId(session_id)) {
        Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<SubmitRequest>,
) -> Response
where
    S: SessionStore + 'static,
{
    let outcome = service.submit_answer(
        &SessionId(session_id),
        QuestionId(request.question_id),
        request.value,
        request.time_spent_ms,
    );

    match outcome {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn next_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.next(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn previous_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.previous(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn reset_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.reset(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn question_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.current_question(&SessionId(session_id)) {
        Ok(Some(question)) => (StatusCode::OK, axum::Json(question)).into_response(),
        Ok(None) => {
            let payload = json!({ "question": serde_json::Value::Null });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn stage_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.stage(&SessionId(session_id)) {
        Ok(stage) => {
            let payload = json!({ "stage": stage, "stage_label": stage.label() });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn result_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.result(&SessionId(session_id)) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: ServiceError) -> Response {
    let status = match &err {
        ServiceError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Engine(EngineError::InvalidTransition { .. }) => StatusCode::CONFLICT,
        ServiceError::Engine(
            EngineError::RequiredUnanswered(_) | EngineError::AtFirstQuestion,
        ) => StatusCode::UNPROCESSABLE_ENTITY,
    };

    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
