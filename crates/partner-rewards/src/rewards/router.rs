use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
    Router,
};
use serde_json::json;

use super::conditions::EvaluationRequest;
use super::domain::{ProgramId, Reward};
use super::repository::{RewardRepository, RewardSummaryView};
use super::service::{QuoteRequest, RewardProgramService, RewardServiceError};

/// Router builder exposing reward evaluation, configuration, and quoting endpoints.
pub fn reward_router<R>(service: Arc<RewardProgramService<R>>) -> Router
where
    R: RewardRepository + 'static,
{
    Router::new()
        .route("/api/v1/rewards/evaluate", post(evaluate_handler))
        .route(
            "/api/v1/programs/:program_id/rewards",
            put(configure_handler::<R>).get(list_handler::<R>),
        )
        .route(
            "/api/v1/programs/:program_id/commissions/quote",
            post(quote_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn evaluate_handler(
    axum::Json(request): axum::Json<EvaluationRequest>,
) -> Response {
    let response = request.resolve();
    (StatusCode::OK, axum::Json(response)).into_response()
}

pub(crate) async fn configure_handler<R>(
    State(service): State<Arc<RewardProgramService<R>>>,
    Path(program_id): Path<String>,
    axum::Json(mut reward): axum::Json<Reward>,
) -> Response
where
    R: RewardRepository + 'static,
{
    reward.program_id = ProgramId(program_id);
    match service.configure(reward) {
        Ok(stored) => (StatusCode::OK, axum::Json(stored)).into_response(),
        Err(RewardServiceError::Violation(violation)) => {
            let payload = json!({
                "error": violation.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<RewardProgramService<R>>>,
    Path(program_id): Path<String>,
) -> Response
where
    R: RewardRepository + 'static,
{
    let program_id = ProgramId(program_id);
    match service.rewards(&program_id) {
        Ok(rewards) => {
            let views: Vec<RewardSummaryView> =
                rewards.iter().map(RewardSummaryView::from).collect();
            let payload = json!({
                "programId": program_id.0,
                "rewards": views,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn quote_handler<R>(
    State(service): State<Arc<RewardProgramService<R>>>,
    Path(program_id): Path<String>,
    axum::Json(request): axum::Json<QuoteRequest>,
) -> Response
where
    R: RewardRepository + 'static,
{
    match service.quote(&ProgramId(program_id), &request) {
        Ok(quote) => (StatusCode::OK, axum::Json(quote)).into_response(),
        Err(error @ RewardServiceError::NoReward { .. }) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

fn internal_error(error: RewardServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
