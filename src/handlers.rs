// handlers.rs
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request, State};
use axum::http::request::Parts;
use axum::Json;
use serde::Serialize;

use crate::error::ApiError;
use crate::models::{
    CreatePollRequest, CreatedPoll, DeleteResponse, Poll, PollResults, ValidationError, VoteRequest,
};
use crate::state::AppState;

/// Poll id taken from the path; anything but an integer is a 400.
pub struct PollId(pub i64);

impl<S> FromRequestParts<S> for PollId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Missing { field: "poll id" }))?;

        let id = raw.parse::<i64>().map_err(|_| {
            ApiError::Validation(ValidationError::InvalidFormat {
                field: "poll id",
                reason: "must be an integer",
            })
        })?;

        Ok(Self(id))
    }
}

/// `Json` whose rejections come back in the API's error format.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::MalformedBody(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Create a poll from a question and at least two options
pub async fn create_poll(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreatePollRequest>,
) -> Result<Json<CreatedPoll>, ApiError> {
    let (question, options) = req.normalize()?;
    let id = state.repo.create_poll(&question, &options).await?;
    Ok(Json(CreatedPoll { id }))
}

/// List every poll, newest first
pub async fn list_polls(State(state): State<AppState>) -> Result<Json<Vec<Poll>>, ApiError> {
    Ok(Json(state.repo.list_polls().await?))
}

pub async fn get_poll(
    State(state): State<AppState>,
    PollId(id): PollId,
) -> Result<Json<Poll>, ApiError> {
    Ok(Json(state.repo.get_poll(id).await?))
}

/// Per-option vote share for a poll
pub async fn get_results(
    State(state): State<AppState>,
    PollId(id): PollId,
) -> Result<Json<PollResults>, ApiError> {
    let poll = state.repo.get_poll(id).await?;
    Ok(Json(poll.results()))
}

/// Vote for one option and return the updated poll
pub async fn vote(
    State(state): State<AppState>,
    PollId(poll_id): PollId,
    ApiJson(req): ApiJson<VoteRequest>,
) -> Result<Json<Poll>, ApiError> {
    let option_id = req
        .option_id
        .ok_or(ValidationError::Missing { field: "optionId" })?;
    Ok(Json(state.repo.vote(poll_id, option_id).await?))
}

/// Delete a poll along with its options
pub async fn delete_poll(
    State(state): State<AppState>,
    PollId(id): PollId,
) -> Result<Json<DeleteResponse>, ApiError> {
    state.repo.delete_poll(id).await?;
    Ok(Json(DeleteResponse { success: true }))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
