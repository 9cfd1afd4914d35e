//! JSON surface for polling clients and other front ends.
//!
//! Requests carry the same credentials as the page forms but no CSRF token,
//! there is no cookie involved.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use dinner_vote_store::{
    progress, tally, OptionBoard, OptionList, Outcome, Participant, RoundProgress, TallyResult,
    VoteError, VoteStore, Votes,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::vote::cast_vote;
use crate::auth::ResetCredentials;
use crate::error::AppError;
use crate::MyState;

#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl From<VoteError> for ApiError {
    fn from(value: VoteError) -> Self {
        Self(value.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self(value.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0.log();
        let body = ErrorBody {
            error: self.0.kind(),
            message: self.0.to_string(),
        };
        (self.0.status_code(), Json(body)).into_response()
    }
}

pub async fn list_votes(State(store): State<Arc<VoteStore>>) -> Json<Votes> {
    Json(store.snapshot())
}

#[derive(Serialize)]
struct Standings<'a> {
    tally: &'a TallyResult,
    outcome: Outcome<'a>,
    progress: RoundProgress,
    open: bool,
    deadline: Option<DateTime<Utc>>,
}

pub async fn show_tally(State(state): State<MyState>) -> Response {
    let votes = state.store.snapshot();
    let result = tally(&votes);
    Json(Standings {
        tally: &result,
        outcome: result.outcome(),
        progress: progress(state.roster.participants(), &votes),
        open: state.store.is_open(),
        deadline: state.store.deadline(),
    })
    .into_response()
}

#[derive(Deserialize)]
pub struct VoteRequest {
    participant: String,
    pin: String,
    option: String,
    #[serde(default)]
    elaboration: Option<String>,
}

#[derive(Serialize)]
pub struct VoteCreated {
    participant: Participant,
    vote: String,
}

pub async fn register_vote(
    State(state): State<MyState>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<VoteCreated>), ApiError> {
    let Json(request) = payload?;
    let (participant, vote) = cast_vote(
        &state,
        &request.participant,
        &request.pin,
        &request.option,
        request.elaboration.as_deref(),
    )?;
    Ok((StatusCode::CREATED, Json(VoteCreated { participant, vote })))
}

#[derive(Serialize)]
pub struct ResetDone {
    cleared: usize,
}

pub async fn reset(
    State(state): State<MyState>,
    payload: Result<Json<ResetCredentials>, JsonRejection>,
) -> Result<Json<ResetDone>, ApiError> {
    let Json(credentials) = payload?;
    state.roster.authorize_reset(&credentials)?;
    let cleared = state.store.reset();
    info!(cleared, "round reset through the api");
    Ok(Json(ResetDone { cleared }))
}

pub async fn list_options(State(options): State<Arc<OptionBoard>>) -> Json<OptionList> {
    Json(options.current())
}
