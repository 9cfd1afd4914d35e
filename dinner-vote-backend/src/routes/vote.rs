use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use dinner_vote_store::Participant;
use serde::Deserialize;

use super::index::{page, Notice};
use crate::csrf_protection::{CsrfSafeForm, CsrfToken};
use crate::error::AppError;
use crate::MyState;

#[derive(Deserialize)]
pub struct Ballot {
    csrf_token: String,
    participant: String,
    pin: String,
    // no radio button checked means no field at all
    #[serde(default)]
    option: String,
    #[serde(default)]
    elaboration: Option<String>,
}

impl CsrfToken for Ballot {
    fn csrf_token(&self) -> &str {
        &self.csrf_token
    }
}

/// PIN check, option check, then the store. Shared by the form and the
/// JSON API.
pub fn cast_vote(
    state: &MyState,
    name: &str,
    pin: &str,
    option: &str,
    elaboration: Option<&str>,
) -> Result<(Participant, String), AppError> {
    let participant = state.roster.authenticate(name, pin)?;
    if !state.options.current().contains(option) {
        return Err(AppError::UnknownOption(option.to_owned()));
    }
    let vote = state
        .store
        .register_vote(&participant, option, elaboration)?;
    Ok((participant, vote))
}

pub async fn vote(
    State(state): State<MyState>,
    CsrfSafeForm { session, value }: CsrfSafeForm<Ballot>,
) -> Response {
    match cast_vote(
        &state,
        &value.participant,
        &value.pin,
        &value.option,
        value.elaboration.as_deref(),
    ) {
        Ok((participant, vote)) => page(
            &state,
            session,
            StatusCode::OK,
            Some(Notice::success(format!(
                "Voto registrado: {participant} → {vote}"
            ))),
        ),
        Err(error) => {
            error.log();
            page(&state, session, error.status_code(), Some(Notice::error(&error)))
        }
    }
}
