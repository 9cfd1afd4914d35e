use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use serde::Deserialize;
use tracing::info;

use super::index::{page, Notice};
use crate::auth::ResetCredentials;
use crate::csrf_protection::{CsrfSafeForm, CsrfToken};
use crate::MyState;

#[derive(Deserialize)]
pub struct ResetForm {
    csrf_token: String,
    #[serde(default)]
    admin: Option<String>,
    #[serde(default)]
    pin: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

impl CsrfToken for ResetForm {
    fn csrf_token(&self) -> &str {
        &self.csrf_token
    }
}

pub async fn reset(
    State(state): State<MyState>,
    CsrfSafeForm { session, value }: CsrfSafeForm<ResetForm>,
) -> Response {
    let credentials = ResetCredentials {
        admin: value.admin,
        pin: value.pin,
        password: value.password,
    };
    match state.roster.authorize_reset(&credentials) {
        Ok(()) => {
            let cleared = state.store.reset();
            info!(cleared, "round reset from the page");
            page(
                &state,
                session,
                StatusCode::OK,
                Some(Notice::success(format!(
                    "Votación reiniciada por autoridad competente ({cleared} votos descartados)."
                ))),
            )
        }
        Err(error) => {
            error.log();
            page(&state, session, error.status_code(), Some(Notice::error(&error)))
        }
    }
}
