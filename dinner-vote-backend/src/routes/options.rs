use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use dinner_vote_store::OptionList;
use serde::Deserialize;
use tracing::info;

use super::index::{page, Notice};
use crate::csrf_protection::{CsrfSafeForm, CsrfToken};
use crate::error::AppError;
use crate::MyState;

#[derive(Deserialize)]
pub struct OptionsForm {
    csrf_token: String,
    /// One option per line.
    #[serde(default)]
    options: String,
}

impl CsrfToken for OptionsForm {
    fn csrf_token(&self) -> &str {
        &self.csrf_token
    }
}

pub async fn options(
    State(state): State<MyState>,
    CsrfSafeForm { session, value }: CsrfSafeForm<OptionsForm>,
) -> Response {
    let Some(options) = OptionList::from_text(&value.options) else {
        let error = AppError::EmptyOptionList;
        error.log();
        return page(&state, session, error.status_code(), Some(Notice::error(&error)));
    };
    let previous = state.options.replace(options);
    info!(previous = ?previous.labels(), current = ?state.options.current().labels(), "options replaced");
    page(
        &state,
        session,
        StatusCode::OK,
        Some(Notice::success("Opciones actualizadas.")),
    )
}
