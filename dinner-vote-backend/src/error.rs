use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dinner_vote_config::ConfigError;
use dinner_vote_store::VoteError;
use handlebars::{RenderError, TemplateError};
use tracing::{debug, error};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Vote(#[from] VoteError),
    #[error("unknown participant {0:?}")]
    UnknownParticipant(String),
    #[error("wrong PIN")]
    WrongPin,
    #[error("only {admin} can reset the votes")]
    NotAdministrator { admin: String },
    #[error("wrong reset password")]
    WrongResetPassword,
    #[error("{0:?} is not one of the options")]
    UnknownOption(String),
    #[error("the option list must contain at least one option")]
    EmptyOptionList,
    #[error("wrong csrf token")]
    WrongCsrfToken,
    #[error("form submission error: {0}")]
    Form(#[from] FormRejection),
    #[error("json submission error: {0}")]
    Json(#[from] JsonRejection),
    #[error("template error: {0}")]
    Template(#[from] Box<TemplateError>),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Config(#[from] ConfigError),
}

impl From<TemplateError> for AppError {
    fn from(value: TemplateError) -> Self {
        Self::Template(Box::new(value))
    }
}

impl AppError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Vote(VoteError::AlreadyVoted { .. }) => StatusCode::CONFLICT,
            Self::Vote(VoteError::MissingElaboration { .. })
            | Self::UnknownOption(_)
            | Self::EmptyOptionList => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Vote(VoteError::VotingClosed) | Self::NotAdministrator { .. } => {
                StatusCode::FORBIDDEN
            }
            Self::UnknownParticipant(_) | Self::WrongPin | Self::WrongResetPassword => {
                StatusCode::UNAUTHORIZED
            }
            Self::WrongCsrfToken => StatusCode::BAD_REQUEST,
            Self::Form(rejection) => rejection.status(),
            Self::Json(rejection) => rejection.status(),
            Self::Template(_) | Self::Render(_) | Self::Io(_) | Self::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable name of the error, used by the JSON API.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Vote(VoteError::AlreadyVoted { .. }) => "already_voted",
            Self::Vote(VoteError::MissingElaboration { .. }) => "missing_elaboration",
            Self::Vote(VoteError::VotingClosed) => "voting_closed",
            Self::UnknownParticipant(_) => "unknown_participant",
            Self::WrongPin => "wrong_pin",
            Self::NotAdministrator { .. } => "not_administrator",
            Self::WrongResetPassword => "wrong_reset_password",
            Self::UnknownOption(_) => "unknown_option",
            Self::EmptyOptionList => "empty_option_list",
            Self::WrongCsrfToken => "wrong_csrf_token",
            Self::Form(_) | Self::Json(_) => "bad_request",
            Self::Template(_) | Self::Render(_) | Self::Io(_) | Self::Config(_) => "internal",
        }
    }

    pub(crate) fn log(&self) {
        let status = self.status_code();
        if status.is_server_error() {
            error!(kind = self.kind(), "{self}");
        } else {
            debug!(kind = self.kind(), %status, "{self}");
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        (self.status_code(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_errors_keep_their_own_status() {
        let already = AppError::from(VoteError::AlreadyVoted {
            existing: "BACCI".to_owned(),
        });
        let missing = AppError::from(VoteError::MissingElaboration {
            option: "Club".to_owned(),
        });
        let closed = AppError::from(VoteError::VotingClosed);

        assert_eq!(already.status_code(), StatusCode::CONFLICT);
        assert_eq!(missing.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(closed.status_code(), StatusCode::FORBIDDEN);
        assert_ne!(already.kind(), missing.kind());
        assert_ne!(missing.kind(), closed.kind());
    }

    #[test]
    fn credential_errors_are_unauthorized() {
        for error in [
            AppError::UnknownParticipant("Nadie".to_owned()),
            AppError::WrongPin,
            AppError::WrongResetPassword,
        ] {
            assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
        }
    }
}
