use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use axum::{Form, RequestExt as _};
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::session::Session;
use crate::MyState;

pub trait CsrfToken {
    fn csrf_token(&self) -> &str;
}

/// A form body whose `csrf_token` field was checked against the session.
///
/// The session is handed on so the handler can send the cookie back.
pub struct CsrfSafeForm<T: CsrfToken> {
    pub session: Session,
    pub value: T,
}

/// Rejection of a form that could not be parsed or carried a foreign token.
pub struct CsrfRejection {
    pub session: Session,
    pub error: AppError,
}

impl IntoResponse for CsrfRejection {
    fn into_response(self) -> Response {
        (self.session, self.error).into_response()
    }
}

#[async_trait]
impl<T> FromRequest<MyState> for CsrfSafeForm<T>
where
    T: DeserializeOwned + CsrfToken + Send,
{
    type Rejection = CsrfRejection;

    async fn from_request(mut req: Request, state: &MyState) -> Result<Self, Self::Rejection> {
        let not_get_or_head = !(req.method() == Method::GET || req.method() == Method::HEAD);
        let session = match req.extract_parts_with_state::<Session, MyState>(state).await {
            Ok(session) => session,
            Err(infallible) => match infallible {},
        };
        let expected_csrf_token = session.csrf_token().to_owned();

        let result = async move {
            let Form(value) = Form::<T>::from_request(req, state).await?;
            if not_get_or_head && value.csrf_token() != expected_csrf_token {
                return Err(AppError::WrongCsrfToken);
            }
            Ok::<T, AppError>(value)
        };
        match result.await {
            Ok(value) => Ok(Self { session, value }),
            Err(error) => Err(CsrfRejection { session, error }),
        }
    }
}
