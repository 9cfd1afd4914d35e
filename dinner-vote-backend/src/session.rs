use core::convert::Infallible;

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponseParts, ResponseParts};
use axum_extra::extract::cookie::{Cookie, Key, SameSite};
use axum_extra::extract::PrivateCookieJar;
use rand::{thread_rng, Rng as _};
use tracing::debug;

/// Per browser state, kept in an encrypted cookie.
///
/// The only thing stored is the CSRF token that every form on the page has
/// to echo back.
#[derive(Clone)]
pub struct Session {
    private_cookies: PrivateCookieJar,
    csrf_token: String,
}

impl Session {
    pub const COOKIE_NAME: &'static str = "dinner_vote_session";

    #[must_use]
    pub fn new(private_cookies: PrivateCookieJar) -> Self {
        match private_cookies.get(Self::COOKIE_NAME) {
            Some(cookie) if !cookie.value().is_empty() => Self {
                csrf_token: cookie.value().to_owned(),
                private_cookies,
            },
            _ => {
                let csrf_token: String = thread_rng()
                    .sample_iter(&rand::distributions::Alphanumeric)
                    .take(30)
                    .map(char::from)
                    .collect();
                debug!("starting new session");
                let cookie = Cookie::build((Self::COOKIE_NAME, csrf_token.clone()))
                    .http_only(true)
                    .same_site(SameSite::Strict)
                    .path("/");
                Self {
                    private_cookies: private_cookies.add(cookie),
                    csrf_token,
                }
            }
        }
    }

    #[must_use]
    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::from_headers(&parts.headers, Key::from_ref(state));
        Ok(Self::new(jar))
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.private_cookies.into_response_parts(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_survives_the_cookie() {
        let key = Key::generate();
        let first = Session::new(PrivateCookieJar::new(key.clone()));
        assert_eq!(first.csrf_token().len(), 30);

        let cookie = first
            .private_cookies
            .get(Session::COOKIE_NAME)
            .expect("session cookie");
        let second = Session::new(PrivateCookieJar::new(key).add(cookie));
        assert_eq!(second.csrf_token(), first.csrf_token());
    }
}
