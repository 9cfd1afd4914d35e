#![allow(dead_code, clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use dinner_vote_backend::{build_state, router};
use dinner_vote_config::{Config, DeadlinePolicy};
use http_body_util::BodyExt as _;
use serde_json::Value;
use tower::ServiceExt as _;

pub const RESET_PASSWORD: &str = "abrete sesamo";

/// Defaults with voting always open, so tests do not depend on the hour.
pub fn config() -> Config {
    Config {
        deadline: DeadlinePolicy::Disabled,
        reset_password: Some(RESET_PASSWORD.to_owned()),
        ..Config::default()
    }
}

pub fn app() -> Router {
    app_with(config())
}

pub fn app_with(config: Config) -> Router {
    router(build_state(config).unwrap())
}

pub async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn send_json(app: &Router, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = body_string(response).await;
    (status, serde_json::from_str(&body).unwrap())
}

pub async fn get_json(app: &Router, uri: &str) -> Value {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    serde_json::from_str(&body_string(response).await).unwrap()
}

pub async fn vote(
    app: &Router,
    participant: &str,
    pin: &str,
    option: &str,
    elaboration: Option<&str>,
) -> (StatusCode, Value) {
    send_json(
        app,
        Method::POST,
        "/api/votes",
        serde_json::json!({
            "participant": participant,
            "pin": pin,
            "option": option,
            "elaboration": elaboration,
        }),
    )
    .await
}

/// A client that keeps the session cookie between requests.
pub struct Browser {
    app: Router,
    cookie: Option<String>,
}

impl Browser {
    pub fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    async fn send(&mut self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let set_cookie = set_cookie.to_str().unwrap();
            let pair = set_cookie.split(';').next().unwrap();
            self.cookie = Some(pair.to_owned());
        }
        let status = response.status();
        (status, body_string(response).await)
    }

    fn request(&self, method: Method, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    pub async fn get(&mut self, uri: &str) -> (StatusCode, String) {
        let request = self.request(Method::GET, uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> (StatusCode, String) {
        let request = self
            .request(Method::POST, uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(serde_urlencoded::to_string(fields).unwrap()))
            .unwrap();
        self.send(request).await
    }

    pub const fn cookie(&self) -> Option<&String> {
        self.cookie.as_ref()
    }
}

/// The value of the first hidden `csrf_token` field on the page.
pub fn csrf_token(page: &str) -> String {
    const NEEDLE: &str = r#"name="csrf_token" value=""#;
    let start = page.find(NEEDLE).unwrap() + NEEDLE.len();
    let end = start + page[start..].find('"').unwrap();
    page[start..end].to_owned()
}
