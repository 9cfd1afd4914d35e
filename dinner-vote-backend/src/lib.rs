//! Web front end of the dinner vote.
//!
//! Every request handler works against one [`MyState`], built once per
//! process by [`build_state`]. The state hands out shared handles to the
//! single [`VoteStore`] and [`OptionBoard`]; nothing here keeps votes of its
//! own.

pub mod auth;
pub mod csrf_protection;
pub mod error;
pub mod routes;
pub mod session;
pub mod telemetry;
pub mod templating;

use std::sync::Arc;

use axum::extract::FromRef;
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::cookie::Key;
use chrono::{DateTime, FixedOffset, Utc};
use dinner_vote_config::{Config, DeadlinePolicy};
use dinner_vote_store::{end_of_day, ElaborationRule, OptionBoard, OptionList, VoteStore};
use handlebars::Handlebars;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, SetRequestIdLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn};

use crate::auth::Roster;
use crate::error::AppError;
use crate::routes::{api, index, options, reset, vote};

#[derive(Clone, FromRef)]
pub struct MyState {
    pub store: Arc<VoteStore>,
    pub options: Arc<OptionBoard>,
    pub roster: Arc<Roster>,
    pub config: Arc<Config>,
    pub templates: Arc<Handlebars<'static>>,
    /// Local time of the round, used for the deadline and every timestamp
    /// shown.
    pub offset: FixedOffset,
    pub key: Key,
}

/// Turns the configured policy into the cutoff of this process' round.
#[must_use]
pub fn resolve_deadline(
    policy: DeadlinePolicy,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match policy {
        DeadlinePolicy::Disabled => None,
        DeadlinePolicy::EndOfDay => {
            let deadline = end_of_day(now, offset);
            if deadline.is_none() {
                warn!("could not compute the end of {now}, voting stays open");
            }
            deadline
        }
        DeadlinePolicy::Fixed { at } => Some(at.with_timezone(&Utc)),
    }
}

pub fn build_state(config: Config) -> Result<MyState, AppError> {
    let config = config.validate()?;
    let offset = config.utc_offset()?;
    let deadline = resolve_deadline(config.deadline, offset, Utc::now());
    if let Some(deadline) = deadline {
        info!(
            "voting closes at {}",
            deadline.with_timezone(&offset).format("%d/%m/%Y %H:%M:%S")
        );
    }

    let store =
        VoteStore::new(ElaborationRule::new(&config.elaboration_option)).with_deadline(deadline);
    let options = OptionList::new(&config.options).ok_or(AppError::EmptyOptionList)?;
    let roster = Roster::from_config(&config);

    Ok(MyState {
        store: Arc::new(store),
        options: Arc::new(OptionBoard::new(options)),
        roster: Arc::new(roster),
        config: Arc::new(config),
        templates: Arc::new(templating::registry()?),
        offset,
        key: Key::generate(),
    })
}

pub fn router(state: MyState) -> Router {
    let app: Router<MyState> = Router::new()
        .route("/", get(index::index))
        .route("/vote", post(vote::vote))
        .route("/reset", post(reset::reset))
        .route("/options", post(options::options))
        .route("/api/votes", get(api::list_votes).post(api::register_vote))
        .route("/api/tally", get(api::show_tally))
        .route("/api/reset", post(api::reset))
        .route("/api/options", get(api::list_options));

    // layers are in reverse order
    let app: Router<()> = app.with_state(state);
    let app = app.layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::default().include_headers(true))
                    .on_response(DefaultOnResponse::default().include_headers(true)),
            )
            .layer(CatchPanicLayer::new()),
    );
    app.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

pub async fn run_server(config: Config) -> Result<(), AppError> {
    info!("starting up server...");

    let listen = config.listen;
    let app = router(build_state(config)?);

    let listener = TcpListener::bind(listen).await?;
    info!("listening on {listen}");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!("failed to install signal handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    warn!("SHUTDOWN");
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn buenos_aires() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    #[test]
    fn end_of_day_is_local_midnight() {
        // 22:30 in Buenos Aires
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 1, 30, 0).unwrap();
        let deadline = resolve_deadline(DeadlinePolicy::EndOfDay, buenos_aires(), now);
        assert_eq!(deadline, Some(Utc.with_ymd_and_hms(2024, 3, 9, 3, 0, 0).unwrap()));
    }

    #[test]
    fn fixed_and_disabled() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 1, 30, 0).unwrap();
        let at = buenos_aires()
            .with_ymd_and_hms(2024, 3, 8, 21, 0, 0)
            .unwrap();
        assert_eq!(
            resolve_deadline(DeadlinePolicy::Fixed { at }, buenos_aires(), now),
            Some(Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap())
        );
        assert_eq!(
            resolve_deadline(DeadlinePolicy::Disabled, buenos_aires(), now),
            None
        );
    }

    #[test]
    fn state_rejects_invalid_config() {
        let config = Config {
            admin: "Nadie".to_owned(),
            ..Config::default()
        };
        assert!(matches!(build_state(config), Err(AppError::Config(_))));
    }
}
