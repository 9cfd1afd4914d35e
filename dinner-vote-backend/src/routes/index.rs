use core::cmp::Reverse;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use chrono::Utc;
use dinner_vote_store::{progress, tally, Outcome, VoteError};
use rand::seq::SliceRandom as _;
use rand::thread_rng;
use serde::Serialize;

use crate::error::AppError;
use crate::session::Session;
use crate::templating::INDEX;
use crate::MyState;

pub const TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

const COMMENTARY: [&str; 4] = [
    "La voluntad popular ha hablado (y se equivoca con seguridad).",
    "Esto es estadística aplicada al hambre.",
    "No lloren, organicen revancha.",
    "Si sale empate, se resuelve con piedra-papel-tijera o soborno en papas fritas.",
];

/// Feedback about the last form that was sent.
#[derive(Serialize, Debug)]
pub struct Notice {
    pub success: bool,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(error: &AppError) -> Self {
        let message = match error {
            AppError::Vote(VoteError::AlreadyVoted { existing }) => format!(
                "Ya votaste: {existing}. Si te arrepentís: lobby por WhatsApp como corresponde."
            ),
            AppError::Vote(VoteError::MissingElaboration { option }) => {
                format!("Especificá qué {} (Tacuarí, Atenas, etc.).", option.to_lowercase())
            }
            AppError::Vote(VoteError::VotingClosed) => {
                "La votación ya cerró. Mañana será otro día.".to_owned()
            }
            AppError::UnknownParticipant(name) => format!("{name:?} no está en la lista."),
            AppError::WrongPin => {
                "Clave incorrecta. Intento de fraude gastronómico detectado.".to_owned()
            }
            AppError::NotAdministrator { admin } => {
                format!("Solo {admin} puede reiniciar la votación.")
            }
            AppError::WrongResetPassword => "Clave de reinicio incorrecta.".to_owned(),
            AppError::UnknownOption(option) if option.is_empty() => {
                "Elegí el destino gastronómico.".to_owned()
            }
            AppError::UnknownOption(option) => format!("{option:?} no es una de las opciones."),
            AppError::EmptyOptionList => {
                "La lista de opciones necesita al menos una opción.".to_owned()
            }
            other => other.to_string(),
        };
        Self {
            success: false,
            message,
        }
    }
}

#[derive(Serialize)]
struct ParticipantView<'a> {
    name: &'a str,
    voted: bool,
}

#[derive(Serialize)]
struct OptionView<'a> {
    label: &'a str,
    elaborate: bool,
}

#[derive(Serialize)]
struct VoteRow<'a> {
    participant: &'a str,
    vote: &'a str,
}

#[derive(Serialize)]
struct ResultRow<'a> {
    option: &'a str,
    count: usize,
    leader: bool,
}

#[derive(Serialize)]
struct IndexPage<'a> {
    csrf_token: &'a str,
    title: &'a str,
    region: &'a str,
    now: String,
    refresh_seconds: u32,
    open: bool,
    deadline: Option<String>,
    notice: Option<Notice>,
    participants: Vec<ParticipantView<'a>>,
    pending: String,
    complete: bool,
    options: Vec<OptionView<'a>>,
    options_text: String,
    elaboration_option: &'a str,
    votes: Vec<VoteRow<'a>>,
    results: Vec<ResultRow<'a>>,
    max_count: usize,
    winner: Option<&'a str>,
    tie: Option<String>,
    commentary: Option<&'static str>,
    admin: &'a str,
}

fn render(state: &MyState, session: &Session, notice: Option<Notice>) -> Result<String, AppError> {
    let votes = state.store.snapshot();
    let result = tally(&votes);
    let round = progress(state.roster.participants(), &votes);
    let options = state.options.current();

    let mut results: Vec<ResultRow<'_>> = result
        .counts
        .iter()
        .map(|(option, &count)| ResultRow {
            option,
            count,
            leader: count == result.max_count,
        })
        .collect();
    results.sort_by_key(|row| Reverse(row.count));

    let (winner, tie) = match result.outcome() {
        Outcome::NoVotes => (None, None),
        Outcome::Winner { option, .. } => (Some(option), None),
        Outcome::Tie { options, .. } => (None, Some(options.join(", "))),
    };

    let page = IndexPage {
        csrf_token: session.csrf_token(),
        title: &state.config.title,
        region: &state.config.region,
        now: Utc::now()
            .with_timezone(&state.offset)
            .format(TIME_FORMAT)
            .to_string(),
        refresh_seconds: state.config.refresh_seconds,
        open: state.store.is_open(),
        deadline: state.store.deadline().map(|deadline| {
            deadline
                .with_timezone(&state.offset)
                .format(TIME_FORMAT)
                .to_string()
        }),
        notice,
        participants: state
            .roster
            .participants()
            .map(|participant| ParticipantView {
                name: participant.as_str(),
                voted: votes.contains_key(participant),
            })
            .collect(),
        pending: round
            .pending
            .iter()
            .map(|participant| participant.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        complete: round.complete,
        options: options
            .labels()
            .iter()
            .map(|label| OptionView {
                label,
                elaborate: state.store.rule().applies_to(label),
            })
            .collect(),
        options_text: options.to_text(),
        elaboration_option: state.store.rule().label(),
        votes: votes
            .iter()
            .map(|(participant, vote)| VoteRow {
                participant: participant.as_str(),
                vote,
            })
            .collect(),
        results,
        max_count: result.max_count,
        winner,
        tie,
        commentary: if result.is_empty() {
            None
        } else {
            COMMENTARY.choose(&mut thread_rng()).copied()
        },
        admin: state.roster.admin().as_str(),
    };
    Ok(state.templates.render(INDEX, &page)?)
}

/// Renders the whole page, answering with `status`.
pub fn page(
    state: &MyState,
    session: Session,
    status: StatusCode,
    notice: Option<Notice>,
) -> Response {
    match render(state, &session, notice) {
        Ok(body) => (status, session, Html(body)).into_response(),
        Err(error) => (session, error).into_response(),
    }
}

pub async fn index(State(state): State<MyState>, session: Session) -> Response {
    page(&state, session, StatusCode::OK, None)
}
