//! PIN gate in front of the vote store.
//!
//! The store trusts whoever calls it, so every surface that records a vote
//! or resets the round goes through a [`Roster`] first.

use core::fmt::{self, Debug};

use dinner_vote_config::Config;
use dinner_vote_store::Participant;
use serde::Deserialize;
use tracing::debug;

use crate::error::AppError;

#[derive(Clone, PartialEq, Eq)]
pub struct Pin(String);

impl Pin {
    pub fn new(pin: impl Into<String>) -> Self {
        Self(pin.into())
    }

    fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }
}

impl Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(***)")
    }
}

/// What a reset request may carry. Either the administrator's name and
/// PIN, or the reset password.
#[derive(Deserialize, Default)]
pub struct ResetCredentials {
    #[serde(default)]
    pub admin: Option<String>,
    #[serde(default)]
    pub pin: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct Roster {
    participants: Vec<(Participant, Pin)>,
    admin: Participant,
    reset_password: Option<String>,
}

impl Roster {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            participants: config
                .participants
                .iter()
                .map(|participant| {
                    (
                        Participant::new(participant.name.clone()),
                        Pin::new(participant.pin.clone()),
                    )
                })
                .collect(),
            admin: Participant::new(config.admin.clone()),
            reset_password: config
                .reset_password
                .clone()
                .filter(|password| !password.is_empty()),
        }
    }

    /// Participants in configuration order.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().map(|(participant, _)| participant)
    }

    #[must_use]
    pub const fn admin(&self) -> &Participant {
        &self.admin
    }

    /// Exact comparison, no trimming. `023` and `23` are different PINs.
    pub fn authenticate(&self, name: &str, pin: &str) -> Result<Participant, AppError> {
        let (participant, expected) = self
            .participants
            .iter()
            .find(|(participant, _)| participant.as_str() == name)
            .ok_or_else(|| AppError::UnknownParticipant(name.to_owned()))?;
        if !expected.matches(pin) {
            debug!(%participant, "wrong PIN");
            return Err(AppError::WrongPin);
        }
        Ok(participant.clone())
    }

    pub fn authorize_reset(&self, credentials: &ResetCredentials) -> Result<(), AppError> {
        if let Some(password) = credentials.password.as_deref().filter(|p| !p.is_empty()) {
            return match &self.reset_password {
                Some(expected) if expected == password => Ok(()),
                _ => Err(AppError::WrongResetPassword),
            };
        }
        let name = credentials.admin.as_deref().unwrap_or_default();
        if name != self.admin.as_str() {
            return Err(AppError::NotAdministrator {
                admin: self.admin.to_string(),
            });
        }
        self.authenticate(name, credentials.pin.as_deref().unwrap_or_default())
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(reset_password: Option<&str>) -> Roster {
        Roster::from_config(&Config {
            reset_password: reset_password.map(str::to_owned),
            ..Config::default()
        })
    }

    #[test]
    fn pins_compare_exactly() {
        let roster = roster(None);
        assert_eq!(
            roster.authenticate("Lucho", "023").unwrap(),
            Participant::new("Lucho")
        );
        assert!(matches!(
            roster.authenticate("Lucho", "23"),
            Err(AppError::WrongPin)
        ));
        assert!(matches!(
            roster.authenticate("Lucho", " 023"),
            Err(AppError::WrongPin)
        ));
        assert!(matches!(
            roster.authenticate("lucho", "023"),
            Err(AppError::UnknownParticipant(_))
        ));
    }

    #[test]
    fn only_the_admin_resets() {
        let roster = roster(None);
        let as_rami = ResetCredentials {
            admin: Some("Rami".to_owned()),
            pin: Some("157".to_owned()),
            password: None,
        };
        assert!(matches!(
            roster.authorize_reset(&as_rami),
            Err(AppError::NotAdministrator { .. })
        ));

        let wrong_pin = ResetCredentials {
            admin: Some("Hilo".to_owned()),
            pin: Some("000".to_owned()),
            password: None,
        };
        assert!(matches!(
            roster.authorize_reset(&wrong_pin),
            Err(AppError::WrongPin)
        ));

        let as_hilo = ResetCredentials {
            admin: Some("Hilo".to_owned()),
            pin: Some("623".to_owned()),
            password: None,
        };
        roster.authorize_reset(&as_hilo).unwrap();
    }

    #[test]
    fn reset_password_only_when_configured() {
        let credentials = ResetCredentials {
            password: Some("abrete".to_owned()),
            ..ResetCredentials::default()
        };
        assert!(matches!(
            roster(None).authorize_reset(&credentials),
            Err(AppError::WrongResetPassword)
        ));
        assert!(matches!(
            roster(Some("")).authorize_reset(&credentials),
            Err(AppError::WrongResetPassword)
        ));
        roster(Some("abrete")).authorize_reset(&credentials).unwrap();
    }

    #[test]
    fn pin_is_not_logged() {
        assert_eq!(format!("{:?}", Pin::new("157")), "Pin(***)");
    }
}
