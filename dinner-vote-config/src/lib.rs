use core::fmt::{Debug, Display};
use std::collections::HashSet;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use chrono::{DateTime, FixedOffset};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "dinner-vote.toml";
/// Overrides the path of [`CONFIG_FILE`].
pub const CONFIG_FILE_ENV: &str = "DINNER_VOTE_CONFIG";
pub const ENV_PREFIX: &str = "DINNER_VOTE_";

#[derive(Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ParticipantConfig {
    pub name: String,
    /// Kept as a string, leading zeros are part of the PIN.
    pub pin: String,
}

impl Debug for ParticipantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticipantConfig")
            .field("name", &self.name)
            .field("pin", &"***")
            .finish()
    }
}

/// When the round stops accepting votes.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum DeadlinePolicy {
    #[serde(rename = "none")]
    Disabled,
    /// Midnight at the end of the day the server was started on, in the
    /// configured UTC offset.
    #[default]
    EndOfDay,
    Fixed { at: DateTime<FixedOffset> },
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Config {
    pub title: String,
    pub region: String,
    pub listen: SocketAddr,
    pub participants: Vec<ParticipantConfig>,
    pub admin: String,
    #[serde(default)]
    pub reset_password: Option<String>,
    pub options: Vec<String>,
    pub elaboration_option: String,
    pub utc_offset_minutes: i32,
    pub deadline: DeadlinePolicy,
    pub refresh_seconds: u32,
}

impl Default for Config {
    fn default() -> Self {
        let participant = |name: &str, pin: &str| ParticipantConfig {
            name: name.to_owned(),
            pin: pin.to_owned(),
        };
        Self {
            title: "Votación Oficial - Cena".to_owned(),
            region: "La Plata, Provincia de Buenos Aires".to_owned(),
            listen: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 3000)),
            participants: vec![
                participant("Rami", "157"),
                participant("Lucho", "023"),
                participant("Rafa", "820"),
                participant("Rulo", "029"),
                participant("Hilo", "623"),
            ],
            admin: "Hilo".to_owned(),
            reset_password: None,
            options: [
                "BACCI",
                "Bar de birras",
                "Restaurante cheto",
                "Pizzería cheta, de esas que le gustan a Rami",
                "Club",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
            elaboration_option: "Club".to_owned(),
            // America/Argentina/Buenos_Aires, no daylight saving time
            utc_offset_minutes: -180,
            deadline: DeadlinePolicy::EndOfDay,
            refresh_seconds: 15,
        }
    }
}

impl Config {
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::InvalidUtcOffset(self.utc_offset_minutes))
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.participants.is_empty() {
            return Err(ConfigError::NoParticipants);
        }
        let mut seen = HashSet::new();
        for participant in &self.participants {
            if !seen.insert(participant.name.as_str()) {
                return Err(ConfigError::DuplicateParticipant(participant.name.clone()));
            }
            if participant.pin.is_empty() || !participant.pin.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(ConfigError::InvalidPin(participant.name.clone()));
            }
        }
        if !seen.contains(self.admin.as_str()) {
            return Err(ConfigError::UnknownAdmin(self.admin));
        }
        if self.options.iter().all(|option| option.trim().is_empty()) {
            return Err(ConfigError::NoOptions);
        }
        self.utc_offset()?;
        Ok(self)
    }
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] Box<figment::Error>),
    #[error("no participants configured")]
    NoParticipants,
    #[error("participant {0:?} is configured more than once")]
    DuplicateParticipant(String),
    #[error("participant {0:?} needs a PIN made of digits only")]
    InvalidPin(String),
    #[error("administrator {0:?} is not one of the participants")]
    UnknownAdmin(String),
    #[error("no voting options configured")]
    NoOptions,
    #[error("utc offset of {0} minutes is out of range")]
    InvalidUtcOffset(i32),
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self::Figment(Box::new(value))
    }
}

#[must_use]
pub fn figment(path: &str) -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__"))
}

pub fn load(path: &str) -> Result<Config, ConfigError> {
    figment(path).extract::<Config>()?.validate()
}

pub fn get_config() -> Result<Config, ConfigError> {
    let path = std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| CONFIG_FILE.to_owned());
    load(&path)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_match_the_dinner_group() {
        let config = Config::default().validate().unwrap();
        assert_eq!(config.participants.len(), 5);
        assert_eq!(config.participants[1].pin, "023");
        assert_eq!(config.admin, "Hilo");
        assert_eq!(config.options.last().map(String::as_str), Some("Club"));
        assert_eq!(config.deadline, DeadlinePolicy::EndOfDay);
        assert_eq!(config.utc_offset().unwrap().local_minus_utc(), -3 * 3600);
    }

    #[test]
    fn file_and_environment_are_layered() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                title = "Asado"
                admin = "Ana"
                options = ["Parrilla", "Club"]
                refresh_seconds = 5

                [deadline]
                mode = "fixed"
                at = "2026-10-18T21:00:00-03:00"

                [[participants]]
                name = "Ana"
                pin = "007"

                [[participants]]
                name = "Beto"
                pin = "123"
                "#,
            )?;
            jail.set_env("DINNER_VOTE_REFRESH_SECONDS", "30");
            jail.set_env("DINNER_VOTE_REGION", "Tandil");

            let config = load(CONFIG_FILE).unwrap();
            assert_eq!(config.title, "Asado");
            assert_eq!(config.region, "Tandil");
            assert_eq!(config.refresh_seconds, 30);
            assert_eq!(config.participants.len(), 2);
            assert_eq!(config.participants[0].pin, "007");
            assert_eq!(config.options, ["Parrilla", "Club"]);
            let offset = FixedOffset::west_opt(3 * 3600).unwrap();
            assert_eq!(
                config.deadline,
                DeadlinePolicy::Fixed {
                    at: offset.with_ymd_and_hms(2026, 10, 18, 21, 0, 0).unwrap()
                }
            );
            Ok(())
        });
    }

    #[test]
    fn deadline_can_be_disabled() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE, "[deadline]\nmode = \"none\"\n")?;
            let config = load(CONFIG_FILE).unwrap();
            assert_eq!(config.deadline, DeadlinePolicy::Disabled);
            Ok(())
        });
    }

    #[test]
    fn admin_must_be_a_participant() {
        let config = Config {
            admin: "Nadie".to_owned(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownAdmin(admin)) if admin == "Nadie"
        ));
    }

    #[test]
    fn pins_must_be_digits() {
        let mut config = Config::default();
        config.participants[0].pin = "12a".to_owned();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPin(name)) if name == "Rami"));
    }

    #[test]
    fn duplicate_participants_are_rejected() {
        let mut config = Config::default();
        config.participants[1].name = "Rami".to_owned();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateParticipant(name)) if name == "Rami"
        ));
    }

    #[test]
    fn blank_options_are_rejected() {
        let config = Config {
            options: vec!["  ".to_owned(), String::new()],
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoOptions)));
    }

    #[test]
    fn pin_is_not_printed() {
        let config = Config::default();
        assert!(!format!("{:?}", config.participants[0]).contains("157"));
    }
}
