//! Runtime configuration.
//!
//! Values come from an optional TOML file, then the `DATABASE_URL`,
//! `SECRET_KEY` and `BIND_ADDRESS` environment variables, then command line
//! flags (applied by the binary).

use std::path::Path;

use axum_extra::extract::cookie::Key;
use chrono::NaiveDateTime;
use serde::Deserialize;

/// Private cookies need at least this many bytes of key material.
pub const MIN_SECRET_KEY_LEN: usize = 64;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub bind: String,
    pub database_url: String,
    /// Used in page titles and the navigation bar.
    pub event_name: String,
    /// Prefix for invite links, without a trailing slash.
    pub public_url: String,
    /// Profiles are locked from this instant (UTC) on.
    pub competition_start: Option<NaiveDateTime>,
    pub secret_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            database_url: ":memory:".to_string(),
            event_name: "HackML 2026".to_string(),
            public_url: "http://localhost:8000".to_string(),
            competition_start: None,
            secret_key: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(
        "secret key must be at least {} bytes (got {})",
        MIN_SECRET_KEY_LEN,
        .0
    )]
    SecretKeyTooShort(usize),
}

impl Settings {
    pub fn from_toml_str(contents: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut settings = match path {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading settings");
                Self::from_toml_str(&std::fs::read_to_string(path)?)?
            }
            None => Self::default(),
        };

        if let Ok(url) = std::env::var("DATABASE_URL") {
            settings.database_url = url;
        }
        if let Ok(secret) = std::env::var("SECRET_KEY") {
            settings.secret_key = Some(secret);
        }
        if let Ok(bind) = std::env::var("BIND_ADDRESS") {
            settings.bind = bind;
        }

        Ok(settings)
    }

    pub fn registration_open(&self, now: NaiveDateTime) -> bool {
        self.competition_start.is_none_or(|start| now < start)
    }

    pub fn invite_link(&self, code: &str) -> String {
        format!(
            "{}/dashboard?code={code}",
            self.public_url.trim_end_matches('/')
        )
    }

    /// The key used to encrypt session cookies. Without a configured secret a
    /// fresh key is generated, which logs everyone out on restart.
    pub fn cookie_key(&self) -> Result<Key, SettingsError> {
        match &self.secret_key {
            Some(secret) if secret.len() < MIN_SECRET_KEY_LEN => {
                Err(SettingsError::SecretKeyTooShort(secret.len()))
            }
            Some(secret) => Ok(Key::from(secret.as_bytes())),
            None => {
                tracing::warn!(
                    "no secret key configured; sessions will not survive a restart"
                );
                Ok(Key::generate())
            }
        }
    }
}
