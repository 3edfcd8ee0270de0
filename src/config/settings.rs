use std::env;

use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://rewire.db?mode=rwc";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Missing required environment variable: {0}")]
    MissingSecret(&'static str),
}

/// Application settings loaded from the environment.
///
/// The three secrets are required and the process refuses to start without
/// them; everything else has a development-friendly default.
#[derive(Clone)]
pub struct AppSettings {
    pub database_url: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub session_token_secret: String,
    pub password_pepper: String,
}

impl AppSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            jwt_secret: require("JWT_SECRET")?,
            session_token_secret: require("SESSION_TOKEN_SECRET")?,
            password_pepper: require("PASSWORD_PEPPER")?,
        })
    }
}

fn require(name: &'static str) -> Result<String, SettingsError> {
    env::var(name).map_err(|_| SettingsError::MissingSecret(name))
}

impl std::fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppSettings")
            .field("database_url", &self.database_url)
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("session_token_secret", &"<redacted>")
            .field("password_pepper", &"<redacted>")
            .finish()
    }
}
