use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Discord API error: {0}")]
    #[diagnostic(code(calbot::discord_api))]
    DiscordApi(#[from] serenity::Error),

    #[error("Environment error: {0}")]
    #[diagnostic(code(calbot::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(calbot::config))]
    Config(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(calbot::google_calendar))]
    GoogleCalendar(String),

    #[error("Google authorization error: {0}")]
    #[diagnostic(
        code(calbot::auth),
        help("Run `cargo run --bin get_calendar_token` to authorize the bot")
    )]
    Auth(String),

    #[error("User registry error: {0}")]
    #[diagnostic(code(calbot::registry))]
    Registry(String),

    #[error("Component error: {0}")]
    #[diagnostic(code(calbot::component))]
    Component(String),

    #[error(transparent)]
    #[diagnostic(code(calbot::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(calbot::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(calbot::other))]
    Other(String),
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Implement From for JSON errors
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type BotResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create component errors
pub fn component_error(message: &str) -> Error {
    Error::Component(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create OAuth errors
pub fn auth_error(message: &str) -> Error {
    Error::Auth(message.to_string())
}

/// Helper to create user registry errors
pub fn registry_error(message: &str) -> Error {
    Error::Registry(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
