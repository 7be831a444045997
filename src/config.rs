use crate::error::{config_error, env_error, BotResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Default activity text for the bot
pub const DEFAULT_ACTIVITY: &str = "Keeping your calendar";

/// Default timezone for parsing event times
pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";

/// Default length of events created from a single start time
pub const DEFAULT_EVENT_DURATION_MINUTES: i64 = 60;

/// Component configuration file
pub const COMPONENTS_FILE: &str = "config/components.toml";

fn auth_paths<F>(lookup: F) -> (PathBuf, PathBuf)
where
    F: Fn(&str) -> Option<String>,
{
    let credentials_path = lookup("GOOGLE_CREDENTIALS_FILE")
        .unwrap_or_else(|| String::from("credentials.json"))
        .into();
    let token_path = lookup("GOOGLE_TOKEN_FILE")
        .unwrap_or_else(|| String::from("token.json"))
        .into();
    (credentials_path, token_path)
}

/// Main configuration structure for the bot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Discord bot token
    pub discord_token: String,
    /// Google Calendar ID events are created in
    pub google_calendar_id: String,
    /// OAuth client secret downloaded from the Google Cloud console
    pub credentials_path: PathBuf,
    /// Cached OAuth token written by `get_calendar_token`
    pub token_path: PathBuf,
    /// Registered user emails
    pub user_data_path: PathBuf,
    /// Timezone user-supplied dates and times are read in
    pub timezone: String,
    /// Length of events created by `/create_event`
    pub event_duration_minutes: i64,
    /// Guild to register slash commands in; global when unset
    pub guild_id: Option<u64>,
    /// Map of component names to their enabled status
    pub components: HashMap<String, bool>,
    /// Bot activity status text
    pub activity: String,
    /// Locale for bot messages
    pub bot_locale: String,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> BotResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Self::from_lookup(|key| env::var(key).ok())?;

        // Load components configuration from file if it exists
        if let Ok(content) = fs::read_to_string(COMPONENTS_FILE) {
            config.merge_components(&content)?;
        }

        Ok(config)
    }

    /// Credentials and token file locations, without requiring a Discord token
    pub fn load_auth_paths() -> (PathBuf, PathBuf) {
        dotenv().ok();
        auth_paths(|key| env::var(key).ok())
    }

    /// Build a configuration from a variable lookup function
    pub fn from_lookup<F>(lookup: F) -> BotResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN").ok_or_else(|| env_error("DISCORD_TOKEN"))?;

        let google_calendar_id =
            lookup("GOOGLE_CALENDAR_ID").unwrap_or_else(|| String::from("primary"));
        let (credentials_path, token_path) = auth_paths(&lookup);
        let user_data_path = lookup("USER_DATA_FILE")
            .unwrap_or_else(|| String::from("user_data.json"))
            .into();

        let timezone = lookup("TIMEZONE").unwrap_or_else(|| String::from(DEFAULT_TIMEZONE));
        timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Invalid TIMEZONE: {}", timezone)))?;

        let event_duration_minutes = match lookup("EVENT_DURATION_MINUTES") {
            Some(value) => value
                .parse::<i64>()
                .ok()
                .filter(|minutes| *minutes > 0)
                .ok_or_else(|| config_error("Invalid EVENT_DURATION_MINUTES format"))?,
            None => DEFAULT_EVENT_DURATION_MINUTES,
        };

        let guild_id = match lookup("GUILD_ID") {
            Some(value) => Some(
                value
                    .parse::<u64>()
                    .map_err(|_| config_error("Invalid GUILD_ID format"))?,
            ),
            None => None,
        };

        let activity = lookup("BOT_ACTIVITY").unwrap_or_else(|| String::from(DEFAULT_ACTIVITY));
        let bot_locale = lookup("BOT_LOCALE").unwrap_or_else(|| String::from("en"));

        // Initialize default components
        let mut components = HashMap::new();
        components.insert("google_calendar".to_string(), true);
        components.insert("user_registry".to_string(), true);

        Ok(Config {
            discord_token,
            google_calendar_id,
            credentials_path,
            token_path,
            user_data_path,
            timezone,
            event_duration_minutes,
            guild_id,
            components,
            activity,
            bot_locale,
        })
    }

    /// Merge component toggles from TOML content over the defaults
    pub fn merge_components(&mut self, content: &str) -> BotResult<()> {
        let file_components = toml::from_str::<HashMap<String, bool>>(content)?;
        self.components.extend(file_components);
        Ok(())
    }

    /// Check if a component is enabled
    pub fn is_component_enabled(&self, name: &str) -> bool {
        *self.components.get(name).unwrap_or(&false)
    }

    /// Parsed timezone
    pub fn tz(&self) -> BotResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Invalid TIMEZONE: {}", self.timezone)))
    }
}
