use poise::serenity_prelude::ChannelId;

use crate::constants::{
    DEFAULT_ANNOUNCE_HOUR, DEFAULT_DATABASE_URL, DEFAULT_HEALTH_PORT, DEFAULT_TZ_OFFSET_HOURS,
};

/// Configuration error types; all of these abort startup
#[derive(Debug)]
pub enum ConfigError {
    MissingToken,
    MissingChannelId,
    InvalidChannelId(String),
    InvalidHour(String),
    InvalidOffset(String),
    InvalidPort(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingToken => write!(
                f,
                "DISCORD_TOKEN environment variable not set. Set it with: export DISCORD_TOKEN=your_bot_token"
            ),
            ConfigError::MissingChannelId => write!(
                f,
                "ANNOUNCE_CHANNEL_ID environment variable not set. Set it to the ID of the announcement channel"
            ),
            ConfigError::InvalidChannelId(value) => {
                write!(f, "ANNOUNCE_CHANNEL_ID must be a positive integer, got '{}'", value)
            }
            ConfigError::InvalidHour(value) => {
                write!(f, "ANNOUNCE_HOUR must be 0-23, got '{}'", value)
            }
            ConfigError::InvalidOffset(value) => {
                write!(f, "TZ_OFFSET_HOURS must be between -23 and 23, got '{}'", value)
            }
            ConfigError::InvalidPort(value) => {
                write!(f, "PORT must be a valid port number, got '{}'", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Configuration loaded from environment variables
pub struct Config {
    pub discord_token: String,
    pub announce_channel_id: ChannelId,
    pub database_url: String,
    pub announce_hour: u32,
    pub utc_offset_hours: i32,
    pub health_port: u16,
    pub dev_guild_id: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let discord_token = std::env::var("DISCORD_TOKEN")
            .map(|t| t.trim().to_string())
            .unwrap_or_default();
        if discord_token.is_empty() {
            return Err(ConfigError::MissingToken);
        }

        let announce_channel_id = match std::env::var("ANNOUNCE_CHANNEL_ID") {
            Ok(value) => parse_channel_id(&value)?,
            Err(_) => return Err(ConfigError::MissingChannelId),
        };

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let announce_hour = match std::env::var("ANNOUNCE_HOUR") {
            Ok(value) => parse_announce_hour(&value)?,
            Err(_) => DEFAULT_ANNOUNCE_HOUR,
        };

        let utc_offset_hours = match std::env::var("TZ_OFFSET_HOURS") {
            Ok(value) => parse_offset_hours(&value)?,
            Err(_) => DEFAULT_TZ_OFFSET_HOURS,
        };

        let health_port = match std::env::var("PORT") {
            Ok(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(value.clone()))?,
            Err(_) => DEFAULT_HEALTH_PORT,
        };

        // Optional: development guild ID for faster command registration
        let dev_guild_id = std::env::var("DEV_GUILD_ID")
            .ok()
            .and_then(|id| id.parse::<u64>().ok());

        Ok(Config {
            discord_token,
            announce_channel_id,
            database_url,
            announce_hour,
            utc_offset_hours,
            health_port,
            dev_guild_id,
        })
    }
}

/// Parse the announcement channel ID (must be a positive integer)
fn parse_channel_id(value: &str) -> Result<ChannelId, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(ChannelId::new(id)),
        _ => Err(ConfigError::InvalidChannelId(value.to_string())),
    }
}

/// Parse the announcement hour (0-23)
fn parse_announce_hour(value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(hour) if hour <= 23 => Ok(hour),
        _ => Err(ConfigError::InvalidHour(value.to_string())),
    }
}

/// Parse the fixed UTC offset in whole hours (-23..=23, no DST)
fn parse_offset_hours(value: &str) -> Result<i32, ConfigError> {
    match value.trim().parse::<i32>() {
        Ok(offset) if (-23..=23).contains(&offset) => Ok(offset),
        _ => Err(ConfigError::InvalidOffset(value.to_string())),
    }
}
