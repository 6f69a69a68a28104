use std::str::FromStr;
use std::time::Duration;

use crate::errors::AppError;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_REPLY_DELAY_MS: u64 = 1500;
const DEFAULT_MAX_MESSAGE_LENGTH: usize = 8000;
const DEFAULT_EVENT_BUFFER: usize = 64;
const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 30 * 60;

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// Latency of the simulated tutor reply.
    pub reply_delay: Duration,
    /// Longest message, in characters, accepted from a client.
    pub max_message_length: usize,
    /// Capacity of each session's event channel.
    pub event_buffer: usize,
    /// A session with no subscriber and no request for this long is closed.
    pub session_idle_ttl: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            reply_delay: Duration::from_millis(DEFAULT_REPLY_DELAY_MS),
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
            event_buffer: DEFAULT_EVENT_BUFFER,
            session_idle_ttl: Duration::from_secs(DEFAULT_SESSION_IDLE_TTL_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        Ok(Self {
            port: parse_or(&lookup, "PORT", defaults.port)?,
            reply_delay: Duration::from_millis(parse_or(
                &lookup,
                "REPLY_DELAY_MS",
                DEFAULT_REPLY_DELAY_MS,
            )?),
            max_message_length: parse_or(&lookup, "MAX_MESSAGE_LENGTH", defaults.max_message_length)?,
            event_buffer: parse_or(&lookup, "EVENT_BUFFER", defaults.event_buffer)?.max(1),
            session_idle_ttl: Duration::from_secs(
                parse_or(&lookup, "SESSION_IDLE_TTL_SECS", DEFAULT_SESSION_IDLE_TTL_SECS)?.max(1),
            ),
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| AppError::InvalidConfig {
            key: key.to_string(),
            value: raw,
        }),
    }
}
