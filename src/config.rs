//! Server configuration from the environment. Invalid values fall back to defaults with a warning.

use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for a single call to the bracket service.
    pub remote_timeout: Duration,
    /// Brackets not touched for this long are dropped from the in-memory store.
    pub inactivity_timeout: Duration,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_remote_timeout_secs() -> u64 {
    15
}

fn default_inactivity_timeout_hours() -> u64 {
    12
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            remote_timeout: Duration::from_secs(default_remote_timeout_secs()),
            inactivity_timeout: Duration::from_secs(default_inactivity_timeout_hours() * 3600),
        }
    }
}

impl ServerConfig {
    /// Read HOST, PORT, REMOTE_TIMEOUT_SECS and INACTIVITY_TIMEOUT_HOURS.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] over any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(default_host);
        let port = parsed(&lookup, "PORT", default_port());
        let timeout_secs = parsed(&lookup, "REMOTE_TIMEOUT_SECS", default_remote_timeout_secs());
        let idle_hours = parsed(
            &lookup,
            "INACTIVITY_TIMEOUT_HOURS",
            default_inactivity_timeout_hours(),
        );
        Self {
            host,
            port,
            remote_timeout: Duration::from_secs(timeout_secs.max(1)),
            inactivity_timeout: Duration::from_secs(idle_hours.max(1).saturating_mul(3600)),
        }
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("{}={:?} is not valid, using {}", key, raw, default);
                default
            }
        },
    }
}
