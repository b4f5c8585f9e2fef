use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::llm::groq::GroqConfig;
use crate::supabase::SupabaseConfig;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://course.db";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RETRIEVAL_LIMIT: usize = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub enum StoreBackend {
    Supabase(SupabaseConfig),
    Sqlite { database_url: String },
}

impl StoreBackend {
    /// `STORE_BACKEND` picks explicitly; otherwise a configured Supabase URL
    /// wins over the local SQLite file.
    pub fn new_from_env() -> Result<Self, ConfigError> {
        let timeout = http_timeout_from_env()?;
        match env::var("STORE_BACKEND").ok().as_deref() {
            Some("supabase") => Ok(StoreBackend::Supabase(SupabaseConfig::new_from_env(timeout)?)),
            Some("sqlite") => Ok(Self::sqlite_from_env()),
            Some(other) => Err(ConfigError::Invalid {
                name: "STORE_BACKEND",
                value: other.to_string(),
            }),
            None if SupabaseConfig::url_from_env().is_some() => {
                Ok(StoreBackend::Supabase(SupabaseConfig::new_from_env(timeout)?))
            }
            None => Ok(Self::sqlite_from_env()),
        }
    }

    fn sqlite_from_env() -> Self {
        StoreBackend::Sqlite {
            database_url: env_or("DATABASE_URL", DEFAULT_DATABASE_URL),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            StoreBackend::Supabase(config) => format!("supabase ({})", config.url),
            StoreBackend::Sqlite { database_url } => format!("sqlite ({})", database_url),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    pub llm: GroqConfig,
    pub retrieval_limit: usize,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, ConfigError> {
        let bind_addr = env_parse("BIND_ADDR", DEFAULT_BIND_ADDR.parse().ok())?;
        let store = StoreBackend::new_from_env()?;
        let llm = GroqConfig::new_from_env(http_timeout_from_env()?)?;
        let retrieval_limit = env_parse("RETRIEVAL_LIMIT", Some(DEFAULT_RETRIEVAL_LIMIT))?;

        Ok(Self {
            bind_addr,
            store,
            llm,
            retrieval_limit,
        })
    }
}

pub fn http_timeout_from_env() -> Result<Duration, ConfigError> {
    let secs = env_parse("HTTP_TIMEOUT_SECS", Some(DEFAULT_HTTP_TIMEOUT_SECS))?;
    Ok(Duration::from_secs(secs))
}

pub(crate) fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Parses `name` if set, falls back to `default`, and reports a missing
/// variable only when there is no default.
pub(crate) fn env_parse<T: FromStr>(
    name: &'static str,
    default: Option<T>,
) -> Result<T, ConfigError> {
    match env::var(name).ok().filter(|v| !v.trim().is_empty()) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { name, value }),
        None => default.ok_or(ConfigError::Missing(name)),
    }
}
