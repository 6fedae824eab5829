use std::env;
use std::fs;
use std::str::FromStr;

use crate::error::AffinityError;

pub const DEFAULT_HTTP_PORT: u16 = 9700;

/// Where the outcome log, roster and model live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = AffinityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(AffinityError::Config(format!(
                "Unknown store backend: {other}"
            ))),
        }
    }
}

/// Output layer for the tracing subscriber (`RUST_LOG_FORMAT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Human,
}

impl FromStr for LogFormat {
    type Err = AffinityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "human" | "text" | "pretty" | "plain" => Ok(Self::Human),
            other => Err(AffinityError::Config(format!(
                "Unknown log format: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub store_backend: StoreBackend,
    /// Required when `store_backend` is postgres
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub run_migrations: bool,
    pub http_port: u16,
    pub default_limit: usize,
    pub max_limit: usize,
    /// Learned records with fewer events are ignored at resolve time
    pub min_learned_samples: u64,
    pub log_format: LogFormat,
}

impl Settings {
    /// Validates the settings and returns an error if invalid.
    pub fn validate(&self) -> Result<(), AffinityError> {
        validate_port(self.http_port)?;
        if self.store_backend == StoreBackend::Postgres
            && self
                .database_url
                .as_deref()
                .is_none_or(|url| url.trim().is_empty())
        {
            return Err(AffinityError::Config(
                "APP_DATABASE_URL is required for the postgres backend".into(),
            ));
        }
        if self.db_max_connections == 0 {
            return Err(AffinityError::Config(
                "Database pool needs at least one connection".into(),
            ));
        }
        if self.max_limit == 0 {
            return Err(AffinityError::Config("Max limit cannot be 0".into()));
        }
        if self.default_limit > self.max_limit {
            return Err(AffinityError::Config(format!(
                "Default limit {} exceeds max limit {}",
                self.default_limit, self.max_limit
            )));
        }
        Ok(())
    }

    /// One-shot training reads and writes the shared store, so it cannot
    /// run against the per-process memory backend.
    pub fn require_persistent_store(&self, command: &str) -> Result<(), AffinityError> {
        match self.store_backend {
            StoreBackend::Postgres => Ok(()),
            StoreBackend::Memory => Err(AffinityError::Config(format!(
                "`{command}` needs APP_STORE_BACKEND=postgres; the memory backend starts empty"
            ))),
        }
    }

    /// Requested limit, or the default, clamped to the max.
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).min(self.max_limit)
    }
}

/// Validates that the port is in valid range (1-65535).
fn validate_port(port: u16) -> Result<(), AffinityError> {
    if port == 0 {
        return Err(AffinityError::Config("Port cannot be 0".into()));
    }
    Ok(())
}

/// Read a value through `lookup`, with support for the _FILE suffix (Docker Secrets)
fn get_var_or_file<F>(lookup: &F, name: &str) -> Result<Option<String>, AffinityError>
where
    F: Fn(&str) -> Option<String>,
{
    let file_var = format!("{name}_FILE");
    if let Some(file_path) = lookup(&file_var) {
        return fs::read_to_string(&file_path)
            .map(|content| Some(content.trim().to_string()))
            .map_err(|e| AffinityError::Config(format!("Failed to read {file_var}: {e}")));
    }
    Ok(lookup(name))
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, AffinityError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| AffinityError::Config(format!("Invalid {name}={raw}: {e}"))),
        None => Ok(default),
    }
}

/// Read and validate `HTTP_PORT` on its own.
pub fn http_port_from_lookup<F>(lookup: F) -> Result<u16, AffinityError>
where
    F: Fn(&str) -> Option<String>,
{
    let port = parse_or(&lookup, "HTTP_PORT", DEFAULT_HTTP_PORT)?;
    validate_port(port)?;
    Ok(port)
}

/// Build settings from an arbitrary variable source.
pub fn from_lookup<F>(lookup: F) -> Result<Settings, AffinityError>
where
    F: Fn(&str) -> Option<String>,
{
    let store_backend = match lookup("APP_STORE_BACKEND") {
        Some(raw) => raw.parse()?,
        None => StoreBackend::Memory,
    };

    let settings = Settings {
        store_backend,
        database_url: get_var_or_file(&lookup, "APP_DATABASE_URL")?,
        db_max_connections: parse_or(&lookup, "APP_DB_MAX_CONNECTIONS", 5)?,
        run_migrations: parse_or(&lookup, "APP_RUN_MIGRATIONS", true)?,
        http_port: http_port_from_lookup(&lookup)?,
        default_limit: parse_or(&lookup, "APP_RECOMMEND_DEFAULT_LIMIT", 5)?,
        max_limit: parse_or(&lookup, "APP_RECOMMEND_MAX_LIMIT", 50)?,
        min_learned_samples: parse_or(&lookup, "APP_MIN_LEARNED_SAMPLES", 1)?,
        log_format: parse_or(&lookup, "RUST_LOG_FORMAT", LogFormat::Json)?,
    };

    // Validate settings before returning
    settings.validate()?;

    Ok(settings)
}

pub fn get_configuration() -> Result<Settings, AffinityError> {
    from_lookup(|name| env::var(name).ok())
}

pub fn get_http_port() -> Result<u16, AffinityError> {
    http_port_from_lookup(|name| env::var(name).ok())
}
