//! Environment-backed runtime configuration.
//!
//! The library owns the configuration surface its components consume
//! (storage driver selection, pool sizing, broker topic and group); the
//! embedding process decides when to load it and how to wire the selected
//! adapters together.

use std::env;
use std::time::Duration;
use thiserror::Error;

/// Errors returned while loading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment value could not be parsed for its key.
    #[error("invalid value '{value}' for {key}")]
    InvalidValue {
        /// The environment variable name.
        key: String,
        /// The rejected raw value.
        value: String,
    },

    /// The storage driver selector is not a known driver.
    #[error("unsupported storage driver: {0}")]
    UnsupportedDriver(String),

    /// The selected driver requires a connection string.
    #[error("DATABASE_URL is required when the postgres driver is selected")]
    MissingDatabaseUrl,
}

/// Storage backend selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageDriver {
    /// In-memory repository, no durability.
    #[default]
    Memory,
    /// PostgreSQL repository via Diesel.
    Postgres,
}

impl StorageDriver {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" => Ok(Self::Postgres),
            _ => Err(ConfigError::UnsupportedDriver(value.to_owned())),
        }
    }
}

/// Persistence configuration consumed by the postgres adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Selected storage backend.
    pub driver: StorageDriver,
    /// Connection string for the durable backend. Empty for memory.
    pub url: String,
    /// Upper bound on pooled connections.
    pub max_pool_size: u32,
    /// Maximum lifetime of a pooled connection before it is recycled.
    pub connection_lifetime: Duration,
    /// Whether the adapter should create missing schema objects on startup.
    pub auto_migrate: bool,
}

/// Broker configuration consumed by the event pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    /// Topic carrying task lifecycle events.
    pub topic: String,
    /// Consumer group identifier for the event consumer loop.
    pub group_id: String,
    /// Capacity of the bounded publish queue and broker backlog.
    pub queue_capacity: usize,
}

/// Aggregate runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Persistence settings.
    pub database: DatabaseConfig,
    /// Event pipeline settings.
    pub broker: BrokerConfig,
}

impl AppConfig {
    /// Default topic for task lifecycle events.
    pub const DEFAULT_TOPIC: &'static str = "task-events";

    /// Default consumer group for the event consumer loop.
    pub const DEFAULT_GROUP_ID: &'static str = "task-events-group";

    /// Default bounded queue capacity.
    pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

    const DEFAULT_POOL_SIZE: u32 = 10;
    const DEFAULT_LIFETIME_SECS: u64 = 3600;

    /// Loads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is present but malformed, or
    /// when the postgres driver is selected without a `DATABASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same conditions as [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let driver = lookup("DB_DRIVER")
            .map(|raw| StorageDriver::parse(&raw))
            .transpose()?
            .unwrap_or_default();
        let url = lookup("DATABASE_URL").unwrap_or_default();
        if driver == StorageDriver::Postgres && url.is_empty() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        let database = DatabaseConfig {
            driver,
            url,
            max_pool_size: parse_var(&lookup, "DB_MAX_POOL_SIZE", Self::DEFAULT_POOL_SIZE)?,
            connection_lifetime: Duration::from_secs(parse_var(
                &lookup,
                "DB_CONN_MAX_LIFETIME_SECS",
                Self::DEFAULT_LIFETIME_SECS,
            )?),
            auto_migrate: parse_bool(&lookup, "DB_AUTO_MIGRATE", true),
        };

        let broker = BrokerConfig {
            topic: lookup("BROKER_TOPIC").unwrap_or_else(|| Self::DEFAULT_TOPIC.to_owned()),
            group_id: lookup("BROKER_GROUP_ID")
                .unwrap_or_else(|| Self::DEFAULT_GROUP_ID.to_owned()),
            queue_capacity: parse_var(
                &lookup,
                "EVENT_QUEUE_CAPACITY",
                Self::DEFAULT_QUEUE_CAPACITY,
            )?,
        };

        Ok(Self { database, broker })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_owned(),
            value: raw,
        })
    })
}

fn parse_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    lookup(key).map_or(default, |raw| matches!(raw.trim(), "true" | "1"))
}
