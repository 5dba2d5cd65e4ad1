//! Typed configuration for the ledger service, loaded from an optional file
//! plus `LEDGER__`-prefixed environment overrides (generalizes the
//! original's envconfig-based `configuration.LoadConfig`,
//! `examples/original_source/` `cmd/command-handler/main.go`).

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    #[serde(with = "humantime_secs")]
    pub read_timeout: Duration,
    #[serde(with = "humantime_secs")]
    pub write_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresConfig {
    pub dsn: String,
    /// Bounds concurrent database load (spec.md §5 "the pool size bounds
    /// concurrent database load"); not an enumerated key in spec.md §6,
    /// added here as the natural `bb8` pool-sizing knob (see DESIGN.md).
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

fn default_pool_size() -> u32 {
    10
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TelemetryConfig {
    pub key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub rpc: RpcConfig,
    pub http: HttpConfig,
    pub postgres: PostgresConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Config {
    /// Loads configuration from `path` (if it exists) overlaid with
    /// `LEDGER__SECTION__KEY`-style environment variables, e.g.
    /// `LEDGER__POSTGRES__DSN`.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("http.read_timeout", "5s")?
            .set_default("http.write_timeout", "10s")?
            .set_default("postgres.pool_size", default_pool_size() as i64)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("LEDGER")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}

/// `serde(with = ...)` helper deserializing a duration from a `"5s"`-style
/// string via `humantime`-compatible parsing, without pulling in the
/// `humantime-serde` crate for a single field pair.
mod humantime_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{}s", value.as_secs()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| serde::de::Error::custom(format!("invalid duration: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_defaults_and_environment_overrides() {
        std::env::set_var("LEDGER__RPC__HOST", "0.0.0.0");
        std::env::set_var("LEDGER__RPC__PORT", "9000");
        std::env::set_var("LEDGER__HTTP__HOST", "0.0.0.0");
        std::env::set_var("LEDGER__HTTP__PORT", "9001");
        std::env::set_var("LEDGER__POSTGRES__DSN", "postgres://localhost/ledger");

        let config = Config::load(None).unwrap();
        assert_eq!(config.rpc.port, 9000);
        assert_eq!(config.http.read_timeout, Duration::from_secs(5));
        assert_eq!(config.postgres.pool_size, 10);
        assert_eq!(config.telemetry.key, None);

        std::env::remove_var("LEDGER__RPC__HOST");
        std::env::remove_var("LEDGER__RPC__PORT");
        std::env::remove_var("LEDGER__HTTP__HOST");
        std::env::remove_var("LEDGER__HTTP__PORT");
        std::env::remove_var("LEDGER__POSTGRES__DSN");
    }
}
