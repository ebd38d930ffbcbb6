use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bind_addr: String,
    pub storage_backend: StorageBackend,
    pub data_dir: PathBuf,
    /// Seeds every session's random source when set, for reproducible games.
    pub rng_seed: Option<u64>,
    pub sse_tick_interval_ms: u64,
    pub otlp_endpoint: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8081".to_string(),
            storage_backend: StorageBackend::File,
            data_dir: PathBuf::from("./data"),
            rng_seed: None,
            sse_tick_interval_ms: 1000,
            otlp_endpoint: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Root .env first (two levels up), then the local one
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let defaults = Config::default();

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or(defaults.bind_addr);

        let storage_backend = match settings
            .get_string("storage.backend")
            .or_else(|_| env::var("STORAGE_BACKEND"))
        {
            Ok(raw) => raw.parse().map_err(config::ConfigError::Message)?,
            Err(_) => defaults.storage_backend,
        };

        let data_dir = settings
            .get_string("storage.data_dir")
            .or_else(|_| env::var("DATA_DIR"))
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let rng_seed = match settings
            .get_string("game.rng_seed")
            .or_else(|_| env::var("GAME_RNG_SEED"))
        {
            Ok(raw) => Some(raw.trim().parse::<u64>().map_err(|e| {
                config::ConfigError::Message(format!("invalid game.rng_seed '{}': {}", raw, e))
            })?),
            Err(_) => None,
        };

        let sse_tick_interval_ms = settings
            .get_string("sse.tick_interval_ms")
            .or_else(|_| env::var("SSE_TICK_INTERVAL_MS"))
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(defaults.sse_tick_interval_ms);

        let otlp_endpoint = settings
            .get_string("telemetry.otlp_endpoint")
            .or_else(|_| env::var("OTEL_EXPORTER_OTLP_ENDPOINT"))
            .ok()
            .filter(|v| !v.trim().is_empty());

        Ok(Config {
            bind_addr,
            storage_backend,
            data_dir,
            rng_seed,
            sse_tick_interval_ms,
            otlp_endpoint,
        })
    }

    /// Configuration backed by the in-memory store; nothing touches disk.
    pub fn in_memory() -> Self {
        Self {
            storage_backend: StorageBackend::Memory,
            ..Self::default()
        }
    }
}
