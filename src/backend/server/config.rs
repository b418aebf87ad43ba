/**
 * Server Configuration
 *
 * Loads the service settings from two sources:
 *
 * 1. Environment variables (after `.env` has been loaded by the binary)
 * 2. An optional TOML file named by `TRACKSYNC_CONFIG`, whose keys are the
 *    environment variable names in lower case:
 *
 * ```toml
 * name_template = "| {artist_first} - {title}"
 * truncate_length = 64
 * idle_policy = "restore"
 * sync_interval_seconds = 60
 * ```
 *
 * Environment variables win over the file. Missing credentials are an error;
 * everything else has a default.
 */

use crate::backend::clients::gateway::GatewayConfig;
use crate::backend::clients::spotify::{SpotifyConfig, DEFAULT_ACCOUNTS_URL, DEFAULT_API_URL};
use crate::shared::config::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::shared::{ConfigError, IdlePolicy, SyncConfig};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const CONFIG_FILE_VAR: &str = "TRACKSYNC_CONFIG";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 60;

/// Everything the server needs to start
#[derive(Debug, Clone)]
pub struct Settings {
    pub sync: SyncConfig,
    pub spotify: SpotifyConfig,
    pub gateway: GatewayConfig,
    /// `None` selects the file under the platform data directory
    pub database_url: Option<String>,
    pub port: u16,
    pub cron_secret: Option<String>,
    /// Zero disables the in-process scheduler
    pub sync_interval: Duration,
}

/// Merged view over the environment and the config file
#[derive(Debug, Default, Clone)]
pub struct Source {
    env: HashMap<String, String>,
    file: HashMap<String, String>,
}

impl Source {
    pub fn new(env: HashMap<String, String>, file: HashMap<String, String>) -> Self {
        Self { env, file }
    }

    /// Process environment plus the file named by `TRACKSYNC_CONFIG`, if any
    pub fn load() -> Result<Self, ConfigError> {
        let env: HashMap<String, String> = std::env::vars().collect();
        let file = match env.get(CONFIG_FILE_VAR) {
            Some(path) if !path.is_empty() => read_file(Path::new(path))?,
            _ => HashMap::new(),
        };
        Ok(Self::new(env, file))
    }

    /// Value for `key`, environment first; empty values count as unset
    pub fn get(&self, key: &str) -> Option<&str> {
        self.env
            .get(key)
            .or_else(|| self.file.get(&key.to_ascii_lowercase()))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn require(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key)
            .map(str::to_string)
            .ok_or(ConfigError::MissingValue(key))
    }

    fn parse<T: FromStr>(&self, key: &'static str) -> Result<Option<T>, ConfigError>
    where
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.parse::<T>().map_err(|e| ConfigError::Invalid {
                    field: key,
                    message: format!("'{}': {}", raw, e),
                })
            })
            .transpose()
    }

    fn flag(&self, key: &'static str) -> Result<Option<bool>, ConfigError> {
        self.get(key)
            .map(|raw| match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::Invalid {
                    field: key,
                    message: format!("'{}' is not a boolean", raw),
                }),
            })
            .transpose()
    }
}

/// Flatten a TOML file into lower-case string values
pub fn read_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let file_error = |message: String| ConfigError::File {
        path: path.display().to_string(),
        message,
    };
    let text = std::fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
    let table: toml::Table = text.parse().map_err(|e: toml::de::Error| file_error(e.to_string()))?;

    let mut values = HashMap::new();
    for (key, value) in table {
        let value = match value {
            toml::Value::String(s) => s,
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            toml::Value::Float(f) => f.to_string(),
            other => return Err(file_error(format!("unsupported value for '{}': {}", key, other))),
        };
        values.insert(key.to_ascii_lowercase(), value);
    }
    Ok(values)
}

impl Settings {
    /// Load from the process environment and the optional config file
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_source(&Source::load()?)
    }

    pub fn from_source(source: &Source) -> Result<Self, ConfigError> {
        let sync = sync_config(source)?;
        let timeout = sync.request_timeout;

        let mut spotify = SpotifyConfig::new(
            source.require("SPOTIFY_CLIENT_ID")?,
            source.require("SPOTIFY_CLIENT_SECRET")?,
            source.require("SPOTIFY_REFRESH_TOKEN")?,
        );
        spotify.api_url = source.get("SPOTIFY_API_URL").unwrap_or(DEFAULT_API_URL).to_string();
        spotify.accounts_url = source
            .get("SPOTIFY_ACCOUNTS_URL")
            .unwrap_or(DEFAULT_ACCOUNTS_URL)
            .to_string();
        spotify.timeout = timeout;

        let gateway = GatewayConfig {
            base_url: source.require("PROFILE_GATEWAY_URL")?,
            session_token: source.require("PROFILE_SESSION_TOKEN")?,
            timeout,
        };

        Ok(Self {
            sync,
            spotify,
            gateway,
            database_url: source.get("DATABASE_URL").map(str::to_string),
            port: source.parse("SERVER_PORT")?.unwrap_or(DEFAULT_PORT),
            cron_secret: source.get("CRON_SECRET").map(str::to_string),
            sync_interval: Duration::from_secs(
                source
                    .parse("SYNC_INTERVAL_SECONDS")?
                    .unwrap_or(DEFAULT_SYNC_INTERVAL_SECS),
            ),
        })
    }
}

fn sync_config(source: &Source) -> Result<SyncConfig, ConfigError> {
    let mut builder = SyncConfig::builder();
    if let Some(template) = source.get("NAME_TEMPLATE") {
        builder = builder.template(template);
    }
    if let Some(length) = source.parse("TRUNCATE_LENGTH")? {
        builder = builder.truncate_length(length);
    }
    if let Some(ellipsis) = source.flag("TRUNCATE_ELLIPSIS")? {
        builder = builder.truncate_ellipsis(ellipsis);
    }
    if let Some(secs) = source.parse("BASE_DELAY_SECONDS")? {
        builder = builder.base_delay_secs(secs);
    }
    if let Some(secs) = source.parse("MAX_DELAY_SECONDS")? {
        builder = builder.max_delay_secs(secs);
    }
    if let Some(secs) = source.parse("TRANSIENT_DELAY_SECONDS")? {
        builder = builder.transient_delay_secs(secs);
    }
    builder = builder.request_timeout_secs(
        source
            .parse("REQUEST_TIMEOUT_SECONDS")?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
    );
    if let Some(secs) = source.parse("MIN_UPDATE_INTERVAL_SECONDS")? {
        builder = builder.min_update_interval_secs(secs);
    }
    if let Some(secs) = source.parse("TRACK_CHANGE_INTERVAL_SECONDS")? {
        builder = builder.track_change_interval_secs(secs);
    }
    if let Some(raw) = source.get("IDLE_POLICY") {
        builder = builder.idle(raw.parse::<IdlePolicy>()?);
    }
    builder.build()
}
