use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use notemark_grammar::GrammarConfig;
use notemark_storage::{StoreConfig, StoreTimeouts};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_COLLECTION: &str = "notes";
/// Relative to the working directory; the assets live at the workspace root.
const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable must be set")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err("expected `text` or `json`".to_string()),
        }
    }
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store: StoreConfig,
    pub grammar: GrammarConfig,
    pub static_dir: PathBuf,
    /// Replaces the built-in templates when set.
    pub templates_dir: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let uri = require("MONGODB_URI")?;
        let database = require("MONGODB_DATABASE")?;
        let collection = get("NOTEMARK_COLLECTION").unwrap_or_else(|| DEFAULT_COLLECTION.to_string());

        let port = parsed(&get, "PORT")?.unwrap_or(DEFAULT_PORT);

        let defaults = GrammarConfig::default();
        let grammar = GrammarConfig {
            java: get("LANGUAGETOOL_JAVA").unwrap_or(defaults.java),
            jar_path: get("LANGUAGETOOL_JAR")
                .map(PathBuf::from)
                .unwrap_or(defaults.jar_path),
            port: parsed(&get, "LANGUAGETOOL_PORT")?.unwrap_or(defaults.port),
            server_url: get("LANGUAGETOOL_URL"),
            default_language: get("NOTEMARK_GRAMMAR_LANGUAGE").unwrap_or(defaults.default_language),
            settle: parsed::<u64>(&get, "NOTEMARK_GRAMMAR_SETTLE_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.settle),
            request_timeout: defaults.request_timeout,
            disabled: flag(&get, "NOTEMARK_GRAMMAR_DISABLED")?.unwrap_or(defaults.disabled),
        };

        let log_format = parsed(&get, "NOTEMARK_LOG_FORMAT")?.unwrap_or_default();

        Ok(Self {
            port,
            store: StoreConfig {
                uri,
                database,
                collection,
                timeouts: StoreTimeouts::default(),
            },
            grammar,
            static_dir: get("NOTEMARK_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
            templates_dir: get("NOTEMARK_TEMPLATES_DIR").map(PathBuf::from),
            log_format,
        })
    }
}

fn parsed<T>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(name)
        .map(|value| {
            value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                name,
                reason: e.to_string(),
                value,
            })
        })
        .transpose()
}

fn flag(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<bool>, ConfigError> {
    get(name)
        .map(|value| match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                name,
                value,
                reason: "expected a boolean".to_string(),
            }),
        })
        .transpose()
}
