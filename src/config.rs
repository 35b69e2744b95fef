use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::quiz::SessionSettings;
use crate::scrape::{leo, verbformen, DEFAULT_MAX_CANDIDATES};

const APPLICATION_DIRECTORY: &str = "artikel-quiz";
const CONFIGURATION_FILE_NAME: &str = "config.toml";
const DATABASE_FILE_NAME: &str = "german_quiz.sqlite3";

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("could not read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfiguration {
    /// Defaults to `german_quiz.sqlite3` in the platform data directory.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapingConfiguration {
    pub user_agent: String,
    pub request_timeout_seconds: u64,
    pub max_candidates_per_source: usize,
    pub verbformen_url: String,
    pub leo_url: String,
}

impl Default for ScrapingConfiguration {
    fn default() -> Self {
        Self {
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            request_timeout_seconds: 30,
            max_candidates_per_source: DEFAULT_MAX_CANDIDATES,
            verbformen_url: verbformen::DEFAULT_SEED_URL.to_string(),
            leo_url: leo::DEFAULT_SEED_URL.to_string(),
        }
    }
}

impl ScrapingConfiguration {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuizConfiguration {
    pub reveal_duration_milliseconds: u64,
    pub shuffle_seed: Option<u64>,
}

impl Default for QuizConfiguration {
    fn default() -> Self {
        Self {
            reveal_duration_milliseconds: 1500,
            shuffle_seed: None,
        }
    }
}

impl QuizConfiguration {
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            reveal_delay: Duration::from_millis(self.reveal_duration_milliseconds),
            shuffle_seed: self.shuffle_seed,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfiguration {
    /// An `EnvFilter` directive such as `info` or `artikel_quiz=debug`.
    pub level: String,
}

impl Default for LoggingConfiguration {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub database: DatabaseConfiguration,
    pub scraping: ScrapingConfiguration,
    pub quiz: QuizConfiguration,
    pub logging: LoggingConfiguration,
}

impl Configuration {
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigurationError> {
        let configuration: Configuration =
            toml::from_str(contents).map_err(|source| ConfigurationError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents, path)
    }

    /// Loads `path` if given, otherwise the file in the platform config
    /// directory if it exists, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }
        match default_configuration_file_path() {
            Some(path) if path.is_file() => Self::load_from_path(path),
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        Url::parse(&self.scraping.verbformen_url).map_err(|e| ConfigurationError::Invalid {
            field: "scraping.verbformen_url",
            reason: e.to_string(),
        })?;
        Url::parse(&self.scraping.leo_url).map_err(|e| ConfigurationError::Invalid {
            field: "scraping.leo_url",
            reason: e.to_string(),
        })?;
        if self.scraping.request_timeout_seconds == 0 {
            return Err(ConfigurationError::Invalid {
                field: "scraping.request_timeout_seconds",
                reason: "must be greater than zero".to_string(),
            });
        }
        EnvFilter::try_new(&self.logging.level).map_err(|e| ConfigurationError::Invalid {
            field: "logging.level",
            reason: e.to_string(),
        })?;
        Ok(())
    }

    pub fn database_path(&self) -> Result<PathBuf, ConfigurationError> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APPLICATION_DIRECTORY).join(DATABASE_FILE_NAME))
            .ok_or_else(|| ConfigurationError::Invalid {
                field: "database.path",
                reason: "no platform data directory, set the path explicitly".to_string(),
            })
    }
}

pub fn default_configuration_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APPLICATION_DIRECTORY).join(CONFIGURATION_FILE_NAME))
}
