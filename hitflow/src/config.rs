use normalizer::{AdContentFallback, NormalizerOptions};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Statsd port cannot be 0")]
    InvalidStatsdPort,

    #[error("Empty statsd host")]
    EmptyStatsdHost,

    #[error("Empty user agent regexes path")]
    EmptyRegexesPath,

    #[error("Invalid sentry DSN: {0}")]
    InvalidSentryDsn(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    ValidationError(#[from] ValidationError),
}

fn default_level() -> String {
    "info".to_string()
}

fn default_prefix() -> String {
    "hitflow".to_string()
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    #[serde(default = "default_level")]
    pub level: String,
    pub sentry_dsn: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_level(),
            sentry_dsn: None,
        }
    }
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct UserAgentConfig {
    /// uap-core `regexes.yaml`
    pub regexes_path: PathBuf,
}

#[derive(Clone, Deserialize, Debug, Default, PartialEq)]
pub struct NormalizerConfig {
    #[serde(default)]
    pub ad_content_fallback: AdContentFallback,
}

impl From<&NormalizerConfig> for NormalizerOptions {
    fn from(config: &NormalizerConfig) -> Self {
        NormalizerOptions {
            ad_content_fallback: config.ad_content_fallback,
        }
    }
}

#[derive(Clone, Deserialize, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Metrics are dropped when not configured
    pub metrics: Option<MetricsConfig>,
    /// Device browser and OS fields stay null when not configured
    pub user_agent: Option<UserAgentConfig>,
    #[serde(default)]
    pub normalizer: NormalizerConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(metrics) = &self.metrics {
            if metrics.statsd_port == 0 {
                return Err(ValidationError::InvalidStatsdPort);
            }
            if metrics.statsd_host.is_empty() {
                return Err(ValidationError::EmptyStatsdHost);
            }
        }

        if let Some(user_agent) = &self.user_agent
            && user_agent.regexes_path.as_os_str().is_empty()
        {
            return Err(ValidationError::EmptyRegexesPath);
        }

        if let Some(dsn) = &self.logging.sentry_dsn {
            dsn.parse::<sentry::types::Dsn>()
                .map_err(|e| ValidationError::InvalidSentryDsn(e.to_string()))?;
        }

        Ok(())
    }
}
