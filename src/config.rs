//! Runtime configuration read from the environment.
//!
//! `.env` files are loaded through `dotenvy` before the process environment
//! is consulted; real environment variables take precedence.

use crate::cache::adapters::MokaCacheBackend;
use crate::insights::services::BackgroundRunner;
use crate::pipeline::adapters::HttpPipelineClient;
use crate::telemetry::LogFormat;
use std::time::Duration;
use thiserror::Error;

const CONVERSION_URL: &str = "CONVERSION_URL";
const SECURITY_API_KEY: &str = "SECURITY_API_KEY";
const MAX_CONCURRENT_CLEANUPS: &str = "INSIGHTS_MAX_CONCURRENT_CLEANUPS";
const PIPELINE_TIMEOUT_SECS: &str = "PIPELINE_TIMEOUT_SECS";
const ERROR_DOCS_URL: &str = "ERROR_DOCS_URL";
const LOG_FORMAT: &str = "LOG_FORMAT";
const CACHE_MAX_CAPACITY: &str = "CACHE_MAX_CAPACITY";
const CACHE_TTL_SECS: &str = "CACHE_TTL_SECS";

/// Default number of cleanups running at once.
pub const DEFAULT_MAX_CONCURRENT_CLEANUPS: usize = 8;

/// Default pipeline submission timeout in seconds.
pub const DEFAULT_PIPELINE_TIMEOUT_SECS: u64 = 30;

/// Default base URL of the error documentation.
pub const DEFAULT_ERROR_DOCS_URL: &str = "https://docs.strata.dev/errors";

/// Default number of cached records.
pub const DEFAULT_CACHE_MAX_CAPACITY: u64 = 10_000;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("missing required configuration variable {0}")]
    Missing(&'static str),

    /// A variable holds a value that cannot be used.
    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Settings of the insights core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightsConfig {
    conversion_url: String,
    security_api_key: String,
    max_concurrent_cleanups: usize,
    pipeline_timeout: Duration,
    error_docs_url: String,
    log_format: LogFormat,
    cache_max_capacity: u64,
    cache_ttl: Option<Duration>,
}

impl InsightsConfig {
    /// Reads the configuration from `.env` and the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for missing or invalid variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for missing or invalid variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |name: &'static str| {
            lookup(name)
                .map(|raw| raw.trim().to_owned())
                .filter(|raw| !raw.is_empty())
        };
        let required = |name: &'static str| value(name).ok_or(ConfigError::Missing(name));

        let log_format = value(LOG_FORMAT)
            .map(|raw| {
                LogFormat::try_from(raw.as_str()).map_err(|err| ConfigError::Invalid {
                    name: LOG_FORMAT,
                    value: raw.clone(),
                    reason: err.to_string(),
                })
            })
            .transpose()?
            .unwrap_or_default();
        let max_concurrent_cleanups =
            parse_number(MAX_CONCURRENT_CLEANUPS, value(MAX_CONCURRENT_CLEANUPS))?
                .unwrap_or(DEFAULT_MAX_CONCURRENT_CLEANUPS);
        if max_concurrent_cleanups == 0 {
            return Err(ConfigError::Invalid {
                name: MAX_CONCURRENT_CLEANUPS,
                value: "0".to_owned(),
                reason: "at least one cleanup must be allowed".to_owned(),
            });
        }
        let timeout_secs = parse_number(PIPELINE_TIMEOUT_SECS, value(PIPELINE_TIMEOUT_SECS))?
            .unwrap_or(DEFAULT_PIPELINE_TIMEOUT_SECS);
        let cache_ttl = parse_number::<u64>(CACHE_TTL_SECS, value(CACHE_TTL_SECS))?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            conversion_url: required(CONVERSION_URL)?,
            security_api_key: required(SECURITY_API_KEY)?,
            max_concurrent_cleanups,
            pipeline_timeout: Duration::from_secs(timeout_secs),
            error_docs_url: value(ERROR_DOCS_URL)
                .unwrap_or_else(|| DEFAULT_ERROR_DOCS_URL.to_owned()),
            log_format,
            cache_max_capacity: parse_number(CACHE_MAX_CAPACITY, value(CACHE_MAX_CAPACITY))?
                .unwrap_or(DEFAULT_CACHE_MAX_CAPACITY),
            cache_ttl,
        })
    }

    /// Base URL of the conversion worker.
    #[must_use]
    pub fn conversion_url(&self) -> &str {
        &self.conversion_url
    }

    /// Number of cleanups allowed to run at once.
    #[must_use]
    pub const fn max_concurrent_cleanups(&self) -> usize {
        self.max_concurrent_cleanups
    }

    /// Timeout of a pipeline submission.
    #[must_use]
    pub const fn pipeline_timeout(&self) -> Duration {
        self.pipeline_timeout
    }

    /// Base URL linked from error responses.
    #[must_use]
    pub fn error_docs_url(&self) -> &str {
        &self.error_docs_url
    }

    /// Format of log output.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Maximum number of cached records.
    #[must_use]
    pub const fn cache_max_capacity(&self) -> u64 {
        self.cache_max_capacity
    }

    /// Lifetime of cached records, if bounded.
    #[must_use]
    pub const fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl
    }

    /// Builds the pipeline client for the configured worker.
    #[must_use]
    pub fn pipeline_client(&self) -> HttpPipelineClient {
        HttpPipelineClient::new(
            self.conversion_url.clone(),
            self.security_api_key.clone(),
            self.pipeline_timeout,
        )
    }

    /// Builds the background runner for cleanups.
    #[must_use]
    pub fn background_runner(&self) -> BackgroundRunner {
        BackgroundRunner::new(self.max_concurrent_cleanups)
    }

    /// Builds the in-process cache backend.
    #[must_use]
    pub fn cache_backend(&self) -> MokaCacheBackend {
        MokaCacheBackend::new(self.cache_max_capacity, self.cache_ttl)
    }
}

fn parse_number<T>(name: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|value| {
        value.parse::<T>().map_err(|err| ConfigError::Invalid {
            name,
            reason: err.to_string(),
            value,
        })
    })
    .transpose()
}
