//! Process configuration resolved once at startup.
//!
//! # Responsibility
//! - Turn raw setting values (CLI flags / environment) into a typed
//!   [`AppConfig`].
//! - Apply environment-dependent defaults for storage file and port.
//!
//! # Invariants
//! - Request handlers never read the environment; they receive pieces of
//!   `AppConfig` by reference or clone.
//! - Every rejected value is reported with the variable name it came from.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEV_DATABASE_FILE: &str = "./beartrak_search_dev.db";
const PROD_DATABASE_FILE: &str = "./beartrak_search.db";
const DEV_PORT: u16 = 8001;
const PROD_PORT: u16 = 8000;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const MEMORY_DATABASE: &str = ":memory:";

/// Deployment flavor selecting storage and port defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    fn default_database(self) -> StorageLocation {
        match self {
            Self::Development => StorageLocation::File(PathBuf::from(DEV_DATABASE_FILE)),
            Self::Production => StorageLocation::File(PathBuf::from(PROD_DATABASE_FILE)),
        }
    }

    fn default_port(self) -> u16 {
        match self {
            Self::Development => DEV_PORT,
            Self::Production => PROD_PORT,
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::invalid(
                "ENVIRONMENT",
                other,
                "expected development|production",
            )),
        }
    }
}

/// Where record data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    File(PathBuf),
    Memory,
}

impl Display for StorageLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory => f.write_str(MEMORY_DATABASE),
        }
    }
}

/// Storage settings handed to [`crate::db::Database::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub location: StorageLocation,
    /// Log every executed SQL statement at `debug` level.
    pub echo_sql: bool,
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self {
            location: StorageLocation::Memory,
            echo_sql: false,
        }
    }
}

/// HTTP listener and transport policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; `*` allows any origin.
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: Environment::default().default_port(),
            cors_origins: vec!["*".to_string()],
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ServerConfig {
    /// Returns the `host:port` bind string.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether the CORS policy accepts every origin.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }
}

/// Logging destination and verbosity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    /// Absolute directory for rolling log files; stderr only when `None`.
    pub log_dir: Option<String>,
}

/// Fully resolved process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub environment: Environment,
    pub debug: bool,
    pub storage: StorageConfig,
    pub server: ServerConfig,
    pub log: LogConfig,
    /// Include `description` in the JSON record representation.
    pub expose_description: bool,
    /// Insert sample records into an empty table at startup.
    pub seed_sample_data: bool,
}

/// Raw, unvalidated setting values. `None` means "use the default".
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub environment: Option<String>,
    pub database_url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub cors_origins: Option<String>,
    pub debug: Option<String>,
    pub log_level: Option<String>,
    pub log_dir: Option<String>,
    pub expose_description: Option<String>,
    pub seed_sample_data: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl AppConfig {
    /// Resolves raw overrides into a validated configuration.
    ///
    /// # Errors
    /// - Returns [`ConfigError::Invalid`] naming the offending variable.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let environment = match overrides.environment.as_deref() {
            Some(value) if !value.trim().is_empty() => value.parse()?,
            _ => Environment::default(),
        };
        let debug = parse_flag("DEBUG", overrides.debug.as_deref(), false)?;

        let location = match overrides.database_url.as_deref() {
            Some(url) if !url.trim().is_empty() => parse_database_url(url)?,
            _ => environment.default_database(),
        };

        let cors_origins = match overrides.cors_origins.as_deref() {
            Some(raw) => parse_origins(raw)?,
            None => vec!["*".to_string()],
        };

        let request_timeout_secs = overrides
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "REQUEST_TIMEOUT_SECS",
                "0",
                "timeout must be at least one second",
            ));
        }

        let host = overrides
            .host
            .map(|host| host.trim().to_string())
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let level = match overrides.log_level {
            Some(level) if !level.trim().is_empty() => level,
            _ if debug => "debug".to_string(),
            _ => default_log_level().to_string(),
        };

        Ok(Self {
            environment,
            debug,
            storage: StorageConfig {
                location,
                echo_sql: debug,
            },
            server: ServerConfig {
                host,
                port: overrides.port.unwrap_or_else(|| environment.default_port()),
                cors_origins,
                request_timeout: Duration::from_secs(request_timeout_secs),
            },
            log: LogConfig {
                level,
                log_dir: overrides.log_dir.filter(|dir| !dir.trim().is_empty()),
            },
            expose_description: parse_flag(
                "EXPOSE_DESCRIPTION",
                overrides.expose_description.as_deref(),
                true,
            )?,
            seed_sample_data: parse_flag(
                "SEED_SAMPLE_DATA",
                overrides.seed_sample_data.as_deref(),
                environment == Environment::Development,
            )?,
        })
    }
}

/// Parses a SQLAlchemy-style SQLite URL or a plain file path.
///
/// `sqlite:///rel.db` is relative, `sqlite:////abs.db` is absolute, and any
/// `sqlite+<driver>://` prefix is accepted.
pub fn parse_database_url(url: &str) -> Result<StorageLocation, ConfigError> {
    let trimmed = url.trim();
    let path = match trimmed.split_once("://") {
        Some((scheme, rest)) => {
            if scheme != "sqlite" && !scheme.starts_with("sqlite+") {
                return Err(ConfigError::invalid(
                    "DATABASE_URL",
                    trimmed,
                    "only sqlite URLs are supported",
                ));
            }
            rest.strip_prefix('/').unwrap_or(rest)
        }
        None => trimmed,
    };

    if path.is_empty() || path == MEMORY_DATABASE {
        return Ok(StorageLocation::Memory);
    }
    Ok(StorageLocation::File(PathBuf::from(path)))
}

/// Splits a comma list of origins. Each origin must be usable as an HTTP
/// header value.
fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            if origin.chars().any(char::is_control) {
                return Err(ConfigError::invalid(
                    "CORS_ORIGINS",
                    origin,
                    "origin must not contain control characters",
                ));
            }
            Ok(origin.to_string())
        })
        .collect()
}

fn parse_flag(name: &'static str, value: Option<&str>, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "" => Ok(default),
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::invalid(
            name,
            other,
            "expected true|false|1|0|yes|no|on|off",
        )),
    }
}

/// Configuration resolution failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid {
        variable: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl ConfigError {
    fn invalid(variable: &'static str, value: &str, reason: &'static str) -> Self {
        Self::Invalid {
            variable,
            value: value.to_string(),
            reason,
        }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid {
                variable,
                value,
                reason,
            } => write!(f, "invalid {variable} value `{value}`: {reason}"),
        }
    }
}

impl Error for ConfigError {}
