//! Application settings.
//!
//! Settings are resolved once at start-up: built-in defaults, then an optional
//! TOML file, then environment variables (after `.env` has been loaded). The
//! resulting [`AppConfig`] is passed by reference to whatever needs it.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{
    fmt,
    net::SocketAddr,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, info, warn};

/// Fallback signing secret for local development.
pub const DEV_SECRET_KEY: &str = "dev-secret-key-change-in-production";

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 365 * 24 * 60;

const DEFAULT_DATABASE_URL: &str = "sqlite://attendance.sqlite?mode=rwc";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Optional overrides read from a TOML file. Every key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    database_url: Option<String>,
    bind_addr: Option<String>,
    secret_key: Option<String>,
    token_ttl_minutes: Option<i64>,
    upload_dir: Option<PathBuf>,
    od_upload_dir: Option<PathBuf>,
    max_upload_bytes: Option<usize>,
}

/// Process-wide configuration, built once in `main`.
#[derive(Clone)]
pub struct AppConfig {
    /// `SeaORM` connection string
    pub database_url: String,
    /// Address the HTTP server listens on
    pub bind_addr: SocketAddr,
    /// HMAC secret used to sign session tokens
    pub secret_key: String,
    /// Lifetime of issued session tokens
    pub token_ttl_minutes: i64,
    /// Directory for face images
    pub upload_dir: PathBuf,
    /// Directory for leave request attachments
    pub od_upload_dir: PathBuf,
    /// Upper bound on request bodies (multipart uploads included)
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            secret_key: DEV_SECRET_KEY.to_string(),
            token_ttl_minutes: 30,
            upload_dir: PathBuf::from("uploads"),
            od_upload_dir: PathBuf::from("od_uploads"),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &self.database_url)
            .field("bind_addr", &self.bind_addr)
            .field("secret_key", &"<redacted>")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("upload_dir", &self.upload_dir)
            .field("od_upload_dir", &self.od_upload_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl AppConfig {
    /// Loads configuration the way the server binary does.
    ///
    /// The TOML file is taken from `CONFIG_PATH` if set (and must then exist),
    /// otherwise `config.toml` is used when present.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        match std::env::var("CONFIG_PATH") {
            Ok(path) => config.apply_file(load_config_file(&path)?)?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                config.apply_file(load_config_file(DEFAULT_CONFIG_PATH)?)?;
            }
            Err(_) => debug!("No config file found; using defaults and environment"),
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;

        if config.secret_key == DEV_SECRET_KEY {
            warn!("SECRET_KEY not configured; using the development fallback secret");
        }
        info!("Configuration loaded: {:?}", config);
        Ok(config)
    }

    /// Parses a TOML document and layers it over the defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::Config {
            message: format!("Failed to parse config file: {e}"),
        })?;
        let mut config = Self::default();
        config.apply_file(file)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) -> Result<()> {
        if let Some(url) = file.database_url {
            self.database_url = url;
        }
        if let Some(addr) = file.bind_addr {
            self.bind_addr = parse_value("bind_addr", &addr)?;
        }
        if let Some(secret) = file.secret_key {
            self.secret_key = secret;
        }
        if let Some(ttl) = file.token_ttl_minutes {
            self.token_ttl_minutes = ttl;
        }
        if let Some(dir) = file.upload_dir {
            self.upload_dir = dir;
        }
        if let Some(dir) = file.od_upload_dir {
            self.od_upload_dir = dir;
        }
        if let Some(limit) = file.max_upload_bytes {
            self.max_upload_bytes = limit;
        }
        Ok(())
    }

    /// Applies environment overrides; `lookup` abstracts `std::env::var` for tests.
    fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(addr) = lookup("BIND_ADDR") {
            self.bind_addr = parse_value("BIND_ADDR", &addr)?;
        }
        if let Some(secret) = lookup("SECRET_KEY") {
            self.secret_key = secret;
        }
        if let Some(ttl) = lookup("TOKEN_TTL_MINUTES") {
            self.token_ttl_minutes = parse_value("TOKEN_TTL_MINUTES", &ttl)?;
        }
        if let Some(dir) = lookup("UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("OD_UPLOAD_DIR") {
            self.od_upload_dir = PathBuf::from(dir);
        }
        if let Some(limit) = lookup("MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = parse_value("MAX_UPLOAD_BYTES", &limit)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.secret_key.is_empty() {
            return Err(Error::Config {
                message: "secret_key must not be empty".to_string(),
            });
        }
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&self.token_ttl_minutes) {
            return Err(Error::Config {
                message: format!(
                    "token_ttl_minutes must be between 1 and {MAX_TOKEN_TTL_MINUTES} (got {})",
                    self.token_ttl_minutes
                ),
            });
        }
        Ok(())
    }

    /// Token lifetime as a duration.
    #[must_use]
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.token_ttl_minutes)
    }
}

fn load_config_file<P: AsRef<Path>>(path: P) -> Result<ConfigFile> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config file {}: {e}", path_ref.display()),
    })
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e| Error::Config {
        message: format!("Invalid value for {key} ({raw:?}): {e}"),
    })
}
