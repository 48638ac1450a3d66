use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::Deserialize;

use crate::error::{Error, Result};

const DEFAULT_SESSION_MAX_AGE: i64 = 7 * 24 * 60 * 60; // one week
const SECRET_KEY_LEN: usize = 48;

/// Application configuration, read from a TOML file once at startup and
/// passed by reference to whatever needs it.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    pub secret_key: String,
    #[serde(default = "default_session_max_age")]
    pub session_max_age: i64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_path() -> PathBuf {
    PathBuf::from("rosterd.db")
}

fn default_session_max_age() -> i64 {
    DEFAULT_SESSION_MAX_AGE
}

impl AppConfig {
    /// Loads the configuration from a TOML file. A relative database path
    /// is resolved against the config file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;

        let mut config: AppConfig = toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("invalid config file {}: {e}", path.display())))?;

        if config.secret_key.is_empty() {
            return Err(Error::Config("secret_key must not be empty".to_string()));
        }

        if config.database_path.is_relative() {
            if let Some(base) = path.parent() {
                config.database_path = base.join(&config.database_path);
            }
        }

        Ok(config)
    }

    /// Writes a fresh config file with a randomly generated secret key.
    /// Fails if the file already exists.
    pub fn generate<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Err(Error::Config(format!(
                "config file already exists: {}",
                path.display()
            )));
        }

        let secret_key: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SECRET_KEY_LEN)
            .map(char::from)
            .collect();

        let contents = format!(
            "host = \"127.0.0.1\"\n\
             port = 8080\n\
             database_path = \"rosterd.db\"\n\
             secret_key = \"{secret_key}\"\n\
             session_max_age = {DEFAULT_SESSION_MAX_AGE}\n"
        );

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, contents)?;

        Self::load(path)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("invalid listen address: {e}")))
    }
}
