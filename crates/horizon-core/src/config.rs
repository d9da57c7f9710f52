//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: which
//! backend to talk to, whether this is a production deployment, and the
//! last username used to sign in.
//!
//! Configuration is stored at `~/.config/horizon-travel/config.json`.
//! `HORIZON_BACKEND_URL`, `HORIZON_ENV` and `HORIZON_DATA_DIR` override it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::auth::{AuthService, CookieJar, CredentialStore};

/// Application name used for config/data directory paths
const APP_NAME: &str = "horizon-travel";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Cookie jar file name in the data directory
const COOKIE_FILE: &str = "cookies.json";

const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

pub const BACKEND_URL_VAR: &str = "HORIZON_BACKEND_URL";
pub const ENVIRONMENT_VAR: &str = "HORIZON_ENV";
pub const DATA_DIR_VAR: &str = "HORIZON_DATA_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" | "test" => Ok(Environment::Development),
            other => Err(anyhow::anyhow!("Unknown environment: {}", other)),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub last_username: Option<String>,
    /// Where the cookie jar lives; defaults to the platform data directory
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            environment: Environment::default(),
            last_username: None,
            data_dir: None,
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(
            std::env::var(BACKEND_URL_VAR).ok(),
            std::env::var(ENVIRONMENT_VAR).ok(),
            std::env::var(DATA_DIR_VAR).ok(),
        )?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn apply_overrides(
        &mut self,
        backend_url: Option<String>,
        environment: Option<String>,
        data_dir: Option<String>,
    ) -> Result<()> {
        if let Some(url) = backend_url.filter(|u| !u.trim().is_empty()) {
            self.backend_url = url;
        }
        if let Some(env) = environment.filter(|e| !e.trim().is_empty()) {
            self.environment = env.parse()?;
        }
        if let Some(dir) = data_dir.filter(|d| !d.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    /// Record the last signed-in username without persisting any
    /// environment or command-line overrides applied to `self`
    pub fn remember_username(&mut self, username: &str) -> Result<()> {
        self.last_username = Some(username.to_string());
        let path = Self::config_path()?;
        let mut on_disk = Self::load_from(&path)?;
        on_disk.last_username = self.last_username.clone();
        on_disk.save_to(&path)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn cookie_jar_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(COOKIE_FILE))
    }

    /// Wire up the client's single auth context
    pub fn auth_service(&self) -> Result<AuthService> {
        let api = ApiClient::new(&self.backend_url).context("Failed to build HTTP client")?;
        let jar = CookieJar::open(self.cookie_jar_path()?);
        let store = CredentialStore::new(jar, self.environment.is_production());
        Ok(AuthService::new(api, store))
    }
}
