use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0";
const DEFAULT_SERVER_PORT: u16 = 5000;
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

const DEFAULT_TMDB_ACCESS_TOKEN_ENV: &str = "TMDB_ACCESS_TOKEN";
const DEFAULT_TMDB_TIMEOUT_SECS: u64 = 10;

const DEFAULT_PAGE_SIZE: u32 = 42;
const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

const DEFAULT_AUTH_SECRET_ENV: &str = "CINE_SESSION_SECRET";
const DEFAULT_SESSION_DAYS: u32 = 7;
const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;

const DEFAULT_STORE_PATH: &str = "./cine.db";

pub const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "./cine.toml",
    "./config/cine.toml",
    "~/.config/cine.toml",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub tmdb: TmdbConfig,
    pub pager: PagerConfig,
    pub auth: AuthConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,

    /// Origin allowed to make credentialed cross-origin requests.
    pub allowed_origin: String,

    /// Development mode: session cookies are sent without `Secure`.
    pub dev: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_SERVER_ADDRESS.to_owned(),
            port: DEFAULT_SERVER_PORT,
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_owned(),
            dev: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    pub base_url: String,
    pub language: String,

    /// Name of the environment variable holding the API read access token.
    pub access_token_env: String,
    pub timeout_secs: u64,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: cine_tmdb::DEFAULT_BASE_URL.to_owned(),
            language: cine_tmdb::DEFAULT_LANGUAGE.to_owned(),
            access_token_env: DEFAULT_TMDB_ACCESS_TOKEN_ENV.to_owned(),
            timeout_secs: DEFAULT_TMDB_TIMEOUT_SECS,
        }
    }
}

impl TmdbConfig {
    pub fn access_token(&self) -> Result<String> {
        secret_from_env(&self.access_token_env)
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build an upstream client from this configuration.
    pub fn client(&self) -> Result<cine_tmdb::Client> {
        cine_tmdb::Client::builder()
            .access_token(self.access_token()?)
            .base_url(&self.base_url)
            .language(&self.language)
            .timeout(self.timeout())
            .build()
            .map_err(Into::into)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagerConfig {
    /// Items per page of the catalogue listing.
    pub page_size: u32,

    /// Upper bound for a client-chosen `limit`.
    pub max_page_size: u32,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Name of the environment variable holding the session signing secret.
    pub secret_env: String,
    pub session_days: u32,
    pub pbkdf2_iterations: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_env: DEFAULT_AUTH_SECRET_ENV.to_owned(),
            session_days: DEFAULT_SESSION_DAYS,
            pbkdf2_iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

impl AuthConfig {
    pub fn secret(&self) -> Result<String> {
        secret_from_env(&self.secret_env)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

impl Config {
    /// Load the configuration at `path`, which must exist if given.
    /// Otherwise load the first file found in the default locations, or
    /// fall back to defaults when there is none.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let home = env::var("HOME").ok();

        if let Some(path) = path {
            let path = expand_home(path, home.as_deref());
            if !path.exists() {
                return Err(Error::Config(format!(
                    "{}: configuration file not found",
                    path.display()
                )));
            }

            return Self::load_from_file(path);
        }

        DEFAULT_CONFIG_PATHS
            .iter()
            .copied()
            .map(|path| expand_home(path, home.as_deref()))
            .find(|path| path.exists())
            .map_or_else(|| Ok(Self::default()), Self::load_from_file)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading configuration.");

        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|error| Error::Config(format!("{}: {error}", path.display())))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|error| Error::Config(error.to_string()))?;

        fs::write(path, contents).map_err(Into::into)
    }
}

/// Write the default configuration to `path`.
pub fn generate_default_config(path: impl AsRef<Path>) -> Result<()> {
    Config::default().save(path)
}

/// Replace a leading `~/` with the home directory.
fn expand_home(path: &str, home: Option<&str>) -> PathBuf {
    match (path.strip_prefix("~/"), home) {
        (Some(rest), Some(home)) => Path::new(home).join(rest),
        _ => PathBuf::from(path),
    }
}

fn secret_from_env(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!("environment variable `{name}` is not set"))),
    }
}
