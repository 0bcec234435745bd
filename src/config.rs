use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use zeroize::Zeroize;

use crate::endpoints::Endpoints;
use crate::oauth::ConsumerKey;

pub const ENV_EMAIL: &str = "NLZIET_EMAIL";
pub const ENV_PASSWORD: &str = "NLZIET_PASSWORD";

const DEFAULT_CONSUMER_KEY: &str = "key";
const DEFAULT_CONSUMER_SECRET: &str = "secret";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("nl", "nlziet", "nlziet-plugin")
}

/// Account credentials as entered by the user
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both fields are required; no format validation is done.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    /// Form fields posted to the interactive login page
    pub fn form(&self) -> Vec<(String, String)> {
        vec![
            ("username".to_string(), self.username.clone()),
            ("password".to_string(), self.password.clone()),
        ]
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl Drop for Credentials {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

/// How the "watch later" playlist is picked from the user's playlists
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WatchLaterLookup {
    /// First playlist in the response, whatever its type
    #[default]
    Positional,
    /// First playlist whose `Type` is `WatchLater`
    ByType,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub consumer_key: Option<String>,
    #[serde(default)]
    pub consumer_secret: Option<String>,
    #[serde(default)]
    pub watch_later_lookup: WatchLaterLookup,
    #[serde(default)]
    pub endpoints: Endpoints,
    /// Where the favorite-series episode cache lives; defaults to the user cache dir
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self, anyhow::Error> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => AppConfig::default(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        if let Ok(email) = std::env::var(ENV_EMAIL) {
            self.email = email;
        }
        if let Ok(password) = std::env::var(ENV_PASSWORD) {
            self.password = password;
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials().is_complete()
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.email.clone(), self.password.clone())
    }

    pub fn consumer(&self) -> ConsumerKey {
        ConsumerKey {
            key: self
                .consumer_key
                .clone()
                .unwrap_or_else(|| DEFAULT_CONSUMER_KEY.to_string()),
            secret: self
                .consumer_secret
                .clone()
                .unwrap_or_else(|| DEFAULT_CONSUMER_SECRET.to_string()),
        }
    }

    pub fn episode_cache_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.cache_path {
            return Some(path.clone());
        }
        project_dirs().map(|dirs| dirs.cache_dir().join("episodes.json"))
    }
}
