use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use url::Url;

use crate::error::{GhQueryError, Result};

pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";

#[derive(Deserialize, Default, Debug)]
pub struct Config {
    pub token: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(|e| GhQueryError::ConfigRead {
                path: config_path.clone(),
                source: e,
            })?;

        toml::from_str(&contents).map_err(|e| GhQueryError::ConfigParse {
            path: config_path,
            source: e,
        })
    }

    pub fn config_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "ghq")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(GhQueryError::NoConfigDir)
    }

    /// Get the token with env var taking precedence over config file
    pub fn token(&self) -> Result<String> {
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            if !token.trim().is_empty() {
                return Ok(token);
            }
        }

        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(String::from)
            .ok_or(GhQueryError::MissingToken)
    }

    /// Endpoint from config, falling back to the public GitHub API.
    pub fn endpoint(&self) -> Result<Url> {
        let raw = self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let url = Url::parse(raw).map_err(|_| GhQueryError::InvalidEndpoint(raw.to_string()))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(GhQueryError::InvalidEndpoint(raw.to_string())),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
