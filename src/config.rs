use log::warn;
use std::env;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub api_key: String,
    pub port: u16,
    pub api_base: String,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from any variable source. Absent values are
    /// left empty; nothing beyond presence is checked.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let api_base = lookup("GITHUB_API_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Self {
            token: lookup("GITHUB_TOKEN").unwrap_or_default(),
            owner: lookup("GITHUB_OWNER").unwrap_or_default(),
            repo: lookup("GITHUB_REPO").unwrap_or_default(),
            api_key: lookup("API_KEY").unwrap_or_default(),
            port,
            api_base,
        }
    }

    /// Names of the variables that were not provided.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("GITHUB_TOKEN", &self.token),
            ("GITHUB_OWNER", &self.owner),
            ("GITHUB_REPO", &self.repo),
            ("API_KEY", &self.api_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn warn_missing(&self) {
        for name in self.missing() {
            warn!("{} is not set; requests depending on it will fail", name);
        }
    }
}
