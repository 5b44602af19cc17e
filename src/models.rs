//! Data models and configuration
//!
//! Defines the runtime configuration for the Gemini image endpoint and the
//! small enums shared between the CLI, the app, and the history log.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_HISTORY_FILE: &str = "imagegen_history.json";

/// Which header carries the API key.
///
/// Google's endpoint expects `x-goog-api-key`; some relay proxies only
/// accept the key as a raw `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthHeaderMode {
    #[default]
    GoogApiKey,
    Authorization,
}

impl AuthHeaderMode {
    pub fn header_name(&self) -> &'static str {
        match self {
            AuthHeaderMode::GoogApiKey => "x-goog-api-key",
            AuthHeaderMode::Authorization => "Authorization",
        }
    }
}

impl FromStr for AuthHeaderMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x-goog-api-key" | "goog" => Ok(AuthHeaderMode::GoogApiKey),
            "authorization" => Ok(AuthHeaderMode::Authorization),
            other => Err(Error::Config(format!(
                "Unknown auth header mode '{}'. Expected x-goog-api-key or authorization",
                other
            ))),
        }
    }
}

impl fmt::Display for AuthHeaderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.header_name())
    }
}

/// Kind of generation run, recorded in the history log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Generate,
    Edit,
    Workflow,
    Inpaint,
}

impl Mode {
    /// Output filename used when the caller doesn't pick one.
    pub fn default_output(&self) -> &'static str {
        match self {
            Mode::Edit => "output.png",
            _ => "generated_image.png",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Generate => "generate",
            Mode::Edit => "edit",
            Mode::Workflow => "workflow",
            Mode::Inpaint => "inpaint",
        };
        f.pad(s)
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Full request path replacing `/v1beta/models/{model}:generateContent`.
    pub api_path: Option<String>,
    pub auth_header: AuthHeaderMode,
    pub timeout: Duration,
    pub history_file: PathBuf,
}

impl Config {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_path: None,
            auth_header: AuthHeaderMode::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
        }
    }

    /// Load configuration from `.env` and the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty("GEMINI_API_KEY")
            .ok_or_else(|| Error::Config("GEMINI_API_KEY not set".to_string()))?;

        let mut config = Self::new(api_key);

        if let Some(base_url) = non_empty("GEMINI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(model) = non_empty("GEMINI_IMAGE_MODEL") {
            config.model = model;
        }
        config.api_path = non_empty("GEMINI_API_PATH");
        if let Some(mode) = non_empty("GEMINI_AUTH_HEADER") {
            config.auth_header = mode.parse()?;
        }
        if let Some(secs) = non_empty("IMAGEGEN_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::Config(format!("IMAGEGEN_TIMEOUT_SECS must be an integer, got '{}'", secs))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        config.history_file = Self::history_file_from_lookup(&lookup);

        Ok(config)
    }

    /// History file location from `IMAGEGEN_HISTORY_FILE`, ignoring blank values.
    pub fn history_file_from_lookup<F>(lookup: F) -> PathBuf
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup("IMAGEGEN_HISTORY_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "sk-test")])).unwrap();

        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.api_path.is_none());
        assert_eq!(config.auth_header, AuthHeaderMode::GoogApiKey);
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.history_file, PathBuf::from(DEFAULT_HISTORY_FILE));
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "sk-test"),
            ("GEMINI_BASE_URL", "https://relay.example.com"),
            ("GEMINI_IMAGE_MODEL", "gemini-3-pro-image-preview"),
            ("GEMINI_API_PATH", "/custom/path"),
            ("GEMINI_AUTH_HEADER", "Authorization"),
            ("IMAGEGEN_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://relay.example.com");
        assert_eq!(config.model, "gemini-3-pro-image-preview");
        assert_eq!(config.api_path.as_deref(), Some("/custom/path"));
        assert_eq!(config.auth_header, AuthHeaderMode::Authorization);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_timeout_is_config_error() {
        let err = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("IMAGEGEN_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_blank_history_file_falls_back_to_default() {
        let lookup = lookup_from(&[("GEMINI_API_KEY", "k"), ("IMAGEGEN_HISTORY_FILE", "")]);
        assert_eq!(
            Config::history_file_from_lookup(&lookup),
            PathBuf::from(DEFAULT_HISTORY_FILE)
        );
        assert_eq!(
            Config::from_lookup(&lookup).unwrap().history_file,
            PathBuf::from(DEFAULT_HISTORY_FILE)
        );

        let lookup = lookup_from(&[("IMAGEGEN_HISTORY_FILE", "logs/history.json")]);
        assert_eq!(
            Config::history_file_from_lookup(lookup),
            PathBuf::from("logs/history.json")
        );
    }

    #[test]
    fn test_auth_header_mode_parse() {
        assert_eq!(
            "x-goog-api-key".parse::<AuthHeaderMode>().unwrap(),
            AuthHeaderMode::GoogApiKey
        );
        assert_eq!(
            "AUTHORIZATION".parse::<AuthHeaderMode>().unwrap(),
            AuthHeaderMode::Authorization
        );
        assert!("bearer".parse::<AuthHeaderMode>().is_err());
    }

    #[test]
    fn test_mode_serialization() {
        let json = serde_json::to_string(&Mode::Inpaint).unwrap();
        assert_eq!(json, "\"inpaint\"");
        assert_eq!(Mode::Edit.default_output(), "output.png");
        assert_eq!(Mode::Generate.default_output(), "generated_image.png");
    }
}
