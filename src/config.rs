use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::error::ChatError;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TEXT_WIDTH: u16 = 80;
pub const DEFAULT_VIEWPORT_HEIGHT: u16 = 22;
pub const DEFAULT_CHAR_LIMIT: usize = 280;

const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// On-disk settings. Every field is optional so a partial file still loads.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub viewport_text_width: Option<u16>,
    pub viewport_height: Option<u16>,
    pub char_limit: Option<usize>,
}

/// Command-line overrides, applied on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub width: Option<u16>,
}

/// Fully resolved settings the application runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub text_width: u16,
    pub viewport_height: u16,
    pub char_limit: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config file {}: {}", config_path.display(), e))?;
        Ok(config)
    }

    /// Merge file values, CLI overrides and the API key into final settings.
    pub fn resolve(self, overrides: Overrides, api_key: String) -> Settings {
        Settings {
            api_key,
            model: overrides
                .model
                .or(self.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: overrides
                .base_url
                .or(self.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            text_width: overrides
                .width
                .or(self.viewport_text_width)
                .unwrap_or(DEFAULT_TEXT_WIDTH)
                .max(20),
            viewport_height: self
                .viewport_height
                .unwrap_or(DEFAULT_VIEWPORT_HEIGHT)
                .max(3),
            char_limit: self.char_limit.unwrap_or(DEFAULT_CHAR_LIMIT),
        }
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("chatterm").join("config.json"))
    }
}

/// Read the API key from the environment, after loading `.env` if one exists.
pub fn load_api_key() -> Result<String, ChatError> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(ChatError::Configuration(format!("could not read .env: {}", e)));
        }
    }
    api_key_from(std::env::var(API_KEY_VAR).ok())
}

fn api_key_from(value: Option<String>) -> Result<String, ChatError> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(ChatError::Configuration(format!("{} is not set", API_KEY_VAR))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_loads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"model": "gpt-4o", "viewport_height": 30}}"#).unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.viewport_height, Some(30));
        assert_eq!(config.base_url, None);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(Config::load_from(file.path()).is_err());
    }

    #[test]
    fn test_resolve_defaults() {
        let settings = Config::default().resolve(Overrides::default(), "sk-test".into());
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.text_width, DEFAULT_TEXT_WIDTH);
        assert_eq!(settings.viewport_height, DEFAULT_VIEWPORT_HEIGHT);
        assert_eq!(settings.char_limit, DEFAULT_CHAR_LIMIT);
    }

    #[test]
    fn test_overrides_win_over_file() {
        let config = Config {
            model: Some("from-file".into()),
            base_url: Some("http://localhost:8080/v1/".into()),
            viewport_text_width: Some(100),
            ..Config::default()
        };
        let overrides = Overrides {
            model: Some("from-cli".into()),
            base_url: None,
            width: Some(60),
        };

        let settings = config.resolve(overrides, "sk-test".into());
        assert_eq!(settings.model, "from-cli");
        assert_eq!(settings.base_url, "http://localhost:8080/v1");
        assert_eq!(settings.text_width, 60);
    }

    #[test]
    fn test_api_key_required() {
        assert!(matches!(api_key_from(None), Err(ChatError::Configuration(_))));
        assert!(matches!(
            api_key_from(Some("   ".into())),
            Err(ChatError::Configuration(_))
        ));
        assert_eq!(api_key_from(Some(" sk-abc\n".into())).unwrap(), "sk-abc");
    }
}
