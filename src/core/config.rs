//! Persistent settings stored as JSON.
//!
//! Every field has a default, so a partial or older file still loads.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::core::lib::{WrenError, WrenResult};

pub const APP_DIR: &str = "wren";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: String,
    pub api_url: String,
    pub search_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub max_history: usize,
    pub max_conversations: usize,
    pub retry_attempts: u32,
    pub retry_delay_secs: u64,
    pub command_timeout_secs: u64,
    pub api_timeout_secs: u64,
    pub log_level: String,
    pub log_file: bool,
    pub auto_save: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: "grok-2-latest".to_string(),
            api_url: "https://api.x.ai/v1/chat/completions".to_string(),
            search_url: "https://api.duckduckgo.com/".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            max_history: 100,
            max_conversations: 10,
            retry_attempts: 3,
            retry_delay_secs: 1,
            command_timeout_secs: 30,
            api_timeout_secs: 30,
            log_level: "warn".to_string(),
            log_file: true,
            auto_save: true,
        }
    }
}

impl Config {
    pub const KEYS: &'static [&'static str] = &[
        "model",
        "api_url",
        "search_url",
        "temperature",
        "max_tokens",
        "max_history",
        "max_conversations",
        "retry_attempts",
        "retry_delay_secs",
        "command_timeout_secs",
        "api_timeout_secs",
        "log_level",
        "log_file",
        "auto_save",
    ];

    /// Default location: `<config_dir>/wren/config.json`.
    pub fn default_path() -> WrenResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join("config.json"))
            .ok_or_else(|| WrenError::ConfigError("Could not determine config directory".to_string()))
    }

    /// Default data directory for session, history and logs.
    pub fn default_data_dir() -> WrenResult<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| WrenError::ConfigError("Could not determine data directory".to_string()))
    }

    /// Loads the config at `path`, writing the defaults there if it is missing.
    pub fn load_or_create(path: &Path) -> WrenResult<Self> {
        if path.exists() {
            let text = fs::read_to_string(path)?;
            let config = serde_json::from_str(&text)
                .map_err(|e| WrenError::ConfigError(format!("Invalid config file {}: {}", path.display(), e)))?;
            debug!(path = %path.display(), "loaded config");
            return Ok(config);
        }

        let config = Self::default();
        config.save(path)?;
        info!(path = %path.display(), "created default config");
        Ok(config)
    }

    /// Like [`Config::load_or_create`], but a file that does not parse yields
    /// the defaults along with the parse error. The file is left as it is.
    pub fn load_or_default(path: &Path) -> WrenResult<(Self, Option<WrenError>)> {
        match Self::load_or_create(path) {
            Err(e @ WrenError::ConfigError(_)) => Ok((Self::default(), Some(e))),
            other => other.map(|config| (config, None)),
        }
    }

    pub fn save(&self, path: &Path) -> WrenResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Updates one setting from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> WrenResult<()> {
        match key {
            "model" => self.model = non_empty(key, value)?,
            "api_url" => self.api_url = non_empty(key, value)?,
            "search_url" => self.search_url = non_empty(key, value)?,
            "temperature" => {
                let temperature: f32 = parse(key, value)?;
                if !(0.0..=2.0).contains(&temperature) {
                    return Err(WrenError::ConfigError("temperature must be between 0 and 2".to_string()));
                }
                self.temperature = temperature;
            }
            "max_tokens" => self.max_tokens = positive(key, value)?,
            "max_history" => self.max_history = positive(key, value)?,
            "max_conversations" => self.max_conversations = parse(key, value)?,
            "retry_attempts" => self.retry_attempts = positive(key, value)?,
            "retry_delay_secs" => self.retry_delay_secs = parse(key, value)?,
            "command_timeout_secs" => self.command_timeout_secs = positive(key, value)?,
            "api_timeout_secs" => self.api_timeout_secs = positive(key, value)?,
            "log_level" => self.log_level = non_empty(key, value)?,
            "log_file" => self.log_file = parse(key, value)?,
            "auto_save" => self.auto_save = parse(key, value)?,
            _ => return Err(WrenError::ConfigError(format!("Invalid configuration key: {}", key))),
        }
        Ok(())
    }

    /// `(key, value)` pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("model", self.model.clone()),
            ("api_url", self.api_url.clone()),
            ("search_url", self.search_url.clone()),
            ("temperature", self.temperature.to_string()),
            ("max_tokens", self.max_tokens.to_string()),
            ("max_history", self.max_history.to_string()),
            ("max_conversations", self.max_conversations.to_string()),
            ("retry_attempts", self.retry_attempts.to_string()),
            ("retry_delay_secs", self.retry_delay_secs.to_string()),
            ("command_timeout_secs", self.command_timeout_secs.to_string()),
            ("api_timeout_secs", self.api_timeout_secs.to_string()),
            ("log_level", self.log_level.clone()),
            ("log_file", self.log_file.to_string()),
            ("auto_save", self.auto_save.to_string()),
        ]
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> WrenResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| WrenError::ConfigError(format!("Invalid value for {}: {}", key, value)))
}

fn positive<T: FromStr + Default + PartialOrd>(key: &str, value: &str) -> WrenResult<T> {
    let parsed: T = parse(key, value)?;
    if parsed <= T::default() {
        return Err(WrenError::ConfigError(format!("{} must be greater than zero", key)));
    }
    Ok(parsed)
}

fn non_empty(key: &str, value: &str) -> WrenResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(WrenError::ConfigError(format!("{} cannot be empty", key)));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config::load_or_create(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn partial_file_merges_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "max_history": 5, "model": "grok-beta" }"#).unwrap();

        let config = Config::load_or_create(&path).unwrap();
        assert_eq!(config.max_history, 5);
        assert_eq!(config.model, "grok-beta");
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.command_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Config::load_or_create(&path), Err(WrenError::ConfigError(_))));
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ \"max_history\": 5,").unwrap();

        let (config, problem) = Config::load_or_default(&path).unwrap();

        assert_eq!(config, Config::default());
        assert!(matches!(problem, Some(WrenError::ConfigError(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ \"max_history\": 5,");
    }

    #[test]
    fn valid_file_loads_without_problem() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "max_history": 5 }"#).unwrap();

        let (config, problem) = Config::load_or_default(&path).unwrap();

        assert_eq!(config.max_history, 5);
        assert!(problem.is_none());
    }

    #[test]
    fn set_parses_typed_values() {
        let mut config = Config::default();
        config.set("max_history", "42").unwrap();
        config.set("auto_save", "false").unwrap();
        config.set("temperature", "0.2").unwrap();

        assert_eq!(config.max_history, 42);
        assert!(!config.auto_save);
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn set_rejects_bad_input() {
        let mut config = Config::default();
        assert!(config.set("theme", "dark").is_err());
        assert!(config.set("max_history", "lots").is_err());
        assert!(config.set("max_history", "0").is_err());
        assert!(config.set("temperature", "9").is_err());
        assert!(config.set("model", "  ").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn every_key_is_listed() {
        let config = Config::default();
        let keys: Vec<&str> = config.entries().into_iter().map(|(key, _)| key).collect();
        assert_eq!(keys, Config::KEYS);
    }

    #[test]
    fn saved_config_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::default();
        config.set("retry_attempts", "5").unwrap();
        config.save(&path).unwrap();

        assert_eq!(Config::load_or_create(&path).unwrap().retry_attempts, 5);
    }
}
