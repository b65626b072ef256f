use crate::constants::{self, env_vars};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub mod paths;
pub mod validation;

use paths::{get_config_path, get_default_data_dir, get_log_dir_path};
use validation::validate_config;

/// Configuration structure for the application.
/// Handles loading, saving, and managing application settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the stats provider, without a trailing slash.
    #[serde(default = "default_stats_api_domain")]
    pub stats_api_domain: String,
    /// Base URL the injury report documents are published under.
    #[serde(default = "default_injury_report_domain")]
    pub injury_report_domain: String,
    /// HTTP timeout in seconds for stats provider requests. Defaults to 30 seconds.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
    /// Timeout in seconds for each injury report download attempt.
    #[serde(default = "default_injury_timeout")]
    pub injury_timeout_seconds: u64,
    /// Directory for downloaded reports and dataset caches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Path to the log file. If not specified, logs will be written to a default location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,
    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    /// Read from the environment only, never persisted.
    #[serde(skip)]
    pub llm_api_key: Option<String>,
}

fn default_stats_api_domain() -> String {
    constants::DEFAULT_STATS_API_DOMAIN.to_string()
}

fn default_injury_report_domain() -> String {
    constants::DEFAULT_INJURY_REPORT_DOMAIN.to_string()
}

fn default_http_timeout() -> u64 {
    constants::DEFAULT_HTTP_TIMEOUT_SECONDS
}

fn default_injury_timeout() -> u64 {
    constants::DEFAULT_INJURY_TIMEOUT_SECONDS
}

fn default_llm_base_url() -> String {
    constants::DEFAULT_LLM_BASE_URL.to_string()
}

fn default_llm_model() -> String {
    constants::DEFAULT_LLM_MODEL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            stats_api_domain: default_stats_api_domain(),
            injury_report_domain: default_injury_report_domain(),
            http_timeout_seconds: default_http_timeout(),
            injury_timeout_seconds: default_injury_timeout(),
            data_dir: None,
            log_file_path: None,
            llm_base_url: default_llm_base_url(),
            llm_model: default_llm_model(),
            llm_api_key: None,
        }
    }
}

impl Config {
    /// Loads configuration from the default config file location.
    /// Falls back to defaults when no config file exists.
    /// Environment variables override config file values.
    ///
    /// # Environment Variables
    /// - `COURTSIDE_STATS_API_DOMAIN` - Override stats provider domain
    /// - `COURTSIDE_INJURY_DOMAIN` - Override injury report domain
    /// - `COURTSIDE_HTTP_TIMEOUT` - Override HTTP timeout in seconds (default: 30)
    /// - `COURTSIDE_DATA_DIR` - Override data directory
    /// - `COURTSIDE_LOG_FILE` - Override log file path
    /// - `COURTSIDE_LLM_MODEL` - Override analysis model
    /// - `OPENAI_API_KEY` - Analysis gateway key
    pub async fn load() -> Result<Self, AppError> {
        let config_path = get_config_path();

        let mut config = if Path::new(&config_path).exists() {
            Self::load_from_path(&config_path).await?
        } else {
            Config::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Applies environment variable overrides on top of the loaded values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(domain) = std::env::var(env_vars::STATS_API_DOMAIN) {
            self.stats_api_domain = domain;
        }

        if let Ok(domain) = std::env::var(env_vars::INJURY_DOMAIN) {
            self.injury_report_domain = domain;
        }

        if let Some(timeout) = std::env::var(env_vars::HTTP_TIMEOUT)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.http_timeout_seconds = timeout;
        }

        if let Ok(data_dir) = std::env::var(env_vars::DATA_DIR) {
            self.data_dir = Some(data_dir);
        }

        if let Ok(log_file_path) = std::env::var(env_vars::LOG_FILE) {
            self.log_file_path = Some(log_file_path);
        }

        if let Ok(model) = std::env::var(env_vars::LLM_MODEL) {
            self.llm_model = model;
        }

        self.llm_api_key = std::env::var(env_vars::LLM_API_KEY)
            .ok()
            .filter(|key| !key.trim().is_empty());
    }

    /// Validates the configuration settings
    pub fn validate(&self) -> Result<(), AppError> {
        validate_config(self)
    }

    /// Saves current configuration to the default config file location.
    pub async fn save(&self) -> Result<(), AppError> {
        let config_path = get_config_path();
        self.save_to_path(&config_path).await
    }

    pub fn get_config_path() -> String {
        paths::get_config_path()
    }

    pub fn get_log_dir_path() -> String {
        paths::get_log_dir_path()
    }

    /// Directory used for downloaded injury reports and dataset caches.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(get_default_data_dir()))
    }

    /// Renders current configuration settings for display.
    /// The API key is reported as set or unset, never printed.
    pub fn describe(&self) -> String {
        let log_location = match &self.log_file_path {
            Some(custom_path) => custom_path.clone(),
            None => format!("{}/courtside.log (default)", get_log_dir_path()),
        };
        let key_state = if self.llm_api_key.is_some() {
            "set"
        } else {
            "not set"
        };

        [
            format!("Config Location:     {}", get_config_path()),
            format!("Stats API Domain:    {}", self.stats_api_domain),
            format!("Injury Domain:       {}", self.injury_report_domain),
            format!("HTTP Timeout:        {} seconds", self.http_timeout_seconds),
            format!("Injury Timeout:      {} seconds", self.injury_timeout_seconds),
            format!("Data Directory:      {}", self.data_dir().display()),
            format!("Log File Location:   {log_location}"),
            format!("Analysis Model:      {} @ {}", self.llm_model, self.llm_base_url),
            format!("Analysis API Key:    {key_state}"),
        ]
        .join("\n")
    }

    /// Saves configuration to a custom file path.
    ///
    /// Creates the parent directory if it doesn't exist and normalizes the provider
    /// domains so they carry a scheme and no trailing slash.
    ///
    /// # Errors
    /// * `AppError::Config` - If the provided path has no parent directory
    /// * `AppError::Io` - If there's an I/O error creating directories or writing the file
    /// * `AppError::TomlSerialize` - If there's an error serializing the configuration
    pub async fn save_to_path(&self, path: &str) -> Result<(), AppError> {
        let config_dir = Path::new(path).parent().ok_or_else(|| {
            AppError::config_error(format!("Path '{path}' has no parent directory"))
        })?;

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).await?;
        }

        let normalized = Config {
            stats_api_domain: normalize_domain(&self.stats_api_domain),
            injury_report_domain: normalize_domain(&self.injury_report_domain),
            ..self.clone()
        };
        let content = toml::to_string_pretty(&normalized)?;
        let mut file = fs::File::create(path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Loads configuration from a custom file path without environment overrides.
    pub async fn load_from_path(path: &str) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Ensures a domain has a scheme and no trailing slash.
fn normalize_domain(domain: &str) -> String {
    let trimmed = domain.trim().trim_end_matches('/');
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    fn clear_env() {
        // SAFETY: env-mutating tests are serialized
        unsafe {
            std::env::remove_var(env_vars::STATS_API_DOMAIN);
            std::env::remove_var(env_vars::INJURY_DOMAIN);
            std::env::remove_var(env_vars::HTTP_TIMEOUT);
            std::env::remove_var(env_vars::DATA_DIR);
            std::env::remove_var(env_vars::LOG_FILE);
            std::env::remove_var(env_vars::LLM_MODEL);
            std::env::remove_var(env_vars::LLM_API_KEY);
        }
    }

    #[tokio::test]
    async fn test_config_load_existing_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let config_path_str = config_path.to_string_lossy();

        let config_content = r#"
stats_api_domain = "https://stats.example.com/stats"
log_file_path = "/custom/log/path"
http_timeout_seconds = 12
"#;
        tokio::fs::write(&config_path, config_content)
            .await
            .unwrap();

        let config = Config::load_from_path(&config_path_str).await.unwrap();

        assert_eq!(config.stats_api_domain, "https://stats.example.com/stats");
        assert_eq!(config.log_file_path, Some("/custom/log/path".to_string()));
        assert_eq!(config.http_timeout_seconds, 12);
        // Unspecified fields fall back to defaults
        assert_eq!(
            config.injury_report_domain,
            constants::DEFAULT_INJURY_REPORT_DOMAIN
        );
        assert_eq!(config.llm_model, constants::DEFAULT_LLM_MODEL);
    }

    #[tokio::test]
    async fn test_config_save_normalizes_domains() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");
        let config_path_str = config_path.to_string_lossy();
        let config = Config {
            stats_api_domain: "stats.example.com/stats/".to_string(),
            injury_report_domain: "http://reports.example.com".to_string(),
            ..Config::default()
        };

        config.save_to_path(&config_path_str).await.unwrap();
        assert!(config_path.exists());

        let loaded = Config::load_from_path(&config_path_str).await.unwrap();
        assert_eq!(loaded.stats_api_domain, "https://stats.example.com/stats");
        assert_eq!(loaded.injury_report_domain, "http://reports.example.com");
    }

    #[tokio::test]
    async fn test_api_key_is_never_written() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let config_path_str = config_path.to_string_lossy();
        let config = Config {
            llm_api_key: Some("sk-secret".to_string()),
            ..Config::default()
        };

        config.save_to_path(&config_path_str).await.unwrap();
        let content = tokio::fs::read_to_string(&config_path).await.unwrap();
        assert!(!content.contains("sk-secret"));
        assert!(!config.describe().contains("sk-secret"));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        // SAFETY: serialized test
        unsafe {
            std::env::set_var(env_vars::STATS_API_DOMAIN, "http://localhost:9000");
            std::env::set_var(env_vars::HTTP_TIMEOUT, "7");
            std::env::set_var(env_vars::LLM_API_KEY, "sk-test");
        }

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.stats_api_domain, "http://localhost:9000");
        assert_eq!(config.http_timeout_seconds, 7);
        assert_eq!(config.llm_api_key.as_deref(), Some("sk-test"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_timeout_env_is_ignored() {
        clear_env();
        // SAFETY: serialized test
        unsafe {
            std::env::set_var(env_vars::HTTP_TIMEOUT, "soon");
        }

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.http_timeout_seconds, default_http_timeout());
        assert_eq!(config.llm_api_key, None);
        clear_env();
    }

    #[test]
    fn test_data_dir_prefers_configured_path() {
        let config = Config {
            data_dir: Some("/tmp/courtside-data".to_string()),
            ..Config::default()
        };
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/courtside-data"));

        let default_dir = Config::default().data_dir();
        assert!(default_dir.to_string_lossy().contains("courtside"));
    }

    #[test]
    fn test_get_config_path() {
        let config_path = Config::get_config_path();
        assert!(config_path.contains("courtside"));
        assert!(config_path.ends_with("config.toml"));
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let invalid_content = r#"
stats_api_domain = "https://stats.example.com"
http_timeout_seconds = [1, 2, "unclosed
"#;
        let result: Result<Config, _> = toml::from_str(invalid_content);
        assert!(result.is_err());
    }
}
