#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for pkengine
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/pkengine/config.toml)
//! - Environment variables
//! - CLI flags (applied by the caller)

pub mod repository;

pub use repository::{default_repositories, RepositoryConfig};

use pkengine_errors::{ConfigError, Error};
use pkengine_types::{OutputFormat, RepositoryDescriptor};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default = "default_repositories")]
    pub repositories: Vec<RepositoryConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            timing: TimingConfig::default(),
            policy: PolicyConfig::default(),
            repositories: default_repositories(),
        }
    }
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Read by the static network probe
    #[serde(default = "default_network_online")]
    pub network_online: bool,
    #[serde(default)]
    pub default_output: OutputFormat,
}

/// Tick intervals in milliseconds, one per operation kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TimingConfig {
    #[serde(default = "default_install_ms")]
    pub install: u64,
    #[serde(default = "default_update_system_ms")]
    pub update_system: u64,
    #[serde(default = "default_update_packages_ms")]
    pub update_packages: u64,
    #[serde(default = "default_refresh_cache_ms")]
    pub refresh_cache: u64,
    #[serde(default = "default_what_provides_ms")]
    pub what_provides: u64,
    #[serde(default = "default_search_name_ms")]
    pub search_name: u64,
    #[serde(default = "default_get_updates_ms")]
    pub get_updates: u64,
    #[serde(default = "default_get_update_detail_ms")]
    pub get_update_detail: u64,
    /// Delay before a queued cancellation is acknowledged
    #[serde(default = "default_cancel_grace_ms")]
    pub cancel_grace: u64,
}

/// Operation policy switches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_true")]
    pub remove_requires_network: bool,
    #[serde(default = "default_true")]
    pub updates_require_network: bool,
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            network_online: true,
            default_output: OutputFormat::Plain,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            install: default_install_ms(),
            update_system: default_update_system_ms(),
            update_packages: default_update_packages_ms(),
            refresh_cache: default_refresh_cache_ms(),
            what_provides: default_what_provides_ms(),
            search_name: default_search_name_ms(),
            get_updates: default_get_updates_ms(),
            get_update_detail: default_get_update_detail_ms(),
            cancel_grace: default_cancel_grace_ms(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            remove_requires_network: true,
            updates_require_network: true,
        }
    }
}

// Default value functions for serde
fn default_locale() -> String {
    "en_GB.utf8".to_string()
}

fn default_network_online() -> bool {
    true
}

fn default_true() -> bool {
    true
}

fn default_install_ms() -> u64 {
    100
}

fn default_update_system_ms() -> u64 {
    1000
}

fn default_update_packages_ms() -> u64 {
    2000
}

fn default_refresh_cache_ms() -> u64 {
    500
}

fn default_what_provides_ms() -> u64 {
    200
}

fn default_search_name_ms() -> u64 {
    2000
}

fn default_get_updates_ms() -> u64 {
    1000
}

fn default_get_update_detail_ms() -> u64 {
    500
}

fn default_cancel_grace_ms() -> u64 {
    1500
}

impl TimingConfig {
    #[must_use]
    pub fn install(&self) -> Duration {
        Duration::from_millis(self.install)
    }

    #[must_use]
    pub fn update_system(&self) -> Duration {
        Duration::from_millis(self.update_system)
    }

    #[must_use]
    pub fn update_packages(&self) -> Duration {
        Duration::from_millis(self.update_packages)
    }

    #[must_use]
    pub fn refresh_cache(&self) -> Duration {
        Duration::from_millis(self.refresh_cache)
    }

    #[must_use]
    pub fn what_provides(&self) -> Duration {
        Duration::from_millis(self.what_provides)
    }

    #[must_use]
    pub fn search_name(&self) -> Duration {
        Duration::from_millis(self.search_name)
    }

    #[must_use]
    pub fn get_updates(&self) -> Duration {
        Duration::from_millis(self.get_updates)
    }

    #[must_use]
    pub fn get_update_detail(&self) -> Duration {
        Duration::from_millis(self.get_update_detail)
    }

    #[must_use]
    pub fn cancel_grace(&self) -> Duration {
        Duration::from_millis(self.cancel_grace)
    }
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("pkengine").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, if it contains invalid
    /// TOML, or if it lists the same repository id twice.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // PKENGINE_LOCALE
        if let Ok(locale) = std::env::var("PKENGINE_LOCALE") {
            if locale.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "PKENGINE_LOCALE".to_string(),
                    value: locale,
                }
                .into());
            }
            self.general.locale = locale;
        }

        // PKENGINE_OFFLINE
        if let Ok(offline) = std::env::var("PKENGINE_OFFLINE") {
            self.general.network_online = match offline.as_str() {
                "true" | "1" | "yes" => false,
                "false" | "0" | "no" => true,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "PKENGINE_OFFLINE".to_string(),
                        value: offline,
                    }
                    .into())
                }
            };
        }

        Ok(())
    }

    /// Descriptors for the configured repositories, in file order
    #[must_use]
    pub fn repository_descriptors(&self) -> Vec<RepositoryDescriptor> {
        self.repositories
            .iter()
            .map(RepositoryConfig::to_descriptor)
            .collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for repo in &self.repositories {
            if !seen.insert(repo.id.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "repositories.id".to_string(),
                    value: repo.id.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_backend_timings() {
        let config = Config::default();
        assert_eq!(config.timing.install(), Duration::from_millis(100));
        assert_eq!(config.timing.update_packages(), Duration::from_millis(2000));
        assert_eq!(config.timing.cancel_grace(), Duration::from_millis(1500));
        assert_eq!(config.general.locale, "en_GB.utf8");
        assert!(config.policy.remove_requires_network);
    }

    #[test]
    fn test_default_repositories() {
        let repos = Config::default().repository_descriptors();
        let ids: Vec<_> = repos.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["fedora", "development", "livna-development"]);
        assert!(repos.iter().all(|r| r.enabled && !r.adhoc));
        assert!(repos[1].development);
        assert!(!repos[2].development);
    }

    #[test]
    fn test_duplicate_repository_rejected() {
        let mut config = Config::default();
        config.repositories.push(config.repositories[0].clone());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
