//! Configuration loader using figment.
//!
//! Sources are layered, later ones overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. Configuration file (`downcount.yaml` / `downcount.yml` /
//!    `config.yaml` / `config.yml`, searched in the configured paths)
//! 3. Environment variables (`DOWNCOUNT_*`, `__` as separator:
//!    `DOWNCOUNT_GLOBAL__LANG=de_de` → `global.lang = "de_de"`)
//!
//! # Example
//!
//! ```rust,ignore
//! use downcount_runtime::config::ConfigLoader;
//!
//! // Simple loading from default locations
//! let config = ConfigLoader::new().load()?;
//!
//! // Load from a specific file with env overrides
//! let config = ConfigLoader::new()
//!     .file("./downcount.yaml")
//!     .with_env()
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::DowncountConfig;

const FILE_NAMES: &[&str] = &["downcount.yaml", "downcount.yml", "config.yaml", "config.yml"];

/// Configuration loader with figment-based multi-source support.
pub struct ConfigLoader {
    /// Search paths for configuration files.
    search_paths: Vec<PathBuf>,
    /// Whether to load environment variables.
    load_env: bool,
    /// Specific config file to load (overrides search).
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a new configuration loader with defaults.
    pub fn new() -> Self {
        Self {
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Adds the current directory to search paths.
    pub fn with_current_dir(self) -> Self {
        if let Ok(cwd) = std::env::current_dir() {
            self.search_path(cwd)
        } else {
            self
        }
    }

    /// Adds the user config directory to search paths.
    pub fn with_user_config_dir(self) -> Self {
        if let Some(config_dir) = dirs::config_dir() {
            self.search_path(config_dir.join("downcount"))
        } else {
            self
        }
    }

    /// Sets a specific configuration file to load.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables loading environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Loads and returns the configuration.
    pub fn load(self) -> ConfigResult<DowncountConfig> {
        let figment = self.build_figment()?;

        let config: DowncountConfig = figment
            .extract()
            .map_err(|e| ConfigError::Extract(e.to_string()))?;

        debug!(
            timers = config.timers.len(),
            templates = config.templates.len(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Builds the figment instance with all sources.
    fn build_figment(self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(DowncountConfig::default()));

        if let Some(path) = &self.config_file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            info!(path = %path.display(), "Loading configuration file");
            figment = figment.merge(Yaml::file(path));
        } else {
            figment = self.search_config_files(figment);
        }

        if self.load_env {
            trace!("Loading environment variables with DOWNCOUNT_ prefix");
            figment = figment.merge(
                Env::prefixed("DOWNCOUNT_")
                    .split("__")
                    .map(|key| key.as_str().replace("__", ".").into()),
            );
        }

        Ok(figment)
    }

    /// Resolves the effective list of search paths.
    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if self.search_paths.is_empty() {
            let mut paths = Vec::new();
            if let Ok(cwd) = std::env::current_dir() {
                paths.push(cwd);
            }
            if let Some(config_dir) = dirs::config_dir() {
                paths.push(config_dir.join("downcount"));
            }
            paths
        } else {
            self.search_paths.clone()
        }
    }

    /// Searches for and loads the first configuration file found.
    fn search_config_files(&self, mut figment: Figment) -> Figment {
        for search_path in self.resolve_search_paths() {
            for name in FILE_NAMES {
                let path = search_path.join(name);
                if path.exists() {
                    info!(path = %path.display(), "Loading configuration file");
                    figment = figment.merge(Yaml::file(path));
                    return figment;
                }
            }
        }
        warn!("No configuration file found, using defaults");
        figment
    }
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<DowncountConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from a specific file, with env overrides applied.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<DowncountConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::new()
            .search_path(dir.path())
            .without_env()
            .load()
            .unwrap();

        assert_eq!(config.global.lang, "en_us");
        assert_eq!(config.logging.level, "info");
        assert!(config.timers.is_empty());
    }

    #[test]
    fn test_load_specific_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("downcount.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "global:\n  lang: zh_cn\ntemplates:\n  motd: hi").unwrap();

        let config = ConfigLoader::new().file(&path).without_env().load().unwrap();
        assert_eq!(config.global.lang, "zh_cn");
        assert_eq!(config.templates.get("motd").map(String::as_str), Some("hi"));
    }

    #[test]
    fn test_missing_explicit_file_errors() {
        let result = ConfigLoader::new()
            .file("/nonexistent/downcount.yaml")
            .without_env()
            .load();
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_search_path_picks_up_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "flags:\n  broadcast: true\n").unwrap();

        let config = ConfigLoader::new()
            .search_path(dir.path())
            .without_env()
            .load()
            .unwrap();
        assert_eq!(config.flags.get("broadcast"), Some(&true));
    }
}
