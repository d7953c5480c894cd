//! Layered configuration loading on top of figment.
//!
//! A [`ConchConfig`] is assembled from several sources, each overriding the
//! ones before it. Files are looked up in the current directory and then in
//! `<user config dir>/conch`, unless search paths or an explicit file are
//! given.
//!
//! # Feature Flags
//!
//! - `toml-config` *(default)*: enables TOML configuration files (`conch.toml`)
//! - `yaml-config`: enables YAML configuration files (`conch.yaml`, `conch.yml`)
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Profile-specific config file (`conch.{profile}.toml` / `conch.{profile}.yaml`)
//! 3. Main config file (`conch.toml` / `conch.yaml`)
//! 4. Environment variables (`CONCH_*`)
//! 5. Programmatic overrides
//!
//! # Environment Variable Mapping
//!
//! Environment variables are mapped using the `CONCH_` prefix with `__` as separator:
//!
//! - `CONCH_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `CONCH_SETTINGS__WINDOW__TITLE=conch` → `settings.window.title = "conch"`
//!
//! # Example
//!
//! ```rust,ignore
//! use conch_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::ConchConfig;
use super::validation::validate_config;

/// Prefix of every environment variable read by the loader.
const ENV_PREFIX: &str = "CONCH_";

/// Selects the `conch.{profile}.*` file layered beneath the main file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    /// `development`, the default.
    #[default]
    Development,
    /// `production`.
    Production,
    /// Any other name, lowercased.
    Custom(String),
}

impl Profile {
    /// The name used in profile file names.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Parses a profile name, accepting the usual abbreviations.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Reads the profile from `CONCH_PROFILE`, defaulting to Development.
    pub fn from_env() -> Self {
        std::env::var("CONCH_PROFILE")
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// File names searched for, in order. Only formats enabled by a feature are
/// listed.
const CONFIG_FILE_NAMES: &[&str] = &[
    #[cfg(feature = "toml-config")]
    "conch.toml",
    #[cfg(feature = "yaml-config")]
    "conch.yaml",
    #[cfg(feature = "yaml-config")]
    "conch.yml",
];

/// Builds a [`ConchConfig`] out of defaults, files, the environment and
/// programmatic values.
pub struct ConfigLoader {
    overrides: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader searching the default locations, with the profile
    /// taken from `CONCH_PROFILE` and environment variables enabled.
    pub fn new() -> Self {
        Self {
            overrides: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Selects the profile whose `conch.{profile}.*` file is layered under
    /// the main file.
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::parse(profile.as_ref());
        self
    }

    /// Searches `path` instead of the current and the user configuration
    /// directory. May be called repeatedly; earlier paths win.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Reads exactly this file and skips the search. A missing file is an
    /// error.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Reads `CONCH_*` environment variables (the default).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Ignores the environment.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Layers `config` over every file and the environment.
    pub fn merge(mut self, config: ConchConfig) -> Self {
        self.overrides = self.overrides.merge(Serialized::defaults(config));
        self
    }

    /// Loads, validates and returns the configuration.
    pub fn load(self) -> ConfigResult<ConchConfig> {
        let profile = self.profile.clone();
        let config: ConchConfig = self.into_figment()?.extract().map_err(|e| {
            ConfigError::ParseError(format!("Failed to extract configuration: {e}"))
        })?;
        validate_config(&config)?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            enabled = ?config.modules.enabled,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn into_figment(self) -> ConfigResult<Figment> {
        let files = match &self.config_file {
            Some(path) if !path.exists() => return Err(ConfigError::FileNotFound(path.clone())),
            Some(path) => vec![path.clone()],
            None => self.find_config_files(),
        };

        let mut figment = Figment::from(Serialized::defaults(ConchConfig::default()));
        for path in &files {
            info!(path = %path.display(), "Loading configuration file");
            figment = merge_file(figment, path)?;
        }

        if self.load_env {
            trace!(prefix = ENV_PREFIX, "Loading environment variables");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        Ok(figment.merge(self.overrides))
    }

    /// Directories searched when no explicit file is given.
    fn search_dirs(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        std::env::current_dir()
            .ok()
            .into_iter()
            .chain(dirs::config_dir().map(|dir| dir.join("conch")))
            .collect()
    }

    /// The files to merge, lowest precedence first.
    ///
    /// The first directory holding a main file wins; its profile variant, if
    /// present, is merged beneath it.
    fn find_config_files(&self) -> Vec<PathBuf> {
        let dirs = self.search_dirs();
        for dir in &dirs {
            for name in CONFIG_FILE_NAMES {
                let main = dir.join(name);
                if !main.exists() {
                    continue;
                }
                let mut files = Vec::with_capacity(2);
                if let Some((stem, ext)) = name.rsplit_once('.') {
                    let variant = dir.join(format!("{stem}.{}.{ext}", self.profile));
                    if variant.exists() {
                        files.push(variant);
                    }
                }
                files.push(main);
                return files;
            }
        }
        warn!(paths = ?dirs, "No configuration file found, using defaults");
        Vec::new()
    }
}

/// Merges one file, picking the provider from its extension.
fn merge_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        #[cfg(feature = "toml-config")]
        "toml" => Ok(figment.merge(Toml::file(path))),
        #[cfg(feature = "yaml-config")]
        "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
        ext => Err(ConfigError::ParseError(format!(
            "Unsupported or disabled configuration file format: .{ext}"
        ))),
    }
}

/// Loads the configuration from the default locations.
pub fn load_config() -> ConfigResult<ConchConfig> {
    ConfigLoader::new().load()
}

/// Loads the configuration from `path`, with environment overrides.
pub fn load_config_from_file(path: impl AsRef<Path>) -> ConfigResult<ConchConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================
