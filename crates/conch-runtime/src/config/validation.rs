//! Configuration validation utilities.

use std::collections::HashSet;

use super::error::{ConfigError, ConfigResult};
use super::schema::{ConchConfig, LogOutput, LoggingConfig, ModulesConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &ConchConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_modules_config(&config.modules)?;

    if !(config.settings.is_object() || config.settings.is_null()) {
        return Err(ConfigError::validation("settings must be a table"));
    }

    Ok(())
}

/// Validates logging configuration.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.file_path is required when logging to a file",
        ));
    }

    if logging.filters.keys().any(|target| target.trim().is_empty()) {
        return Err(ConfigError::validation("Log filter target cannot be empty"));
    }

    Ok(())
}

/// Validates the module selection.
fn validate_modules_config(modules: &ModulesConfig) -> ConfigResult<()> {
    let enabled = modules.enabled.as_deref().unwrap_or_default();

    let mut seen = HashSet::new();
    for name in enabled {
        validate_module_name(name)?;
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::validation(format!(
                "Module '{name}' is enabled more than once"
            )));
        }
    }

    for name in &modules.disabled {
        validate_module_name(name)?;
        if seen.contains(name.as_str()) {
            return Err(ConfigError::ConflictingModule(name.clone()));
        }
    }

    Ok(())
}

fn validate_module_name(name: &str) -> ConfigResult<()> {
    if name.trim().is_empty() {
        return Err(ConfigError::validation("Module name cannot be empty"));
    }
    if name.chars().any(char::is_whitespace) {
        // `reload <name>` could never address it
        return Err(ConfigError::validation(format!(
            "Module name cannot contain whitespace: '{name}'"
        )));
    }
    Ok(())
}
