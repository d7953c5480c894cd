//! Configuration for conch interpreters.
//!
//! This module provides figment-based loading and validation of the
//! logging setup, the module selection and the client settings handed to
//! modules.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    ConchConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, ModulesConfig,
    SpanEventConfig,
};
pub use validation::validate_config;
