//! # Conch Runtime
//!
//! Runs conch interpreters.
//!
//! This crate provides:
//! - The [`Interpreter`]: a command queue drained by one dedicated worker
//!   thread that owns every module
//! - Configuration loading and validation ([`config`])
//! - Logging setup ([`logging`])
//!
//! ```rust,ignore
//! use conch_runtime::{Interpreter, config::load_config, logging};
//!
//! let config = load_config()?;
//! logging::init_from_config(&config.logging);
//!
//! let interpreter = Interpreter::builder()
//!     .config(&config)
//!     .sink(|reply: Reply| println!("{}", reply.text))
//!     .spawn()?;
//!
//! interpreter.put_command("ping")?;
//! interpreter.stop()?;
//! interpreter.join()?;
//! ```

pub mod config;
pub mod error;
pub mod interpreter;
pub mod logging;

pub use config::{ConchConfig, ConfigError, ConfigLoader, ConfigResult};
pub use error::{RuntimeError, RuntimeResult};
pub use interpreter::{Interpreter, InterpreterBuilder, RELOAD_COMMAND};
pub use logging::{LoggingBuilder, SpanEvents};

// Re-export tracing for use by other crates
pub use tracing;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
