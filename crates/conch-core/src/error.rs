//! Unified error types for the conch core.
//!
//! Every failure that can happen around a module (discovery, lifecycle hooks,
//! command-tree validation) is described by [`ModuleError`]. None of these
//! errors ever leave the worker thread: they are converted into
//! [`Message::Error`](crate::Message::Error) at the boundary closest to where
//! they happened and delivered through the reply sink like any other reply.

use std::sync::Arc;

use thiserror::Error;

/// Type-erased error returned by lifecycle hooks, handlers and continuations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared, cloneable error cause carried by [`Message::Error`](crate::Message::Error).
pub type ErrorCause = Arc<dyn std::error::Error + Send + Sync>;

// =============================================================================
// Module Errors
// =============================================================================

/// Errors raised while loading, configuring, reloading or tearing down modules.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// The module could not be found or instantiated.
    #[error("failed to load module '{module}': {cause}")]
    Load {
        /// Name the module was requested by.
        module: String,
        /// Underlying failure.
        cause: BoxError,
    },

    /// The module's `initialize` hook failed.
    #[error("failed to initialize module '{module}': {cause}")]
    Init {
        /// Module name.
        module: String,
        /// Underlying failure.
        cause: BoxError,
    },

    /// The module's `configure` hook failed.
    #[error("failed to configure module '{module}': {cause}")]
    Config {
        /// Module name.
        module: String,
        /// Underlying failure.
        cause: BoxError,
    },

    /// The module's `destroy` hook failed. Only ever logged.
    #[error("failed to destroy module '{module}': {cause}")]
    Destroy {
        /// Module name.
        module: String,
        /// Underlying failure.
        cause: BoxError,
    },

    /// The module broke the module contract (e.g. a default command at the
    /// root of its command tree).
    #[error("module '{module}' violates the module contract: {reason}")]
    Contract {
        /// Module name.
        module: String,
        /// What was wrong.
        reason: CommandContractError,
    },

    /// Any of the above, raised while reloading the named module.
    #[error("failed to reload module '{module}': {source}")]
    Reload {
        /// Module name.
        module: String,
        /// The step that failed.
        #[source]
        source: Box<ModuleError>,
    },
}

impl ModuleError {
    /// Returns the name of the module this error concerns.
    pub fn module(&self) -> &str {
        match self {
            Self::Load { module, .. }
            | Self::Init { module, .. }
            | Self::Config { module, .. }
            | Self::Destroy { module, .. }
            | Self::Contract { module, .. }
            | Self::Reload { module, .. } => module,
        }
    }

    /// Wraps this error as a failure of a reload of the same module.
    pub fn into_reload(self) -> Self {
        Self::Reload {
            module: self.module().to_string(),
            source: Box::new(self),
        }
    }
}

// =============================================================================
// Command Contract Errors
// =============================================================================

/// A module or handler did not honour the command contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandContractError {
    /// The top level of a command tree carries a default handler.
    #[error("the top level of a command tree cannot have a default command")]
    RootDefault,

    /// The top level of a command tree is a bare handler instead of a branch.
    #[error("the top level of a command tree must be a branch")]
    RootHandler,

    /// Building the command tree panicked.
    #[error("building the command tree panicked: {detail}")]
    TreePanicked {
        /// Panic message.
        detail: String,
    },

    /// A handler or continuation did not produce a message.
    #[error("handler '{command}' did not produce a message: {detail}")]
    InvalidResponse {
        /// Module that owns the handler, or `conversation` for continuations.
        command: String,
        /// Panic payload, when one could be recovered.
        detail: String,
    },
}

// =============================================================================
// Queue Errors
// =============================================================================

/// The command queue has no consumer anymore (the worker has exited).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("command queue is closed")]
pub struct QueueClosed;

/// Result type for module operations.
pub type ModuleResult<T> = Result<T, ModuleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_name_is_kept_through_reload() {
        let err = ModuleError::Init {
            module: "ping".into(),
            cause: "boom".into(),
        }
        .into_reload();

        assert_eq!(err.module(), "ping");
        assert!(matches!(err, ModuleError::Reload { ref source, .. } if matches!(**source, ModuleError::Init { .. })));
        assert_eq!(
            err.to_string(),
            "failed to reload module 'ping': failed to initialize module 'ping': boom"
        );
    }

    #[test]
    fn test_contract_error_display() {
        let err = ModuleError::Contract {
            module: "bad".into(),
            reason: CommandContractError::RootDefault,
        };
        assert!(err.to_string().contains("cannot have a default command"));
    }
}
