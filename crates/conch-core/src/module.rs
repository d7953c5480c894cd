//! The module contract.
//!
//! Every plugin module implements [`Module`]. Only [`name`](Module::name) and
//! [`priority`](Module::priority) are required; the command tree and the three
//! lifecycle hooks default to "nothing to do".
//!
//! Modules that should be picked up automatically are exported into the
//! [`MODULES`] slice with [`export_module!`](crate::export_module):
//!
//! ```rust,ignore
//! use conch_core::{Branch, CommandNode, Message, Module, export_module};
//!
//! struct Ping;
//!
//! impl Module for Ping {
//!     fn name(&self) -> &str { "ping" }
//!     fn priority(&self) -> i32 { 10 }
//!     fn commands(&self) -> Option<CommandNode> {
//!         Some(Branch::new().handler("ping", |_, _, _| Ok(Message::reply("pong"))).into())
//!     }
//! }
//!
//! export_module!(PING, "ping", || Ok(Box::new(Ping)));
//! ```

use linkme::distributed_slice;
use serde_json::Value;

use crate::command::CommandNode;
use crate::context::ModuleContext;
use crate::error::BoxError;

/// A pluggable unit contributing commands, a priority and lifecycle hooks.
///
/// A module is owned by the interpreter's worker thread for its whole life;
/// hooks may freely mutate the module's own state. Hooks must not block
/// indefinitely: the worker stalls until they return.
pub trait Module: Send {
    /// Unique name, also used as the key for `reload <name>`.
    fn name(&self) -> &str;

    /// Evaluation order; lower values are asked first.
    fn priority(&self) -> i32;

    /// The module's command tree, if it takes commands at all.
    ///
    /// Read after [`initialize`](Self::initialize) and after every
    /// [`configure`](Self::configure). The top level must be a branch
    /// without a default handler.
    fn commands(&self) -> Option<CommandNode> {
        None
    }

    /// Called once after the module has been created or re-created.
    fn initialize(&mut self, _ctx: &ModuleContext) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called with the full client configuration whenever it changes.
    fn configure(&mut self, _ctx: &ModuleContext, _cfg: &Value) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called before the module is reloaded or the interpreter shuts down.
    fn destroy(&mut self, _ctx: &ModuleContext) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Factory function creating a fresh module instance.
pub type CreateModuleFn = fn() -> Result<Box<dyn Module>, BoxError>;

/// A static handle that identifies and instantiates a module.
#[derive(Debug, Clone, Copy)]
pub struct ModuleDescriptor {
    /// Name the module is discovered and reloaded by.
    pub name: &'static str,
    /// Creates a fresh instance.
    pub create: CreateModuleFn,
}

impl ModuleDescriptor {
    /// Creates a fresh instance of the module.
    #[inline]
    pub fn instantiate(&self) -> Result<Box<dyn Module>, BoxError> {
        (self.create)()
    }
}

/// Every module exported with [`export_module!`](crate::export_module).
#[distributed_slice]
pub static MODULES: [ModuleDescriptor];

/// Exports a module into the [`MODULES`] slice.
///
/// ```rust,ignore
/// export_module!(PING, "ping", || Ok(Box::new(Ping::default())));
/// ```
#[macro_export]
macro_rules! export_module {
    ($ident:ident, $name:expr, $create:expr $(,)?) => {
        #[$crate::linkme::distributed_slice($crate::MODULES)]
        #[linkme(crate = $crate::linkme)]
        static $ident: $crate::ModuleDescriptor = $crate::ModuleDescriptor {
            name: $name,
            create: $create,
        };
    };
}
