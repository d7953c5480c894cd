//! # Conch Core
//!
//! Foundation types of the conch command interpreter.
//!
//! conch routes free-form text commands to pluggable [`Module`]s, runs one
//! command at a time on a dedicated worker and lets modules hold multi-step
//! conversations by answering with a [`Message::Question`] or
//! [`Message::Select`].
//!
//! This crate defines the contract everything else is built on:
//!
//! - **Messages**: the tagged result of a command ([`Message`]) and its wire
//!   form ([`Reply`])
//! - **Command trees**: [`CommandNode`], [`Branch`] and the validated
//!   top-level [`CommandTree`]
//! - **Modules**: the [`Module`] trait with no-op default hooks, static
//!   discovery via [`MODULES`] / [`export_module!`]
//! - **Plumbing**: the command queue ([`CommandSender`]), the
//!   [`ReplySink`] and the [`ModuleContext`] injected into every call
//! - **Errors**: [`ModuleError`] and [`CommandContractError`]
//!
//! ```text
//! ┌───────────┐  put_command  ┌───────┐   ┌────────┐   ┌─────────┐   add_reply  ┌────────┐
//! │ producers │──────────────▶│ queue │──▶│ worker │──▶│ modules │─────────────▶│ client │
//! └───────────┘               └───────┘   └────────┘   └─────────┘              └────────┘
//! ```

pub mod command;
pub mod context;
pub mod error;
pub mod message;
pub mod module;
pub mod queue;
pub mod reply;
pub mod sink;

pub use command::{Branch, CommandNode, CommandTree, Handler};
pub use context::ModuleContext;
pub use error::{
    BoxError, CommandContractError, ErrorCause, ModuleError, ModuleResult, QueueClosed,
};
pub use message::{
    Answer, BoundArgs, Choice, Continuation, Dialog, HandlerResult, Message, NO_ANSWER,
};
pub use module::{CreateModuleFn, MODULES, Module, ModuleDescriptor};
pub use queue::{CommandReceiver, CommandSender, QueueItem, command_queue};
pub use reply::{Reply, tags};
pub use sink::{NullSink, ReplySink};

#[doc(hidden)]
pub use linkme;

/// Prelude for module authors.
pub mod prelude {
    pub use super::{
        Answer, BoxError, Branch, Choice, CommandNode, HandlerResult, Message, Module,
        ModuleContext, export_module,
    };
}
