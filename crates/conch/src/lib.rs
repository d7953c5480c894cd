//! # Conch
//!
//! A command interpreter that routes free-form text commands to pluggable
//! modules.
//!
//! ## Overview
//!
//! Producers enqueue raw command strings from any thread. A single worker
//! thread drains the queue in order, tokenizes each command and asks the
//! loaded modules, in priority order, whether their command tree matches.
//! A module answers with a reply, an error, nothing at all (letting the next
//! module try), or a question or selection that captures the next command
//! as its answer.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐     ┌───────┐     ┌────────────────────────────────────┐
//! │ producers │────▶│ queue │────▶│ worker                             │
//! └───────────┘     └───────┘     │  ├─ reload <name> ──▶ registry     │
//!                                 │  ├─ pending dialog ─▶ continuation │──▶ ReplySink
//!                                 │  └─ otherwise ──────▶ router       │
//!                                 └────────────────────────────────────┘
//! ```
//!
//! - **Core** ([`core`]): messages, replies, command trees, the module
//!   contract and the queue
//! - **Framework** ([`framework`]): router, conversation state, module
//!   catalog and registry
//! - **Runtime** ([`runtime`]): the interpreter, configuration and logging
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use conch::prelude::*;
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
//!
//! fn main() -> anyhow::Result<()> {
//!     let interpreter = Interpreter::builder()
//!         .sink(|reply: Reply| println!("{}", reply.text))
//!         .spawn()?;
//!
//!     interpreter.put_command("ping")?;
//!     interpreter.stop()?;
//!     interpreter.join()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: read `conch.toml` configuration files (default)
//! - `yaml-config`: read `conch.yaml` configuration files
//! - `json-log`: JSON log output

pub use conch_core as core;
pub use conch_framework as framework;
pub use conch_runtime as runtime;

pub use conch_core::export_module;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use conch::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use conch_runtime::{ConchConfig, ConfigLoader, Interpreter, InterpreterBuilder};

    // Module authoring
    pub use conch_core::{
        Answer, BoxError, Branch, Choice, CommandNode, HandlerResult, Message, Module,
        ModuleContext, export_module,
    };

    // Client side
    pub use conch_core::{Reply, ReplySink, tags};
}
