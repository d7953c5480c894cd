//! # Conch Framework
//!
//! The dispatch machinery of the conch command interpreter.
//!
//! This layer provides:
//! - The [`Router`], which walks modules in priority order and resolves a
//!   tokenized command against their command trees
//! - The [`Conversation`] state, which sends the next input straight to a
//!   pending question or select
//! - The [`ModuleCatalog`] of known modules and the [`ModuleRegistry`]
//!   driving their lifecycle hooks
//! - The [`guard`] that turns handler errors and panics into error messages
//!
//! None of these types are thread-safe by themselves; they are owned by the
//! interpreter's worker thread, which serializes every mutation.

pub mod catalog;
pub mod conversation;
pub mod guard;
pub mod registry;
pub mod router;

pub use catalog::{ModuleCatalog, ModuleFactory};
pub use conversation::Conversation;
pub use registry::{ModuleRegistry, ModuleState};
pub use router::{Router, resolve};
