//! Command trees.
//!
//! A module describes the commands it understands with a tree of
//! [`CommandNode`]s. Each input token selects a child of the current
//! [`Branch`]; descent stops at a [`CommandNode::Handler`] or when the next
//! token has no matching child, in which case the branch's default handler
//! (if any) is used.
//!
//! ```rust,ignore
//! use conch_core::{Branch, Message};
//!
//! let tree = Branch::new()
//!     .handler("ping", |_ctx, _args, _argc| Ok(Message::reply("pong")))
//!     .branch(
//!         "volume",
//!         Branch::new()
//!             .handler("up", volume_up)
//!             .default(show_volume),
//!     );
//! ```
//!
//! The top level of a tree is a [`CommandTree`]: it must be a branch and it
//! may not have a default handler, so a module can never claim the empty
//! command.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::context::ModuleContext;
use crate::error::CommandContractError;
use crate::message::HandlerResult;

/// A command handler: receives the remaining tokens and their count.
pub type Handler = Arc<dyn Fn(&ModuleContext, &[String], usize) -> HandlerResult + Send + Sync>;

// ============================================================================
// CommandNode
// ============================================================================

/// A node of a command tree.
#[derive(Clone)]
pub enum CommandNode {
    /// A leaf that handles the command.
    Handler(Handler),
    /// An inner node with named children and an optional default.
    Branch(Branch),
}

impl CommandNode {
    /// Wraps a function into a handler node.
    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(&ModuleContext, &[String], usize) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Handler(Arc::new(f))
    }
}

impl From<Branch> for CommandNode {
    fn from(branch: Branch) -> Self {
        Self::Branch(branch)
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handler(_) => f.write_str("Handler"),
            Self::Branch(branch) => branch.fmt(f),
        }
    }
}

// ============================================================================
// Branch
// ============================================================================

/// An inner node of a command tree.
#[derive(Clone)]
pub struct Branch {
    children: HashMap<String, CommandNode>,
    default: Option<Handler>,
}

impl Branch {
    /// Creates an empty branch.
    pub fn new() -> Self {
        Self {
            children: HashMap::new(),
            default: None,
        }
    }

    /// Adds a child node under `key`, replacing any previous child.
    pub fn command(mut self, key: impl Into<String>, node: impl Into<CommandNode>) -> Self {
        self.children.insert(key.into(), node.into());
        self
    }

    /// Adds a handler under `key`.
    pub fn handler<F>(self, key: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ModuleContext, &[String], usize) -> HandlerResult + Send + Sync + 'static,
    {
        self.command(key, CommandNode::handler(f))
    }

    /// Adds a nested branch under `key`.
    pub fn branch(self, key: impl Into<String>, branch: Branch) -> Self {
        self.command(key, branch)
    }

    /// Sets the handler used when descent stops at this branch.
    pub fn default<F>(mut self, f: F) -> Self
    where
        F: Fn(&ModuleContext, &[String], usize) -> HandlerResult + Send + Sync + 'static,
    {
        self.default = Some(Arc::new(f));
        self
    }

    /// Looks up the child selected by `token`.
    pub fn child(&self, token: &str) -> Option<&CommandNode> {
        self.children.get(token)
    }

    /// Returns the default handler, if any.
    pub fn default_handler(&self) -> Option<&Handler> {
        self.default.as_ref()
    }

    /// Returns the keys of all children.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Returns the number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if the branch has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl fmt::Debug for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("Branch")
            .field("children", &keys)
            .field("default", &self.default.is_some())
            .finish()
    }
}

// ============================================================================
// CommandTree
// ============================================================================

/// A validated top-level command tree.
#[derive(Debug, Clone)]
pub struct CommandTree {
    root: Branch,
}

impl CommandTree {
    /// Validates `root` as the top level of a module's command tree.
    pub fn new(root: Branch) -> Result<Self, CommandContractError> {
        if root.default.is_some() {
            return Err(CommandContractError::RootDefault);
        }
        Ok(Self { root })
    }

    /// Returns the root branch.
    pub fn root(&self) -> &Branch {
        &self.root
    }
}

impl TryFrom<CommandNode> for CommandTree {
    type Error = CommandContractError;

    fn try_from(node: CommandNode) -> Result<Self, Self::Error> {
        match node {
            CommandNode::Branch(branch) => Self::new(branch),
            CommandNode::Handler(_) => Err(CommandContractError::RootHandler),
        }
    }
}
