//! The context handed to every module hook, handler and continuation.
//!
//! Modules never reach for global state: whatever they may use of the
//! interpreter is injected through [`ModuleContext`].

use std::sync::Arc;

use crate::error::QueueClosed;
use crate::queue::CommandSender;
use crate::reply::Reply;
use crate::sink::ReplySink;

/// Dependencies injected into modules.
#[derive(Clone)]
pub struct ModuleContext {
    sender: CommandSender,
    sink: Arc<dyn ReplySink>,
}

impl ModuleContext {
    /// Creates a new context.
    pub fn new(sender: CommandSender, sink: Arc<dyn ReplySink>) -> Self {
        Self { sender, sink }
    }

    /// Handle to the interpreter's command queue.
    pub fn sender(&self) -> &CommandSender {
        &self.sender
    }

    /// Enqueues a command behind everything already queued.
    pub fn put_command(&self, raw: impl Into<String>) -> Result<(), QueueClosed> {
        self.sender.put_command(raw)
    }

    /// The interpreter's client.
    pub fn sink(&self) -> &Arc<dyn ReplySink> {
        &self.sink
    }

    /// Sends an unsolicited message to the client.
    pub fn notify(&self, message: Reply) {
        self.sink.add_message(message);
    }
}

impl std::fmt::Debug for ModuleContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleContext")
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}
