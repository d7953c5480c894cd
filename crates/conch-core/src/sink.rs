//! The reply sink: the only way the worker talks to its client.

use serde_json::Value;

use crate::reply::Reply;

/// Receives every finalized reply of an interpreter.
///
/// Only ever called from the interpreter's worker thread.
pub trait ReplySink: Send + Sync {
    /// Delivers the reply to a processed command.
    fn add_reply(&self, reply: Reply);

    /// Delivers an unsolicited message, such as a module failing to load.
    ///
    /// Defaults to [`add_reply`](Self::add_reply).
    fn add_message(&self, message: Reply) {
        self.add_reply(message);
    }

    /// Applies the client's own section (`window`) of a new configuration.
    fn set_configuration(&self, _window: Option<&Value>) {}
}

impl<F> ReplySink for F
where
    F: Fn(Reply) + Send + Sync,
{
    fn add_reply(&self, reply: Reply) {
        self(reply);
    }
}

/// A sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ReplySink for NullSink {
    fn add_reply(&self, _reply: Reply) {}
}
