//! The command queue between producers and the interpreter's worker.
//!
//! Any number of producers (GUI callbacks, chat handlers, timers, async tasks)
//! hold a cloned [`CommandSender`]; a single worker thread owns the
//! [`CommandReceiver`]. Items are delivered strictly in the order the queue
//! observed them.

use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::QueueClosed;

/// One entry of the command queue.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueItem {
    /// A raw command line, exactly as typed.
    Command(String),
    /// A new client configuration, applied on the worker thread.
    Configure(Value),
    /// Asks the worker to destroy every module and exit.
    Shutdown,
}

/// Cloneable producer handle of the command queue.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: mpsc::UnboundedSender<QueueItem>,
}

impl CommandSender {
    /// Enqueues a raw command.
    pub fn put_command(&self, raw: impl Into<String>) -> Result<(), QueueClosed> {
        self.send(QueueItem::Command(raw.into()))
    }

    /// Enqueues a new configuration.
    pub fn set_configuration(&self, cfg: Value) -> Result<(), QueueClosed> {
        self.send(QueueItem::Configure(cfg))
    }

    /// Enqueues the shutdown sentinel.
    pub fn stop(&self) -> Result<(), QueueClosed> {
        self.send(QueueItem::Shutdown)
    }

    /// Enqueues an arbitrary item.
    pub fn send(&self, item: QueueItem) -> Result<(), QueueClosed> {
        self.tx.send(item).map_err(|_| QueueClosed)
    }

    /// Returns `true` once the worker has dropped its receiver.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side of the command queue. Owned by exactly one worker.
#[derive(Debug)]
pub struct CommandReceiver {
    rx: mpsc::UnboundedReceiver<QueueItem>,
}

impl CommandReceiver {
    /// Blocks the current thread until the next item arrives.
    ///
    /// Returns `None` once every sender has been dropped.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context.
    pub fn blocking_next(&mut self) -> Option<QueueItem> {
        self.rx.blocking_recv()
    }

    /// Waits for the next item.
    pub async fn next(&mut self) -> Option<QueueItem> {
        self.rx.recv().await
    }

    /// Returns the next item if one is already queued.
    pub fn try_next(&mut self) -> Option<QueueItem> {
        self.rx.try_recv().ok()
    }
}

/// Creates a new, unbounded command queue.
pub fn command_queue() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CommandSender { tx }, CommandReceiver { rx })
}
