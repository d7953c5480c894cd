//! Conversation state.
//!
//! A module starts a conversation by answering with a question or a select.
//! The interpreter then owes the *next* input to that conversation: it is
//! tokenized and passed straight to the stored continuation, bypassing every
//! command tree. At most one conversation is pending at a time.

use tracing::{debug, trace};

use conch_core::{Answer, Dialog, Message, ModuleContext, Reply};

use crate::guard;

/// Name continuations are reported under in logs and contract errors.
const CONVERSATION: &str = "conversation";

/// Holds the single pending conversation, if any.
#[derive(Debug, Default)]
pub struct Conversation {
    pending: Option<Dialog>,
}

impl Conversation {
    /// Creates an idle conversation state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while an answer is awaited.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The dialog awaiting an answer.
    pub fn pending(&self) -> Option<&Dialog> {
        self.pending.as_ref()
    }

    /// Drops the pending conversation, returning whether there was one.
    pub fn abandon(&mut self) -> bool {
        let abandoned = self.pending.take().is_some();
        if abandoned {
            debug!("Pending conversation abandoned");
        }
        abandoned
    }

    /// Hands `tokens` to the pending continuation.
    ///
    /// Returns `None` when no conversation is pending. The pending state is
    /// cleared either way; it is re-armed only by [`settle`](Self::settle).
    pub fn answer(&mut self, ctx: &ModuleContext, tokens: &[String]) -> Option<Message> {
        let dialog = self.pending.take()?;
        trace!(prompt = %dialog.prompt, "Answering pending conversation");

        let continuation = &dialog.continuation;
        let message = guard::invoke(CONVERSATION, || continuation(ctx, Answer::new(tokens, &dialog)));
        Some(message)
    }

    /// Finalizes the result of a command or answer into its wire form.
    ///
    /// A question or select becomes the new pending conversation; anything
    /// else leaves the state idle.
    pub fn settle(&mut self, message: Message) -> Reply {
        let reply = message.to_reply();
        self.pending = match message.into_dialog() {
            Ok(dialog) => {
                debug!(select = dialog.is_select(), "Conversation armed");
                Some(dialog)
            }
            Err(_) => None,
        };
        reply
    }
}
