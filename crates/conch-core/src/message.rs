//! The message type produced by every handler and continuation.
//!
//! A [`Message`] is the tagged result of processing one command:
//!
//! - [`Message::Reply`]: a final textual answer
//! - [`Message::Error`]: a failure with its cause and a human readable context
//! - [`Message::Question`]: a follow-up question; the next input goes to its continuation
//! - [`Message::Select`]: like a question, but constrained to a list of choices
//! - [`Message::Empty`]: "no opinion", the router asks the next module
//!
//! Question and select messages are the only way to start a conversation. They
//! carry a [`Continuation`] together with a map of bound arguments that are
//! handed back to the continuation along with the user's answer.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::ModuleContext;
use crate::error::{BoxError, ErrorCause};
use crate::reply::{Reply, tags};

/// Text of the reply synthesized when no module answers a command.
pub const NO_ANSWER: &str = "No answer :(";

/// Arguments bound to a continuation when a conversation starts.
pub type BoundArgs = serde_json::Map<String, Value>;

/// Result type of handlers and continuations.
pub type HandlerResult = Result<Message, BoxError>;

/// A continuation stored by a pending conversation.
///
/// It has the same shape as a command handler but receives an [`Answer`],
/// which also exposes the bound arguments and (for selects) the choices.
pub type Continuation = Arc<dyn Fn(&ModuleContext, Answer<'_>) -> HandlerResult + Send + Sync>;

// ============================================================================
// Choice
// ============================================================================

/// One entry of a [`Message::Select`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Text shown to the user.
    pub label: String,
    /// Value the continuation works with once this choice is picked.
    pub payload: Value,
}

impl Choice {
    /// Creates a new choice.
    pub fn new(label: impl Into<String>, payload: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

// ============================================================================
// Message
// ============================================================================

/// The tagged result of processing a command.
#[derive(Clone)]
pub enum Message {
    /// A final answer.
    Reply {
        /// Text shown to the user.
        text: String,
    },

    /// A failure, delivered like a normal reply but tagged as an error.
    Error {
        /// What went wrong.
        cause: ErrorCause,
        /// Where it went wrong, for humans.
        context: String,
    },

    /// A follow-up question.
    Question {
        /// Text shown to the user.
        prompt: String,
        /// Receives the next input.
        continuation: Continuation,
        /// Handed back to the continuation.
        args: BoundArgs,
    },

    /// A follow-up question constrained to a list of choices.
    Select {
        /// Text shown above the choices.
        prompt: String,
        /// Receives the next input and validates it against `choices`.
        continuation: Continuation,
        /// Ordered `(label, payload)` pairs.
        choices: Vec<Choice>,
        /// Handed back to the continuation.
        args: BoundArgs,
    },

    /// No opinion; the next module gets a chance.
    Empty,
}

impl Message {
    /// Creates a reply.
    pub fn reply(text: impl Into<String>) -> Self {
        Self::Reply { text: text.into() }
    }

    /// Creates an error message.
    pub fn error(cause: impl Into<BoxError>, context: impl Into<String>) -> Self {
        Self::Error {
            cause: ErrorCause::from(cause.into()),
            context: context.into(),
        }
    }

    /// Creates a question whose answer is handed to `continuation`.
    pub fn question<F>(prompt: impl Into<String>, continuation: F) -> Self
    where
        F: Fn(&ModuleContext, Answer<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Question {
            prompt: prompt.into(),
            continuation: Arc::new(continuation),
            args: BoundArgs::new(),
        }
    }

    /// Creates a select whose answer is handed to `continuation`.
    pub fn select<F>(prompt: impl Into<String>, continuation: F, choices: Vec<Choice>) -> Self
    where
        F: Fn(&ModuleContext, Answer<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Select {
            prompt: prompt.into(),
            continuation: Arc::new(continuation),
            choices,
            args: BoundArgs::new(),
        }
    }

    /// The "no opinion" message.
    pub fn empty() -> Self {
        Self::Empty
    }

    /// Binds an argument to the continuation of a question or select.
    ///
    /// Has no effect on the other variants.
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Self::Question { args, .. } | Self::Select { args, .. } = &mut self {
            args.insert(key.into(), value.into());
        }
        self
    }

    /// Returns `true` for [`Message::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns `true` if this message starts (or continues) a conversation.
    pub fn is_dialog(&self) -> bool {
        matches!(self, Self::Question { .. } | Self::Select { .. })
    }

    /// Returns `true` for [`Message::Error`].
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Returns the variant name, used as the reply tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Reply { .. } => tags::REPLY,
            Self::Error { .. } => tags::ERROR,
            Self::Question { .. } => tags::QUESTION,
            Self::Select { .. } => tags::SELECT,
            Self::Empty => tags::EMPTY,
        }
    }

    /// Splits a question or select into its [`Dialog`] state.
    ///
    /// Any other variant is handed back unchanged.
    pub fn into_dialog(self) -> Result<Dialog, Self> {
        match self {
            Self::Question {
                prompt,
                continuation,
                args,
            } => Ok(Dialog {
                prompt,
                continuation,
                args,
                choices: None,
            }),
            Self::Select {
                prompt,
                continuation,
                choices,
                args,
            } => Ok(Dialog {
                prompt,
                continuation,
                args,
                choices: Some(choices),
            }),
            other => Err(other),
        }
    }

    /// Normalizes this message into the `(text, tags, extra)` wire form.
    ///
    /// [`Message::Empty`] normalizes to the default "no answer" reply.
    pub fn to_reply(&self) -> Reply {
        match self {
            Self::Reply { text } => Reply::new(text.clone(), tags::REPLY),
            Self::Error { cause, context } => {
                Reply::new(format!("{context}: {cause}"), tags::ERROR)
            }
            Self::Question { prompt, args, .. } => {
                let reply = Reply::new(prompt.clone(), tags::QUESTION);
                match args.get("text") {
                    Some(text) => reply.with_extra(serde_json::json!({ "text": text })),
                    None => reply,
                }
            }
            Self::Select {
                prompt, choices, ..
            } => {
                let mut text = prompt.clone();
                for (i, choice) in choices.iter().enumerate() {
                    text.push_str(&format!("\n {}. {}", i + 1, choice.label));
                }
                let labels: Vec<&str> = choices.iter().map(|c| c.label.as_str()).collect();
                Reply::new(text, tags::SELECT).with_extra(serde_json::json!({ "choices": labels }))
            }
            Self::Empty => Reply::new(NO_ANSWER, tags::REPLY),
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reply { text } => f.debug_struct("Reply").field("text", text).finish(),
            Self::Error { cause, context } => f
                .debug_struct("Error")
                .field("cause", &cause.to_string())
                .field("context", context)
                .finish(),
            Self::Question { prompt, args, .. } => f
                .debug_struct("Question")
                .field("prompt", prompt)
                .field("args", args)
                .finish_non_exhaustive(),
            Self::Select {
                prompt,
                choices,
                args,
                ..
            } => f
                .debug_struct("Select")
                .field("prompt", prompt)
                .field("choices", choices)
                .field("args", args)
                .finish_non_exhaustive(),
            Self::Empty => f.write_str("Empty"),
        }
    }
}

// ============================================================================
// Dialog
// ============================================================================

/// The state of a question or select waiting for its answer.
#[derive(Clone)]
pub struct Dialog {
    /// Prompt that was shown to the user.
    pub prompt: String,
    /// Receives the answer.
    pub continuation: Continuation,
    /// Arguments bound when the dialog was created.
    pub args: BoundArgs,
    /// Present for selects.
    pub choices: Option<Vec<Choice>>,
}

impl Dialog {
    /// Rebuilds the message this dialog was created from.
    pub fn to_message(&self) -> Message {
        match &self.choices {
            Some(choices) => Message::Select {
                prompt: self.prompt.clone(),
                continuation: Arc::clone(&self.continuation),
                choices: choices.clone(),
                args: self.args.clone(),
            },
            None => Message::Question {
                prompt: self.prompt.clone(),
                continuation: Arc::clone(&self.continuation),
                args: self.args.clone(),
            },
        }
    }

    /// Returns `true` if this dialog is a select.
    pub fn is_select(&self) -> bool {
        self.choices.is_some()
    }
}

impl fmt::Debug for Dialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialog")
            .field("prompt", &self.prompt)
            .field("args", &self.args)
            .field("choices", &self.choices)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Answer
// ============================================================================

/// The input handed to a [`Continuation`].
///
/// The raw answer is tokenized exactly like a command, but never walked
/// through any command tree.
#[derive(Debug, Clone, Copy)]
pub struct Answer<'a> {
    /// Whitespace separated tokens of the answer.
    pub tokens: &'a [String],
    /// Number of tokens.
    pub count: usize,
    dialog: &'a Dialog,
}

impl<'a> Answer<'a> {
    /// Creates an answer to `dialog`.
    pub fn new(tokens: &'a [String], dialog: &'a Dialog) -> Self {
        Self {
            tokens,
            count: tokens.len(),
            dialog,
        }
    }

    /// The answer joined back with single spaces.
    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }

    /// Arguments bound when the dialog started.
    pub fn args(&self) -> &'a BoundArgs {
        &self.dialog.args
    }

    /// Looks up a bound argument.
    pub fn arg(&self, key: &str) -> Option<&'a Value> {
        self.dialog.args.get(key)
    }

    /// Choices offered by a select; empty for questions.
    pub fn choices(&self) -> &'a [Choice] {
        self.dialog.choices.as_deref().unwrap_or_default()
    }

    /// Resolves the answer against the offered choices.
    ///
    /// Accepts a 1-based index or the exact label of a choice.
    pub fn choice(&self) -> Option<&'a Choice> {
        let choices = self.choices();
        let text = self.text();
        if let Ok(index) = text.parse::<usize>() {
            return index.checked_sub(1).and_then(|i| choices.get(i));
        }
        choices.iter().find(|c| c.label == text)
    }

    /// Re-arms the same dialog so the user is asked again.
    pub fn reprompt(&self) -> Message {
        self.dialog.to_message()
    }

    /// Re-arms the same dialog with a different prompt text.
    pub fn reprompt_with(&self, prompt: impl Into<String>) -> Message {
        let mut dialog = self.dialog.clone();
        dialog.prompt = prompt.into();
        dialog.to_message()
    }
}
