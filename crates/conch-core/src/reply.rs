//! Wire form of a finalized message.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tags attached to a [`Reply`] so clients can style it.
pub mod tags {
    /// A final answer.
    pub const REPLY: &str = "reply";
    /// An error.
    pub const ERROR: &str = "error";
    /// A follow-up question.
    pub const QUESTION: &str = "question";
    /// A follow-up question with choices.
    pub const SELECT: &str = "select";
    /// Never delivered; empty messages are normalized to [`REPLY`].
    pub const EMPTY: &str = "empty";
}

/// The `(text, tags, extra)` tuple delivered to the reply sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    /// Text shown to the user.
    pub text: String,
    /// Style tags, see [`tags`].
    pub tags: Vec<String>,
    /// Additional structured data (`null` when absent).
    #[serde(default)]
    pub extra: Value,
}

impl Reply {
    /// Creates a reply with a single tag and no extra data.
    pub fn new(text: impl Into<String>, tag: &str) -> Self {
        Self {
            text: text.into(),
            tags: vec![tag.to_string()],
            extra: Value::Null,
        }
    }

    /// Attaches extra structured data.
    pub fn with_extra(mut self, extra: Value) -> Self {
        self.extra = extra;
        self
    }

    /// Returns `true` if this reply carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Returns `true` if this reply reports an error.
    pub fn is_error(&self) -> bool {
        self.has_tag(tags::ERROR)
    }
}
