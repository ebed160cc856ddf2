//! Chat request types submitted through the message-relay port.

use serde::Serialize;

/// Maximum output tokens requested when the caller does not say otherwise.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Role attached to a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// A turn authored by the human operator.
    User,
    /// A turn previously produced by the model.
    Assistant,
}

/// A single role-tagged turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Role tag serialised onto the wire.
    pub role: ChatRole,
    /// Turn content.
    pub content: String,
}

impl ChatMessage {
    /// Build a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Build an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// An ordered chat exchange with an optional system instruction and an
/// output-token bound.
///
/// The turn sequence is never empty: constructors require an initial turn
/// and [`ChatRequest::push`] only appends, so the invariant holds by
/// construction rather than by a runtime check at submission time.
///
/// # Examples
///
/// ```rust
/// use valet::domain::{ChatRequest, DEFAULT_MAX_TOKENS};
///
/// let request = ChatRequest::from_user("ping").with_system("Reply with OK");
/// assert_eq!(request.messages().len(), 1);
/// assert_eq!(request.system(), Some("Reply with OK"));
/// assert_eq!(request.max_tokens(), DEFAULT_MAX_TOKENS);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    messages: Vec<ChatMessage>,
    system: Option<String>,
    max_tokens: u32,
}

impl ChatRequest {
    /// Build a request from its first turn.
    pub fn new(first_turn: ChatMessage) -> Self {
        Self {
            messages: vec![first_turn],
            system: None,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Build a single-turn request from user text.
    pub fn from_user(user_text: impl Into<String>) -> Self {
        Self::new(ChatMessage::user(user_text))
    }

    /// Attach a system instruction.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Override the output-token bound.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Append a turn to the exchange.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// The ordered turn sequence. Guaranteed non-empty.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The system instruction, when one was attached.
    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    /// The output-token bound.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
