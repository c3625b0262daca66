//! Base provider trait and common types for Teddy
//!
//! This module defines the `CompletionProvider` trait that completion
//! backends implement, along with the transcript message type, the request
//! built from a transcript, and the classified result of a request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Typed or transcribed input from the child
    User,
    /// Replies, proactive nudges, and surfaced failures
    Assistant,
    /// Instructions for the model
    System,
}

impl Origin {
    /// Wire role name used by chat-completion APIs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single transcript entry
///
/// Messages are immutable once created; their position in the transcript
/// is their arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who produced the message
    pub origin: Origin,
    /// Message text
    pub text: String,
}

impl Message {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use teddy::providers::{Message, Origin};
    ///
    /// let msg = Message::user("Hello, teddy!");
    /// assert_eq!(msg.origin, Origin::User);
    /// ```
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            origin: Origin::User,
            text: text.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            origin: Origin::Assistant,
            text: text.into(),
        }
    }

    /// Creates a new system message
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            origin: Origin::System,
            text: text.into(),
        }
    }
}

/// Message in the `{role, content}` shape chat-completion APIs expect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Role of the message sender
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl From<&Message> for ApiMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.origin.as_str().to_string(),
            content: message.text.clone(),
        }
    }
}

/// A completion request derived from a transcript snapshot
///
/// Built fresh for every send and never stored. The system prompt is always
/// the first and only system message: transcript entries of origin
/// `System` are dropped when the request is built.
///
/// # Examples
///
/// ```
/// use teddy::providers::{CompletionRequest, Message};
///
/// let transcript = vec![Message::user("hi"), Message::assistant("hello!")];
/// let request = CompletionRequest::new("Be kind", &transcript);
/// assert_eq!(request.api_messages().len(), transcript.len() + 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Fixed instructions sent first
    pub system_prompt: Message,
    /// Conversation history in arrival order
    pub history: Vec<Message>,
}

impl CompletionRequest {
    /// Build a request from a system prompt and a transcript
    pub fn new(system_prompt: impl Into<String>, transcript: &[Message]) -> Self {
        let history = transcript
            .iter()
            .filter(|m| m.origin != Origin::System)
            .cloned()
            .collect();

        Self {
            system_prompt: Message::system(system_prompt),
            history,
        }
    }

    /// Messages in wire order: system prompt, then history
    pub fn api_messages(&self) -> Vec<ApiMessage> {
        std::iter::once(&self.system_prompt)
            .chain(self.history.iter())
            .map(ApiMessage::from)
            .collect()
    }
}

/// Classified outcome of one completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionResult {
    /// The endpoint returned at least one choice; this is the first one
    Success {
        /// Reply text
        text: String,
    },
    /// The endpoint answered 2xx without a usable choice
    EmptyChoice,
    /// The endpoint rejected the request
    HttpError {
        /// HTTP status code
        status: u16,
        /// Response body, verbatim
        body: String,
    },
    /// The request never produced a readable response
    NetworkError {
        /// Description of the transport failure
        cause: String,
    },
}

impl CompletionResult {
    /// Whether the request produced a reply
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Chat-completion backend
///
/// Implementations perform at most one request per call, never retry, and
/// convert every failure into a `CompletionResult` instead of returning an
/// error.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Request a completion for the given conversation
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult;
}
