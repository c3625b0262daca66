//! The companion: one conversational turn from input to spoken reply
//!
//! `Companion::send` appends the user's message, asks the completion
//! provider for a reply, and appends exactly one assistant message for the
//! outcome, whether that is the reply itself or a readable description of
//! what went wrong.

use crate::agent::Session;
use crate::config::Config;
use crate::error::Result;
use crate::providers::{CompletionProvider, CompletionRequest, CompletionResult, Message};
use crate::speech::{SpeechSynthesizer, VoiceInput};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Prefix for replies describing a rejected request
pub const HTTP_ERROR_LABEL: &str = "OpenRouter API Error";

/// Reply appended when the endpoint returns no usable choice
pub const EMPTY_CHOICE_REPLY: &str = "The AI didn't provide a response. Please try again.";

/// Reply appended when the endpoint cannot be reached
pub const NETWORK_ERROR_REPLY: &str = "Failed to get a response from the AI. There might be an issue with the OpenRouter API. Please try again later.";

/// Transcript text for a completion outcome
///
/// # Examples
///
/// ```
/// use teddy::agent::core::reply_text;
/// use teddy::providers::CompletionResult;
///
/// let result = CompletionResult::HttpError { status: 429, body: "rate limited".to_string() };
/// assert_eq!(reply_text(&result), "OpenRouter API Error: 429 - rate limited");
/// ```
pub fn reply_text(result: &CompletionResult) -> String {
    match result {
        CompletionResult::Success { text } => text.clone(),
        CompletionResult::EmptyChoice => EMPTY_CHOICE_REPLY.to_string(),
        CompletionResult::HttpError { status, body } => {
            format!("{}: {} - {}", HTTP_ERROR_LABEL, status, body)
        }
        CompletionResult::NetworkError { .. } => NETWORK_ERROR_REPLY.to_string(),
    }
}

/// Conversation driver for one session
///
/// Share it behind an `Arc` to send from several tasks.
pub struct Companion {
    session: Session,
    provider: Arc<dyn CompletionProvider>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    system_prompt: String,
    locale: String,
    speak_replies: bool,
    send_gate: Option<Mutex<()>>,
}

impl Companion {
    /// Create a companion from configuration
    pub fn new(
        session: Session,
        provider: Arc<dyn CompletionProvider>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        config: &Config,
    ) -> Self {
        Self {
            session,
            provider,
            synthesizer,
            system_prompt: config.session.system_prompt.clone(),
            locale: config.speech.locale.clone(),
            speak_replies: config.speech.output_enabled,
            send_gate: config.session.serialize_sends.then(|| Mutex::new(())),
        }
    }

    /// The session this companion writes to
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Send one user message and record the outcome
    ///
    /// Blank input is ignored and returns `None`. Otherwise the user message
    /// is appended immediately, and exactly one assistant message follows
    /// once the provider answers. When sends are serialized, a send waits
    /// for earlier in-flight requests before building its own request, so
    /// each request sees the previous reply.
    pub async fn send(&self, text: &str) -> Option<CompletionResult> {
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!("Ignoring blank input");
            return None;
        }

        self.session.append(Message::user(text));

        let _in_flight = match &self.send_gate {
            Some(gate) => Some(gate.lock().await),
            None => None,
        };

        let request = CompletionRequest::new(&self.system_prompt, &self.session.snapshot());
        let result = self.provider.complete(&request).await;

        match &result {
            CompletionResult::Success { .. } => tracing::debug!("Received reply"),
            CompletionResult::EmptyChoice => tracing::warn!("Completion returned no choices"),
            CompletionResult::HttpError { status, .. } => {
                tracing::warn!(status, "Completion request rejected")
            }
            CompletionResult::NetworkError { cause } => {
                tracing::warn!(%cause, "Completion endpoint unreachable")
            }
        }

        self.session.append(Message::assistant(reply_text(&result)));

        if let CompletionResult::Success { text } = &result {
            if self.speak_replies {
                self.synthesizer.speak(text, &self.locale);
            }
        }

        Some(result)
    }

    /// Capture one utterance and send it
    ///
    /// Returns `Ok(None)` when recognition produced no transcript; nothing is
    /// appended in that case.
    ///
    /// # Errors
    ///
    /// Returns error if a recognition is already running
    pub async fn send_voice(&self, voice: &VoiceInput) -> Result<Option<CompletionResult>> {
        let outcome = voice.listen().await?;
        match outcome.transcript() {
            Some(transcript) => Ok(self.send(&transcript).await),
            None => Ok(None),
        }
    }
}
