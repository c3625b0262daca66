//! Speech-to-text: recognizer capability and listening state machine
//!
//! A recognizer produces a short stream of `RecognitionEvent`s per start:
//! `Started`, at most one `Result`, and `Ended` (or an `Error`). `VoiceInput`
//! drives one recognition at a time through
//! `Idle -> Listening -> {Result | Error | Ended} -> Idle`.

use crate::error::{Result, TeddyError};
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::mpsc;

/// Event emitted by a recognizer during one recognition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Audio capture began
    Started,
    /// A transcript segment was recognized
    Result(String),
    /// Recognition failed
    Error(String),
    /// Recognition stopped
    Ended,
}

/// Single-shot speech recognition capability
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Begin one non-continuous recognition in the given locale
    ///
    /// The returned channel closes after the recognition stops.
    async fn start(&self, locale: &str) -> Result<mpsc::Receiver<RecognitionEvent>>;
}

/// Whether a recognition is in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenState {
    /// Ready to start
    Idle,
    /// A recognition is running
    Listening,
}

/// How one recognition finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenOutcome {
    /// Speech was recognized
    Transcript(String),
    /// The recognizer or device reported an error
    Failed(String),
    /// Recognition stopped without producing a transcript
    Ended,
}

impl ListenOutcome {
    /// The transcript, if one was produced
    pub fn transcript(self) -> Option<String> {
        match self {
            Self::Transcript(text) => Some(text),
            _ => None,
        }
    }
}

/// Resets the listening flag on every exit path
struct ListeningGuard<'a>(&'a AtomicBool);

impl Drop for ListeningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Voice input driven by a recognizer
pub struct VoiceInput {
    recognizer: Arc<dyn SpeechRecognizer>,
    locale: String,
    listening: AtomicBool,
}

impl VoiceInput {
    /// Create voice input for the given recognizer and locale
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>, locale: impl Into<String>) -> Self {
        Self {
            recognizer,
            locale: locale.into(),
            listening: AtomicBool::new(false),
        }
    }

    /// Current listening state
    pub fn state(&self) -> ListenState {
        if self.listening.load(Ordering::SeqCst) {
            ListenState::Listening
        } else {
            ListenState::Idle
        }
    }

    /// Whether a recognition is in progress
    pub fn is_listening(&self) -> bool {
        self.state() == ListenState::Listening
    }

    /// Run one recognition
    ///
    /// Recognition failures are logged and reported as `ListenOutcome::Failed`;
    /// they are never turned into transcript entries.
    ///
    /// # Errors
    ///
    /// Returns `TeddyError::AlreadyListening` if a recognition is running
    pub async fn listen(&self) -> Result<ListenOutcome> {
        if self.listening.swap(true, Ordering::SeqCst) {
            return Err(TeddyError::AlreadyListening.into());
        }
        let _guard = ListeningGuard(&self.listening);

        let mut events = match self.recognizer.start(&self.locale).await {
            Ok(events) => events,
            Err(e) => {
                tracing::error!("Speech recognition error: {}", e);
                return Ok(ListenOutcome::Failed(e.to_string()));
            }
        };

        while let Some(event) = events.recv().await {
            match event {
                RecognitionEvent::Started => tracing::info!("Listening started"),
                RecognitionEvent::Result(text) => {
                    let text = text.trim();
                    if text.is_empty() {
                        tracing::debug!("Ignoring empty recognition result");
                        continue;
                    }
                    return Ok(ListenOutcome::Transcript(text.to_string()));
                }
                RecognitionEvent::Error(reason) => {
                    tracing::error!("Speech recognition error: {}", reason);
                    return Ok(ListenOutcome::Failed(reason));
                }
                RecognitionEvent::Ended => break,
            }
        }

        tracing::info!("Listening ended");
        Ok(ListenOutcome::Ended)
    }
}

/// Recognizer backed by an external dictation command
///
/// The command's trimmed stdout is the transcript. A non-zero exit status is
/// a recognition error carrying stderr.
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
}

impl CommandRecognizer {
    /// Create a recognizer from `[program, args...]`
    ///
    /// # Errors
    ///
    /// Returns `TeddyError::Speech` if the command is empty
    pub fn new(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| TeddyError::Speech("STT command is empty".to_string()))?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

#[async_trait]
impl SpeechRecognizer for CommandRecognizer {
    async fn start(&self, locale: &str) -> Result<mpsc::Receiver<RecognitionEvent>> {
        let mut command = Command::new(&self.program);
        command
            .args(super::expand_args(&self.args, locale))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|e| {
            TeddyError::Speech(format!("Failed to start '{}': {}", self.program, e))
        })?;

        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(async move {
            let _ = tx.send(RecognitionEvent::Started).await;

            match child.wait_with_output().await {
                Ok(output) if output.status.success() => {
                    let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !transcript.is_empty() {
                        let _ = tx.send(RecognitionEvent::Result(transcript)).await;
                    }
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                    let reason = if stderr.is_empty() {
                        format!("recognizer exited with {}", output.status)
                    } else {
                        stderr
                    };
                    let _ = tx.send(RecognitionEvent::Error(reason)).await;
                }
                Err(e) => {
                    let _ = tx.send(RecognitionEvent::Error(e.to_string())).await;
                }
            }

            let _ = tx.send(RecognitionEvent::Ended).await;
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ScriptedRecognizer;

    #[tokio::test]
    async fn test_listen_returns_first_result() {
        let recognizer = ScriptedRecognizer::new(vec![
            RecognitionEvent::Started,
            RecognitionEvent::Result("I like tigers".to_string()),
            RecognitionEvent::Ended,
        ]);
        let voice = VoiceInput::new(Arc::new(recognizer), "en-US");

        let outcome = voice.listen().await.unwrap();
        assert_eq!(outcome, ListenOutcome::Transcript("I like tigers".to_string()));
        assert_eq!(voice.state(), ListenState::Idle);
    }

    #[tokio::test]
    async fn test_listen_error_resets_state() {
        let recognizer = ScriptedRecognizer::new(vec![
            RecognitionEvent::Started,
            RecognitionEvent::Error("no-speech".to_string()),
        ]);
        let voice = VoiceInput::new(Arc::new(recognizer), "en-US");

        let outcome = voice.listen().await.unwrap();
        assert_eq!(outcome, ListenOutcome::Failed("no-speech".to_string()));
        assert!(!voice.is_listening());
    }

    #[tokio::test]
    async fn test_listen_end_without_result() {
        let recognizer =
            ScriptedRecognizer::new(vec![RecognitionEvent::Started, RecognitionEvent::Ended]);
        let voice = VoiceInput::new(Arc::new(recognizer), "en-US");

        let outcome = voice.listen().await.unwrap();
        assert_eq!(outcome, ListenOutcome::Ended);
        assert_eq!(outcome.transcript(), None);
    }

    #[tokio::test]
    async fn test_listen_skips_blank_results() {
        let recognizer = ScriptedRecognizer::new(vec![
            RecognitionEvent::Result("   ".to_string()),
            RecognitionEvent::Ended,
        ]);
        let voice = VoiceInput::new(Arc::new(recognizer), "en-US");

        assert_eq!(voice.listen().await.unwrap(), ListenOutcome::Ended);
    }

    #[tokio::test]
    async fn test_listen_start_failure_is_reported() {
        let voice = VoiceInput::new(Arc::new(ScriptedRecognizer::failing("mic denied")), "en-US");

        let outcome = voice.listen().await.unwrap();
        assert!(matches!(outcome, ListenOutcome::Failed(reason) if reason.contains("mic denied")));
        assert!(!voice.is_listening());
    }

    #[tokio::test]
    async fn test_listen_rejects_concurrent_start() {
        let (recognizer, release) = ScriptedRecognizer::held(vec![
            RecognitionEvent::Started,
            RecognitionEvent::Result("hello".to_string()),
        ]);
        let voice = Arc::new(VoiceInput::new(Arc::new(recognizer), "en-US"));

        let first = {
            let voice = Arc::clone(&voice);
            tokio::spawn(async move { voice.listen().await })
        };

        while !voice.is_listening() {
            tokio::task::yield_now().await;
        }

        let second = voice.listen().await;
        assert!(second.is_err());

        release.notify_one();
        let outcome = first.await.unwrap().unwrap();
        assert_eq!(outcome, ListenOutcome::Transcript("hello".to_string()));
        assert!(!voice.is_listening());
    }

    #[test]
    fn test_command_recognizer_requires_program() {
        assert!(CommandRecognizer::new(&[]).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_recognizer_uses_stdout() {
        let recognizer =
            CommandRecognizer::new(&["echo".to_string(), "hello teddy".to_string()]).unwrap();
        let voice = VoiceInput::new(Arc::new(recognizer), "en-US");

        assert_eq!(
            voice.listen().await.unwrap(),
            ListenOutcome::Transcript("hello teddy".to_string())
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_recognizer_substitutes_locale() {
        let recognizer =
            CommandRecognizer::new(&["echo".to_string(), "{locale}".to_string()]).unwrap();
        let voice = VoiceInput::new(Arc::new(recognizer), "fr-FR");

        assert_eq!(
            voice.listen().await.unwrap(),
            ListenOutcome::Transcript("fr-FR".to_string())
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_recognizer_failure_exit() {
        let recognizer = CommandRecognizer::new(&["false".to_string()]).unwrap();
        let voice = VoiceInput::new(Arc::new(recognizer), "en-US");

        assert!(matches!(
            voice.listen().await.unwrap(),
            ListenOutcome::Failed(_)
        ));
    }

    #[tokio::test]
    async fn test_command_recognizer_missing_program() {
        let recognizer =
            CommandRecognizer::new(&["teddy-no-such-dictation-tool".to_string()]).unwrap();
        let voice = VoiceInput::new(Arc::new(recognizer), "en-US");

        assert!(matches!(
            voice.listen().await.unwrap(),
            ListenOutcome::Failed(_)
        ));
    }
}
