//! Text-to-speech: fire-and-forget synthesizer capability

use crate::error::{Result, TeddyError};
use std::process::Stdio;
use tokio::process::Command;

/// Fire-and-forget speech output
///
/// `speak` returns immediately; completion is never reported back.
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text` in `locale`
    fn speak(&self, text: &str, locale: &str);
}

/// Synthesizer that only logs what it would say
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSynthesizer;

impl SpeechSynthesizer for SilentSynthesizer {
    fn speak(&self, text: &str, locale: &str) {
        tracing::debug!(locale, chars = text.len(), "Speech output disabled, skipping");
    }
}

/// Synthesizer backed by an external TTS command such as `espeak-ng` or `say`
///
/// The text is passed as the final argument.
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
}

impl CommandSynthesizer {
    /// Create a synthesizer from `[program, args...]`
    ///
    /// # Errors
    ///
    /// Returns `TeddyError::Speech` if the command is empty
    ///
    /// # Examples
    ///
    /// ```
    /// use teddy::speech::CommandSynthesizer;
    ///
    /// let command = vec!["espeak-ng".to_string(), "-v".to_string(), "{locale}".to_string()];
    /// assert!(CommandSynthesizer::new(&command).is_ok());
    /// assert!(CommandSynthesizer::new(&[]).is_err());
    /// ```
    pub fn new(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| TeddyError::Speech("TTS command is empty".to_string()))?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    fn command(&self, text: &str, locale: &str) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(super::expand_args(&self.args, locale))
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn speak(&self, text: &str, locale: &str) {
        match self.command(text, locale).spawn() {
            Ok(mut child) => {
                let program = self.program.clone();
                tokio::spawn(async move {
                    match child.wait().await {
                        Ok(status) if !status.success() => {
                            tracing::warn!("TTS command '{}' exited with {}", program, status);
                        }
                        Ok(_) => {}
                        Err(e) => tracing::warn!("TTS command '{}' failed: {}", program, e),
                    }
                });
            }
            Err(e) => {
                tracing::warn!("Failed to start TTS command '{}': {}", self.program, e);
            }
        }
    }
}
