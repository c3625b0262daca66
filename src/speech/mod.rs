//! Speech input and output for Teddy
//!
//! Both directions are capabilities behind traits so the conversation core
//! never depends on a particular platform API:
//!
//! - `recognition`: single-shot speech-to-text and the listening state machine
//! - `synthesis`: fire-and-forget text-to-speech

pub mod recognition;
pub mod synthesis;

pub use recognition::{
    CommandRecognizer, ListenOutcome, ListenState, RecognitionEvent, SpeechRecognizer, VoiceInput,
};
pub use synthesis::{CommandSynthesizer, SilentSynthesizer, SpeechSynthesizer};

use crate::config::SpeechConfig;
use std::sync::Arc;

/// Placeholder replaced with the configured locale in command arguments
pub const LOCALE_PLACEHOLDER: &str = "{locale}";

/// Substitute `{locale}` in every argument
pub(crate) fn expand_args(args: &[String], locale: &str) -> Vec<String> {
    args.iter()
        .map(|arg| arg.replace(LOCALE_PLACEHOLDER, locale))
        .collect()
}

/// Build the synthesizer described by the speech configuration
///
/// Without a TTS command, replies are only logged.
pub fn create_synthesizer(config: &SpeechConfig) -> Arc<dyn SpeechSynthesizer> {
    match CommandSynthesizer::new(&config.tts_command) {
        Ok(synth) => Arc::new(synth),
        Err(_) => {
            tracing::debug!("No TTS command configured; replies will not be spoken");
            Arc::new(SilentSynthesizer)
        }
    }
}

/// Build the recognizer described by the speech configuration, if any
pub fn create_recognizer(config: &SpeechConfig) -> Option<Arc<dyn SpeechRecognizer>> {
    match CommandRecognizer::new(&config.stt_command) {
        Ok(recognizer) => Some(Arc::new(recognizer)),
        Err(_) => {
            tracing::debug!("No STT command configured; voice input unavailable");
            None
        }
    }
}
