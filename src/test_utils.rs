//! Test utilities for Teddy
//!
//! Scripted collaborators for unit tests: a completion provider with queued
//! results, a recognizer with queued events, and a synthesizer that records
//! what it was asked to say.

use crate::error::{Result, TeddyError};
use crate::providers::{CompletionProvider, CompletionRequest, CompletionResult};
use crate::speech::{RecognitionEvent, SpeechRecognizer, SpeechSynthesizer};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Notify};

/// Provider that returns queued results and records every request
pub struct ScriptedProvider {
    results: Mutex<VecDeque<(CompletionResult, Duration)>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    /// Provider answering each call with the next result, immediately
    pub fn new(results: Vec<CompletionResult>) -> Self {
        Self::with_delays(results.into_iter().map(|r| (r, Duration::ZERO)).collect())
    }

    /// Provider answering each call with the next result after its delay
    pub fn with_delays(results: Vec<(CompletionResult, Duration)>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.results.lock().unwrap().pop_front();
        match next {
            Some((result, delay)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => CompletionResult::NetworkError {
                cause: "no scripted result".to_string(),
            },
        }
    }
}

/// Synthesizer that records `(text, locale)` pairs
#[derive(Default)]
pub struct RecordingSynthesizer {
    spoken: Mutex<Vec<(String, String)>>,
}

impl RecordingSynthesizer {
    /// Everything spoken so far
    pub fn spoken(&self) -> Vec<(String, String)> {
        self.spoken.lock().unwrap().clone()
    }
}

impl SpeechSynthesizer for RecordingSynthesizer {
    fn speak(&self, text: &str, locale: &str) {
        self.spoken
            .lock()
            .unwrap()
            .push((text.to_string(), locale.to_string()));
    }
}

/// Recognizer that replays a fixed list of events
pub struct ScriptedRecognizer {
    events: Vec<RecognitionEvent>,
    start_error: Option<String>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedRecognizer {
    /// Recognizer emitting `events` on every start
    pub fn new(events: Vec<RecognitionEvent>) -> Self {
        Self {
            events,
            start_error: None,
            gate: None,
        }
    }

    /// Recognizer whose start always fails
    pub fn failing(reason: &str) -> Self {
        Self {
            events: Vec::new(),
            start_error: Some(reason.to_string()),
            gate: None,
        }
    }

    /// Recognizer that holds its events until the returned `Notify` fires
    pub fn held(events: Vec<RecognitionEvent>) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        (
            Self {
                events,
                start_error: None,
                gate: Some(Arc::clone(&gate)),
            },
            gate,
        )
    }
}

#[async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    async fn start(&self, _locale: &str) -> Result<mpsc::Receiver<RecognitionEvent>> {
        if let Some(reason) = &self.start_error {
            return Err(TeddyError::Speech(reason.clone()).into());
        }

        let (tx, rx) = mpsc::channel(self.events.len().max(1));
        let events = self.events.clone();
        let gate = self.gate.clone();
        tokio::spawn(async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            for event in events {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });

        Ok(rx)
    }
}
