//! Integration tests for proactive engagement
//!
//! A companion and an engagement monitor share one session, the way the
//! interactive chat wires them. Time is paused so idle windows elapse
//! instantly.

mod common;

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use teddy::agent::{Companion, EngagementMonitor, Session, SessionEvent};
use teddy::config::Config;
use teddy::providers::{CompletionProvider, CompletionRequest, CompletionResult, Message, Origin};

use common::RecordingSynthesizer;

/// Provider that answers every request with the same reply
#[derive(Default)]
struct EchoProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl CompletionProvider for EchoProvider {
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let last = request
            .history
            .last()
            .map(|m| m.text.clone())
            .unwrap_or_default();
        CompletionResult::Success {
            text: format!("you said {}", last),
        }
    }
}

fn proactive_count(session: &Session, config: &Config) -> usize {
    session
        .snapshot()
        .iter()
        .filter(|m| m.origin == Origin::Assistant && m.text == config.session.proactive_message)
        .count()
}

#[tokio::test(start_paused = true)]
async fn test_silence_after_reply_gets_one_proactive_message() {
    let config = Config::default();
    let session = Session::new();
    let provider = Arc::new(EchoProvider::default());
    let companion = Companion::new(
        session.clone(),
        provider.clone(),
        RecordingSynthesizer::new(),
        &config,
    );
    let monitor = EngagementMonitor::new(session.clone(), &config.session).spawn();

    companion.send("hi").await;
    assert_eq!(session.len(), 2);

    tokio::time::sleep(config.session.idle_window() + Duration::from_secs(1)).await;
    assert_eq!(proactive_count(&session, &config), 1);

    tokio::time::sleep(config.session.idle_window() * 4).await;
    assert_eq!(proactive_count(&session, &config), 1);

    // The proactive message is not sent to the completion endpoint
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

    monitor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_steady_conversation_gets_no_proactive_message() {
    let config = Config::default();
    let session = Session::new();
    let companion = Companion::new(
        session.clone(),
        Arc::new(EchoProvider::default()),
        RecordingSynthesizer::new(),
        &config,
    );
    let monitor = EngagementMonitor::new(session.clone(), &config.session).spawn();

    let step = config.session.idle_window() / 2;
    for i in 0..6 {
        tokio::time::sleep(step).await;
        companion.send(&format!("message {}", i)).await;
    }

    assert_eq!(proactive_count(&session, &config), 0);
    assert_eq!(session.len(), 12);

    monitor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_proactive_message_is_broadcast_to_subscribers() {
    let config = Config::default();
    let session = Session::new();
    let mut events = session.subscribe();
    let monitor = EngagementMonitor::new(session.clone(), &config.session).spawn();

    tokio::time::sleep(config.session.idle_window() + Duration::from_secs(1)).await;

    match events.recv().await.unwrap() {
        SessionEvent::Appended { index, message } => {
            assert_eq!(index, 0);
            assert_eq!(
                message,
                Message::assistant(config.session.proactive_message.clone())
            );
        }
    }

    monitor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_no_proactive_message_after_shutdown() {
    let config = Config::default();
    let session = Session::new();
    let monitor = EngagementMonitor::new(session.clone(), &config.session).spawn();

    tokio::time::sleep(Duration::from_secs(1)).await;
    monitor.shutdown().await;

    tokio::time::sleep(config.session.idle_window() * 2).await;
    assert!(session.is_empty());
}
