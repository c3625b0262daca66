//! Session state: the append-only conversation transcript
//!
//! A `Session` is a cheap, cloneable handle to one conversation. The
//! companion, the engagement monitor, and any renderer share the same
//! handle; each append happens under a lock, so entries never tear and
//! subscribers observe them in transcript order.

use crate::providers::{Message, Origin};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, watch};
use tokio::time::Instant;

const EVENT_CAPACITY: usize = 256;

/// Observable change to a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A message was appended at `index`
    Appended {
        /// Position of the message in the transcript
        index: usize,
        /// The appended message
        message: Message,
    },
}

#[derive(Debug)]
struct SessionState {
    transcript: Vec<Message>,
    last_user_message_at: Instant,
}

#[derive(Debug)]
struct SessionInner {
    state: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
    user_activity: watch::Sender<Instant>,
}

/// Shared handle to a conversation transcript
///
/// # Examples
///
/// ```
/// use teddy::agent::Session;
/// use teddy::providers::Message;
///
/// let session = Session::new();
/// session.append(Message::user("hi"));
/// assert_eq!(session.snapshot(), vec![Message::user("hi")]);
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Create an empty session
    ///
    /// The last-user-message instant starts at creation time, so the idle
    /// window is measured from session start until the first user message.
    pub fn new() -> Self {
        let now = Instant::now();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (user_activity, _) = watch::channel(now);

        Self {
            inner: Arc::new(SessionInner {
                state: Mutex::new(SessionState {
                    transcript: Vec::new(),
                    last_user_message_at: now,
                }),
                events,
                user_activity,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // Appends never panic midway, so a poisoned transcript is still consistent
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a message to the end of the transcript
    ///
    /// A user message also moves the last-user-message instant to now and
    /// wakes the engagement monitor. Every append is broadcast to
    /// subscribers. Returns the index of the new entry.
    pub fn append(&self, message: Message) -> usize {
        let mut state = self.lock();
        let index = state.transcript.len();

        if message.origin == Origin::User {
            let now = Instant::now();
            state.last_user_message_at = now;
            self.inner.user_activity.send_replace(now);
        }

        state.transcript.push(message.clone());
        tracing::debug!(index, origin = %message.origin, "Appended message");

        // Sent under the lock so subscribers see transcript order
        let _ = self
            .inner
            .events
            .send(SessionEvent::Appended { index, message });

        index
    }

    /// Immutable copy of the current transcript
    pub fn snapshot(&self) -> Vec<Message> {
        self.lock().transcript.clone()
    }

    /// Instant of the most recent user message (or session creation)
    pub fn last_user_message_at(&self) -> Instant {
        self.lock().last_user_message_at
    }

    /// Number of messages in the transcript
    pub fn len(&self) -> usize {
        self.lock().transcript.len()
    }

    /// Whether the transcript is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subscribe to append notifications
    ///
    /// Only appends that happen after subscribing are delivered.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Watch the last-user-message instant
    pub fn watch_user_activity(&self) -> watch::Receiver<Instant> {
        self.inner.user_activity.subscribe()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
