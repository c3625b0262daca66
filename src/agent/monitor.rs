//! Engagement monitor: proactive messages after user silence
//!
//! The monitor is a background task with two states. It is `Armed` while a
//! timer is pending and `Idle` once it has used up its nudges for the
//! current silence. Every user message re-arms it at
//! `last_user_message_at + idle_window`.
//!
//! When the timer fires the monitor re-reads the session before acting: a
//! user message that arrived after the timer was scheduled, but before its
//! notification was observed, must not be answered with a nudge.

use crate::agent::Session;
use crate::config::SessionConfig;
use crate::providers::Message;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

/// Observable monitor state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// No timer pending
    Idle,
    /// Timer pending
    Armed {
        /// When the timer fires
        deadline: Instant,
    },
}

/// Watches a session for silence and injects a proactive message
///
/// # Examples
///
/// ```no_run
/// use teddy::agent::{EngagementMonitor, Session};
/// use teddy::config::SessionConfig;
///
/// # async fn example() {
/// let session = Session::new();
/// let monitor = EngagementMonitor::new(session.clone(), &SessionConfig::default()).spawn();
/// // ... conversation ...
/// monitor.shutdown().await;
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct EngagementMonitor {
    session: Session,
    idle_window: Duration,
    proactive_message: String,
    max_consecutive_nudges: u32,
}

impl EngagementMonitor {
    /// Create a monitor from session configuration
    pub fn new(session: Session, config: &SessionConfig) -> Self {
        Self::with_settings(
            session,
            config.idle_window(),
            config.proactive_message.clone(),
            config.max_consecutive_nudges,
        )
    }

    /// Create a monitor with explicit settings
    pub fn with_settings(
        session: Session,
        idle_window: Duration,
        proactive_message: impl Into<String>,
        max_consecutive_nudges: u32,
    ) -> Self {
        Self {
            session,
            idle_window,
            proactive_message: proactive_message.into(),
            max_consecutive_nudges,
        }
    }

    /// Start the monitor on the current runtime
    pub fn spawn(self) -> MonitorHandle {
        let cancellation = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(MonitorState::Idle);

        tracing::info!(
            idle_window_secs = self.idle_window.as_secs(),
            max_nudges = self.max_consecutive_nudges,
            "Starting engagement monitor"
        );

        let task = tokio::spawn(self.run(cancellation.clone(), state_tx));

        MonitorHandle {
            cancellation,
            task: Some(task),
            state: state_rx,
        }
    }

    async fn run(self, cancellation: CancellationToken, state: watch::Sender<MonitorState>) {
        let mut activity = self.session.watch_user_activity();
        // Timers are measured from the last user message, then from each nudge
        let mut anchor = *activity.borrow_and_update();
        let mut nudges: u32 = 0;

        loop {
            let deadline = if nudges < self.max_consecutive_nudges {
                self.deadline_after(anchor)
            } else {
                None
            };
            state.send_replace(match deadline {
                Some(deadline) => MonitorState::Armed { deadline },
                None => MonitorState::Idle,
            });

            let timer = async move {
                match deadline {
                    Some(deadline) => sleep_until(deadline).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                biased;

                _ = cancellation.cancelled() => break,

                changed = activity.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    anchor = *activity.borrow_and_update();
                    nudges = 0;
                    tracing::debug!("User activity observed, re-arming engagement timer");
                }

                // The activity arm is polled first, so this only sees a newer
                // user message when it lands between the timer firing and the
                // watch notification being observed
                _ = timer => {
                    let now = Instant::now();
                    match self.on_expiry(now) {
                        Expiry::Nudge => {
                            tracing::info!("No user message within idle window, sending proactive message");
                            self.session.append(Message::assistant(self.proactive_message.clone()));
                            nudges += 1;
                            anchor = now;
                        }
                        Expiry::Rearm { last_user_message_at } => {
                            tracing::debug!("User message arrived before timer fired, re-arming");
                            anchor = last_user_message_at;
                            nudges = 0;
                        }
                    }
                }
            }
        }

        state.send_replace(MonitorState::Idle);
        tracing::debug!("Engagement monitor stopped");
    }

    /// Deadline one idle window after `anchor`, if representable
    fn deadline_after(&self, anchor: Instant) -> Option<Instant> {
        let deadline = anchor.checked_add(self.idle_window);
        if deadline.is_none() {
            tracing::warn!(
                idle_window_secs = self.idle_window.as_secs(),
                "Idle window too large to schedule, engagement monitor stays idle"
            );
        }
        deadline
    }

    /// Decide what a fired timer does, re-reading the session at `now`
    fn on_expiry(&self, now: Instant) -> Expiry {
        let last_user_message_at = self.session.last_user_message_at();
        if now.saturating_duration_since(last_user_message_at) >= self.idle_window {
            Expiry::Nudge
        } else {
            Expiry::Rearm {
                last_user_message_at,
            }
        }
    }
}

/// Action taken when the engagement timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expiry {
    /// The silence lasted a full idle window
    Nudge,
    /// The user spoke since the timer was armed
    Rearm { last_user_message_at: Instant },
}

/// Owner of a running engagement monitor
///
/// Dropping the handle cancels the monitor; `shutdown` also waits for the
/// task to finish.
#[derive(Debug)]
pub struct MonitorHandle {
    cancellation: CancellationToken,
    task: Option<JoinHandle<()>>,
    state: watch::Receiver<MonitorState>,
}

impl MonitorHandle {
    /// Current monitor state
    pub fn state(&self) -> MonitorState {
        *self.state.borrow()
    }

    /// Whether the monitor task is still running
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Cancel the monitor and wait for it to stop
    pub async fn shutdown(mut self) {
        self.cancellation.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Engagement monitor task failed: {}", e);
            }
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}
