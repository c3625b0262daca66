//! Agent module for Teddy
//!
//! This module contains the conversation core: the shared session
//! transcript, the engagement monitor that re-engages a quiet user, and the
//! companion that turns user input into completion requests and replies.

pub mod core;
pub mod monitor;
pub mod session;

pub use self::core::Companion;
pub use monitor::{EngagementMonitor, MonitorHandle, MonitorState};
pub use session::{Session, SessionEvent};
