//! Teddy - conversational teddy bear companion library
//!
//! This library provides the conversational core of the teddy bear: a shared
//! session transcript, an engagement monitor that speaks up after a period of
//! silence, and a client for an OpenAI-compatible chat completion endpoint.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `agent`: Session state, the engagement monitor, and the companion that
//!   drives one conversational turn
//! - `providers`: Completion request model and the OpenRouter client
//! - `speech`: Speech recognition and synthesis collaborators
//! - `camera`: Best-effort camera preview acquisition
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//! - `commands`: Handlers for the CLI subcommands
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use teddy::providers::create_provider;
//! use teddy::speech::create_synthesizer;
//! use teddy::{Companion, Config, Session};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let session = Session::new();
//!     let provider = create_provider(&config.provider)?;
//!     let synthesizer = create_synthesizer(&config.speech);
//!     let companion = Arc::new(Companion::new(session.clone(), provider, synthesizer, &config));
//!
//!     companion.send("Hello teddy!").await;
//!     println!("{:?}", session.snapshot());
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod camera;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod providers;
pub mod speech;

// Re-export commonly used types
pub use agent::{Companion, EngagementMonitor, Session};
pub use config::Config;
pub use error::{Result, TeddyError};
pub use providers::{CompletionResult, Message, Origin};

#[cfg(test)]
pub mod test_utils;
