//! Provider module for Teddy
//!
//! This module contains the chat-completion abstraction and the
//! OpenRouter-compatible implementation.

pub mod base;
pub mod openrouter;

pub use base::{
    ApiMessage, CompletionProvider, CompletionRequest, CompletionResult, Message, Origin,
};
pub use openrouter::OpenRouterProvider;

use crate::config::ProviderConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create the configured completion provider
///
/// # Errors
///
/// Returns error if the HTTP client cannot be built
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn CompletionProvider>> {
    Ok(Arc::new(OpenRouterProvider::new(config.clone())?))
}
