//! Configuration management for Teddy
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, TeddyError};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for Teddy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Completion endpoint settings
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Conversation and engagement settings
    #[serde(default)]
    pub session: SessionConfig,
    /// Speech input/output settings
    #[serde(default)]
    pub speech: SpeechConfig,
    /// Camera preview settings
    #[serde(default)]
    pub camera: CameraConfig,
}

/// Chat-completion endpoint configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the OpenAI-compatible API (without `/chat/completions`)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Bearer token. Normally supplied through `OPENROUTER_API_KEY`.
    #[serde(default)]
    pub api_key: String,

    /// Value of the `HTTP-Referer` identification header
    #[serde(default = "default_referer")]
    pub referer: String,

    /// Value of the `X-Title` identification header
    #[serde(default = "default_title")]
    pub title: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,
}

fn default_api_base() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "openchat/openchat-7b:free".to_string()
}

fn default_referer() -> String {
    "https://video-ai-chatbot.com".to_string()
}

fn default_title() -> String {
    "TeddyAI".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            api_key: String::new(),
            referer: default_referer(),
            title: default_title(),
            timeout_seconds: default_request_timeout(),
        }
    }
}

impl ProviderConfig {
    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

// Hand-written so the token never lands in logs.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("referer", &self.referer)
            .field("title", &self.title)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Longest accepted idle window (one day)
pub const MAX_IDLE_WINDOW_SECONDS: u64 = 24 * 60 * 60;

/// Conversation behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// System prompt placed first in every completion request
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Seconds of user silence before a proactive message is injected,
    /// between 1 and `MAX_IDLE_WINDOW_SECONDS`
    #[serde(default = "default_idle_window")]
    pub idle_window_seconds: u64,

    /// Canned assistant message used to re-engage the user
    #[serde(default = "default_proactive_message")]
    pub proactive_message: String,

    /// Maximum proactive messages per silence period (at least 1)
    #[serde(default = "default_max_consecutive_nudges")]
    pub max_consecutive_nudges: u32,

    /// Allow at most one in-flight completion request per session
    #[serde(default = "default_serialize_sends")]
    pub serialize_sends: bool,
}

fn default_system_prompt() -> String {
    "You are a friendly teddy bear designed for toddlers. Your purpose is to provide \
     educational insights, teach new things, sing songs, and engage in playful conversation. \
     Keep your responses short, simple, and age-appropriate. If the toddler doesn't engage \
     with you for a while, proactively ask them a question or suggest an activity."
        .to_string()
}

fn default_idle_window() -> u64 {
    15
}

fn default_proactive_message() -> String {
    "Hi there! What's your favorite animal today? Or would you like to sing a song with me?"
        .to_string()
}

fn default_max_consecutive_nudges() -> u32 {
    1
}

fn default_serialize_sends() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            idle_window_seconds: default_idle_window(),
            proactive_message: default_proactive_message(),
            max_consecutive_nudges: default_max_consecutive_nudges(),
            serialize_sends: default_serialize_sends(),
        }
    }
}

impl SessionConfig {
    /// Idle window as a `Duration`
    pub fn idle_window(&self) -> Duration {
        Duration::from_secs(self.idle_window_seconds)
    }
}

/// Speech input/output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Locale for recognition and synthesis
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Speak successful replies aloud
    #[serde(default = "default_output_enabled")]
    pub output_enabled: bool,

    /// Text-to-speech command; `{locale}` is substituted, the text is the last argument
    #[serde(default)]
    pub tts_command: Vec<String>,

    /// Speech-to-text command; `{locale}` is substituted, stdout is the transcript
    #[serde(default)]
    pub stt_command: Vec<String>,
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_output_enabled() -> bool {
    true
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            output_enabled: default_output_enabled(),
            tts_command: Vec::new(),
            stt_command: Vec::new(),
        }
    }
}

/// Camera preview configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Try to acquire a capture device at startup
    #[serde(default = "default_camera_enabled")]
    pub enabled: bool,

    /// Capture device path
    #[serde(default = "default_camera_device")]
    pub device: PathBuf,

    /// Requested facing mode ("user" or "environment")
    #[serde(default = "default_facing_mode")]
    pub facing_mode: String,
}

fn default_camera_enabled() -> bool {
    true
}

fn default_camera_device() -> PathBuf {
    PathBuf::from("/dev/video0")
}

fn default_facing_mode() -> String {
    "user".to_string()
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            enabled: default_camera_enabled(),
            device: default_camera_device(),
            facing_mode: default_facing_mode(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used and a warning is logged.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: impl AsRef<Path>, cli: &crate::cli::Cli) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(TeddyError::from)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_yaml::from_str(&contents)
            .map_err(TeddyError::from)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
            self.provider.api_key = key;
        }

        // The crate-specific variable wins over the vendor one
        if let Ok(key) = std::env::var("TEDDY_API_KEY") {
            self.provider.api_key = key;
        }

        if let Ok(api_base) = std::env::var("TEDDY_API_BASE") {
            self.provider.api_base = api_base;
        }

        if let Ok(model) = std::env::var("TEDDY_MODEL") {
            self.provider.model = model;
        }

        if let Ok(timeout) = std::env::var("TEDDY_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.provider.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid TEDDY_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(idle) = std::env::var("TEDDY_IDLE_WINDOW_SECONDS") {
            if let Ok(value) = idle.parse() {
                self.session.idle_window_seconds = value;
            } else {
                tracing::warn!("Invalid TEDDY_IDLE_WINDOW_SECONDS: {}", idle);
            }
        }

        if let Ok(locale) = std::env::var("TEDDY_LOCALE") {
            self.speech.locale = locale;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let crate::cli::Commands::Chat {
            no_speech,
            idle_seconds,
            no_camera,
        } = &cli.command
        {
            if *no_speech {
                self.speech.output_enabled = false;
            }
            if let Some(seconds) = idle_seconds {
                self.session.idle_window_seconds = *seconds;
            }
            if *no_camera {
                self.camera.enabled = false;
            }
        }
    }

    /// Validate the configuration
    ///
    /// The API key is not checked here. A missing token surfaces as an
    /// authorization error from the endpoint, shown in the transcript.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.api_base.trim().is_empty() {
            return Err(TeddyError::Config("provider.api_base cannot be empty".to_string()).into());
        }

        if !self.provider.api_base.starts_with("http://")
            && !self.provider.api_base.starts_with("https://")
        {
            return Err(TeddyError::Config(format!(
                "provider.api_base must be an http(s) URL: {}",
                self.provider.api_base
            ))
            .into());
        }

        if self.provider.model.trim().is_empty() {
            return Err(TeddyError::Config("provider.model cannot be empty".to_string()).into());
        }

        if self.provider.timeout_seconds == 0 {
            return Err(TeddyError::Config(
                "provider.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.session.idle_window_seconds == 0 {
            return Err(TeddyError::Config(
                "session.idle_window_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.session.idle_window_seconds > MAX_IDLE_WINDOW_SECONDS {
            return Err(TeddyError::Config(format!(
                "session.idle_window_seconds must be at most {}",
                MAX_IDLE_WINDOW_SECONDS
            ))
            .into());
        }

        if self.session.max_consecutive_nudges == 0 {
            return Err(TeddyError::Config(
                "session.max_consecutive_nudges must be greater than 0".to_string(),
            )
            .into());
        }

        if self.session.proactive_message.trim().is_empty() {
            return Err(TeddyError::Config(
                "session.proactive_message cannot be empty".to_string(),
            )
            .into());
        }

        if self.session.system_prompt.trim().is_empty() {
            return Err(
                TeddyError::Config("session.system_prompt cannot be empty".to_string()).into(),
            );
        }

        if self.speech.locale.trim().is_empty() {
            return Err(TeddyError::Config("speech.locale cannot be empty".to_string()).into());
        }

        Ok(())
    }
}
