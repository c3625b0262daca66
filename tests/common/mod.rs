use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use teddy::config::{Config, ProviderConfig};
use teddy::speech::SpeechSynthesizer;

pub const TEST_API_KEY: &str = "test-key";

/// Provider config pointing at a mock server
#[allow(dead_code)]
pub fn provider_config(api_base: &str) -> ProviderConfig {
    ProviderConfig {
        api_base: api_base.to_string(),
        api_key: TEST_API_KEY.to_string(),
        ..ProviderConfig::default()
    }
}

/// Full config pointing at a mock server, with camera and speech commands off
#[allow(dead_code)]
pub fn test_config(api_base: &str) -> Config {
    let mut config = Config::default();
    config.provider = provider_config(api_base);
    config.camera.enabled = false;
    config
}

/// Synthesizer that records what it was asked to say
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingSynthesizer {
    spoken: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl RecordingSynthesizer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

impl SpeechSynthesizer for RecordingSynthesizer {
    fn speak(&self, text: &str, _locale: &str) {
        self.spoken.lock().unwrap().push(text.to_string());
    }
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
