//! Camera preview acquisition
//!
//! The camera is optional. Failing to open it is logged and the
//! conversation continues without video.

use crate::config::CameraConfig;
use crate::error::{Result, TeddyError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Requested capture properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraConstraints {
    /// Facing mode ("user" for the front camera)
    pub facing_mode: String,
    /// Capture device path
    pub device: PathBuf,
}

impl From<&CameraConfig> for CameraConstraints {
    fn from(config: &CameraConfig) -> Self {
        Self {
            facing_mode: config.facing_mode.clone(),
            device: config.device.clone(),
        }
    }
}

/// An acquired capture stream
///
/// Holds the device exclusively; dropping the stream releases it.
#[derive(Debug)]
pub struct CameraStream {
    device: PathBuf,
    facing_mode: String,
    _handle: std::fs::File,
}

impl CameraStream {
    /// Device the stream was opened from
    pub fn device(&self) -> &Path {
        &self.device
    }

    /// Facing mode the stream was requested with
    pub fn facing_mode(&self) -> &str {
        &self.facing_mode
    }
}

/// Source of camera streams
#[async_trait]
pub trait CameraSource: Send + Sync {
    /// Acquire a stream satisfying `constraints`
    async fn acquire(&self, constraints: &CameraConstraints) -> Result<CameraStream>;
}

/// Camera backed by a local capture device node such as `/dev/video0`
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceCamera;

#[async_trait]
impl CameraSource for DeviceCamera {
    async fn acquire(&self, constraints: &CameraConstraints) -> Result<CameraStream> {
        let file = tokio::fs::OpenOptions::new()
            .read(true)
            .open(&constraints.device)
            .await
            .map_err(|e| {
                TeddyError::Camera(format!("{}: {}", constraints.device.display(), e))
            })?;

        Ok(CameraStream {
            device: constraints.device.clone(),
            facing_mode: constraints.facing_mode.clone(),
            _handle: file.into_std().await,
        })
    }
}

/// Acquire a preview stream, logging and swallowing failure
pub async fn acquire_preview(
    source: &dyn CameraSource,
    constraints: &CameraConstraints,
) -> Option<CameraStream> {
    match source.acquire(constraints).await {
        Ok(stream) => {
            tracing::info!(
                device = %stream.device().display(),
                facing_mode = stream.facing_mode(),
                "Camera acquired"
            );
            Some(stream)
        }
        Err(e) => {
            tracing::warn!("Error accessing camera: {}", e);
            None
        }
    }
}
