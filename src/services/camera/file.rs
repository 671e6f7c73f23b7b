//! Camera that "captures" an existing JPEG file, the command line stand-in for a device camera
use super::{Camera, Photo};
use crate::config::FromServiceConfig;
use crate::services::PermissionStatus;
use crate::{Error, Permission};
use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use std::path::PathBuf;

/// Defines where the captured image comes from and where capture files are written
#[derive(Clone, Debug, FromServiceConfig)]
pub struct FileCamera {
    /// JPEG file returned by every capture
    path: String,
    /// answer given to permission requests
    permission_granted: bool,
    /// when set each capture is copied into this directory and removed when the session ends
    capture_dir: String,
}

impl FileCamera {
    pub fn new(path: &str) -> Self {
        FileCamera {
            path: path.to_string(),
            ..Default::default()
        }
    }

    pub fn set_permission_granted(&mut self, granted: bool) {
        self.permission_granted = granted;
    }

    pub fn set_capture_dir(&mut self, dir: &str) {
        self.capture_dir = dir.to_string();
    }
}

impl Default for FileCamera {
    fn default() -> Self {
        FileCamera {
            path: String::new(),
            permission_granted: true,
            capture_dir: String::new(),
        }
    }
}

#[async_trait(?Send)]
impl Camera for FileCamera {
    async fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::from(self.permission_granted)
    }

    async fn take_picture(&self) -> Result<Photo, Error> {
        if !self.permission_granted {
            return Err(Error::PermissionDenied(Permission::Camera));
        }
        if self.path.is_empty() {
            return Err(Error::CaptureFailed(
                "no image path configured for the file camera".to_string(),
            ));
        }
        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|e| Error::CaptureFailed(format!("{}: {}", self.path, e)))?;
        debug!("captured {} bytes from {}", data.len(), self.path);
        if self.capture_dir.is_empty() {
            return Ok(Photo::from_bytes(data));
        }

        let dest = PathBuf::from(&self.capture_dir).join(format!(
            "capture-{}.jpg",
            Utc::now().format("%Y%m%dT%H%M%S%.6f")
        ));
        tokio::fs::write(&dest, &data).await?;
        Ok(Photo::with_capture_file(data, dest))
    }
}
