//! Device camera: permission handling and single shot still capture
use super::PermissionStatus;
use crate::config::{FromServiceConfig, ServiceConfig};
use crate::Error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::remove_file;
use std::path::{Path, PathBuf};

mod file;
pub use file::FileCamera;

/// trait that wraps the device camera
#[async_trait(?Send)]
pub trait Camera {
    /// Ask the user for camera access
    async fn request_permission(&self) -> PermissionStatus;

    /// Take a single still picture
    async fn take_picture(&self) -> Result<Photo, Error>;
}

pub fn new_camera_handler(config: &ServiceConfig) -> Result<Box<dyn Camera>, Error> {
    match config.handler() {
        "file" => Ok(Box::new(FileCamera::from_config(config)?)),
        _ => Err(Error::UnknownServiceHandler(format!(
            "no camera handler exists for: {}",
            config.handler()
        ))),
    }
}

/// A captured JPEG image.
///
/// When the camera wrote the capture to disk the photo owns that file and removes it when dropped,
/// so the image never outlives the capture session that holds it.
pub struct Photo {
    data: Vec<u8>,
    digest: String,
    captured_at: DateTime<Utc>,
    capture_file: Option<PathBuf>,
}

impl Photo {
    /// Create a photo that only lives in memory
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let digest = hex::encode(Sha256::digest(&data));
        Photo {
            data,
            digest,
            captured_at: Utc::now(),
            capture_file: None,
        }
    }

    /// Create a photo backed by a capture file that is deleted together with the photo
    pub fn with_capture_file(data: Vec<u8>, path: PathBuf) -> Self {
        let mut photo = Photo::from_bytes(data);
        photo.capture_file = Some(path);
        photo
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// SHA-256 digest of the image data as a hex string
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn capture_file(&self) -> Option<&Path> {
        self.capture_file.as_deref()
    }
}

impl fmt::Debug for Photo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Photo")
            .field("len", &self.data.len())
            .field("digest", &self.digest)
            .field("captured_at", &self.captured_at)
            .field("capture_file", &self.capture_file)
            .finish()
    }
}

impl Drop for Photo {
    fn drop(&mut self) {
        if let Some(path) = self.capture_file.take() {
            match remove_file(&path) {
                Ok(_) => debug!("removed capture file {:?}", path),
                Err(e) => warn!("could not remove capture file {:?}: {}", path, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_photo_digest() {
        let photo = Photo::from_bytes(b"abc".to_vec());
        assert_eq!(
            photo.digest(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(photo.data(), b"abc");
        assert!(photo.capture_file().is_none());
    }

    #[test]
    fn test_capture_file_is_removed_with_photo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.jpg");
        fs::write(&path, b"jpeg").unwrap();
        let photo = Photo::with_capture_file(b"jpeg".to_vec(), path.clone());
        assert!(path.exists());
        drop(photo);
        assert!(!path.exists());
    }
}
