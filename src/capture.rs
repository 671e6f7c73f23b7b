//! Capture a geotagged photo, annotate it and upload it as a road report
//!
//! A [`CaptureSession`] lives for one visit of the capture screen and moves through
//! `Idle -> Captured -> Submitting`. A successful upload consumes the session, a failed one
//! hands it back in `Captured` so the user can retry without taking the photo again.
use crate::gps::Coordinate;
use crate::notify::{Notice, Notifier};
use crate::services::geolocation::{position_with_timeout, DEFAULT_POSITION_TIMEOUT};
use crate::services::{Camera, GeolocationProvider, Photo, ReportUploadService};
use crate::{Error, Permission};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::time::Duration;

pub const IMAGE_FIELD: &str = "images_bytes";
pub const IMAGE_FILE_NAME: &str = "photo.jpg";
pub const IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Observable phase of a capture session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapturePhase {
    Idle,
    Captured,
    Submitting,
}

/// Photo and the location it was taken at, stored together by a single transition
#[derive(Debug)]
struct Capture {
    photo: Photo,
    geotag: Option<Coordinate>,
}

#[derive(Debug)]
enum Stage {
    Idle,
    Captured(Capture),
    Submitting(Capture),
}

impl Stage {
    fn phase(&self) -> CapturePhase {
        match self {
            Stage::Idle => CapturePhase::Idle,
            Stage::Captured(_) => CapturePhase::Captured,
            Stage::Submitting(_) => CapturePhase::Submitting,
        }
    }
}

/// Multipart payload of a report upload
#[derive(Clone, Debug, PartialEq)]
pub struct ReportUpload {
    image: Vec<u8>,
    digest: String,
    annotation: String,
    geotag: Option<Coordinate>,
}

impl ReportUpload {
    /// Package a photo for upload, `geotag` is optional on the wire
    pub fn new(photo: &Photo, annotation: &str, geotag: Option<Coordinate>) -> Self {
        ReportUpload {
            image: photo.data().to_vec(),
            digest: photo.digest().to_string(),
            annotation: annotation.to_string(),
            geotag,
        }
    }

    pub fn image(&self) -> &[u8] {
        &self.image
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn annotation(&self) -> &str {
        &self.annotation
    }

    pub fn geotag(&self) -> Option<Coordinate> {
        self.geotag
    }

    pub fn image_field(&self) -> &'static str {
        IMAGE_FIELD
    }

    pub fn file_name(&self) -> &'static str {
        IMAGE_FILE_NAME
    }

    pub fn mime_type(&self) -> &'static str {
        IMAGE_MIME_TYPE
    }

    /// Text fields of the form, the coordinates are only sent when a geotag is present
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("text_descr", self.annotation.clone())];
        if let Some(geotag) = self.geotag {
            fields.push(("latitude", geotag.latitude().to_string()));
            fields.push(("longitude", geotag.longitude().to_string()));
        }
        fields
    }
}

/// The single upload allowed for a session, see [`CaptureSession::begin_submit`]
#[derive(Debug)]
pub struct UploadTicket {
    report: ReportUpload,
}

impl UploadTicket {
    pub fn report(&self) -> &ReportUpload {
        &self.report
    }

    /// Send the report, the response must be handed back with [`CaptureSession::finish_submit`]
    pub async fn send(self, service: &dyn ReportUploadService) -> UploadResponse {
        let result = service.upload_report(&self.report).await;
        UploadResponse {
            digest: self.report.digest,
            geotag: self.report.geotag,
            result,
        }
    }
}

/// Outcome of an [`UploadTicket`]
#[derive(Debug)]
pub struct UploadResponse {
    digest: String,
    geotag: Option<Coordinate>,
    result: Result<serde_json::Value, Error>,
}

/// Confirmation of an accepted report
#[derive(Clone, Debug, PartialEq)]
pub struct UploadReceipt {
    digest: String,
    geotag: Option<Coordinate>,
    uploaded_at: DateTime<Utc>,
    response: serde_json::Value,
}

impl UploadReceipt {
    /// SHA-256 digest of the uploaded image
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn geotag(&self) -> Option<Coordinate> {
        self.geotag
    }

    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    /// Body returned by the backend
    pub fn response(&self) -> &serde_json::Value {
        &self.response
    }
}

/// Result of finishing or attempting a submit
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The report was accepted, the capture flow is over
    Uploaded(UploadReceipt),
    /// The upload failed, the session is back in `Captured`
    Failed(CaptureSession),
    /// The session was not in a state that allows submitting, nothing happened
    Ignored(CaptureSession),
}

/// State of one visit to the capture screen
#[derive(Debug)]
pub struct CaptureSession {
    annotation: String,
    stage: Stage,
    position_timeout: Duration,
}

impl CaptureSession {
    pub fn new() -> Self {
        CaptureSession {
            annotation: String::new(),
            stage: Stage::Idle,
            position_timeout: DEFAULT_POSITION_TIMEOUT,
        }
    }

    /// Limit how long the shutter waits for a location fix
    pub fn with_position_timeout(mut self, timeout: Duration) -> Self {
        self.position_timeout = timeout;
        self
    }

    pub fn phase(&self) -> CapturePhase {
        self.stage.phase()
    }

    fn capture(&self) -> Option<&Capture> {
        match &self.stage {
            Stage::Idle => None,
            Stage::Captured(capture) | Stage::Submitting(capture) => Some(capture),
        }
    }

    pub fn photo(&self) -> Option<&Photo> {
        self.capture().map(|c| &c.photo)
    }

    pub fn geotag(&self) -> Option<Coordinate> {
        self.capture().and_then(|c| c.geotag)
    }

    pub fn annotation(&self) -> &str {
        &self.annotation
    }

    /// Free-text description sent along with the photo
    pub fn set_annotation(&mut self, text: &str) {
        self.annotation = text.to_string();
    }

    /// Whether the submit control should be enabled
    pub fn can_submit(&self) -> bool {
        self.phase() == CapturePhase::Captured
    }

    /// Handle a shutter press: snapshot the location, then take the picture.
    ///
    /// Both camera and location permission are required. When either the location fix or the
    /// picture cannot be obtained the session stays `Idle`, a photo is never stored without the
    /// location it was taken at.
    pub async fn shutter(
        &mut self,
        camera: &dyn Camera,
        geolocation: &dyn GeolocationProvider,
        notifier: &dyn Notifier,
    ) -> Result<(), Error> {
        if !matches!(self.stage, Stage::Idle) {
            debug!("ignoring shutter press, a photo was already captured");
            return Err(Error::InvalidState("a photo was already captured"));
        }

        let camera_permission = camera.request_permission().await;
        let location_permission = geolocation.request_permission().await;
        if !camera_permission.is_granted() || !location_permission.is_granted() {
            info!(
                "capture blocked: camera={:?}, location={:?}",
                camera_permission, location_permission
            );
            notifier.notify(Notice::capture_permissions_required());
            let denied = if camera_permission.is_granted() {
                Permission::Location
            } else {
                Permission::Camera
            };
            return Err(Error::PermissionDenied(denied));
        }

        let geotag = match position_with_timeout(geolocation, self.position_timeout).await {
            Ok(location) => location,
            Err(e) => {
                error!("Error getting location for capture: {}", e);
                notifier.notify(Notice::capture_failed());
                return Err(Error::LocationUnavailable(e.to_string()));
            }
        };
        let photo = match camera.take_picture().await {
            Ok(photo) => photo,
            Err(e) => {
                error!("Error taking picture: {}", e);
                notifier.notify(Notice::capture_failed());
                return Err(e);
            }
        };

        info!("captured photo {} at {}", photo.digest(), geotag);
        self.stage = Stage::Captured(Capture {
            photo,
            geotag: Some(geotag),
        });
        Ok(())
    }

    /// Move to `Submitting` and hand out the upload, `None` unless a photo is captured and no
    /// upload is in flight.
    pub fn begin_submit(&mut self) -> Option<UploadTicket> {
        let capture = match std::mem::replace(&mut self.stage, Stage::Idle) {
            Stage::Captured(capture) => capture,
            other => {
                debug!("ignoring submit while {:?}", other.phase());
                self.stage = other;
                return None;
            }
        };
        let report = ReportUpload::new(&capture.photo, &self.annotation, capture.geotag);
        self.stage = Stage::Submitting(capture);
        Some(UploadTicket { report })
    }

    /// Apply the upload response, consuming the session on success
    pub fn finish_submit(
        mut self,
        response: UploadResponse,
        notifier: &dyn Notifier,
    ) -> SubmitOutcome {
        let capture = match std::mem::replace(&mut self.stage, Stage::Idle) {
            Stage::Submitting(capture) => capture,
            other => {
                warn!("upload response received while not submitting");
                self.stage = other;
                return SubmitOutcome::Ignored(self);
            }
        };

        match response.result {
            Ok(body) => {
                info!("report {} uploaded", response.digest);
                debug!("upload response: {}", body);
                notifier.notify(Notice::upload_succeeded());
                SubmitOutcome::Uploaded(UploadReceipt {
                    digest: response.digest,
                    geotag: response.geotag,
                    uploaded_at: Utc::now(),
                    response: body,
                })
            }
            Err(e) => {
                error!("Error uploading report {}: {}", response.digest, e);
                notifier.notify(Notice::upload_failed());
                self.stage = Stage::Captured(capture);
                SubmitOutcome::Failed(self)
            }
        }
    }

    /// Upload the captured report and wait for the answer
    pub async fn submit(
        mut self,
        service: &dyn ReportUploadService,
        notifier: &dyn Notifier,
    ) -> SubmitOutcome {
        match self.begin_submit() {
            Some(ticket) => {
                let response = ticket.send(service).await;
                self.finish_submit(response, notifier)
            }
            None => SubmitOutcome::Ignored(self),
        }
    }

    /// Leave the capture screen without uploading, the photo is discarded
    pub fn cancel(self) {
        if let Some(photo) = self.photo() {
            info!("capture of photo {} cancelled", photo.digest());
        }
    }
}

impl Default for CaptureSession {
    fn default() -> Self {
        CaptureSession::new()
    }
}
