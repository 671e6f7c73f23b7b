//! Service module that exports interfaces to the backend API and device capabilities

pub mod backend;
pub mod camera;
pub mod geolocation;
pub mod map;

// rexport some traits and utilty functions
pub use backend::{
    new_backend_handler, AutocompleteService, PathFinderApi, ReportUploadService, RoutingService,
};
pub use camera::{new_camera_handler, Camera, Photo};
pub use geolocation::{new_geolocation_handler, GeolocationProvider, LocationTracker};
pub use map::{new_map_display_handler, MapSurface};

/// Answer of the device to a permission request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        self == PermissionStatus::Granted
    }
}

impl From<bool> for PermissionStatus {
    fn from(granted: bool) -> Self {
        if granted {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }
}
