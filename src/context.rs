//! Explicitly constructed set of services shared by the coordinators
use crate::config::Config;
use crate::map::MapAdapter;
use crate::notify::{Notifier, TerminalNotifier};
use crate::services::{Camera, GeolocationProvider, LocationTracker, MapSurface, PathFinderApi};
use crate::Error;
use log::{debug, info};

/// Owns the backend client and device services for the lifetime of the application.
///
/// Components receive the pieces they need as arguments, nothing is reached through globals.
pub struct AppContext {
    pub backend: PathFinderApi,
    pub geolocation: Box<dyn GeolocationProvider>,
    pub camera: Box<dyn Camera>,
    pub map_display: Box<dyn MapSurface>,
    pub notifier: Box<dyn Notifier>,
    pub tracker: LocationTracker,
    pub map: MapAdapter,
}

impl AppContext {
    /// Build every service from the configuration
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let backend = config.get_backend_handler()?;
        debug!("backend at {}", backend.base_url());
        let ctx = AppContext {
            backend,
            geolocation: config.get_geolocation_handler()?,
            camera: config.get_camera_handler()?,
            map_display: config.get_map_display_handler()?,
            notifier: Box::new(TerminalNotifier::default()),
            tracker: LocationTracker::default(),
            map: MapAdapter::from_settings(config.map())?,
        };
        info!("application services initialized");
        Ok(ctx)
    }

    /// Release the services, dropping the backend client closes its idle connections
    pub fn shutdown(self) {
        if let Some(fix) = self.tracker.last_fix() {
            debug!("last known position {}", fix);
        }
        drop(self);
        info!("application services shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ServiceConfig, ServiceType};

    #[test]
    fn test_context_from_default_config() {
        let mut config = Config::default();
        config.set_service(ServiceType::MapDisplay, ServiceConfig::new("log"));
        let ctx = AppContext::from_config(&config).unwrap();
        assert_eq!(ctx.backend.base_url(), "http://10.0.2.2:8000");
        assert!(ctx.tracker.last_fix().is_none());
        ctx.shutdown();
    }

    #[test]
    fn test_context_reports_bad_service_config() {
        let mut config = Config::default();
        config.set_service(
            ServiceType::Geolocation,
            ServiceConfig::new("fixed").with_parameter("latitude", "north"),
        );
        assert!(AppContext::from_config(&config).is_err());
    }
}
