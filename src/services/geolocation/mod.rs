//! Device location: permission handling, position queries and reverse geocoding
use super::PermissionStatus;
use crate::config::{FromServiceConfig, ServiceConfig};
use crate::gps::Coordinate;
use crate::notify::{Notice, Notifier};
use crate::{Error, Permission};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::time::Duration;

mod fixed;
pub use fixed::FixedPosition;

/// Give up on a position fix after this long
pub const DEFAULT_POSITION_TIMEOUT: Duration = Duration::from_secs(15);

/// trait that wraps the device location capability
#[async_trait(?Send)]
pub trait GeolocationProvider {
    /// Ask the user for foreground location access
    async fn request_permission(&self) -> PermissionStatus;

    /// Return the current position of the device
    async fn current_position(&self) -> Result<Coordinate, Error>;

    /// Turn a coordinate into a human readable address if the provider knows one
    async fn reverse_geocode(&self, location: Coordinate) -> Result<Option<String>, Error>;
}

pub fn new_geolocation_handler(
    config: &ServiceConfig,
) -> Result<Box<dyn GeolocationProvider>, Error> {
    match config.handler() {
        "fixed" => Ok(Box::new(FixedPosition::from_config(config)?)),
        _ => Err(Error::UnknownServiceHandler(format!(
            "no geolocation handler exists for: {}",
            config.handler()
        ))),
    }
}

/// Query the current position, a provider that does not answer in time is treated as unavailable
pub async fn position_with_timeout(
    provider: &dyn GeolocationProvider,
    timeout: Duration,
) -> Result<Coordinate, Error> {
    match tokio::time::timeout(timeout, provider.current_position()).await {
        Ok(result) => result,
        Err(_) => Err(Error::PositionUnavailable(format!(
            "no position fix within {:.1}s",
            timeout.as_secs_f64()
        ))),
    }
}

/// Tracks the user's position for the map, location problems never block the caller
#[derive(Debug)]
pub struct LocationTracker {
    timeout: Duration,
    permission: Option<PermissionStatus>,
    denial_notified: bool,
    last_fix: Option<Coordinate>,
}

impl LocationTracker {
    pub fn new(timeout: Duration) -> Self {
        LocationTracker {
            timeout,
            permission: None,
            denial_notified: false,
            last_fix: None,
        }
    }

    pub fn permission(&self) -> Option<PermissionStatus> {
        self.permission
    }

    /// Most recent successful position fix
    pub fn last_fix(&self) -> Option<Coordinate> {
        self.last_fix
    }

    /// Request location permission, the denial notice is only shown the first time
    pub async fn ensure_permission(
        &mut self,
        provider: &dyn GeolocationProvider,
        notifier: &dyn Notifier,
    ) -> PermissionStatus {
        let status = provider.request_permission().await;
        self.permission = Some(status);
        if status.is_granted() {
            debug!("location permission granted");
        } else if !self.denial_notified {
            info!("location permission denied, falling back to the default map region");
            notifier.notify(Notice::location_denied());
            self.denial_notified = true;
        }
        status
    }

    /// Try to obtain a position fix, returns `None` on denial or provider failure
    pub async fn locate(
        &mut self,
        provider: &dyn GeolocationProvider,
        notifier: &dyn Notifier,
    ) -> Option<Coordinate> {
        if !self.ensure_permission(provider, notifier).await.is_granted() {
            return None;
        }
        match position_with_timeout(provider, self.timeout).await {
            Ok(location) => {
                debug!("position fix: {}", location);
                self.last_fix = Some(location);
                Some(location)
            }
            Err(e) => {
                warn!("could not determine the current position: {}", e);
                None
            }
        }
    }
}

impl Default for LocationTracker {
    fn default() -> Self {
        LocationTracker::new(DEFAULT_POSITION_TIMEOUT)
    }
}

/// Error returned by providers when the location permission is missing
pub(crate) fn location_denied() -> Error {
    Error::PermissionDenied(Permission::Location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;

    fn provider(granted: bool, available: bool) -> FixedPosition {
        let mut provider = FixedPosition::new(40.758, -73.985);
        provider.set_permission_granted(granted);
        provider.set_available(available);
        provider
    }

    #[tokio::test]
    async fn test_locate_returns_fix() {
        let notifier = RecordingNotifier::new();
        let mut tracker = LocationTracker::default();
        let fix = tracker.locate(&provider(true, true), &notifier).await;
        assert_eq!(fix, Some(Coordinate::new(40.758, -73.985).unwrap()));
        assert_eq!(tracker.last_fix(), fix);
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_denial_is_non_fatal_and_notified_once() {
        let notifier = RecordingNotifier::new();
        let mut tracker = LocationTracker::default();
        let denied = provider(false, true);
        assert_eq!(tracker.locate(&denied, &notifier).await, None);
        assert_eq!(tracker.locate(&denied, &notifier).await, None);
        assert_eq!(tracker.permission(), Some(PermissionStatus::Denied));
        assert_eq!(notifier.notices(), vec![Notice::location_denied()]);
    }

    #[tokio::test]
    async fn test_unavailable_provider_yields_none() {
        let notifier = RecordingNotifier::new();
        let mut tracker = LocationTracker::default();
        assert_eq!(tracker.locate(&provider(true, false), &notifier).await, None);
        assert!(tracker.last_fix().is_none());
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let mut slow = provider(true, true);
        slow.set_delay(Duration::from_millis(200));
        match position_with_timeout(&slow, Duration::from_millis(10)).await {
            Err(e @ Error::PositionUnavailable(_)) => {
                assert_eq!(e.kind(), crate::ErrorKind::Device)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
