//! Geolocation provider that reports a configured position, used on the command line and in tests
use super::{location_denied, GeolocationProvider};
use crate::config::FromServiceConfig;
use crate::gps::Coordinate;
use crate::services::PermissionStatus;
use crate::Error;
use async_trait::async_trait;
use std::time::Duration;

/// Defines the position and behaviour of a simulated location provider
#[derive(Clone, Debug, FromServiceConfig)]
pub struct FixedPosition {
    latitude: f64,
    longitude: f64,
    /// answer given to permission requests
    permission_granted: bool,
    /// when false every position query fails as if the GPS had no fix
    available: bool,
    /// reverse geocoding answer, empty means the address is unknown
    address: String,
    /// simulated time to obtain a fix
    delay_ms: u64,
}

impl FixedPosition {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        FixedPosition {
            latitude,
            longitude,
            ..Default::default()
        }
    }

    pub fn set_permission_granted(&mut self, granted: bool) {
        self.permission_granted = granted;
    }

    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    pub fn set_address(&mut self, address: &str) {
        self.address = address.to_string();
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay_ms = delay.as_millis() as u64;
    }
}

impl Default for FixedPosition {
    fn default() -> Self {
        FixedPosition {
            latitude: 40.7128,
            longitude: -74.0060,
            permission_granted: true,
            available: true,
            address: String::new(),
            delay_ms: 0,
        }
    }
}

#[async_trait(?Send)]
impl GeolocationProvider for FixedPosition {
    async fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::from(self.permission_granted)
    }

    async fn current_position(&self) -> Result<Coordinate, Error> {
        if !self.permission_granted {
            return Err(location_denied());
        }
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
        if !self.available {
            return Err(Error::PositionUnavailable(
                "location provider has no fix".to_string(),
            ));
        }
        Coordinate::new(self.latitude, self.longitude)
    }

    async fn reverse_geocode(&self, _location: Coordinate) -> Result<Option<String>, Error> {
        if !self.permission_granted {
            return Err(location_denied());
        }
        if self.address.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.address.clone()))
        }
    }
}
