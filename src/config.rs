//! Store application configuration that gets read from disk
use crate::gps::{Coordinate, Region};
use crate::map::{DEFAULT_REGION, PADDING_RATIO};
use crate::services::{
    new_backend_handler, new_camera_handler, new_geolocation_handler, new_map_display_handler,
    Camera, GeolocationProvider, MapSurface, PathFinderApi,
};
use crate::Error;
use log::debug;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::Value;
use simplelog::LevelFilter;
use std::collections::HashMap;
use std::fs::File;
use std::io::prelude::*;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub use pathfinder_derive::FromServiceConfig;

/// Defines the allowed keys under the services map
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Backend,
    Camera,
    Geolocation,
    MapDisplay,
}

/// Type alias for clarity
pub type ServiceParameters = HashMap<String, Value>;

/// Configuration options for a single service of any type
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    handler: String,
    #[serde(default)]
    configuration: ServiceParameters,
}

impl ServiceConfig {
    /// Create a configuration entry for a handler without any parameters
    pub fn new(handler: &str) -> Self {
        ServiceConfig {
            handler: handler.to_string(),
            configuration: HashMap::new(),
        }
    }

    /// Add or replace a parameter, mostly useful when building configs in code
    pub fn with_parameter<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.configuration.insert(key.to_string(), value.into());
        self
    }

    pub fn handler(&self) -> &str {
        &self.handler
    }

    pub fn parameters(&self) -> impl Iterator<Item = &String> + '_ {
        self.configuration.keys()
    }

    pub fn get_parameter(&self, key: &str) -> Option<&Value> {
        self.configuration.get(key)
    }

    pub fn get_parameter_as_string(&self, key: &str) -> Option<Result<String, Error>> {
        self.configuration.get(key).map(|value| {
            value
                .as_str()
                .map(|v| v.to_string())
                .ok_or_else(|| self.invalid_value(key, "a string", value))
        })
    }

    pub fn get_parameter_as_bool(&self, key: &str) -> Option<Result<bool, Error>> {
        self.configuration.get(key).map(|value| {
            value
                .as_bool()
                .ok_or_else(|| self.invalid_value(key, "a boolean", value))
        })
    }

    pub fn get_parameter_as_i64(&self, key: &str) -> Option<Result<i64, Error>> {
        self.configuration.get(key).map(|value| {
            value
                .as_i64()
                .ok_or_else(|| self.invalid_value(key, "an integer", value))
        })
    }

    pub fn get_parameter_as_f64(&self, key: &str) -> Option<Result<f64, Error>> {
        self.configuration.get(key).map(|value| {
            value
                .as_f64()
                .ok_or_else(|| self.invalid_value(key, "a floating point value", value))
        })
    }

    fn invalid_value(&self, key: &str, expected: &str, value: &Value) -> Error {
        Error::InvalidConfigurationValue(format!(
            "invalid value for {}.{}, expected {}: {:?}",
            &self.handler, key, expected, value
        ))
    }
}

/// Build a service handler from its configuration entry
pub trait FromServiceConfig: Sized {
    fn from_config(config: &ServiceConfig) -> Result<Self, Error>;
}

/// Map display settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// latitude of the region shown before the first location fix
    pub default_latitude: f64,
    /// longitude of the region shown before the first location fix
    pub default_longitude: f64,
    /// span in degrees of the default region
    pub default_delta: f64,
    /// extra span added on each side of a fitted route, as a fraction of the route extent
    pub fit_padding: f64,
}

impl MapSettings {
    pub fn default_region(&self) -> Result<Region, Error> {
        let center = Coordinate::new(self.default_latitude, self.default_longitude)?;
        if !(self.default_delta > 0.0) {
            return Err(Error::InvalidConfigurationValue(format!(
                "invalid value for map.default_delta, expected a positive span: {}",
                self.default_delta
            )));
        }
        Ok(Region::around(center, self.default_delta))
    }
}

impl Default for MapSettings {
    fn default() -> Self {
        MapSettings {
            default_latitude: DEFAULT_REGION.latitude,
            default_longitude: DEFAULT_REGION.longitude,
            default_delta: DEFAULT_REGION.latitude_delta,
            fit_padding: PADDING_RATIO,
        }
    }
}

/// Configuration struct that we can create from the config file used
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(
        deserialize_with = "deserialize_level_filter",
        serialize_with = "serialize_level_filter",
        default = "default_level_filter"
    )]
    log_level: LevelFilter,
    #[serde(default)]
    services: HashMap<ServiceType, ServiceConfig>,
    #[serde(default)]
    map: MapSettings,
}

impl Config {
    pub fn load<T: Read>(source: &mut T) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_reader(source)
    }

    /// Read the config file at `path`, or the default location when no path is given.
    ///
    /// A missing file at the default location is not an error, the built-in defaults are used.
    pub fn from_path(path: Option<&Path>) -> Result<Self, Error> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let path = default_config_path();
                if !path.exists() {
                    debug!("no config file at {:?}, using defaults", path);
                    return Ok(Config::default());
                }
                path
            }
        };
        debug!("loading config file {:?}", path);
        let mut fp = File::open(&path)?;
        Ok(Config::load(&mut fp)?)
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn map(&self) -> &MapSettings {
        &self.map
    }

    /// Register a service configuration, replacing the current entry for that type
    pub fn set_service(&mut self, kind: ServiceType, config: ServiceConfig) {
        self.services.insert(kind, config);
    }

    fn service_config(&self, kind: ServiceType) -> ServiceConfig {
        match self.services.get(&kind) {
            Some(cfg) => cfg.clone(),
            None => ServiceConfig::new(default_handler(kind)),
        }
    }

    pub fn get_backend_handler(&self) -> Result<PathFinderApi, Error> {
        new_backend_handler(&self.service_config(ServiceType::Backend))
    }

    pub fn get_geolocation_handler(&self) -> Result<Box<dyn GeolocationProvider>, Error> {
        new_geolocation_handler(&self.service_config(ServiceType::Geolocation))
    }

    pub fn get_camera_handler(&self) -> Result<Box<dyn Camera>, Error> {
        new_camera_handler(&self.service_config(ServiceType::Camera))
    }

    pub fn get_map_display_handler(&self) -> Result<Box<dyn MapSurface>, Error> {
        new_map_display_handler(&self.service_config(ServiceType::MapDisplay))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: default_level_filter(),
            services: HashMap::new(),
            map: MapSettings::default(),
        }
    }
}

/// Handler used for a service type that has no entry in the config file
fn default_handler(kind: ServiceType) -> &'static str {
    match kind {
        ServiceType::Backend => "pathfinder_api",
        ServiceType::Camera => "file",
        ServiceType::Geolocation => "fixed",
        ServiceType::MapDisplay => "tui",
    }
}

/// Location of the config file when none is given on the command line
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pathfinder")
        .join("config.yml")
}

fn deserialize_level_filter<'de, D>(deserializer: D) -> Result<LevelFilter, D::Error>
where
    D: Deserializer<'de>,
{
    let buf = String::deserialize(deserializer)?;
    LevelFilter::from_str(&buf)
        .map_err(|_| serde::de::Error::custom(format!("invalid level value: {}", buf)))
}

fn serialize_level_filter<S>(level: &LevelFilter, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&level.to_string())
}

fn default_level_filter() -> LevelFilter {
    LevelFilter::Info
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
log_level: debug
services:
  backend:
    handler: pathfinder_api
    configuration:
      base_url: "http://localhost:8000"
      timeout_secs: 5
  geolocation:
    handler: fixed
    configuration:
      latitude: 40.758
      longitude: -73.985
      permission_granted: false
map:
  default_delta: 0.1
"#;

    #[test]
    fn test_load_sample_config() {
        let config = Config::load(&mut SAMPLE.as_bytes()).unwrap();
        assert_eq!(config.log_level(), LevelFilter::Debug);
        assert_eq!(config.map().default_delta, 0.1);
        assert_eq!(config.map().default_latitude, DEFAULT_REGION.latitude);

        let api = config.get_backend_handler().unwrap();
        assert_eq!(api.base_url(), "http://localhost:8000");
        assert_eq!(api.timeout_secs(), 5);
    }

    #[test]
    fn test_missing_services_fall_back_to_defaults() {
        let config = Config::load(&mut "log_level: warn".as_bytes()).unwrap();
        assert_eq!(config.log_level(), LevelFilter::Warn);
        assert!(config.get_backend_handler().is_ok());
        assert!(config.get_geolocation_handler().is_ok());
        assert!(config.get_camera_handler().is_ok());
        assert_eq!(config.map().default_region().unwrap(), DEFAULT_REGION);
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        assert!(Config::load(&mut "log_level: loud".as_bytes()).is_err());
    }

    #[test]
    fn test_wrong_parameter_type_is_an_error() {
        let cfg = ServiceConfig::new("fixed").with_parameter("latitude", "north");
        match cfg.get_parameter_as_f64("latitude") {
            Some(Err(Error::InvalidConfigurationValue(msg))) => {
                assert!(msg.contains("fixed.latitude"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(cfg.get_parameter_as_f64("longitude").is_none());
    }

    #[test]
    fn test_unknown_handler_is_an_error() {
        let mut config = Config::default();
        config.set_service(ServiceType::Camera, ServiceConfig::new("polaroid"));
        match config.get_camera_handler() {
            Err(Error::UnknownServiceHandler(_)) => {}
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("expected an error for an unknown handler"),
        }
    }
}
