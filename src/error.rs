//! Defines the general error type for the crate and various conversions into it
use std::convert;
use std::fmt;

/// Device capability guarded by a runtime permission
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    Camera,
    Location,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Camera => write!(f, "camera"),
            Permission::Location => write!(f, "location"),
        }
    }
}

/// Coarse classification of failures, used to decide how a failure reaches the user
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A device permission was refused, the app falls back to reduced functionality
    PermissionDenied,
    /// Any failure talking to the backend (transport, status code or response body)
    NetworkFailure,
    /// An operation was attempted from a state that does not allow it
    StateViolation,
    /// A device collaborator (location, camera) could not produce a value
    Device,
    /// Invalid or missing application configuration
    Configuration,
}

/// General error type for the crate
#[derive(Debug)]
pub enum Error {
    PermissionDenied(Permission),
    PositionUnavailable(String),
    LocationUnavailable(String),
    CaptureFailed(String),
    Request(reqwest::Error),
    RequestError(reqwest::StatusCode, String),
    Decode(serde_json::Error),
    MalformedResponse(String),
    InvalidCoordinate(f64, f64),
    InvalidState(&'static str),
    InvalidConfigurationValue(String),
    UnknownServiceHandler(String),
    Io(std::io::Error),
    Terminal(crossterm::ErrorKind),
    Yaml(serde_yaml::Error),
}

impl Error {
    /// Return the failure class this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Error::Request(_)
            | Error::RequestError(..)
            | Error::Decode(_)
            | Error::MalformedResponse(_)
            | Error::InvalidCoordinate(..) => ErrorKind::NetworkFailure,
            Error::InvalidState(_) => ErrorKind::StateViolation,
            Error::PositionUnavailable(_)
            | Error::LocationUnavailable(_)
            | Error::CaptureFailed(_)
            | Error::Io(_)
            | Error::Terminal(_) => ErrorKind::Device,
            Error::InvalidConfigurationValue(_)
            | Error::UnknownServiceHandler(_)
            | Error::Yaml(_) => ErrorKind::Configuration,
        }
    }
}

impl convert::From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Error {
        Error::Request(err)
    }
}

impl convert::From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Decode(err)
    }
}

impl convert::From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Error {
        Error::Yaml(err)
    }
}

impl convert::From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl convert::From<crossterm::ErrorKind> for Error {
    fn from(err: crossterm::ErrorKind) -> Error {
        Error::Terminal(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::PermissionDenied(perm) => write!(f, "{} permission was denied", perm),
            Error::PositionUnavailable(msg) => write!(f, "Current position unavailable: {}", msg),
            Error::LocationUnavailable(msg) => {
                write!(f, "Could not obtain a location fix for the capture: {}", msg)
            }
            Error::CaptureFailed(msg) => write!(f, "Could not capture image: {}", msg),
            Error::Request(e) => write!(f, "{}", e),
            Error::RequestError(code, msg) => {
                write!(f, "Backend request failed with code: {} - {}", code, msg)
            }
            Error::Decode(e) => write!(f, "Could not decode backend response: {}", e),
            Error::MalformedResponse(msg) => write!(f, "Malformed backend response: {}", msg),
            Error::InvalidCoordinate(lat, lng) => {
                write!(f, "Invalid coordinate: latitude={}, longitude={}", lat, lng)
            }
            Error::InvalidState(msg) => write!(f, "{}", msg),
            Error::InvalidConfigurationValue(msg) => write!(f, "{}", msg),
            Error::UnknownServiceHandler(msg) => write!(f, "{}", msg),
            Error::Io(e) => write!(f, "{}", e),
            Error::Terminal(e) => write!(f, "Terminal error: {}", e),
            Error::Yaml(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {}
