//! Location-aware route coordination and geotagged road report uploads for PathFinder
//!
//! The crate resolves free-text places through the backend autocomplete endpoint, requests
//! routes between them, computes the map viewport for the result and drives the
//! capture-annotate-upload flow of road reports. Device capabilities (location, camera, map
//! drawing) and the backend sit behind the traits in [`services`].
pub mod capture;
pub mod cli;
pub mod config;
pub mod context;
mod error;
pub mod gps;
pub mod map;
pub mod notify;
pub mod resolver;
pub mod route;
pub mod services;

pub use error::{Error, ErrorKind, Permission};
pub use gps::{Coordinate, Region, RoutePath};
