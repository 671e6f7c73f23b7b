//! Compute what the map shows: viewport, markers and the route overlay
use crate::config::MapSettings;
use crate::gps::{Coordinate, Region, RoutePath};
use crate::services::MapSurface;
use crate::Error;
use log::debug;

/// Region shown before the first location fix or when location permission was denied
pub const DEFAULT_REGION: Region = Region {
    latitude: 40.7128,
    longitude: -74.0060,
    latitude_delta: 0.05,
    longitude_delta: 0.05,
};

/// Span in degrees used when centering on the user's location
pub const LOCATION_DELTA: f64 = 0.02;

/// Fraction of the route extent added as margin on every side of a fitted route
pub const PADDING_RATIO: f64 = 0.1;

/// Smallest span of a fitted route, keeps single point routes from zooming in forever
pub const MIN_FIT_DELTA: f64 = 0.005;

/// Screen space margin in pixels requested from the map surface when fitting a route
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgePadding {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl EdgePadding {
    pub fn uniform(px: u32) -> Self {
        EdgePadding {
            top: px,
            right: px,
            bottom: px,
            left: px,
        }
    }
}

impl Default for EdgePadding {
    fn default() -> Self {
        EdgePadding::uniform(50)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerKind {
    UserLocation,
    Destination,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    kind: MarkerKind,
    coordinate: Coordinate,
}

impl Marker {
    pub fn new(kind: MarkerKind, coordinate: Coordinate) -> Self {
        Marker { kind, coordinate }
    }

    pub fn kind(&self) -> MarkerKind {
        self.kind
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
}

/// Everything a map surface needs to draw one update
#[derive(Clone, Debug, PartialEq)]
pub struct MapFrame {
    region: Region,
    markers: Vec<Marker>,
    overlay: Vec<Coordinate>,
    fit: bool,
}

impl MapFrame {
    pub fn region(&self) -> Region {
        self.region
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Route points to draw as a polyline, empty when there is no route
    pub fn overlay(&self) -> &[Coordinate] {
        &self.overlay
    }

    /// Whether this frame should trigger the fit-to-route camera animation
    pub fn fit(&self) -> bool {
        self.fit
    }
}

/// Smallest region containing the whole path plus `padding` of its extent on each side
pub fn fit_region(path: &RoutePath, padding: f64) -> Option<Region> {
    let bounds = path.bounds()?;
    let (latitude, _) = bounds.center();
    let (longitude, longitude_span) = longitude_extent(path)?;
    let scale = 1.0 + 2.0 * padding;
    Some(Region {
        latitude,
        longitude,
        latitude_delta: ((bounds.max_latitude - bounds.min_latitude) * scale).max(MIN_FIT_DELTA),
        longitude_delta: (longitude_span * scale).max(MIN_FIT_DELTA),
    })
}

/// Center and width of the narrowest longitude interval covering the path.
///
/// The widest gap between neighbouring longitudes, the one across ±180° included, is the part
/// left out of view, so a route crossing the antimeridian does not span the whole globe.
fn longitude_extent(path: &RoutePath) -> Option<(f64, f64)> {
    let mut longitudes: Vec<f64> = path.iter().map(|c| c.longitude()).collect();
    longitudes.sort_by(|a, b| a.total_cmp(b));
    let (first, last) = (*longitudes.first()?, *longitudes.last()?);

    let (mut start, mut end) = (first, last);
    let mut gap = first + 360.0 - last;
    for pair in longitudes.windows(2) {
        if pair[1] - pair[0] > gap {
            gap = pair[1] - pair[0];
            start = pair[1];
            end = pair[0] + 360.0;
        }
    }

    let mut center = (start + end) / 2.0;
    if center > 180.0 {
        center -= 360.0;
    }
    Some((center, end - start))
}

/// Pick the viewport with the built-in defaults, see [`MapAdapter::viewport`]
pub fn compute_viewport(location: Option<Coordinate>, path: &RoutePath) -> Region {
    MapAdapter::default().viewport(location, path)
}

/// Turns the user location and the current route into map frames
#[derive(Debug)]
pub struct MapAdapter {
    default_region: Region,
    padding: f64,
    edge_padding: EdgePadding,
    fitted_revision: Option<u64>,
}

impl MapAdapter {
    pub fn new(default_region: Region, padding: f64) -> Self {
        MapAdapter {
            default_region,
            padding,
            edge_padding: EdgePadding::default(),
            fitted_revision: None,
        }
    }

    pub fn from_settings(settings: &MapSettings) -> Result<Self, Error> {
        Ok(MapAdapter::new(
            settings.default_region()?,
            settings.fit_padding.max(0.0),
        ))
    }

    /// Fit the route when there is one, else center on the user, else show the default region
    pub fn viewport(&self, location: Option<Coordinate>, path: &RoutePath) -> Region {
        if let Some(region) = fit_region(path, self.padding) {
            return region;
        }
        match location {
            Some(location) => Region::around(location, LOCATION_DELTA),
            None => self.default_region,
        }
    }

    /// Build the next frame.
    ///
    /// `revision` identifies the displayed path, the fit animation is requested only the first
    /// time a given revision is seen.
    pub fn frame(
        &mut self,
        location: Option<Coordinate>,
        path: &RoutePath,
        revision: Option<u64>,
        destination: Option<Coordinate>,
    ) -> MapFrame {
        let fit = !path.is_empty() && revision.is_some() && revision != self.fitted_revision;
        if fit {
            self.fitted_revision = revision;
        }

        let mut markers = Vec::new();
        if let Some(location) = location {
            markers.push(Marker::new(MarkerKind::UserLocation, location));
        }
        if let Some(destination) = destination {
            markers.push(Marker::new(MarkerKind::Destination, destination));
        }

        MapFrame {
            region: self.viewport(location, path),
            markers,
            overlay: path.to_vec(),
            fit,
        }
    }

    /// Build the next frame and draw it, running the fit animation first when requested
    pub fn present(
        &mut self,
        surface: &mut dyn MapSurface,
        location: Option<Coordinate>,
        path: &RoutePath,
        revision: Option<u64>,
        destination: Option<Coordinate>,
    ) -> Result<MapFrame, Error> {
        let frame = self.frame(location, path, revision, destination);
        if frame.fit() {
            debug!("fitting map to route revision {:?}", revision);
            surface.fit_to_coordinates(frame.overlay(), self.edge_padding)?;
        }
        surface.render(&frame)?;
        Ok(frame)
    }
}

impl Default for MapAdapter {
    fn default() -> Self {
        MapAdapter::new(DEFAULT_REGION, PADDING_RATIO)
    }
}
