//! Module with GPS specific structures
use crate::Error;
use serde::Serialize;
use std::fmt;
use std::ops::Deref;

/// Stores a single geospatial point
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Coordinate {
    /// latitude coordinate in degrees
    latitude: f64,
    /// longitude coordinate in degrees
    longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, both values must be finite and within the valid degree ranges
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, Error> {
        if !latitude.is_finite()
            || !longitude.is_finite()
            || !(-90.0..=90.0).contains(&latitude)
            || !(-180.0..=180.0).contains(&longitude)
        {
            return Err(Error::InvalidCoordinate(latitude, longitude));
        }
        Ok(Coordinate {
            latitude,
            longitude,
        })
    }

    /// Return latitude in degrees
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Return longitude in degrees
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Parse a "lat,lng" pair as accepted by the routing backend
    pub fn parse_pair(src: &str) -> Option<Self> {
        let (lat, lng) = src.split_once(',')?;
        let lat = lat.trim().parse().ok()?;
        let lng = lng.trim().parse().ok()?;
        Coordinate::new(lat, lng).ok()
    }

    /// Format as a "lat,lng" pair with six decimals (roughly 10cm precision)
    pub fn to_pair_string(&self) -> String {
        format!("{0:.6},{1:.6}", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Ordered path returned by the routing backend, an empty path means no route was found
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RoutePath(Vec<Coordinate>);

impl RoutePath {
    pub const fn empty() -> Self {
        RoutePath(Vec::new())
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.0
    }

    /// Smallest box containing every point of the path
    pub fn bounds(&self) -> Option<BoundingBox> {
        let first = self.0.first()?;
        let init = BoundingBox {
            min_latitude: first.latitude,
            max_latitude: first.latitude,
            min_longitude: first.longitude,
            max_longitude: first.longitude,
        };
        Some(self.0.iter().skip(1).fold(init, |mut b, c| {
            b.min_latitude = b.min_latitude.min(c.latitude);
            b.max_latitude = b.max_latitude.max(c.latitude);
            b.min_longitude = b.min_longitude.min(c.longitude);
            b.max_longitude = b.max_longitude.max(c.longitude);
            b
        }))
    }
}

impl From<Vec<Coordinate>> for RoutePath {
    fn from(coordinates: Vec<Coordinate>) -> Self {
        RoutePath(coordinates)
    }
}

impl Deref for RoutePath {
    type Target = [Coordinate];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Axis aligned latitude/longitude box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_latitude + self.max_latitude) / 2.0,
            (self.min_longitude + self.max_longitude) / 2.0,
        )
    }

    pub fn contains(&self, c: &Coordinate) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&c.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&c.longitude)
    }
}

/// Visible map area expressed as a center point and the span shown on each axis
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Region {
    /// Region centered on a coordinate with the same span on both axes
    pub fn around(center: Coordinate, delta: f64) -> Self {
        Region {
            latitude: center.latitude,
            longitude: center.longitude,
            latitude_delta: delta,
            longitude_delta: delta,
        }
    }

    /// Return the corners of the region as a bounding box
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox {
            min_latitude: self.latitude - self.latitude_delta / 2.0,
            max_latitude: self.latitude + self.latitude_delta / 2.0,
            min_longitude: self.longitude - self.longitude_delta / 2.0,
            max_longitude: self.longitude + self.longitude_delta / 2.0,
        }
    }

    /// Whether the coordinate is visible, regions may extend across the antimeridian
    pub fn contains(&self, c: &Coordinate) -> bool {
        let bounds = self.bounds();
        (bounds.min_latitude..=bounds.max_latitude).contains(&c.latitude)
            && (self.unwrap_longitude(c.longitude) - self.longitude).abs()
                <= self.longitude_delta / 2.0
    }

    /// Equivalent of `longitude` (±360°) closest to the region center
    pub fn unwrap_longitude(&self, longitude: f64) -> f64 {
        let offset = (longitude - self.longitude + 540.0).rem_euclid(360.0) - 180.0;
        self.longitude + offset
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "center=({:.6}, {:.6}) span=({:.5}, {:.5})",
            self.latitude, self.longitude, self.latitude_delta, self.longitude_delta
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_rejects_out_of_range_values() {
        assert!(Coordinate::new(40.758, -73.985).is_ok());
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(90.5, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.1).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_pair_string_parses_back() {
        let c = Coordinate::new(40.7128, -74.006).unwrap();
        assert_eq!(c.to_pair_string(), "40.712800,-74.006000");
        assert_eq!(Coordinate::parse_pair(" 40.7128 , -74.006"), Some(c));
        assert_eq!(Coordinate::parse_pair("Times Square, New York"), None);
        assert_eq!(Coordinate::parse_pair("95.0,10.0"), None);
    }

    #[test]
    fn test_route_path_bounds() {
        assert!(RoutePath::empty().bounds().is_none());
        let path = RoutePath::from(vec![
            Coordinate::new(40.758, -73.985).unwrap(),
            Coordinate::new(40.768, -73.978).unwrap(),
            Coordinate::new(40.761, -73.990).unwrap(),
        ]);
        let b = path.bounds().unwrap();
        assert_eq!(b.min_latitude, 40.758);
        assert_eq!(b.max_latitude, 40.768);
        assert_eq!(b.min_longitude, -73.990);
        assert_eq!(b.max_longitude, -73.978);
        assert!(path.iter().all(|c| b.contains(c)));
    }
}
