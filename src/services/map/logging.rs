//! Map surface that writes frames to the application log
use super::MapSurface;
use crate::config::FromServiceConfig;
use crate::gps::Coordinate;
use crate::map::{EdgePadding, MapFrame};
use crate::Error;
use log::info;

#[derive(Debug, Default, FromServiceConfig)]
pub struct LogMap {}

impl MapSurface for LogMap {
    fn fit_to_coordinates(
        &mut self,
        coordinates: &[Coordinate],
        padding: EdgePadding,
    ) -> Result<(), Error> {
        info!(
            "fitting map to {} coordinates (padding {}px)",
            coordinates.len(),
            padding.top
        );
        Ok(())
    }

    fn render(&mut self, frame: &MapFrame) -> Result<(), Error> {
        info!("map region {}", frame.region());
        for marker in frame.markers() {
            info!("marker {:?} at {}", marker.kind(), marker.coordinate());
        }
        if !frame.overlay().is_empty() {
            info!("route overlay with {} points", frame.overlay().len());
        }
        Ok(())
    }
}
