//! Map rendering surfaces that display the frames computed by the map adapter
use crate::config::{FromServiceConfig, ServiceConfig};
use crate::gps::Coordinate;
use crate::map::{EdgePadding, MapFrame};
use crate::Error;

mod logging;
pub use self::logging::LogMap;
mod tui;
pub use self::tui::TerminalMap;

/// trait that defines the drawing primitives a map view offers
pub trait MapSurface {
    /// Animate the camera so every coordinate is visible inside the padded view
    fn fit_to_coordinates(
        &mut self,
        coordinates: &[Coordinate],
        padding: EdgePadding,
    ) -> Result<(), Error>;

    /// Draw the region, markers and path overlay of a frame
    fn render(&mut self, frame: &MapFrame) -> Result<(), Error>;
}

pub fn new_map_display_handler(config: &ServiceConfig) -> Result<Box<dyn MapSurface>, Error> {
    match config.handler() {
        "tui" => Ok(Box::new(TerminalMap::from_config(config)?)),
        "log" => Ok(Box::new(LogMap::from_config(config)?)),
        _ => Err(Error::UnknownServiceHandler(format!(
            "no map display handler exists for: {}",
            config.handler()
        ))),
    }
}
