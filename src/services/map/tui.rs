//! Use the tui crate to draw the map frame directly on the terminal
use super::MapSurface;
use crate::config::FromServiceConfig;
use crate::gps::Coordinate;
use crate::map::{EdgePadding, MapFrame, MarkerKind};
use crate::Error;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::debug;
use std::io;
use tui::{
    backend::CrosstermBackend,
    style::Color,
    widgets::{
        canvas::{Canvas, Line, Points},
        Block, Borders,
    },
    Terminal,
};

/// Draws the route and markers on a braille canvas spanning the frame region
#[derive(Debug, FromServiceConfig)]
pub struct TerminalMap {
    /// keep the map on screen until a key is pressed
    wait_for_key: bool,
}

impl Default for TerminalMap {
    fn default() -> Self {
        TerminalMap { wait_for_key: true }
    }
}

impl TerminalMap {
    pub fn new(wait_for_key: bool) -> Self {
        TerminalMap { wait_for_key }
    }
}

impl MapSurface for TerminalMap {
    fn fit_to_coordinates(
        &mut self,
        coordinates: &[Coordinate],
        _padding: EdgePadding,
    ) -> Result<(), Error> {
        // the terminal has no camera animation, the next render uses the fitted region
        debug!("fit requested for {} coordinates", coordinates.len());
        Ok(())
    }

    fn render(&mut self, frame: &MapFrame) -> Result<(), Error> {
        let region = frame.region();
        let bounds = region.bounds();
        let x = |c: &Coordinate| region.unwrap_longitude(c.longitude());
        let segments: Vec<(f64, f64, f64, f64)> = frame
            .overlay()
            .windows(2)
            .map(|w| (x(&w[0]), w[0].latitude(), x(&w[1]), w[1].latitude()))
            .collect();
        let points_of = |kind: MarkerKind| -> Vec<(f64, f64)> {
            frame
                .markers()
                .iter()
                .filter(|m| m.kind() == kind)
                .map(|m| (x(&m.coordinate()), m.coordinate().latitude()))
                .collect()
        };
        let user = points_of(MarkerKind::UserLocation);
        let destination = points_of(MarkerKind::Destination);

        let mut stdout = io::stdout();
        if self.wait_for_key {
            enable_raw_mode()?;
            execute!(stdout, EnterAlternateScreen)?;
        }
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        let drawn = terminal.draw(|f| {
            let canvas = Canvas::default()
                .block(Block::default().borders(Borders::ALL).title("PathFinder"))
                .x_bounds([bounds.min_longitude, bounds.max_longitude])
                .y_bounds([bounds.min_latitude, bounds.max_latitude])
                .paint(|ctx| {
                    for &(x1, y1, x2, y2) in &segments {
                        ctx.draw(&Line {
                            x1,
                            y1,
                            x2,
                            y2,
                            color: Color::Cyan,
                        });
                    }
                    ctx.draw(&Points {
                        coords: &user,
                        color: Color::Green,
                    });
                    ctx.draw(&Points {
                        coords: &destination,
                        color: Color::Red,
                    });
                });
            f.render_widget(canvas, f.size());
        });

        if self.wait_for_key {
            // restore the terminal even when drawing failed
            let waited = match &drawn {
                Ok(_) => wait_for_key_press(),
                Err(_) => Ok(()),
            };
            disable_raw_mode()?;
            execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
            waited?;
        }
        drawn?;

        Ok(())
    }
}

fn wait_for_key_press() -> Result<(), Error> {
    loop {
        if let Event::Key(_) = event::read()? {
            return Ok(());
        }
    }
}
