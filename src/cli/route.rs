//! Define route subcommand
use crate::context::AppContext;
use crate::gps::Coordinate;
use crate::resolver::{AddressResolver, Field, SuggestionQuery};
use crate::route::{RouteCoordinator, RouteUpdate};
use crate::Error;
use log::{debug, warn};
use structopt::StructOpt;

/// Request a route and print it, or draw it with the configured map display
#[derive(Debug, StructOpt)]
pub struct RouteOpts {
    /// Where the route starts, an address or a "lat,lng" pair
    #[structopt(short, long, default_value = "")]
    origin: String,
    /// Where the route ends, an address or a "lat,lng" pair
    #[structopt(short, long, default_value = "")]
    destination: String,
    /// Start at the current position of the device instead of --origin
    #[structopt(long, conflicts_with = "pick-origin")]
    from_here: bool,
    /// Replace the origin with this entry of its suggestion list
    #[structopt(long)]
    pick_origin: Option<usize>,
    /// Replace the destination with this entry of its suggestion list
    #[structopt(long)]
    pick_destination: Option<usize>,
    /// Draw the map instead of printing the route points
    #[structopt(long)]
    draw: bool,
}

pub async fn route_command(
    ctx: &mut AppContext,
    opts: RouteOpts,
) -> Result<(), Box<dyn std::error::Error>> {
    let location = ctx
        .tracker
        .locate(ctx.geolocation.as_ref(), ctx.notifier.as_ref())
        .await;

    let mut resolver = AddressResolver::new();
    // both suggestion lists are fetched at the same time, like two fields typed in quick succession
    let (origin_query, destination_query) = fill_fields(&mut resolver, &opts, location)?;
    let (origin_resp, destination_resp) = tokio::join!(
        async {
            match origin_query {
                Some(query) => Some(query.fetch(&ctx.backend).await),
                None => None,
            }
        },
        async {
            match destination_query {
                Some(query) => Some(query.fetch(&ctx.backend).await),
                None => None,
            }
        }
    );
    for (field, response, pick) in [
        (Field::Origin, origin_resp, opts.pick_origin),
        (Field::Destination, destination_resp, opts.pick_destination),
    ] {
        if let (Some(response), Some(idx)) = (response, pick) {
            resolver.apply(response);
            match resolver.select(field, idx) {
                Some(text) => debug!("{} set to {:?}", field, text),
                None => warn!("no {} suggestion with index {}", field, idx),
            }
        }
    }

    let mut coordinator = RouteCoordinator::new();
    let update = coordinator
        .get_route(
            resolver.text(Field::Origin),
            resolver.text(Field::Destination),
            &ctx.backend,
            ctx.notifier.as_ref(),
        )
        .await;
    debug!("route update: {:?}", update);
    if update == RouteUpdate::Rejected {
        return Ok(());
    }

    if opts.draw {
        ctx.map.present(
            ctx.map_display.as_mut(),
            location,
            coordinator.path(),
            coordinator.path_revision(),
            coordinator.destination_coordinate(),
        )?;
        return Ok(());
    }

    let frame = ctx.map.frame(
        location,
        coordinator.path(),
        coordinator.path_revision(),
        coordinator.destination_coordinate(),
    );
    println!(
        "Route from {:?} to {:?}: {} points",
        resolver.text(Field::Origin),
        resolver.text(Field::Destination),
        frame.overlay().len()
    );
    for point in frame.overlay() {
        println!("  {}", point.to_pair_string());
    }
    for marker in frame.markers() {
        println!("Marker {:?} at {}", marker.kind(), marker.coordinate());
    }
    println!("Viewport: {}", frame.region());

    Ok(())
}

/// Set both fields from the options, returns the suggestion queries needed by `--pick-*`
fn fill_fields(
    resolver: &mut AddressResolver,
    opts: &RouteOpts,
    location: Option<Coordinate>,
) -> Result<(Option<SuggestionQuery>, Option<SuggestionQuery>), Error> {
    resolver.set_text(Field::Origin, &opts.origin);
    resolver.set_text(Field::Destination, &opts.destination);
    if opts.from_here {
        let here = location.ok_or_else(|| {
            Error::PositionUnavailable("cannot start the route at the current position".to_string())
        })?;
        resolver.set_text(Field::Origin, &here.to_pair_string());
    }

    let mut query = |field: Field, pick: Option<usize>| -> Option<SuggestionQuery> {
        pick?;
        let text = resolver.text(field).to_string();
        resolver.input(field, &text)
    };
    let origin_query = query(Field::Origin, opts.pick_origin);
    let destination_query = query(Field::Destination, opts.pick_destination);
    Ok((origin_query, destination_query))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> RouteOpts {
        RouteOpts::from_iter_safe(args).unwrap()
    }

    #[test]
    fn test_from_here_fills_origin_with_the_position() {
        let opts = parse(&["route", "--from-here", "--destination", "Central Park"]);
        let mut resolver = AddressResolver::new();
        let here = Coordinate::new(40.758, -73.985).unwrap();
        let (origin, destination) = fill_fields(&mut resolver, &opts, Some(here)).unwrap();
        assert!(origin.is_none());
        assert!(destination.is_none());
        assert_eq!(resolver.text(Field::Origin), "40.758000,-73.985000");
        assert_eq!(resolver.text(Field::Destination), "Central Park");
    }

    #[test]
    fn test_from_here_requires_a_position() {
        let opts = parse(&["route", "--from-here", "--destination", "Central Park"]);
        let mut resolver = AddressResolver::new();
        assert!(matches!(
            fill_fields(&mut resolver, &opts, None),
            Err(Error::PositionUnavailable(_))
        ));
    }

    #[test]
    fn test_from_here_cannot_be_combined_with_pick_origin() {
        let args = [
            "route",
            "--from-here",
            "--pick-origin",
            "0",
            "--destination",
            "Central Park",
        ];
        assert!(RouteOpts::from_iter_safe(&args).is_err());
    }

    #[test]
    fn test_pick_queries_use_the_field_text() {
        let opts = parse(&[
            "route",
            "--origin",
            "Times",
            "--destination",
            "Central Park",
            "--pick-origin",
            "1",
            "--pick-destination",
            "0",
        ]);
        let mut resolver = AddressResolver::new();
        let here = Coordinate::new(40.758, -73.985).unwrap();
        let (origin, destination) = fill_fields(&mut resolver, &opts, Some(here)).unwrap();
        assert_eq!(origin.unwrap().text(), "Times");
        assert_eq!(destination.unwrap().text(), "Central Park");
        assert_eq!(resolver.text(Field::Origin), "Times");
    }

    #[test]
    fn test_pick_with_short_text_issues_no_query() {
        let opts = parse(&["route", "--origin", "Ti", "--destination", "Zoo", "--pick-origin", "0"]);
        let mut resolver = AddressResolver::new();
        let (origin, destination) = fill_fields(&mut resolver, &opts, None).unwrap();
        assert!(origin.is_none());
        assert!(destination.is_none());
        assert_eq!(resolver.text(Field::Origin), "Ti");
    }
}
