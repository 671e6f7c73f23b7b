//! Define locate subcommand
use crate::context::AppContext;
use log::warn;
use structopt::StructOpt;

/// Print the current position and, when known, its address
#[derive(Debug, StructOpt)]
pub struct LocateOpts {
    /// Skip the reverse geocoding lookup
    #[structopt(long)]
    no_address: bool,
}

pub async fn locate_command(
    ctx: &mut AppContext,
    opts: LocateOpts,
) -> Result<(), Box<dyn std::error::Error>> {
    let location = match ctx
        .tracker
        .locate(ctx.geolocation.as_ref(), ctx.notifier.as_ref())
        .await
    {
        Some(location) => location,
        None => {
            println!("Current position unknown");
            return Ok(());
        }
    };
    println!("Current position: {}", location);

    if !opts.no_address {
        match ctx.geolocation.reverse_geocode(location).await {
            Ok(Some(address)) => println!("Address: {}", address),
            Ok(None) => println!("Address: unknown"),
            Err(e) => warn!("reverse geocoding failed: {}", e),
        }
    }

    Ok(())
}
