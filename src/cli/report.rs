//! Define report subcommand
use crate::capture::{CaptureSession, SubmitOutcome};
use crate::context::AppContext;
use log::{info, warn};
use structopt::StructOpt;

/// Capture a geotagged photo with the configured camera and upload it as a road report
#[derive(Debug, StructOpt)]
pub struct ReportOpts {
    /// Description of the road condition shown in the photo
    #[structopt(short, long, default_value = "")]
    description: String,
    /// How many times a failed upload is retried with the same photo
    #[structopt(short, long, default_value = "0")]
    retries: u32,
}

pub async fn report_command(
    ctx: &mut AppContext,
    opts: ReportOpts,
) -> Result<(), Box<dyn std::error::Error>> {
    let notifier = ctx.notifier.as_ref();
    let mut session = CaptureSession::new();
    if let Err(e) = session
        .shutter(ctx.camera.as_ref(), ctx.geolocation.as_ref(), notifier)
        .await
    {
        session.cancel();
        return Err(Box::new(e));
    }
    session.set_annotation(&opts.description);

    let mut attempt = 0;
    loop {
        attempt += 1;
        session = match session.submit(&ctx.backend, notifier).await {
            SubmitOutcome::Uploaded(receipt) => {
                info!("report accepted after {} attempt(s)", attempt);
                println!("Uploaded photo {}", receipt.digest());
                if let Some(geotag) = receipt.geotag() {
                    println!("Geotag: {}", geotag);
                }
                println!("Response: {}", receipt.response());
                return Ok(());
            }
            SubmitOutcome::Failed(session) if attempt <= opts.retries => {
                warn!("upload attempt {} failed, retrying", attempt);
                session
            }
            SubmitOutcome::Failed(session) | SubmitOutcome::Ignored(session) => {
                session.cancel();
                return Err(format!("report upload failed after {} attempt(s)", attempt).into());
            }
        };
    }
}
