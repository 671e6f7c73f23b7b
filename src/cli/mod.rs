//! Define the application's command line interface
use crate::context::AppContext;
use simplelog::LevelFilter;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

mod locate;
use locate::{locate_command, LocateOpts};
mod report;
use report::{report_command, ReportOpts};
mod route;
use route::{route_command, RouteOpts};
mod suggest;
use suggest::{suggest_command, SuggestOpts};

/// Find routes between places and report road conditions with geotagged photos
#[derive(Debug, StructOpt)]
#[structopt(name = "pathfinder")]
pub struct Cli {
    /// Set logging level to debug, use a second time (e.g. -vv) to set logging to trace
    #[structopt(short, long, parse(from_occurrences))]
    verbose: i32,
    /// Suppress info logging messages use a second time (e.g. -qq) to hide warnings
    #[structopt(short, long, parse(from_occurrences))]
    quiet: i32,
    /// Configuration file to use instead of the default location
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,
    #[structopt(subcommand)]
    cmd: Command,
}

impl Cli {
    /// Return the verbose flag counts as a log level filter
    pub fn verbosity(&self, default: LevelFilter) -> LevelFilter {
        if self.quiet == 1 {
            LevelFilter::Warn
        } else if self.quiet > 1 {
            LevelFilter::Error
        } else if self.verbose == 1 {
            LevelFilter::Debug
        } else if self.verbose > 1 {
            LevelFilter::Trace
        } else {
            default
        }
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config.as_deref()
    }

    /// Consume options struct and return the result of subcommand execution
    pub async fn execute_subcommand(
        self,
        ctx: &mut AppContext,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.cmd.execute(ctx).await
    }
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Show the current position of the device
    #[structopt(name = "locate")]
    Locate(LocateOpts),
    /// Capture a geotagged photo and upload it as a road report
    #[structopt(name = "report")]
    Report(ReportOpts),
    /// Request a route between two places and show it on the map
    #[structopt(name = "route")]
    Route(RouteOpts),
    /// List address suggestions for partial input
    #[structopt(name = "suggest")]
    Suggest(SuggestOpts),
}

impl Command {
    /// Consume enum variant and return the result of the command's execution
    async fn execute(self, ctx: &mut AppContext) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Command::Locate(opts) => locate_command(ctx, opts).await,
            Command::Report(opts) => report_command(ctx, opts).await,
            Command::Route(opts) => route_command(ctx, opts).await,
            Command::Suggest(opts) => suggest_command(ctx, opts).await,
        }
    }
}
