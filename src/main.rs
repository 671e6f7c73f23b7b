use log::{error, info};
use pathfinder::cli::Cli;
use pathfinder::config::Config;
use pathfinder::context::AppContext;
use simplelog::{TermLogger, TerminalMode};
use structopt::StructOpt;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opt = Cli::from_args();
    let config = Config::from_path(opt.config_path())?;
    let level_filter = opt.verbosity(config.log_level());
    TermLogger::init(level_filter, simplelog::Config::default(), TerminalMode::Mixed)?;

    // every service call happens on this thread, the coordinators are not shared
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(opt, config))
}

async fn run(opt: Cli, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = AppContext::from_config(&config)?;
    let result = opt.execute_subcommand(&mut ctx).await;
    if let Err(e) = &result {
        error!("{}", e);
    }
    ctx.shutdown();
    info!("done");
    result
}
