use anyhow::Result;
use clap::Parser;
use smartfarm_runner::cli;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::AppsCli::parse();
    cli::init_logging(args.verbose);
    cli::run_all_apps(args).await
}
