use anyhow::Context;
use clap::Parser;
use spatial_backend::cli::{self, Args};
use spatial_backend::core::ConfigLoader;
use spatial_backend::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = ConfigLoader::settings_path(args.config.as_deref());
    let guard =
        logging::init(&args.command, settings.as_deref()).context("failed to initialize logging")?;

    let code = cli::run(args).await?;
    drop(guard);
    std::process::exit(code);
}
