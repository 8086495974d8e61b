use clap::Parser;
use wagerbook::cli::{self, Cli};
use wagerbook::config::AppConfig;

mod main_runtime;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_from(&cli.config)?;
    main_runtime::init_logging(&config.logging);

    cli::run(cli, config).await?;
    Ok(())
}
