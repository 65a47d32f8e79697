use clap::Parser;
use infrastructure::config::Config;
use presentation::cli::{Cli, CliApp};
use shared::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut config = Config::load()?;
    cli.apply_to(&mut config)?;
    let app = CliApp::new(&config);
    app.run(&cli).await
}
