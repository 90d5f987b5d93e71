use owo_colors::OwoColorize;
use tena::api::ApiClient;
use tena::cli::{Cli, commands, output::Output};
use tena::utils::{config::TenaConfig, logging};
use tracing::debug;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Optional .env next to the binary's working directory
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();

    let mut config = TenaConfig::load(cli.config.as_deref())?;
    config.apply_env_overrides();
    cli.apply_overrides(&mut config);
    config.validate()?;

    logging::init_tracing(&config.logging, cli.verbose);
    debug!(api = %config.api.base_url, ai = %config.api.ai_service_url, "Configuration loaded");

    let output = if config.output.color {
        Output::new()
    } else {
        Output::no_color()
    };
    let client = ApiClient::new(&config.api)?;

    commands::execute(cli.command, client, &output).await
}
