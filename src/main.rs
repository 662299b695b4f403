mod cli;
mod config;
mod logging;
mod model;
mod setup;
mod store;
mod sync;
mod trello;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use cli::{Cli, Command};
use config::{EnvOverrides, DEFAULT_TRIGGER_LABEL, TRIGGER_LABEL_COLOR};
use store::MappingStore;
use sync::Reconciler;
use trello::client::TrelloClient;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match logging::init(&cli.log_dir(), &cli.log_level, cli.command().log_prefix()) {
        Ok(path) => info!("Logging to {}", path.display()),
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    }

    match run(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the command finished without any recorded error.
async fn run(cli: &Cli) -> Result<bool> {
    let file_config = config::load_file_config(&cli.config_path())?;
    let env = EnvOverrides::from_env();

    match cli.command() {
        Command::Sync => {
            let config = file_config.into_sync_config(&env)?;
            let client = TrelloClient::new(&config.credentials);
            let store = MappingStore::new(cli.mapping_path());
            info!("Mapping file: {}", store.path().display());
            let outcome = Reconciler::new(&client, &config).run(&store).await?;
            Ok(outcome.succeeded())
        }
        Command::SetupLabel => {
            let credentials = file_config.credentials(&env)?;
            let label = file_config
                .trigger_label
                .as_deref()
                .unwrap_or(DEFAULT_TRIGGER_LABEL);
            let client = TrelloClient::new(&credentials);
            let stats = setup::setup_all_boards(&client, label, TRIGGER_LABEL_COLOR).await;
            Ok(stats.errors == 0)
        }
    }
}
