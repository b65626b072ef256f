// src/main.rs
mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Args, Command};
use courtside::config::Config;
use courtside::error::AppError;
use logging::setup_logging;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();

    let (log_file_path, _guard) = setup_logging(&args).await?;
    tracing::info!("Logs are being written to: {log_file_path}");

    match args.command {
        Command::Config(config_args) => commands::handle_config_command(&config_args).await,
        command => {
            let config = Config::load().await?;
            commands::run_command(command, config).await
        }
    }
}
