//! Employee Tracker CLI entry point.

use clap::Parser;

use employee_tracker::cli::{commands, handle_error, Cli, Commands};
use employee_tracker::infrastructure::{ConfigLoader, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args, &config, cli.json).await,
        Commands::Shell => commands::shell::execute(&config, cli.json).await,
        Commands::Refresh => commands::refresh::execute(&config, cli.json).await,
        Commands::Department(args) => commands::department::execute(args, &config, cli.json).await,
        Commands::Role(args) => commands::role::execute(args, &config, cli.json).await,
        Commands::Employee(args) => commands::employee::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
