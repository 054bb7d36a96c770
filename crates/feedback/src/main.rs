//! `feedbackd` - HTTP service and CLI for the feedback store
//!
//! Runs the feedback API by default, and offers a few maintenance commands
//! for inspecting storage and configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use feedback::cli::{Cli, Command, ConfigCommand, ListCommand};
use feedback::{init_logging, server, Config, FeedbackRepresentation, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config_path = cli.config.clone();
    let command = cli.into_command();

    if let Command::Config(config_cmd) = command {
        return handle_config(config_path, config_cmd);
    }

    let mut config = Config::load_from(config_path).context("loading configuration")?;

    match command {
        Command::Serve(serve_cmd) => {
            serve_cmd.apply(&mut config);
            config.validate()?;
            server::run(&config).await?;
        }
        Command::Init => {
            let storage = Storage::open(config.database_path())?;
            println!("Database ready at {}", storage.path().display());
        }
        Command::List(list_cmd) => handle_list(&config, &list_cmd)?,
        Command::Config(_) => {} // handled before loading
    }
    Ok(())
}

fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    let storage = Storage::open(config.database_path())?;
    let records = storage.recent(cmd.limit)?;

    if cmd.json {
        let items: Vec<FeedbackRepresentation> =
            records.iter().map(FeedbackRepresentation::from).collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No feedback yet.");
        return Ok(());
    }

    for record in &records {
        let repr = record.to_representation();
        match &repr.email {
            Some(email) => println!("#{} {} <{}> at {}", repr.id, repr.name, email, repr.created_at),
            None => println!("#{} {} at {}", repr.id, repr.name, repr.created_at),
        }
        println!("    {}", repr.message);
    }
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path).context("loading configuration")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Server]");
                println!("  Host:               {}", config.server.host);
                println!("  Port:               {}", config.server.port);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = ConfigCommand::validation_target(file, config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path)).context("configuration is invalid")?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
