//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config::Config;

/// Arguments for running the HTTP service.
#[derive(Debug, Default, Args)]
pub struct ServeCommand {
    /// Interface to bind to (overrides configuration)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides configuration)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to the database file (overrides configuration)
    #[arg(short, long, value_name = "PATH")]
    pub database: Option<PathBuf>,
}

impl ServeCommand {
    /// Apply command-line overrides on top of loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(database) = &self.database {
            config.storage.database_path.clone_from(database);
        }
    }
}

/// Arguments for listing stored feedback.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Maximum number of records (negative for all)
    #[arg(short, long, default_value = "20", allow_negative_numbers = true)]
    pub limit: i64,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

impl ConfigCommand {
    /// File checked by `config validate`: `--file`, then the global
    /// `--config`, then the default location.
    #[must_use]
    pub fn validation_target(file: Option<PathBuf>, global: Option<PathBuf>) -> PathBuf {
        file.or(global).unwrap_or_else(Config::default_config_path)
    }
}
