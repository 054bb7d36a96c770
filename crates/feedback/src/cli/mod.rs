//! Command-line interface for the feedback service.
//!
//! This module provides the CLI structure for the `feedbackd` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, ListCommand, ServeCommand};

use crate::logging::Verbosity;

/// feedbackd - Collect and browse user feedback
///
/// Runs a small HTTP service that stores feedback submissions in `SQLite`
/// and serves the most recent ones back.
#[derive(Debug, Parser)]
#[command(name = "feedbackd")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP service
    Serve(ServeCommand),

    /// Create the database and schema, then exit
    Init,

    /// Print recent feedback from the database
    List(ListCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }

    /// The command to run, with `serve` as the default.
    #[must_use]
    pub fn into_command(self) -> Command {
        self.command
            .unwrap_or_else(|| Command::Serve(ServeCommand::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: None,
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "feedbackd");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["feedbackd"]).unwrap();
        assert!(matches!(cli.into_command(), Command::Serve(_)));
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "feedbackd",
            "serve",
            "--host",
            "127.0.0.1",
            "-p",
            "8080",
            "--database",
            "/tmp/fb.db",
        ])
        .unwrap();
        let Command::Serve(serve) = cli.into_command() else {
            panic!("expected serve");
        };
        assert_eq!(serve.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(serve.port, Some(8080));
        assert_eq!(serve.database, Some(PathBuf::from("/tmp/fb.db")));
    }

    #[test]
    fn test_parse_list() {
        let cli = Cli::try_parse_from(["feedbackd", "list", "--limit", "-1", "--json"]).unwrap();
        let Command::List(list) = cli.into_command() else {
            panic!("expected list");
        };
        assert_eq!(list.limit, -1);
        assert!(list.json);
    }

    #[test]
    fn test_parse_init() {
        let cli = Cli::try_parse_from(["feedbackd", "init"]).unwrap();
        assert!(matches!(cli.into_command(), Command::Init));
    }

    #[test]
    fn test_parse_config_show() {
        let cli = Cli::try_parse_from(["feedbackd", "config", "show", "--json"]).unwrap();
        assert!(matches!(
            cli.into_command(),
            Command::Config(ConfigCommand::Show { json: true })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = Cli::try_parse_from(["feedbackd", "-c", "/custom/config.toml", "init"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose_and_quiet() {
        let cli = Cli::try_parse_from(["feedbackd", "-vv", "init"]).unwrap();
        assert_eq!(cli.verbose, 2);

        let cli = Cli::try_parse_from(["feedbackd", "-q"]).unwrap();
        assert!(cli.quiet);
    }
}
