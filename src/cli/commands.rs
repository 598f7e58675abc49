//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - select: dry-run a recommender selection over a fixture
//! - config: print the resolved configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// recsel - evaluate annotation recommenders and decide which stay active
#[derive(Parser, Debug)]
#[command(name = "recsel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a selection over a project fixture and print the decisions
    Select {
        /// YAML fixture with layers, recommenders, documents and recorded labels
        #[arg(short, long)]
        fixture: PathBuf,

        /// Session owner; defaults to the fixture's user
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Print the resolved configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_args() {
        let cli = Cli::parse_from(["recsel", "select", "--fixture", "demo.yml", "--user", "bob"]);
        match cli.command {
            Commands::Select { fixture, user } => {
                assert_eq!(fixture, PathBuf::from("demo.yml"));
                assert_eq!(user.as_deref(), Some("bob"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["recsel", "config", "-v", "--config", "custom.yml"]);
        assert!(cli.is_verbose());
        assert_eq!(cli.config, Some(PathBuf::from("custom.yml")));
        assert!(matches!(cli.command, Commands::Config));
    }

    #[test]
    fn test_fixture_is_required() {
        assert!(Cli::try_parse_from(["recsel", "select"]).is_err());
    }
}
