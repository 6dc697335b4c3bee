//! CLI definition and command handling

pub mod commands;
pub mod context;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{
    ChangedCommand, NotesCommand, PrepareCommand, PublishCommand, ReleaseCommand, VerifyCommand,
};

/// Tandem - release every package of a monorepo in tandem
#[derive(Debug, Parser)]
#[command(name = "tandem")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Configuration file, searched from the working directory by default
    #[arg(long, global = true, env = "TANDEM_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check configuration, working copy and registry credentials
    Verify(VerifyCommand),

    /// Show which packages the next release would bump
    Changed(ChangedCommand),

    /// Write the release version to the changed packages
    Prepare(PrepareCommand),

    /// Publish the workspace packages to the registry
    Publish(PublishCommand),

    /// Print release notes scoped to the changed packages
    Notes(NotesCommand),

    /// Verify, prepare and publish in one run
    Release(ReleaseCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(&self) -> anyhow::Result<()> {
        match &self.command {
            Commands::Verify(cmd) => cmd.execute(self),
            Commands::Changed(cmd) => cmd.execute(self),
            Commands::Prepare(cmd) => cmd.execute(self),
            Commands::Publish(cmd) => cmd.execute(self),
            Commands::Notes(cmd) => cmd.execute(self),
            Commands::Release(cmd) => cmd.execute(self),
        }
    }

    /// Directory the release runs in
    pub fn working_dir(&self) -> anyhow::Result<PathBuf> {
        let cwd = std::env::current_dir()?;
        let dir = match &self.directory {
            Some(dir) => cwd.join(dir),
            None => cwd,
        };
        Ok(dir.canonicalize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_release() {
        let cli = Cli::try_parse_from([
            "tandem",
            "-C",
            "repo",
            "--format",
            "json",
            "release",
            "--next-version",
            "1.2.0",
            "--channel",
            "next",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.directory, Some(PathBuf::from("repo")));
        match cli.command {
            Commands::Release(cmd) => {
                assert_eq!(cmd.release.next_version, "1.2.0");
                assert_eq!(cmd.release.channel.as_deref(), Some("next"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_next_version_required() {
        assert!(Cli::try_parse_from(["tandem", "prepare"]).is_err());
        assert!(Cli::try_parse_from(["tandem", "verify"]).is_ok());
    }
}
