//! Verify command

use clap::Args;
use tracing::info;

use tandem_core::session::ReleaseSession;
use tandem_core::workflow::verify_conditions;

use crate::cli::context::Run;
use crate::cli::{output, Cli, OutputFormat};

/// Check configuration, working copy and registry credentials
#[derive(Debug, Args)]
pub struct VerifyCommand {}

impl VerifyCommand {
    /// Execute the verify command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing verify command");
        let run = Run::open(cli)?;
        let mut session = ReleaseSession::new();

        verify_conditions(&run.config, &run.ctx, &mut session, run.collaborators())?;

        match cli.format {
            OutputFormat::Json => output::json(&serde_json::json!({ "verified": true }))?,
            OutputFormat::Text if !cli.quiet => output::success("All release conditions verified"),
            OutputFormat::Text => {}
        }
        Ok(())
    }
}
