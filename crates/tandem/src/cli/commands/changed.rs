//! Changed command

use clap::Args;
use tracing::info;

use tandem_core::workflow::changed_packages;

use crate::cli::context::{ReleaseArgs, Run};
use crate::cli::{output, Cli};

/// Show which packages the next release would bump
#[derive(Debug, Args)]
pub struct ChangedCommand {
    #[command(flatten)]
    pub release: ReleaseArgs,
}

impl ChangedCommand {
    /// Execute the changed command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(version = %self.release.next_version, "executing changed command");
        let run = Run::load(cli, &self.release)?;

        let (_, updates) = changed_packages(&run.config, &run.ctx, run.collaborators())?;
        output::update_set(cli.format, &self.release.next_version, &updates)
    }
}
