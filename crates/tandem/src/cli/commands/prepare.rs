//! Prepare command

use clap::Args;
use tracing::info;

use tandem_core::session::ReleaseSession;
use tandem_core::workflow::{prepare, verify_conditions};

use crate::cli::context::{ReleaseArgs, Run};
use crate::cli::{output, Cli};

/// Write the release version to the changed packages
#[derive(Debug, Args)]
pub struct PrepareCommand {
    #[command(flatten)]
    pub release: ReleaseArgs,

    /// Skip the verification step
    #[arg(long)]
    pub no_verify: bool,
}

impl PrepareCommand {
    /// Execute the prepare command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            version = %self.release.next_version,
            no_verify = self.no_verify,
            "executing prepare command"
        );
        let run = Run::load(cli, &self.release)?;
        let mut session = ReleaseSession::new();

        if !self.no_verify {
            verify_conditions(&run.config, &run.ctx, &mut session, run.collaborators())?;
        }
        let report = prepare(&run.config, &run.ctx, &mut session, run.collaborators())?;
        output::prepare_report(cli.format, &report)
    }
}
