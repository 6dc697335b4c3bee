//! Publish command

use clap::Args;
use tracing::info;

use tandem_core::session::ReleaseSession;
use tandem_core::workflow::{publish, verify_conditions};

use crate::cli::context::{ReleaseArgs, Run};
use crate::cli::{output, Cli};

/// Publish the workspace packages to the registry
#[derive(Debug, Args)]
pub struct PublishCommand {
    #[command(flatten)]
    pub release: ReleaseArgs,

    /// Skip the verification step
    #[arg(long)]
    pub no_verify: bool,
}

impl PublishCommand {
    /// Execute the publish command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            version = %self.release.next_version,
            channel = ?self.release.channel,
            "executing publish command"
        );
        let run = Run::load(cli, &self.release)?;
        let mut session = ReleaseSession::new();

        if !self.no_verify {
            verify_conditions(&run.config, &run.ctx, &mut session, run.collaborators())?;
        }
        let release = publish(&run.config, &run.ctx, &mut session, run.collaborators())?;
        output::release_info(cli.format, release.as_ref())
    }
}
