//! Release command

use clap::Args;
use console::style;
use tracing::info;

use tandem_changelog::generate_notes;
use tandem_core::monorepo::load_packages;
use tandem_core::session::ReleaseSession;
use tandem_core::workflow::{prepare, publish, verify_conditions};

use crate::cli::context::{ReleaseArgs, Run};
use crate::cli::{output, Cli, OutputFormat};

/// Verify, prepare and publish in one run
#[derive(Debug, Args)]
pub struct ReleaseCommand {
    #[command(flatten)]
    pub release: ReleaseArgs,
}

impl ReleaseCommand {
    /// Execute the release command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            version = %self.release.next_version,
            channel = ?self.release.channel,
            "executing release command"
        );
        let run = Run::load(cli, &self.release)?;
        let mut session = ReleaseSession::new();

        verify_conditions(&run.config, &run.ctx, &mut session, run.collaborators())?;
        let report = prepare(&run.config, &run.ctx, &mut session, run.collaborators())?;

        let notes = if run.config.generate_notes {
            let packages = load_packages(&run.ctx.cwd)?;
            generate_notes(&run.config, &run.ctx, &run.repo, &packages)?
        } else {
            String::new()
        };

        let release = publish(&run.config, &run.ctx, &mut session, run.collaborators())?;

        if cli.format == OutputFormat::Json {
            return output::json(&serde_json::json!({
                "prepare": report,
                "notes": notes,
                "release": release,
            }));
        }

        output::prepare_report(cli.format, &report)?;
        if !notes.is_empty() && !cli.quiet {
            println!();
            println!("{}", style("Release notes").bold());
            print!("{}", notes);
        }
        output::release_info(cli.format, release.as_ref())
    }
}
