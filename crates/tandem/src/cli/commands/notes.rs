//! Notes command

use clap::Args;
use tracing::info;

use tandem_changelog::generate_notes;
use tandem_core::monorepo::load_packages;

use crate::cli::context::{ReleaseArgs, Run};
use crate::cli::{output, Cli, OutputFormat};

/// Print release notes scoped to the changed packages
#[derive(Debug, Args)]
pub struct NotesCommand {
    #[command(flatten)]
    pub release: ReleaseArgs,
}

impl NotesCommand {
    /// Execute the notes command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(version = %self.release.next_version, "executing notes command");
        let run = Run::load(cli, &self.release)?;
        let packages = load_packages(&run.ctx.cwd)?;

        let notes = generate_notes(&run.config, &run.ctx, &run.repo, &packages)?;

        match cli.format {
            OutputFormat::Json => output::json(&serde_json::json!({
                "version": self.release.next_version,
                "notes": notes,
            })),
            OutputFormat::Text => {
                if notes.is_empty() {
                    output::warning("Release notes are disabled, set generateNotes to enable them");
                } else {
                    print!("{}", notes);
                }
                Ok(())
            }
        }
    }
}
