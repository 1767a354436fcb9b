//! Pull command - make the local tree match the remote side

use anyhow::Result;
use clap::Args;

use cumulus_sync::Direction;

use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct PullCommand {
    /// Subtree to pull, relative to the sync root (default: everything)
    pub path: Option<String>,

    /// Apply without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Show what would be done without making changes
    #[arg(long)]
    pub dry_run: bool,
}

impl PullCommand {
    pub async fn execute(
        &self,
        format: OutputFormat,
        config_path: Option<&std::path::Path>,
    ) -> Result<()> {
        super::run_sync(
            Direction::Pull,
            self.path.as_deref(),
            self.yes,
            self.dry_run,
            format,
            config_path,
        )
        .await
    }
}
