//! Push command - make the remote side match the local tree

use anyhow::Result;
use clap::Args;

use cumulus_sync::Direction;

use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct PushCommand {
    /// Subtree to push, relative to the sync root (default: everything)
    pub path: Option<String>,

    /// Apply without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Show what would be done without making changes
    #[arg(long)]
    pub dry_run: bool,
}

impl PushCommand {
    pub async fn execute(
        &self,
        format: OutputFormat,
        config_path: Option<&std::path::Path>,
    ) -> Result<()> {
        super::run_sync(
            Direction::Push,
            self.path.as_deref(),
            self.yes,
            self.dry_run,
            format,
            config_path,
        )
        .await
    }
}
