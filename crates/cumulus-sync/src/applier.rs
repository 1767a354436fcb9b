//! Change appliers
//!
//! An applier knows how to realize a single [`Change`] against the
//! destination side. [`PushApplier`] mutates the remote store from local
//! sources; [`PullApplier`] mutates the local tree from remote sources.
//! Neither ever touches the authoritative side of its direction.

use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::debug;

use cumulus_core::domain::change::Change;
use cumulus_core::domain::node::Node;
use cumulus_core::ports::local_tree::ILocalTree;
use cumulus_core::ports::remote_store::IRemoteStore;

/// Applies one change to the destination side
#[async_trait::async_trait]
pub trait IChangeApplier: Send + Sync {
    /// Realizes `change` against the destination
    async fn apply(&self, change: &Change) -> anyhow::Result<()>;
}

// ============================================================================
// PushApplier
// ============================================================================

/// Realizes changes against the remote store (push direction)
pub struct PushApplier {
    local: Arc<dyn ILocalTree>,
    remote: Arc<dyn IRemoteStore>,
}

impl PushApplier {
    /// Creates a push applier reading from `local` and writing to `remote`
    pub fn new(local: Arc<dyn ILocalTree>, remote: Arc<dyn IRemoteStore>) -> Self {
        Self { local, remote }
    }

    /// Creates or updates the remote counterpart of a local node
    async fn upsert(&self, src: &Node) -> anyhow::Result<()> {
        let parent_path = match src.path().parent() {
            Some(parent) => parent,
            None => bail!("change targets the sync root itself: {}", src.path()),
        };

        let parent = self
            .remote
            .find_by_path(&parent_path)
            .await
            .with_context(|| format!("looking up remote parent {parent_path}"))?
            .with_context(|| format!("remote parent {parent_path} does not exist"))?;
        let parent_id = parent
            .id()
            .with_context(|| format!("remote parent {parent_path} has no identity"))?;

        // Content is read per change, immediately before the upload, so
        // a large change list never holds more than in-flight file data.
        let content = if src.is_dir() {
            None
        } else {
            Some(
                self.local
                    .read(src.path())
                    .await
                    .with_context(|| format!("reading local file {}", src.path()))?,
            )
        };

        let stored = self
            .remote
            .upsert(parent_id, src, content.as_deref())
            .await
            .with_context(|| format!("upserting {}", src.path()))?;
        debug!(path = %src.path(), id = ?stored.id(), "Pushed node");
        Ok(())
    }
}

#[async_trait::async_trait]
impl IChangeApplier for PushApplier {
    async fn apply(&self, change: &Change) -> anyhow::Result<()> {
        match change {
            Change::Add { src } | Change::Modify { src, .. } => self.upsert(src).await,
            Change::Delete { dest } => {
                let id = dest
                    .id()
                    .with_context(|| format!("remote node {} has no identity", dest.path()))?;
                self.remote
                    .trash(id)
                    .await
                    .with_context(|| format!("trashing {}", dest.path()))?;
                debug!(path = %dest.path(), "Trashed remote node");
                Ok(())
            }
        }
    }
}

// ============================================================================
// PullApplier
// ============================================================================

/// Realizes changes against the local tree (pull direction)
pub struct PullApplier {
    local: Arc<dyn ILocalTree>,
    remote: Arc<dyn IRemoteStore>,
}

impl PullApplier {
    /// Creates a pull applier reading from `remote` and writing to `local`
    pub fn new(local: Arc<dyn ILocalTree>, remote: Arc<dyn IRemoteStore>) -> Self {
        Self { local, remote }
    }

    /// Materializes a remote node in the local tree
    async fn materialize(&self, src: &Node) -> anyhow::Result<()> {
        if src.is_dir() {
            self.local
                .create_dir(src.path())
                .await
                .with_context(|| format!("creating local directory {}", src.path()))?;
        } else {
            let id = src
                .id()
                .with_context(|| format!("remote node {} has no identity", src.path()))?;
            let content = self
                .remote
                .download(id)
                .await
                .with_context(|| format!("downloading {}", src.path()))?;
            self.local
                .write(src.path(), &content)
                .await
                .with_context(|| format!("writing local file {}", src.path()))?;
        }
        debug!(path = %src.path(), dir = src.is_dir(), "Pulled node");
        Ok(())
    }
}

#[async_trait::async_trait]
impl IChangeApplier for PullApplier {
    async fn apply(&self, change: &Change) -> anyhow::Result<()> {
        match change {
            Change::Add { src } | Change::Modify { src, .. } => self.materialize(src).await,
            Change::Delete { dest } => {
                self.local
                    .remove(dest.path())
                    .await
                    .with_context(|| format!("removing local node {}", dest.path()))?;
                debug!(path = %dest.path(), "Removed local node");
                Ok(())
            }
        }
    }
}
