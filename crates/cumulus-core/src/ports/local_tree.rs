//! Local tree port (driven/secondary port)
//!
//! This module defines the interface for local filesystem access under
//! the sync root. All paths are logical [`NodePath`]s; the adapter maps
//! them onto its configured root directory.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because filesystem errors are adapter-specific.
//! - `stat` mirrors `find_by_path` on the remote side: a missing entry is
//!   `Ok(None)`, not an error.
//! - `list_dir` must exclude hidden entries (names starting with the
//!   adapter's configured prefix) and must tolerate entries that vanish
//!   between enumeration and stat - those are skipped, not errors.
//! - The write-side operations (`write`, `create_dir`, `remove`) exist
//!   for the pull direction, where the local tree is the destination.

use crate::domain::newtypes::NodePath;
use crate::domain::node::Node;

/// Port trait for local filesystem access under the sync root
#[async_trait::async_trait]
pub trait ILocalTree: Send + Sync {
    /// Snapshots the entry at a logical path
    ///
    /// # Returns
    /// `Ok(None)` when nothing exists at the path (never an error)
    async fn stat(&self, path: &NodePath) -> anyhow::Result<Option<Node>>;

    /// Lists the direct children of a directory
    ///
    /// Hidden entries are excluded; entries that disappear mid-listing
    /// are skipped.
    async fn list_dir(&self, path: &NodePath) -> anyhow::Result<Vec<Node>>;

    /// Reads a file's entire content
    async fn read(&self, path: &NodePath) -> anyhow::Result<Vec<u8>>;

    /// Computes the SHA-256 checksum of a file, hex-encoded
    ///
    /// Compared against remote revision markers to decide divergence
    /// when sizes agree.
    async fn checksum(&self, path: &NodePath) -> anyhow::Result<String>;

    /// Writes a file, creating or replacing it
    async fn write(&self, path: &NodePath, data: &[u8]) -> anyhow::Result<()>;

    /// Creates a directory (parents included)
    async fn create_dir(&self, path: &NodePath) -> anyhow::Result<()>;

    /// Removes a file or directory subtree
    async fn remove(&self, path: &NodePath) -> anyhow::Result<()>;
}
