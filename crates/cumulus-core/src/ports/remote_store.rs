//! Remote store port (driven/secondary port)
//!
//! This module defines the interface for the remote hierarchical file
//! store. The engine only ever talks to the store through this trait;
//! transport, authentication and rate limiting belong to the adapter.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are
//!   adapter-specific and don't need domain-level classification.
//! - "Not found" is an expected outcome of lookups, not an error:
//!   `find_by_path` returns `Ok(None)`. Any `Err` from this trait is a
//!   transport-class failure and is fatal during resolution.
//! - `trash` is a soft delete: the object must be recoverable by the
//!   provider, not permanently erased.

use crate::domain::newtypes::{NodePath, RemoteId};
use crate::domain::node::Node;

/// Port trait for remote store operations
///
/// Implementations must hand back [`Node`]s whose `path` fields are
/// logical paths relative to the store root, matching the local side's
/// path vocabulary, and whose `id` fields are always populated.
#[async_trait::async_trait]
pub trait IRemoteStore: Send + Sync {
    /// Looks up a node by its logical path
    ///
    /// # Returns
    /// `Ok(None)` when no node exists at the path (never an error)
    async fn find_by_path(&self, path: &NodePath) -> anyhow::Result<Option<Node>>;

    /// Lists the direct children of a directory node
    ///
    /// # Arguments
    /// * `id` - Identity of the directory to list
    async fn list_children(&self, id: &RemoteId) -> anyhow::Result<Vec<Node>>;

    /// Creates or updates a node under the given parent
    ///
    /// When `node` carries a remote id, the existing object with that id
    /// is updated in place; otherwise a new object is created. `content`
    /// is `None` for directories.
    ///
    /// # Returns
    /// The stored node's fresh metadata (id always populated)
    async fn upsert(
        &self,
        parent: &RemoteId,
        node: &Node,
        content: Option<&[u8]>,
    ) -> anyhow::Result<Node>;

    /// Soft-deletes a node (and, for directories, its subtree)
    async fn trash(&self, id: &RemoteId) -> anyhow::Result<()>;

    /// Downloads a file node's content
    async fn download(&self, id: &RemoteId) -> anyhow::Result<Vec<u8>>;
}
