//! Node - metadata snapshot of one filesystem entry
//!
//! A [`Node`] captures just enough metadata about one entry, local or
//! remote, to decide equality and staleness during change resolution.
//! Nodes are built fresh for each resolution pass and never mutated; the
//! only sanctioned derivation is [`Node::merge_remote_identity`], which
//! produces a *new* value carrying another node's remote id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::{NodePath, RemoteId};

/// Metadata snapshot of one filesystem entry, local or remote
///
/// The `path` is logical (relative to the sync root) and shared by both
/// sides; `id` and `revision` exist only for nodes that originate from
/// the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Remote identity; `None` for nodes that exist only locally
    id: Option<RemoteId>,
    /// Logical path relative to the sync root
    path: NodePath,
    /// Whether this entry is a directory
    is_dir: bool,
    /// Size in bytes (0 for directories)
    size: u64,
    /// Last modification time, when the originating side reports one
    modified: Option<DateTime<Utc>>,
    /// Provider-supplied content marker (remote side only)
    revision: Option<String>,
}

impl Node {
    /// Snapshot of a local entry (no remote identity, no revision)
    #[must_use]
    pub fn local(path: NodePath, is_dir: bool, size: u64, modified: Option<DateTime<Utc>>) -> Self {
        Self {
            id: None,
            path,
            is_dir,
            size: if is_dir { 0 } else { size },
            modified,
            revision: None,
        }
    }

    /// Snapshot of a remote entry
    #[must_use]
    pub fn remote(
        id: RemoteId,
        path: NodePath,
        is_dir: bool,
        size: u64,
        modified: Option<DateTime<Utc>>,
        revision: Option<String>,
    ) -> Self {
        Self {
            id: Some(id),
            path,
            is_dir,
            size: if is_dir { 0 } else { size },
            modified,
            revision,
        }
    }

    /// Remote identity, if this node has one
    #[must_use]
    pub fn id(&self) -> Option<&RemoteId> {
        self.id.as_ref()
    }

    /// Logical path relative to the sync root
    #[must_use]
    pub fn path(&self) -> &NodePath {
        &self.path
    }

    /// Final path component; empty string only for the root node
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.file_name().unwrap_or("")
    }

    /// Whether this entry is a directory
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Size in bytes (always 0 for directories)
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Last modification time, if known
    #[must_use]
    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }

    /// Provider content marker, if this node came from the remote store
    #[must_use]
    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    /// Derive a new node carrying `other`'s remote identity
    ///
    /// Used before dispatching a Modify so the applied change addresses
    /// the existing remote object instead of creating a duplicate. This
    /// is a pure merge: `self` is unchanged, metadata stays `self`'s,
    /// only the id comes from `other`. When `other` has no id (a local
    /// destination in the pull direction), `self`'s own id is kept.
    #[must_use]
    pub fn merge_remote_identity(&self, other: &Node) -> Node {
        Node {
            id: other.id.clone().or_else(|| self.id.clone()),
            ..self.clone()
        }
    }

    /// Whether two file nodes' timestamps agree at second granularity
    ///
    /// Filesystems and providers round mtimes differently; sub-second
    /// drift must not count as divergence. Unknown on either side counts
    /// as agreement (the caller falls back to other comparators).
    #[must_use]
    pub fn modified_matches(&self, other: &Node) -> bool {
        match (self.modified, other.modified) {
            (Some(a), Some(b)) => a.timestamp() == b.timestamp(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn path(s: &str) -> NodePath {
        NodePath::new(s.to_string()).unwrap()
    }

    fn rid(s: &str) -> RemoteId {
        RemoteId::new(s.to_string()).unwrap()
    }

    #[test]
    fn test_local_node_has_no_identity() {
        let node = Node::local(path("a.txt"), false, 12, None);
        assert!(node.id().is_none());
        assert!(node.revision().is_none());
        assert_eq!(node.size(), 12);
        assert_eq!(node.name(), "a.txt");
    }

    #[test]
    fn test_directory_size_is_zero() {
        let node = Node::local(path("docs"), true, 4096, None);
        assert_eq!(node.size(), 0);
    }

    #[test]
    fn test_remote_node() {
        let node = Node::remote(
            rid("r1"),
            path("a.txt"),
            false,
            12,
            None,
            Some("abc123".to_string()),
        );
        assert_eq!(node.id().unwrap().as_str(), "r1");
        assert_eq!(node.revision(), Some("abc123"));
    }

    #[test]
    fn test_merge_remote_identity_is_pure() {
        let local = Node::local(path("a.txt"), false, 12, None);
        let remote = Node::remote(rid("r1"), path("a.txt"), false, 9, None, None);

        let merged = local.merge_remote_identity(&remote);

        // Merged node carries the remote id but the local metadata.
        assert_eq!(merged.id().unwrap().as_str(), "r1");
        assert_eq!(merged.size(), 12);

        // The original local node is untouched.
        assert!(local.id().is_none());
    }

    #[test]
    fn test_merge_keeps_own_identity_when_other_has_none() {
        let remote = Node::remote(rid("r1"), path("a.txt"), false, 9, None, None);
        let local = Node::local(path("a.txt"), false, 12, None);

        // Pull direction: source is remote, destination local (no id).
        let merged = remote.merge_remote_identity(&local);
        assert_eq!(merged.id().unwrap().as_str(), "r1");
    }

    #[test]
    fn test_modified_matches_second_granularity() {
        let t1 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let t2 = t1 + chrono::Duration::milliseconds(400);
        let t3 = t1 + chrono::Duration::seconds(2);

        let a = Node::local(path("f"), false, 1, Some(t1));
        let b = Node::local(path("f"), false, 1, Some(t2));
        let c = Node::local(path("f"), false, 1, Some(t3));

        assert!(a.modified_matches(&b));
        assert!(!a.modified_matches(&c));
    }

    #[test]
    fn test_modified_matches_unknown_side() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let known = Node::local(path("f"), false, 1, Some(t));
        let unknown = Node::local(path("f"), false, 1, None);

        assert!(known.modified_matches(&unknown));
        assert!(unknown.modified_matches(&known));
    }
}
