//! Change - one required mutation to reconcile one path
//!
//! A [`Change`] is produced by the resolver and consumed exactly once by
//! the orchestrator. The three variants carry exactly the node references
//! their operation needs, so the spec invariants (Add has a source only,
//! Delete a destination only, Modify both) hold by construction and
//! dispatch is an exhaustive match rather than an op-code switch.

use std::fmt::{self, Display, Formatter};

use super::newtypes::NodePath;
use super::node::Node;

/// Operation kind of a [`Change`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeOp {
    /// Create the entry on the destination side
    Add,
    /// Replace the destination entry's content with the source's
    Modify,
    /// Remove the entry from the destination side
    Delete,
}

impl Display for ChangeOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            ChangeOp::Add => "+",
            ChangeOp::Modify => "M",
            ChangeOp::Delete => "-",
        };
        write!(f, "{symbol}")
    }
}

/// One required mutation to reconcile one path between the two sides
///
/// `src` is always the authoritative side's node, `dest` the other
/// side's. Which side is authoritative depends on the sync direction
/// (push = local, pull = remote); the change itself is direction-neutral.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Path exists only on the authoritative side
    Add {
        /// Snapshot of the entry to create
        src: Node,
    },
    /// Path exists on both sides with divergent content
    Modify {
        /// Authoritative snapshot carrying the content to apply
        src: Node,
        /// Existing destination snapshot (carries the remote identity)
        dest: Node,
    },
    /// Path exists only on the destination side
    Delete {
        /// Snapshot of the entry to remove
        dest: Node,
    },
}

impl Change {
    /// Operation kind
    #[must_use]
    pub fn op(&self) -> ChangeOp {
        match self {
            Change::Add { .. } => ChangeOp::Add,
            Change::Modify { .. } => ChangeOp::Modify,
            Change::Delete { .. } => ChangeOp::Delete,
        }
    }

    /// Logical path this change reconciles
    #[must_use]
    pub fn path(&self) -> &NodePath {
        match self {
            Change::Add { src } | Change::Modify { src, .. } => src.path(),
            Change::Delete { dest } => dest.path(),
        }
    }

    /// Authoritative-side node (None for Delete)
    #[must_use]
    pub fn src(&self) -> Option<&Node> {
        match self {
            Change::Add { src } | Change::Modify { src, .. } => Some(src),
            Change::Delete { .. } => None,
        }
    }

    /// Destination-side node (None for Add)
    #[must_use]
    pub fn dest(&self) -> Option<&Node> {
        match self {
            Change::Modify { dest, .. } | Change::Delete { dest } => Some(dest),
            Change::Add { .. } => None,
        }
    }

    /// Identity carry-over: normalize a Modify so its source carries the
    /// destination's remote id
    ///
    /// Applying a Modify must address the existing remote object, never
    /// create a duplicate. The orchestrator calls this before dispatch;
    /// Add and Delete pass through unchanged.
    #[must_use]
    pub fn with_merged_identity(self) -> Change {
        match self {
            Change::Modify { src, dest } => {
                let merged = src.merge_remote_identity(&dest);
                Change::Modify { src: merged, dest }
            }
            other => other,
        }
    }
}

impl Display for Change {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op(), self.path())
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::newtypes::{NodePath, RemoteId};

    use super::*;

    fn local(p: &str) -> Node {
        Node::local(NodePath::new(p.to_string()).unwrap(), false, 10, None)
    }

    fn remote(p: &str, id: &str) -> Node {
        Node::remote(
            RemoteId::new(id.to_string()).unwrap(),
            NodePath::new(p.to_string()).unwrap(),
            false,
            20,
            None,
            None,
        )
    }

    #[test]
    fn test_add_shape() {
        let change = Change::Add { src: local("a.txt") };
        assert_eq!(change.op(), ChangeOp::Add);
        assert_eq!(change.path().as_str(), "a.txt");
        assert!(change.src().is_some());
        assert!(change.dest().is_none());
    }

    #[test]
    fn test_delete_shape() {
        let change = Change::Delete {
            dest: remote("old.log", "r9"),
        };
        assert_eq!(change.op(), ChangeOp::Delete);
        assert_eq!(change.path().as_str(), "old.log");
        assert!(change.src().is_none());
        assert!(change.dest().is_some());
    }

    #[test]
    fn test_modify_shape() {
        let change = Change::Modify {
            src: local("c.txt"),
            dest: remote("c.txt", "r3"),
        };
        assert_eq!(change.op(), ChangeOp::Modify);
        assert!(change.src().is_some());
        assert!(change.dest().is_some());
    }

    #[test]
    fn test_with_merged_identity_on_modify() {
        let change = Change::Modify {
            src: local("c.txt"),
            dest: remote("c.txt", "r3"),
        };

        let merged = change.with_merged_identity();
        let src = merged.src().unwrap();
        assert_eq!(src.id().unwrap().as_str(), "r3");
        // Source metadata (the local size) is preserved.
        assert_eq!(src.size(), 10);
    }

    #[test]
    fn test_with_merged_identity_passthrough() {
        let add = Change::Add { src: local("a") };
        assert_eq!(add.clone().with_merged_identity(), add);

        let del = Change::Delete {
            dest: remote("b", "r1"),
        };
        assert_eq!(del.clone().with_merged_identity(), del);
    }

    #[test]
    fn test_display() {
        let change = Change::Add { src: local("a.txt") };
        assert_eq!(change.to_string(), "+ a.txt");

        let change = Change::Delete {
            dest: remote("old.log", "r9"),
        };
        assert_eq!(change.to_string(), "- old.log");
    }
}
