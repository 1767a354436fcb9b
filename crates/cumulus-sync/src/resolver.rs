//! Tree walker and change resolver
//!
//! The [`ChangeResolver`] recursively compares a local subtree against its
//! remote counterpart and produces the ordered [`Change`] list required to
//! make the destination side match the authoritative side.
//!
//! ## Resolution rules
//!
//! For each (authoritative, other) pair at one path:
//! - authoritative only -> `Add`; directories recurse so every descendant
//!   also produces an `Add`
//! - other only -> a single `Delete` (trash is recursive)
//! - both directories -> no change for the pair, recurse into the by-name
//!   union of children
//! - both files -> `Modify` iff content diverges
//! - type conflict (file vs directory) -> `Delete` then `Add`, never `Modify`
//!
//! Resolution never mutates anything: the output is a [`Resolution`] value
//! holding the change list plus non-fatal warnings. Remote failures while
//! walking abort the whole resolution; no partial list is ever returned.

use std::collections::BTreeMap;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{debug, instrument};

use cumulus_core::domain::change::Change;
use cumulus_core::domain::newtypes::NodePath;
use cumulus_core::domain::node::Node;
use cumulus_core::ports::local_tree::ILocalTree;
use cumulus_core::ports::remote_store::IRemoteStore;

/// Which side is authoritative for this invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Local state is authoritative; the remote store is updated to match
    Push,
    /// Remote state is authoritative; the local tree is updated to match
    Pull,
}

/// Output of one resolution pass
///
/// `changes` is ordered top-down: a directory always precedes its
/// descendants, and a type-conflict `Delete` precedes its `Add`.
/// `warnings` collects non-fatal observations (entries that vanished
/// mid-walk, unreadable files assumed divergent).
#[derive(Debug, Default)]
pub struct Resolution {
    /// Ordered change list, safe to apply top-down
    pub changes: Vec<Change>,
    /// Non-fatal observations gathered during the walk
    pub warnings: Vec<String>,
}

impl Resolution {
    /// True when both sides are already consistent
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Recursive local/remote tree differ
pub struct ChangeResolver {
    local: Arc<dyn ILocalTree>,
    remote: Arc<dyn IRemoteStore>,
    direction: Direction,
}

impl ChangeResolver {
    /// Creates a resolver for one sync direction
    pub fn new(
        local: Arc<dyn ILocalTree>,
        remote: Arc<dyn IRemoteStore>,
        direction: Direction,
    ) -> Self {
        Self {
            local,
            remote,
            direction,
        }
    }

    /// Resolves the change list for the subtree rooted at `path`
    ///
    /// # Errors
    /// Fails on any remote error other than not-found, and on local
    /// failures at `path` itself. A missing authoritative sync root is
    /// an error; anywhere else, absence is data, not failure.
    #[instrument(skip(self), fields(path = %path, direction = ?self.direction))]
    pub async fn resolve(&self, path: &NodePath) -> Result<Resolution> {
        let local = self
            .local
            .stat(path)
            .await
            .with_context(|| format!("Failed to stat local path: {path}"))?;
        let remote = self
            .remote
            .find_by_path(path)
            .await
            .with_context(|| format!("Remote lookup failed for: {path}"))?;

        if path.is_root() {
            match self.direction {
                Direction::Push if local.is_none() => {
                    bail!("Local sync root does not exist")
                }
                Direction::Pull if remote.is_none() => {
                    bail!("Remote root not found")
                }
                _ => {}
            }
        }

        let mut resolution = Resolution::default();
        self.resolve_pair(local, remote, &mut resolution).await?;

        debug!(
            changes = resolution.changes.len(),
            warnings = resolution.warnings.len(),
            "Resolution complete"
        );
        Ok(resolution)
    }

    /// Classifies one (local, remote) pair and recurses as needed
    ///
    /// Boxed because async recursion needs a pinned future.
    fn resolve_pair<'a>(
        &'a self,
        local: Option<Node>,
        remote: Option<Node>,
        out: &'a mut Resolution,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let (auth, other) = match self.direction {
                Direction::Push => (local.clone(), remote.clone()),
                Direction::Pull => (remote.clone(), local.clone()),
            };

            match (auth, other) {
                (None, None) => Ok(()),

                // Authoritative only: create on the destination side. A
                // directory recurses with the other side absent so every
                // descendant yields its own Add.
                (Some(a), None) => {
                    debug!(path = %a.path(), "Only on authoritative side");
                    let recurse = a.is_dir();
                    out.changes.push(Change::Add { src: a.clone() });
                    if recurse {
                        self.resolve_children(auth_local(&self.direction, &a), auth_remote(&self.direction, &a), out)
                            .await?;
                    }
                    Ok(())
                }

                // Destination only: one Delete covers the whole subtree.
                (None, Some(o)) => {
                    debug!(path = %o.path(), "Only on destination side");
                    out.changes.push(Change::Delete { dest: o });
                    Ok(())
                }

                (Some(a), Some(o)) => {
                    if a.is_dir() && o.is_dir() {
                        self.resolve_children(local.as_ref(), remote.as_ref(), out)
                            .await
                    } else if a.is_dir() != o.is_dir() {
                        // Type conflict: the stale-typed destination entry is
                        // trashed and the correctly-typed entry re-created.
                        debug!(path = %a.path(), "Type conflict");
                        let recurse = a.is_dir();
                        out.changes.push(Change::Delete { dest: o });
                        out.changes.push(Change::Add { src: a.clone() });
                        if recurse {
                            self.resolve_children(
                                auth_local(&self.direction, &a),
                                auth_remote(&self.direction, &a),
                                out,
                            )
                            .await?;
                        }
                        Ok(())
                    } else {
                        // Both files: divergence check is direction-neutral.
                        let (l, r) = match self.direction {
                            Direction::Push => (&a, &o),
                            Direction::Pull => (&o, &a),
                        };
                        if self.files_diverge(l, r, &mut out.warnings).await? {
                            debug!(path = %a.path(), "Content diverged");
                            out.changes.push(Change::Modify { src: a, dest: o });
                        }
                        Ok(())
                    }
                }
            }
        })
    }

    /// Recurses into the by-name union of a directory pair's children
    ///
    /// Either side may be absent (authoritative-only subtrees). Union
    /// members are visited in name order, so listings are deterministic
    /// and parents always precede children in the emitted list.
    async fn resolve_children(
        &self,
        local_dir: Option<&Node>,
        remote_dir: Option<&Node>,
        out: &mut Resolution,
    ) -> Result<()> {
        let local_children = match local_dir {
            Some(dir) if dir.is_dir() => self
                .local
                .list_dir(dir.path())
                .await
                .with_context(|| format!("Failed to list local directory: {}", dir.path()))?,
            _ => Vec::new(),
        };

        let remote_children = match remote_dir {
            Some(dir) if dir.is_dir() => {
                let id = dir
                    .id()
                    .with_context(|| format!("Remote directory has no id: {}", dir.path()))?;
                self.remote
                    .list_children(id)
                    .await
                    .with_context(|| format!("Failed to list remote directory: {}", dir.path()))?
            }
            _ => Vec::new(),
        };

        let mut union: BTreeMap<String, (Option<Node>, Option<Node>)> = BTreeMap::new();
        for child in local_children {
            let name = child.name().to_string();
            union.entry(name).or_default().0 = Some(child);
        }
        for child in remote_children {
            let name = child.name().to_string();
            union.entry(name).or_default().1 = Some(child);
        }

        for (_, (local_child, remote_child)) in union {
            self.resolve_pair(local_child, remote_child, out).await?;
        }

        Ok(())
    }

    /// Decides whether two file snapshots of the same path diverge
    ///
    /// Comparator precedence: size, then remote revision against the
    /// local checksum, then mtime at second granularity. An unreadable
    /// local file is assumed divergent and noted as a warning.
    async fn files_diverge(
        &self,
        local: &Node,
        remote: &Node,
        warnings: &mut Vec<String>,
    ) -> Result<bool> {
        if local.size() != remote.size() {
            return Ok(true);
        }

        if let Some(revision) = remote.revision() {
            return match self.local.checksum(local.path()).await {
                Ok(sum) => Ok(sum != revision),
                Err(err) => {
                    warnings.push(format!(
                        "Could not checksum '{}', assuming modified: {err:#}",
                        local.path()
                    ));
                    Ok(true)
                }
            };
        }

        Ok(!local.modified_matches(remote))
    }
}

/// The authoritative node viewed as the local side, if this direction's
/// authority is local
fn auth_local<'a>(direction: &Direction, node: &'a Node) -> Option<&'a Node> {
    match direction {
        Direction::Push => Some(node),
        Direction::Pull => None,
    }
}

/// The authoritative node viewed as the remote side, if this direction's
/// authority is remote
fn auth_remote<'a>(direction: &Direction, node: &'a Node) -> Option<&'a Node> {
    match direction {
        Direction::Push => None,
        Direction::Pull => Some(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_side_helpers() {
        let node = Node::local(NodePath::root(), true, 0, None);

        assert!(auth_local(&Direction::Push, &node).is_some());
        assert!(auth_remote(&Direction::Push, &node).is_none());

        assert!(auth_local(&Direction::Pull, &node).is_none());
        assert!(auth_remote(&Direction::Pull, &node).is_some());
    }

    #[test]
    fn test_resolution_is_empty() {
        let resolution = Resolution::default();
        assert!(resolution.is_empty());
    }
}
