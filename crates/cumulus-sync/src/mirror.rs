//! Directory mirror remote store
//!
//! [`DirMirrorStore`] implements [`IRemoteStore`] over a plain directory,
//! which stands in for the cloud side: ids are minted per session and
//! kept in memory, revisions are SHA-256 content digests, and `trash`
//! moves objects into a `.cumulus-trash/` directory instead of deleting
//! them. Dot-named entries are internal and never listed.

use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use cumulus_core::domain::newtypes::{NodePath, RemoteId};
use cumulus_core::domain::node::Node;
use cumulus_core::ports::remote_store::IRemoteStore;

const TRASH_DIR: &str = ".cumulus-trash";

/// Directory-backed [`IRemoteStore`] with session-scoped identities
pub struct DirMirrorStore {
    root: PathBuf,
    id_by_path: DashMap<NodePath, RemoteId>,
    path_by_id: DashMap<RemoteId, NodePath>,
}

impl DirMirrorStore {
    /// Opens (creating if needed) a mirror rooted at `root`
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(TRASH_DIR))
            .await
            .with_context(|| format!("cannot initialize mirror at {}", root.display()))?;
        Ok(Self {
            root,
            id_by_path: DashMap::new(),
            path_by_id: DashMap::new(),
        })
    }

    fn absolute(&self, path: &NodePath) -> PathBuf {
        if path.is_root() {
            self.root.clone()
        } else {
            self.root.join(path.as_str())
        }
    }

    /// Returns the stable (per-session) id for a logical path, minting
    /// one on first sight
    fn intern(&self, path: &NodePath) -> RemoteId {
        if let Some(existing) = self.id_by_path.get(path) {
            return existing.clone();
        }
        // RemoteId::new cannot fail on a non-empty uuid.
        let id = RemoteId::new(Uuid::new_v4().simple().to_string())
            .unwrap_or_else(|_| unreachable!("uuid is never empty"));
        self.id_by_path.insert(path.clone(), id.clone());
        self.path_by_id.insert(id.clone(), path.clone());
        id
    }

    fn forget(&self, path: &NodePath) {
        if let Some((_, id)) = self.id_by_path.remove(path) {
            self.path_by_id.remove(&id);
        }
        // Descendant mappings go stale with their ancestor.
        let prefix = format!("{}/", path.as_str());
        let stale: Vec<NodePath> = self
            .id_by_path
            .iter()
            .filter(|entry| entry.key().as_str().starts_with(&prefix))
            .map(|entry| entry.key().clone())
            .collect();
        for descendant in stale {
            if let Some((_, id)) = self.id_by_path.remove(&descendant) {
                self.path_by_id.remove(&id);
            }
        }
    }

    async fn node_at(&self, path: &NodePath) -> Result<Option<Node>> {
        let abs = self.absolute(path);
        let metadata = match fs::metadata(&abs).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("stat failed for {path}")),
        };

        let modified = metadata.modified().ok().map(DateTime::<Utc>::from);
        let revision = if metadata.is_dir() {
            None
        } else {
            let content = fs::read(&abs)
                .await
                .with_context(|| format!("cannot read {}", abs.display()))?;
            Some(digest(&content))
        };

        Ok(Some(Node::remote(
            self.intern(path),
            path.clone(),
            metadata.is_dir(),
            metadata.len(),
            modified,
            revision,
        )))
    }

    fn path_for(&self, id: &RemoteId) -> Result<NodePath> {
        match self.path_by_id.get(id) {
            Some(path) => Ok(path.clone()),
            None => bail!("unknown remote id {}", id.as_str()),
        }
    }
}

#[async_trait::async_trait]
impl IRemoteStore for DirMirrorStore {
    async fn find_by_path(&self, path: &NodePath) -> Result<Option<Node>> {
        self.node_at(path).await
    }

    async fn list_children(&self, id: &RemoteId) -> Result<Vec<Node>> {
        let path = self.path_for(id)?;
        let abs = self.absolute(&path);
        let mut entries = fs::read_dir(&abs)
            .await
            .with_context(|| format!("cannot list {}", abs.display()))?;

        let mut nodes = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("enumeration failed in {}", abs.display()))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let child_path = path
                .join(&name)
                .with_context(|| format!("invalid entry name {name:?} in {path}"))?;
            if let Some(node) = self.node_at(&child_path).await? {
                nodes.push(node);
            }
        }

        nodes.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(nodes)
    }

    async fn upsert(
        &self,
        parent: &RemoteId,
        node: &Node,
        content: Option<&[u8]>,
    ) -> Result<Node> {
        let parent_path = self.path_for(parent)?;
        let path = parent_path
            .join(node.name())
            .with_context(|| format!("invalid node name {:?}", node.name()))?;
        let abs = self.absolute(&path);

        if node.is_dir() {
            fs::create_dir_all(&abs)
                .await
                .with_context(|| format!("cannot create {}", abs.display()))?;
        } else {
            let content = match content {
                Some(content) => content,
                None => bail!("file upsert for {path} carries no content"),
            };
            fs::write(&abs, content)
                .await
                .with_context(|| format!("cannot write {}", abs.display()))?;
        }
        debug!(path = %path, dir = node.is_dir(), "Stored node");

        match self.node_at(&path).await? {
            Some(stored) => Ok(stored),
            None => bail!("stored node {path} vanished immediately"),
        }
    }

    async fn trash(&self, id: &RemoteId) -> Result<()> {
        let path = self.path_for(id)?;
        let abs = self.absolute(&path);

        // Flattened name keeps the original path readable in the trash
        // while the uuid suffix avoids collisions across trashings.
        let flattened = path.as_str().replace('/', "_");
        let resting = self
            .root
            .join(TRASH_DIR)
            .join(format!("{flattened}.{}", Uuid::new_v4().simple()));
        fs::rename(&abs, &resting)
            .await
            .with_context(|| format!("cannot trash {}", abs.display()))?;
        self.forget(&path);
        debug!(path = %path, "Trashed node");
        Ok(())
    }

    async fn download(&self, id: &RemoteId) -> Result<Vec<u8>> {
        let path = self.path_for(id)?;
        let abs = self.absolute(&path);
        fs::read(&abs)
            .await
            .with_context(|| format!("cannot read {}", abs.display()))
    }
}

fn digest(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

// ============================================================================
// Tests
// ============================================================================
