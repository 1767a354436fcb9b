//! Local filesystem adapter
//!
//! [`LocalTreeAdapter`] implements [`ILocalTree`] over `tokio::fs`,
//! mapping logical paths onto a configured root directory. Writes are
//! atomic (temp file + rename) so a crashed pull never leaves a
//! half-written file at its final path.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::warn;

use cumulus_core::domain::newtypes::NodePath;
use cumulus_core::domain::node::Node;
use cumulus_core::ports::local_tree::ILocalTree;

/// Filesystem-backed [`ILocalTree`] rooted at a directory
pub struct LocalTreeAdapter {
    root: PathBuf,
    hidden_prefix: String,
}

impl LocalTreeAdapter {
    /// Creates an adapter over `root`, excluding entries whose name
    /// starts with `hidden_prefix`
    pub fn new(root: impl Into<PathBuf>, hidden_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            hidden_prefix: hidden_prefix.into(),
        }
    }

    fn absolute(&self, path: &NodePath) -> PathBuf {
        if path.is_root() {
            self.root.clone()
        } else {
            self.root.join(path.as_str())
        }
    }

    fn is_hidden(&self, name: &str) -> bool {
        !self.hidden_prefix.is_empty() && name.starts_with(&self.hidden_prefix)
    }

    fn node_from_metadata(
        path: &NodePath,
        metadata: &std::fs::Metadata,
    ) -> Node {
        let modified = metadata
            .modified()
            .ok()
            .map(DateTime::<Utc>::from);
        Node::local(path.clone(), metadata.is_dir(), metadata.len(), modified)
    }
}

#[async_trait::async_trait]
impl ILocalTree for LocalTreeAdapter {
    async fn stat(&self, path: &NodePath) -> Result<Option<Node>> {
        match fs::metadata(self.absolute(path)).await {
            Ok(metadata) => Ok(Some(Self::node_from_metadata(path, &metadata))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("stat failed for {path}")),
        }
    }

    async fn list_dir(&self, path: &NodePath) -> Result<Vec<Node>> {
        let abs = self.absolute(path);
        let mut entries = fs::read_dir(&abs)
            .await
            .with_context(|| format!("cannot list directory {}", abs.display()))?;

        let mut nodes = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("directory enumeration failed in {}", abs.display()))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.is_hidden(&name) {
                continue;
            }
            let child_path = path
                .join(&name)
                .with_context(|| format!("invalid entry name {name:?} in {path}"))?;
            // Entries can vanish (or be broken symlinks) between read_dir
            // and metadata; those are skipped, not fatal.
            match fs::metadata(entry.path()).await {
                Ok(metadata) => nodes.push(Self::node_from_metadata(&child_path, &metadata)),
                Err(e) => {
                    warn!(path = %child_path, error = %e, "Skipping unreadable entry");
                }
            }
        }

        nodes.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(nodes)
    }

    async fn read(&self, path: &NodePath) -> Result<Vec<u8>> {
        let abs = self.absolute(path);
        fs::read(&abs)
            .await
            .with_context(|| format!("cannot read {}", abs.display()))
    }

    async fn checksum(&self, path: &NodePath) -> Result<String> {
        let content = self.read(path).await?;
        let mut hasher = Sha256::new();
        hasher.update(&content);
        Ok(hex::encode(hasher.finalize()))
    }

    async fn write(&self, path: &NodePath, data: &[u8]) -> Result<()> {
        let abs = self.absolute(path);
        if let Some(parent) = abs.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("cannot create parent of {}", abs.display()))?;
        }
        let tmp = temp_sibling(&abs);
        fs::write(&tmp, data)
            .await
            .with_context(|| format!("cannot write {}", tmp.display()))?;
        fs::rename(&tmp, &abs)
            .await
            .with_context(|| format!("cannot move {} into place", tmp.display()))?;
        Ok(())
    }

    async fn create_dir(&self, path: &NodePath) -> Result<()> {
        let abs = self.absolute(path);
        fs::create_dir_all(&abs)
            .await
            .with_context(|| format!("cannot create directory {}", abs.display()))
    }

    async fn remove(&self, path: &NodePath) -> Result<()> {
        let abs = self.absolute(path);
        let metadata = fs::metadata(&abs)
            .await
            .with_context(|| format!("cannot stat {}", abs.display()))?;
        if metadata.is_dir() {
            fs::remove_dir_all(&abs)
                .await
                .with_context(|| format!("cannot remove directory {}", abs.display()))
        } else {
            fs::remove_file(&abs)
                .await
                .with_context(|| format!("cannot remove file {}", abs.display()))
        }
    }
}

/// Temp path in the same directory as `target`, so the final rename
/// stays on one filesystem
fn temp_sibling(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    target.with_file_name(format!("{name}.{nanos}.part"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn path(s: &str) -> NodePath {
        NodePath::new(s.to_string()).unwrap()
    }

    fn adapter(dir: &TempDir) -> LocalTreeAdapter {
        LocalTreeAdapter::new(dir.path(), ".")
    }

    #[tokio::test]
    async fn test_stat_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let tree = adapter(&dir);
        assert!(tree.stat(&path("nope.txt")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stat_root_and_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        let tree = adapter(&dir);

        let root = tree.stat(&NodePath::root()).await.unwrap().unwrap();
        assert!(root.is_dir());

        let file = tree.stat(&path("a.txt")).await.unwrap().unwrap();
        assert!(!file.is_dir());
        assert_eq!(file.size(), 5);
        assert!(file.modified().is_some());
    }

    #[tokio::test]
    async fn test_list_dir_excludes_hidden_and_sorts() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.txt"), b"b").unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        std::fs::write(dir.path().join(".secret"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();

        let tree = adapter(&dir);
        let nodes = tree.list_dir(&NodePath::root()).await.unwrap();
        let names: Vec<&str> = nodes.iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "docs"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_dir_skips_broken_symlink() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        std::os::unix::fs::symlink("missing-target", dir.path().join("dangling")).unwrap();

        let tree = adapter(&dir);
        let nodes = tree.list_dir(&NodePath::root()).await.unwrap();
        let names: Vec<&str> = nodes.iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["a.txt"]);
    }

    #[tokio::test]
    async fn test_checksum_is_sha256_hex() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        let tree = adapter(&dir);

        let sum = tree.checksum(&path("a.txt")).await.unwrap();
        assert_eq!(
            sum,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[tokio::test]
    async fn test_write_creates_parents_and_replaces() {
        let dir = TempDir::new().unwrap();
        let tree = adapter(&dir);

        tree.write(&path("docs/deep/a.txt"), b"one").await.unwrap();
        tree.write(&path("docs/deep/a.txt"), b"two").await.unwrap();

        let content = std::fs::read(dir.path().join("docs/deep/a.txt")).unwrap();
        assert_eq!(content, b"two");
        // No temp leftovers next to the final file.
        let leftovers = std::fs::read_dir(dir.path().join("docs/deep"))
            .unwrap()
            .count();
        assert_eq!(leftovers, 1);
    }

    #[tokio::test]
    async fn test_remove_file_and_subtree() {
        let dir = TempDir::new().unwrap();
        let tree = adapter(&dir);
        tree.write(&path("docs/a.txt"), b"a").await.unwrap();

        tree.remove(&path("docs/a.txt")).await.unwrap();
        assert!(!dir.path().join("docs/a.txt").exists());

        tree.write(&path("docs/b.txt"), b"b").await.unwrap();
        tree.remove(&path("docs")).await.unwrap();
        assert!(!dir.path().join("docs").exists());
    }
}
