//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for domain identifiers and
//! logical paths. Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// RemoteId
// ============================================================================

/// Identity of a node within the remote store (opaque, provider-supplied)
///
/// A `RemoteId` is unique within one remote store. Local-only nodes carry
/// no remote id until an upsert assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteId(String);

impl RemoteId {
    /// Create a new RemoteId
    ///
    /// # Errors
    /// Returns error if the id is empty
    pub fn new(id: String) -> Result<Self, DomainError> {
        if id.is_empty() {
            return Err(DomainError::InvalidRemoteId(
                "Remote ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RemoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemoteId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for RemoteId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RemoteId> for String {
    fn from(id: RemoteId) -> Self {
        id.0
    }
}

// ============================================================================
// NodePath
// ============================================================================

/// A logical path relative to the sync root
///
/// `NodePath` is the path vocabulary shared by both sides of a sync: the
/// same value addresses the local entry under the sync root and the remote
/// entry under the store root. It is `/` separated with no leading slash;
/// the root itself is the empty path. Components may not be empty, `.`,
/// or `..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodePath(String);

impl NodePath {
    /// Create a new NodePath
    ///
    /// # Errors
    /// Returns error if the path is absolute, contains empty components,
    /// or contains `.`/`..` components
    pub fn new(path: String) -> Result<Self, DomainError> {
        if path.is_empty() {
            return Ok(Self::root());
        }

        if path.starts_with('/') || path.ends_with('/') {
            return Err(DomainError::InvalidPath(format!(
                "Path must be relative with no trailing slash: {path}"
            )));
        }

        for component in path.split('/') {
            if component.is_empty() {
                return Err(DomainError::InvalidPath(format!(
                    "Path contains empty component: {path}"
                )));
            }
            if component == "." || component == ".." {
                return Err(DomainError::InvalidPath(format!(
                    "Path contains traversal component: {path}"
                )));
            }
        }

        Ok(Self(path))
    }

    /// The sync root (empty path)
    #[must_use]
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Returns true if this is the sync root
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join a single path component
    ///
    /// # Errors
    /// Returns error if the component is empty or contains `/` or traversal
    pub fn join(&self, component: &str) -> Result<Self, DomainError> {
        if component.is_empty()
            || component.contains('/')
            || component == "."
            || component == ".."
        {
            return Err(DomainError::InvalidPath(format!(
                "Invalid path component: {component}"
            )));
        }

        let joined = if self.is_root() {
            component.to_string()
        } else {
            format!("{}/{component}", self.0)
        };

        Ok(Self(joined))
    }

    /// Get the parent path (None for the root)
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }

        match self.0.rfind('/') {
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => Some(Self::root()),
        }
    }

    /// Get the final component (None for the root)
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.0.rsplit('/').next()
    }
}

impl Display for NodePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // Root renders as "/" so log lines never show an empty field.
        if self.is_root() {
            write!(f, "/")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl FromStr for NodePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for NodePath {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<NodePath> for String {
    fn from(path: NodePath) -> Self {
        path.0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod remote_id_tests {
        use super::*;

        #[test]
        fn test_valid_id() {
            let id = RemoteId::new("0AB1cde2FGH3ijk".to_string()).unwrap();
            assert_eq!(id.as_str(), "0AB1cde2FGH3ijk");
        }

        #[test]
        fn test_empty_fails() {
            let result = RemoteId::new(String::new());
            assert!(result.is_err());
        }

        #[test]
        fn test_serde_roundtrip() {
            let id = RemoteId::new("ABC123".to_string()).unwrap();
            let json = serde_json::to_string(&id).unwrap();
            let parsed: RemoteId = serde_json::from_str(&json).unwrap();
            assert_eq!(id, parsed);
        }
    }

    mod node_path_tests {
        use super::*;

        #[test]
        fn test_new_valid() {
            let path = NodePath::new("docs/readme.md".to_string()).unwrap();
            assert_eq!(path.as_str(), "docs/readme.md");
        }

        #[test]
        fn test_root() {
            let root = NodePath::root();
            assert!(root.is_root());
            assert_eq!(root.as_str(), "");
            assert_eq!(root.to_string(), "/");
        }

        #[test]
        fn test_empty_string_is_root() {
            let path = NodePath::new(String::new()).unwrap();
            assert!(path.is_root());
        }

        #[test]
        fn test_leading_slash_fails() {
            assert!(NodePath::new("/docs".to_string()).is_err());
        }

        #[test]
        fn test_trailing_slash_fails() {
            assert!(NodePath::new("docs/".to_string()).is_err());
        }

        #[test]
        fn test_double_slash_fails() {
            assert!(NodePath::new("docs//readme.md".to_string()).is_err());
        }

        #[test]
        fn test_traversal_fails() {
            assert!(NodePath::new("docs/../secret".to_string()).is_err());
            assert!(NodePath::new("./docs".to_string()).is_err());
        }

        #[test]
        fn test_join() {
            let root = NodePath::root();
            let docs = root.join("docs").unwrap();
            assert_eq!(docs.as_str(), "docs");

            let readme = docs.join("readme.md").unwrap();
            assert_eq!(readme.as_str(), "docs/readme.md");
        }

        #[test]
        fn test_join_invalid_component() {
            let root = NodePath::root();
            assert!(root.join("").is_err());
            assert!(root.join("a/b").is_err());
            assert!(root.join("..").is_err());
        }

        #[test]
        fn test_parent() {
            let path = NodePath::new("a/b/c.txt".to_string()).unwrap();
            let parent = path.parent().unwrap();
            assert_eq!(parent.as_str(), "a/b");

            let grandparent = parent.parent().unwrap();
            assert_eq!(grandparent.as_str(), "a");

            let root = grandparent.parent().unwrap();
            assert!(root.is_root());

            assert!(root.parent().is_none());
        }

        #[test]
        fn test_file_name() {
            let path = NodePath::new("docs/readme.md".to_string()).unwrap();
            assert_eq!(path.file_name(), Some("readme.md"));
            assert_eq!(NodePath::root().file_name(), None);
        }

        #[test]
        fn test_ordering_is_parent_first() {
            // String ordering keeps a directory before its descendants,
            // which is the stable top-down order the resolver relies on.
            let dir = NodePath::new("docs".to_string()).unwrap();
            let child = NodePath::new("docs/readme.md".to_string()).unwrap();
            assert!(dir < child);
        }

        #[test]
        fn test_serde_roundtrip() {
            let path = NodePath::new("a/b".to_string()).unwrap();
            let json = serde_json::to_string(&path).unwrap();
            let parsed: NodePath = serde_json::from_str(&json).unwrap();
            assert_eq!(path, parsed);
        }
    }
}
