//! Filesystem entry snapshot passed to visitors

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// The kind of a traversed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
}

/// Read-only metadata snapshot taken when an entry is encountered.
///
/// Timestamps the platform cannot provide stay `None`; a missing timestamp
/// never fails a lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryMetadata {
    /// Size in bytes (0 for directories on most platforms).
    pub size: u64,
    /// Creation time, where the filesystem records one.
    pub created: Option<SystemTime>,
    /// Last modification time.
    pub modified: Option<SystemTime>,
}

impl EntryMetadata {
    /// Snapshot metadata for `path`. Unreadable paths yield an empty snapshot.
    pub fn read(path: &Path) -> Self {
        match fs::metadata(path) {
            Ok(meta) => Self {
                size: meta.len(),
                created: meta.created().ok(),
                modified: meta.modified().ok(),
            },
            Err(_) => Self::default(),
        }
    }
}

/// One filesystem object encountered during traversal.
///
/// Identity is the full path. `level` is 1-based: the traversal root's
/// immediate children are at level 1.
#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub path: PathBuf,
    pub parent: PathBuf,
    pub level: usize,
    pub kind: EntryKind,
    pub metadata: EntryMetadata,
}

impl Entry {
    /// Build a file entry for `name` under `parent`, snapshotting metadata.
    pub fn file(name: &str, parent: &Path, level: usize) -> Self {
        let path = parent.join(name);
        let metadata = EntryMetadata::read(&path);
        Self {
            name: name.to_string(),
            path,
            parent: parent.to_path_buf(),
            level,
            kind: EntryKind::File,
            metadata,
        }
    }

    /// Build a directory entry for `name` under `parent`.
    pub fn directory(name: &str, parent: &Path, level: usize) -> Self {
        let path = parent.join(name);
        let metadata = EntryMetadata::read(&path);
        Self {
            name: name.to_string(),
            path,
            parent: parent.to_path_buf(),
            level,
            kind: EntryKind::Directory,
            metadata,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}
