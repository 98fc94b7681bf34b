//! Recursive two-tree comparison

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::cancel::CancelToken;
use crate::entry::EntryKind;
use crate::walk::Status;

/// Paths classified on one axis of a comparison, split by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideSet {
    pub dirs: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

impl SideSet {
    pub fn len(&self) -> usize {
        self.dirs.len() + self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty() && self.files.is_empty()
    }

    fn extend(&mut self, other: SideSet) {
        self.dirs.extend(other.dirs);
        self.files.extend(other.files);
    }
}

/// Fully expanded result of comparing two trees.
///
/// Common entries are recorded under their left-rooted path. Every abort
/// path still carries whatever was classified before the abort.
#[derive(Debug, Clone, Default)]
pub struct DiffReport {
    pub status: Status,
    pub total: usize,
    pub left_only: SideSet,
    pub right_only: SideSet,
    pub common: SideSet,
}

/// Recursive comparator classifying entries into left-only, right-only and
/// common sets at every directory level.
///
/// The name filter applies to base names, identically on both sides, and
/// gates recursion into common directories. Names that are a directory on
/// one side and a file on the other are omitted from every set.
pub struct DiffEngine {
    max_levels: Option<usize>,
    dirs_only: bool,
    name_filter: Option<Regex>,
    cancel: CancelToken,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffEngine {
    pub fn new() -> Self {
        Self {
            max_levels: None,
            dirs_only: false,
            name_filter: None,
            cancel: CancelToken::new(),
        }
    }

    pub fn max_levels(mut self, limit: Option<usize>) -> Self {
        self.max_levels = limit;
        self
    }

    /// Suppress all file classification.
    pub fn dirs_only(mut self, yes: bool) -> Self {
        self.dirs_only = yes;
        self
    }

    pub fn name_filter(mut self, filter: Option<Regex>) -> Self {
        self.name_filter = filter;
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn diff(&self, left: &Path, right: &Path) -> DiffReport {
        self.diff_level(left, right, 1)
    }

    fn diff_level(&self, left: &Path, right: &Path, level: usize) -> DiffReport {
        let mut report = DiffReport::default();

        if self.cancel.is_cancelled() {
            eprintln!(
                "dirwalk: [level {level}] interrupted while comparing {} and {}",
                left.display(),
                right.display()
            );
            report.status = Status::Interrupted;
            return report;
        }

        // Comparing a path against itself is a user error, not a walk.
        if left == right {
            report.status = Status::IdenticalInput;
            return report;
        }

        // Silent truncation, same policy as the traversal engine.
        if let Some(max) = self.max_levels {
            if level > max {
                return report;
            }
        }

        let left_entries = match list_kinds(left) {
            Ok(entries) => entries,
            Err(err) => {
                eprintln!("dirwalk: cannot read {}: {err}", left.display());
                report.status = Status::CompareError;
                return report;
            }
        };
        let right_entries = match list_kinds(right) {
            Ok(entries) => entries,
            Err(err) => {
                eprintln!("dirwalk: cannot read {}: {err}", right.display());
                report.status = Status::CompareError;
                return report;
            }
        };

        let mut common_dir_names = Vec::new();

        for (name, kind) in &left_entries {
            match right_entries.get(name) {
                None => {
                    if !self.name_allows(name) {
                        continue;
                    }
                    match kind {
                        EntryKind::Directory => report.left_only.dirs.push(left.join(name)),
                        EntryKind::File if !self.dirs_only => {
                            report.left_only.files.push(left.join(name));
                        }
                        EntryKind::File => {}
                    }
                }
                Some(right_kind) if right_kind == kind => {
                    if !self.name_allows(name) {
                        continue;
                    }
                    match kind {
                        EntryKind::Directory => {
                            report.common.dirs.push(left.join(name));
                            common_dir_names.push(name.clone());
                        }
                        EntryKind::File if !self.dirs_only => {
                            report.common.files.push(left.join(name));
                        }
                        EntryKind::File => {}
                    }
                }
                Some(_) => {} // same name, different kind: omitted
            }
        }

        for (name, kind) in &right_entries {
            if left_entries.contains_key(name) || !self.name_allows(name) {
                continue;
            }
            match kind {
                EntryKind::Directory => report.right_only.dirs.push(right.join(name)),
                EntryKind::File if !self.dirs_only => {
                    report.right_only.files.push(right.join(name));
                }
                EntryKind::File => {}
            }
        }

        report.total = report.left_only.len() + report.right_only.len() + report.common.len();

        for name in common_dir_names {
            let child = self.diff_level(&left.join(&name), &right.join(&name), level + 1);
            report.total += child.total;
            report.left_only.extend(child.left_only);
            report.right_only.extend(child.right_only);
            report.common.extend(child.common);
            if child.status.is_abort() {
                report.status = child.status;
                return report;
            }
        }

        report
    }

    fn name_allows(&self, name: &str) -> bool {
        self.name_filter
            .as_ref()
            .map(|filter| filter.is_match(name))
            .unwrap_or(true)
    }
}

/// One level of names mapped to their kinds, sorted by name. Symlinks and
/// special files are skipped.
fn list_kinds(root: &Path) -> io::Result<BTreeMap<String, EntryKind>> {
    let mut entries = BTreeMap::new();
    for entry in fs::read_dir(root)? {
        let Ok(entry) = entry else { continue };
        let Ok(file_type) = entry.file_type() else { continue };
        if file_type.is_symlink() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if file_type.is_dir() {
            entries.insert(name, EntryKind::Directory);
        } else if file_type.is_file() {
            entries.insert(name, EntryKind::File);
        }
    }
    Ok(entries)
}
