//! Best-effort replay of a diff classification as copies

use std::fs;
use std::io;
use std::path::Path;

use super::engine::{DiffReport, SideSet};

/// Which direction(s) synchronization copies entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Copy left-only entries right and right-only entries left.
    #[default]
    TwoWay,
    /// Copy left-only entries to the right side only.
    LeftToRight,
    /// Copy right-only entries to the left side only.
    RightToLeft,
}

/// What a synchronization pass accomplished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub copied_dirs: usize,
    pub copied_files: usize,
    pub failures: usize,
}

/// One-shot, best-effort copier over a [`DiffReport`].
///
/// Directories are copied recursively to the equivalent relative location
/// under the opposite root, merging into whatever already exists there.
/// Loose files are copied flat into the opposite root, not to their
/// relative subdirectory. A failed copy is reported and skipped; the rest
/// of the plan continues, nothing is rolled back.
pub struct SyncEngine<'a> {
    left_root: &'a Path,
    right_root: &'a Path,
    mode: SyncMode,
}

impl<'a> SyncEngine<'a> {
    pub fn new(left_root: &'a Path, right_root: &'a Path, mode: SyncMode) -> Self {
        Self {
            left_root,
            right_root,
            mode,
        }
    }

    pub fn synchronize(&self, report: &DiffReport) -> SyncStats {
        let mut stats = SyncStats::default();
        if matches!(self.mode, SyncMode::TwoWay | SyncMode::LeftToRight) {
            self.copy_side(&report.left_only, self.left_root, self.right_root, &mut stats);
        }
        if matches!(self.mode, SyncMode::TwoWay | SyncMode::RightToLeft) {
            self.copy_side(&report.right_only, self.right_root, self.left_root, &mut stats);
        }
        stats
    }

    fn copy_side(&self, side: &SideSet, from_root: &Path, to_root: &Path, stats: &mut SyncStats) {
        for dir in &side.dirs {
            let dest = match dir.strip_prefix(from_root) {
                Ok(relative) => to_root.join(relative),
                Err(_) => {
                    eprintln!(
                        "dirwalk: {} is not under {}",
                        dir.display(),
                        from_root.display()
                    );
                    stats.failures += 1;
                    continue;
                }
            };
            println!("  copying {} -> {}", dir.display(), dest.display());
            match copy_tree_merged(dir, &dest) {
                Ok(()) => stats.copied_dirs += 1,
                Err(err) => {
                    eprintln!("dirwalk: cannot copy {}: {err}", dir.display());
                    stats.failures += 1;
                }
            }
        }

        // Loose files land flat in the opposing root.
        for file in &side.files {
            let Some(name) = file.file_name() else {
                continue;
            };
            let dest = to_root.join(name);
            println!("  copying {} -> {}", file.display(), dest.display());
            match fs::copy(file, &dest) {
                Ok(_) => stats.copied_files += 1,
                Err(err) => {
                    eprintln!("dirwalk: cannot copy {}: {err}", file.display());
                    stats.failures += 1;
                }
            }
        }
    }
}

/// Recursively copy `src` into `dest`, creating missing directories,
/// merging into existing ones and overwriting existing files. Symlinks
/// are skipped.
fn copy_tree_merged(src: &Path, dest: &Path) -> io::Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_symlink() {
            continue;
        }
        let target = dest.join(entry.file_name());
        if file_type.is_dir() {
            copy_tree_merged(&entry.path(), &target)?;
        } else if file_type.is_file() {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
