//! The depth-first traversal engine

use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

use crate::cancel::CancelToken;
use crate::entry::Entry;
use crate::progress::Progress;

use super::outcome::{Outcome, Status};
use super::visitor::Visitor;

/// Depth-first walker driving the export and search behaviors.
///
/// A `Walker` may be reused across invocations: the wall-clock baseline is
/// re-armed at the start of every [`run`](Walker::run), never shared between
/// them. The walker itself performs no mutation of the tree; errors surface
/// only through the outcome status.
pub struct Walker<'a> {
    cancel: CancelToken,
    progress: Option<&'a mut dyn Progress>,
    started: Option<Instant>,
}

impl Default for Walker<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Walker<'a> {
    pub fn new() -> Self {
        Self {
            cancel: CancelToken::new(),
            progress: None,
            started: None,
        }
    }

    /// Use `token` for cooperative cancellation checks.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Attach an observer polled after each visited entry. Optional and
    /// never required for correctness.
    pub fn with_progress(mut self, progress: &'a mut dyn Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Walk the tree rooted at `root`, dispatching entries to `visitor`.
    pub fn run<V: Visitor>(&mut self, root: &Path, visitor: &mut V) -> Outcome {
        self.started = None;
        self.traverse(root, 1, visitor)
    }

    fn traverse<V: Visitor>(&mut self, root: &Path, level: usize, visitor: &mut V) -> Outcome {
        if self.cancel.is_cancelled() {
            eprintln!(
                "dirwalk: [level {level}] interrupted in {}",
                root.display()
            );
            return Outcome::aborted(Status::Interrupted);
        }

        // The budget baseline arms on the first level that sees a budget and
        // is checked opportunistically at the top of every call after that.
        if let Some(budget) = visitor.criteria().max_time {
            match self.started {
                None => self.started = Some(Instant::now()),
                Some(started) if started.elapsed() >= budget => {
                    return Outcome::aborted(Status::TimeBudget);
                }
                Some(_) => {}
            }
        }

        // Depth truncation is silent, not an error.
        if let Some(max) = visitor.criteria().max_levels {
            if level > max {
                return Outcome::default();
            }
        }

        let (files, dirs) = match list_level(root) {
            Ok(listing) => listing,
            Err(err) => {
                eprintln!("dirwalk: cannot read {}: {err}", root.display());
                return if visitor.criteria().quit_on_walk_error {
                    Outcome::aborted(Status::WalkError)
                } else {
                    Outcome::default()
                };
            }
        };

        let mut outcome = Outcome::default();

        for name in &files {
            let entry = Entry::file(name, root, level);
            if !visitor.visit_file(&entry).is_ignored() {
                outcome.local_files += 1;
                outcome.total_files += 1;
            }
            self.poll_progress(&entry, visitor);
        }

        let non_recursive = visitor.criteria().non_recursive;
        for name in &dirs {
            let entry = Entry::directory(name, root, level);
            if visitor.visit_directory(&entry).is_ignored() {
                self.poll_progress(&entry, visitor);
                continue;
            }
            outcome.local_dirs += 1;
            outcome.total_dirs += 1;
            self.poll_progress(&entry, visitor);

            let subtree = if non_recursive {
                Outcome::default()
            } else {
                self.traverse(&entry.path, level + 1, visitor)
            };
            visitor.directory_done(&entry, &subtree);
            outcome.absorb(&subtree);
            if subtree.status.is_abort() {
                outcome.status = subtree.status;
                return outcome;
            }
        }

        outcome
    }

    fn poll_progress<V: Visitor>(&mut self, entry: &Entry, visitor: &V) {
        if let Some(progress) = self.progress.as_deref_mut() {
            progress.update(&entry.path, visitor.tally());
        }
    }
}

/// Enumerate one directory level in one shot: file names and directory
/// names, sorted independently. Symlinks are skipped to keep the walk
/// cycle-free; unreadable entries within a readable level are skipped.
fn list_level(root: &Path) -> io::Result<(Vec<String>, Vec<String>)> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root)? {
        let Ok(entry) = entry else { continue };
        let Ok(file_type) = entry.file_type() else { continue };
        if file_type.is_symlink() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if file_type.is_dir() {
            dirs.push(name);
        } else if file_type.is_file() {
            files.push(name);
        }
    }
    files.sort();
    dirs.sort();
    Ok((files, dirs))
}
