//! Optional live-progress observer
//!
//! The stand-in for the original tool's progress window: the walker polls
//! the observer after each visited entry with the current path and the
//! visitor's running totals. Correctness never depends on it.

use std::path::Path;

use crate::walk::Tally;

/// Observer receiving live counters during a walk.
pub trait Progress {
    fn update(&mut self, current: &Path, tally: Tally);

    /// Called once after the walk finishes.
    fn finish(&mut self) {}
}

/// Prints a periodically refreshed status line to stderr.
pub struct ConsoleProgress {
    seen: usize,
    every: usize,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self { seen: 0, every: 64 }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for ConsoleProgress {
    fn update(&mut self, current: &Path, tally: Tally) {
        self.seen += 1;
        if self.seen % self.every != 0 {
            return;
        }
        eprint!(
            "\r{} (found {}: dirs {} files {}, ignored {})    ",
            current.display(),
            tally.found(),
            tally.directories,
            tally.files,
            tally.ignored
        );
    }

    fn finish(&mut self) {
        if self.seen >= self.every {
            eprintln!();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counting(usize);

    impl Progress for Counting {
        fn update(&mut self, _current: &Path, _tally: Tally) {
            self.0 += 1;
        }
    }

    #[test]
    fn observer_sees_every_entry() {
        use crate::criteria::Criteria;
        use crate::entry::Entry;
        use crate::test_utils::TestTree;
        use crate::walk::{Visit, Visitor, Walker};

        struct KeepAll(Criteria, Tally);
        impl Visitor for KeepAll {
            fn criteria(&self) -> &Criteria {
                &self.0
            }
            fn visit_file(&mut self, _entry: &Entry) -> Visit {
                self.1.files += 1;
                Visit::Keep
            }
            fn visit_directory(&mut self, _entry: &Entry) -> Visit {
                self.1.directories += 1;
                Visit::Keep
            }
            fn tally(&self) -> Tally {
                self.1
            }
        }

        let tree = TestTree::new();
        tree.add_file("a.txt", "a");
        tree.add_file("sub/b.txt", "b");

        let mut observer = Counting(0);
        let mut visitor = KeepAll(Criteria::default(), Tally::default());
        Walker::new()
            .with_progress(&mut observer)
            .run(tree.path(), &mut visitor);
        assert_eq!(observer.0, 3);
    }
}
