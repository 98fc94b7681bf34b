//! dirwalk - walk directory trees to export, search, and compare them

pub mod cancel;
pub mod criteria;
pub mod diff;
pub mod entry;
pub mod filter;
pub mod progress;
pub mod report;
pub mod template;
pub mod visit;
pub mod walk;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use cancel::CancelToken;
pub use criteria::{ConfigFile, Criteria, CriteriaError, DateOp, DateRule};
pub use diff::{DiffEngine, DiffReport, SideSet, SyncEngine, SyncMode, SyncStats};
pub use entry::{Entry, EntryKind, EntryMetadata};
pub use filter::EntryFilter;
pub use progress::{ConsoleProgress, Progress};
pub use template::{Template, TemplateError};
pub use visit::{ExportVisitor, SearchVisitor};
pub use walk::{Outcome, Status, Tally, Visit, Visitor, Walker};
