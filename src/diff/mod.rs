//! Two-tree comparison and synchronization

mod engine;
mod sync;

pub use engine::{DiffEngine, DiffReport, SideSet};
pub use sync::{SyncEngine, SyncMode, SyncStats};
