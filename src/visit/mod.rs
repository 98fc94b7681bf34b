//! Visitor implementations: the export renderer and the search collector

mod export;
mod search;

pub use export::ExportVisitor;
pub use search::SearchVisitor;
