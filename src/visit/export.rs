//! Export visitor: renders kept entries through the document templates

use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::criteria::{Criteria, CriteriaError};
use crate::entry::Entry;
use crate::filter::EntryFilter;
use crate::template::{Template, fill};
use crate::walk::{Outcome, Tally, Visit, Visitor};

/// One open directory while its subtree is still being walked.
struct Frame {
    name: String,
    path: String,
    parent: String,
    level: usize,
    id: usize,
    children: String,
}

/// Collecting visitor for export mode.
///
/// Kept files render into the current directory frame immediately; kept
/// directories open a frame that closes in `directory_done`, once the
/// subtree counts are final, so fragments assemble strictly bottom-up.
/// Never mutates the filesystem.
pub struct ExportVisitor<'a> {
    criteria: &'a Criteria,
    template: &'a Template,
    filter: EntryFilter,
    separator: String,
    tally: Tally,
    stack: Vec<Frame>,
    next_id: usize,
}

impl<'a> ExportVisitor<'a> {
    pub fn new(criteria: &'a Criteria, template: &'a Template) -> Result<Self, CriteriaError> {
        let mut visitor = Self {
            criteria,
            template,
            filter: EntryFilter::from_criteria(criteria)?,
            separator: criteria.item_separator.clone(),
            tally: Tally::default(),
            stack: Vec::new(),
            next_id: 0,
        };
        // The traversal root gets a frame of its own, closed by into_document.
        let root = criteria.directory.display().to_string();
        let id = visitor.take_id();
        visitor.stack.push(Frame {
            name: root.clone(),
            path: root,
            parent: String::new(),
            level: 0,
            id,
            children: String::new(),
        });
        Ok(visitor)
    }

    fn take_id(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }

    fn append_fragment(&mut self, fragment: String) {
        if let Some(frame) = self.stack.last_mut() {
            if !frame.children.is_empty() {
                frame.children.push_str(&self.separator);
                frame.children.push('\n');
            }
            frame.children.push_str(&fragment);
        }
    }

    fn render_directory(&self, frame: &Frame, subtree: &Outcome) -> String {
        fill(
            &self.template.directory,
            &[
                ("ID", &frame.id.to_string()),
                ("DIRNAME", &frame.name),
                ("PATH", &frame.path),
                ("PARENT", &frame.parent),
                ("LEVEL", &frame.level.to_string()),
                ("NDIRS", &subtree.local_dirs.to_string()),
                ("NFILES", &subtree.local_files.to_string()),
                ("TNDIRS", &subtree.total_dirs.to_string()),
                ("TNFILES", &subtree.total_files.to_string()),
                ("SUBDIRECTORY", &frame.children),
            ],
        )
    }

    /// Assemble the final document from the page template and the walk's
    /// outcome. Frames an abort left open are closed with zero counts.
    pub fn into_document(mut self, outcome: &Outcome) -> String {
        while self.stack.len() > 1 {
            if let Some(frame) = self.stack.pop() {
                let fragment = self.render_directory(&frame, &Outcome::default());
                self.append_fragment(fragment);
            }
        }
        let tree = self.stack.pop().map(|frame| frame.children).unwrap_or_default();

        let criteria_json =
            serde_json::to_string(self.criteria).unwrap_or_else(|_| "{}".to_string());
        let css_links = css_links(&self.criteria.css);
        let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        fill(
            &self.template.page,
            &[
                ("TREE", &tree),
                (
                    "TRAVERSALROOTDIR",
                    &self.criteria.directory.display().to_string(),
                ),
                ("LNDIRS", &outcome.local_dirs.to_string()),
                ("LNFILES", &outcome.local_files.to_string()),
                ("NDIRS", &outcome.total_dirs.to_string()),
                ("NFILES", &outcome.total_files.to_string()),
                ("TERMINATIONCODE", &outcome.status.code().to_string()),
                ("TITLE", &self.criteria.title),
                ("INTROTEXT", &self.criteria.introduction),
                ("CSS", &css_links),
                ("CRITERIA", &criteria_json),
                ("GENERATED", &generated),
            ],
        )
    }
}

impl Visitor for ExportVisitor<'_> {
    fn criteria(&self) -> &Criteria {
        self.criteria
    }

    fn visit_file(&mut self, entry: &Entry) -> Visit {
        let visit = self.filter.decide(entry, &self.tally);
        if visit.is_ignored() {
            self.tally.ignored += 1;
            return visit;
        }
        self.tally.files += 1;
        let id = self.take_id();
        let fragment = fill(
            &self.template.file,
            &[
                ("ID", &id.to_string()),
                ("FILENAME", &entry.name),
                ("PATH", &entry.path.display().to_string()),
                ("PARENT", &entry.parent.display().to_string()),
                ("LEVEL", &entry.level.to_string()),
                ("SIZE", &entry.metadata.size.to_string()),
                ("SIZEH", &format_size(entry.metadata.size)),
                ("MODIFIED", &format_time(entry.metadata.modified)),
                ("CREATED", &format_time(entry.metadata.created)),
            ],
        );
        self.append_fragment(fragment);
        Visit::Keep
    }

    fn visit_directory(&mut self, entry: &Entry) -> Visit {
        let visit = self.filter.decide(entry, &self.tally);
        if visit.is_ignored() {
            self.tally.ignored += 1;
            return visit;
        }
        self.tally.directories += 1;
        let id = self.take_id();
        self.stack.push(Frame {
            name: entry.name.clone(),
            path: entry.path.display().to_string(),
            parent: entry.parent.display().to_string(),
            level: entry.level,
            id,
            children: String::new(),
        });
        Visit::Keep
    }

    fn directory_done(&mut self, _entry: &Entry, subtree: &Outcome) {
        if let Some(frame) = self.stack.pop() {
            let fragment = self.render_directory(&frame, subtree);
            self.append_fragment(fragment);
        }
    }

    fn tally(&self) -> Tally {
        self.tally
    }
}

fn css_links(css: &str) -> String {
    if css.is_empty() {
        return String::new();
    }
    css.split(',')
        .map(|entry| {
            format!(
                "<link rel=\"stylesheet\" type=\"text/css\" href=\"{}\">",
                entry.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1}G", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1}M", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1}K", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

fn format_time(timestamp: Option<SystemTime>) -> String {
    match timestamp {
        Some(t) => DateTime::<Local>::from(t)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "-".to_string(),
    }
}
