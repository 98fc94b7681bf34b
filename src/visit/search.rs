//! Search visitor: prints entries whose names match the criteria

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::criteria::{Criteria, CriteriaError};
use crate::entry::Entry;
use crate::filter::EntryFilter;
use crate::walk::{Tally, Visit, Visitor};

/// Matching visitor for search mode.
///
/// Prints each kept entry to stdout as it is encountered and keeps the
/// running match tally. `no_files` removes files from the results entirely;
/// `no_dirs` keeps directories walkable but silent.
pub struct SearchVisitor<'a> {
    criteria: &'a Criteria,
    filter: EntryFilter,
    tally: Tally,
    stdout: StandardStream,
}

impl<'a> SearchVisitor<'a> {
    pub fn new(criteria: &'a Criteria, use_color: bool) -> Result<Self, CriteriaError> {
        let choice = if use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Ok(Self {
            criteria,
            filter: EntryFilter::from_criteria(criteria)?,
            tally: Tally::default(),
            stdout: StandardStream::stdout(choice),
        })
    }

    fn print_match(&mut self, entry: &Entry) {
        // A write failure must not abort the walk.
        let _ = self.write_match(entry);
    }

    fn write_match(&mut self, entry: &Entry) -> io::Result<()> {
        if entry.is_dir() {
            self.stdout
                .set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_bold(true))?;
            writeln!(self.stdout, "{}", entry.path.display())?;
            self.stdout.reset()?;
        } else {
            writeln!(self.stdout, "{}", entry.path.display())?;
        }
        Ok(())
    }
}

impl Visitor for SearchVisitor<'_> {
    fn criteria(&self) -> &Criteria {
        self.criteria
    }

    fn visit_file(&mut self, entry: &Entry) -> Visit {
        if self.criteria.no_files {
            self.tally.ignored += 1;
            return Visit::Ignore;
        }
        let visit = self.filter.decide(entry, &self.tally);
        if visit.is_ignored() {
            self.tally.ignored += 1;
        } else {
            self.tally.files += 1;
            self.print_match(entry);
        }
        visit
    }

    fn visit_directory(&mut self, entry: &Entry) -> Visit {
        let visit = self.filter.decide(entry, &self.tally);
        if visit.is_ignored() {
            self.tally.ignored += 1;
            return visit;
        }
        // no_dirs suppresses reporting, not descent.
        if !self.criteria.no_dirs {
            self.tally.directories += 1;
            self.print_match(entry);
        }
        Visit::Keep
    }

    fn tally(&self) -> Tally {
        self.tally
    }
}
