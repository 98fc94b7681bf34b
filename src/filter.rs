//! Entry matching shared by the export and search visitors

use regex::Regex;

use crate::criteria::{Criteria, CriteriaError, DateRule};
use crate::entry::{Entry, EntryKind};
use crate::walk::{Tally, Visit};

/// Compiled form of the matching criteria.
///
/// Built once per invocation from [`Criteria`]; the pattern fields are
/// compiled here so a bad expression fails up front instead of mid-walk.
pub struct EntryFilter {
    file_include: Option<Regex>,
    file_exclude: Option<Regex>,
    dir_include: Option<Regex>,
    dir_exclude: Option<Regex>,
    file_size: Option<u64>,
    min_file_size: Option<u64>,
    max_file_size: Option<u64>,
    creation_date: Option<DateRule>,
    modified_date: Option<DateRule>,
    max_dirs: Option<usize>,
    max_files: Option<usize>,
}

impl EntryFilter {
    pub fn from_criteria(criteria: &Criteria) -> Result<Self, CriteriaError> {
        Ok(Self {
            file_include: compile(&criteria.file_include)?,
            file_exclude: compile(&criteria.file_exclude)?,
            dir_include: compile(&criteria.dir_include)?,
            dir_exclude: compile(&criteria.dir_exclude)?,
            file_size: criteria.file_size,
            min_file_size: criteria.min_file_size,
            max_file_size: criteria.max_file_size,
            creation_date: criteria.creation_date,
            modified_date: criteria.modified_date,
            max_dirs: criteria.max_dirs,
            max_files: criteria.max_files,
        })
    }

    /// Keep-or-ignore decision for `entry`, given the matches counted so far.
    /// `tally` only feeds the max_dirs/max_files caps.
    pub fn decide(&self, entry: &Entry, tally: &Tally) -> Visit {
        let keep = match entry.kind {
            EntryKind::File => {
                !self.file_cap_reached(tally)
                    && name_matches(&entry.name, &self.file_include, &self.file_exclude)
                    && self.passes_size(entry)
                    && self.passes_dates(entry)
            }
            EntryKind::Directory => {
                !self.dir_cap_reached(tally)
                    && name_matches(&entry.name, &self.dir_include, &self.dir_exclude)
                    && self.passes_dates(entry)
            }
        };
        if keep { Visit::Keep } else { Visit::Ignore }
    }

    fn file_cap_reached(&self, tally: &Tally) -> bool {
        self.max_files.is_some_and(|max| tally.files >= max)
    }

    fn dir_cap_reached(&self, tally: &Tally) -> bool {
        self.max_dirs.is_some_and(|max| tally.directories >= max)
    }

    fn passes_size(&self, entry: &Entry) -> bool {
        let size = entry.metadata.size;
        if self.file_size.is_some_and(|exact| size != exact) {
            return false;
        }
        if self.min_file_size.is_some_and(|min| size < min) {
            return false;
        }
        if self.max_file_size.is_some_and(|max| size > max) {
            return false;
        }
        true
    }

    /// Entries whose timestamps the platform cannot supply pass date rules.
    fn passes_dates(&self, entry: &Entry) -> bool {
        if let (Some(rule), Some(created)) = (self.creation_date, entry.metadata.created) {
            if !rule.matches(created) {
                return false;
            }
        }
        if let (Some(rule), Some(modified)) = (self.modified_date, entry.metadata.modified) {
            if !rule.matches(modified) {
                return false;
            }
        }
        true
    }
}

/// Inclusion/exclusion test against a base name. An empty (absent) inclusion
/// pattern admits everything; exclusion always wins.
fn name_matches(name: &str, include: &Option<Regex>, exclude: &Option<Regex>) -> bool {
    if exclude.as_ref().is_some_and(|pattern| pattern.is_match(name)) {
        return false;
    }
    if let Some(pattern) = include {
        return pattern.is_match(name);
    }
    true
}

fn compile(pattern: &str) -> Result<Option<Regex>, CriteriaError> {
    if pattern.is_empty() {
        return Ok(None);
    }
    Regex::new(pattern)
        .map(Some)
        .map_err(|source| CriteriaError::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::DateOp;
    use crate::entry::EntryMetadata;
    use std::path::PathBuf;
    use std::time::SystemTime;

    fn file_entry(name: &str, size: u64) -> Entry {
        Entry {
            name: name.to_string(),
            path: PathBuf::from(name),
            parent: PathBuf::from("."),
            level: 1,
            kind: EntryKind::File,
            metadata: EntryMetadata {
                size,
                created: Some(SystemTime::now()),
                modified: Some(SystemTime::now()),
            },
        }
    }

    fn dir_entry(name: &str) -> Entry {
        Entry {
            name: name.to_string(),
            path: PathBuf::from(name),
            parent: PathBuf::from("."),
            level: 1,
            kind: EntryKind::Directory,
            metadata: EntryMetadata::default(),
        }
    }

    fn filter(criteria: &Criteria) -> EntryFilter {
        EntryFilter::from_criteria(criteria).unwrap()
    }

    #[test]
    fn empty_patterns_admit_everything() {
        let f = filter(&Criteria::default());
        assert_eq!(f.decide(&file_entry("a.txt", 1), &Tally::default()), Visit::Keep);
        assert_eq!(f.decide(&dir_entry("sub"), &Tally::default()), Visit::Keep);
    }

    #[test]
    fn inclusion_pattern_is_anchored_by_the_caller() {
        let criteria = Criteria {
            dir_include: "^a".to_string(),
            ..Criteria::default()
        };
        let f = filter(&criteria);
        assert_eq!(f.decide(&dir_entry("apple"), &Tally::default()), Visit::Keep);
        assert_eq!(f.decide(&dir_entry("banana"), &Tally::default()), Visit::Ignore);
    }

    #[test]
    fn exclusion_wins_over_inclusion() {
        let criteria = Criteria {
            file_include: "txt".to_string(),
            file_exclude: "^secret".to_string(),
            ..Criteria::default()
        };
        let f = filter(&criteria);
        assert_eq!(
            f.decide(&file_entry("notes.txt", 1), &Tally::default()),
            Visit::Keep
        );
        assert_eq!(
            f.decide(&file_entry("secret.txt", 1), &Tally::default()),
            Visit::Ignore
        );
    }

    #[test]
    fn size_bounds() {
        let criteria = Criteria {
            min_file_size: Some(10),
            max_file_size: Some(100),
            ..Criteria::default()
        };
        let f = filter(&criteria);
        assert_eq!(f.decide(&file_entry("a", 5), &Tally::default()), Visit::Ignore);
        assert_eq!(f.decide(&file_entry("b", 50), &Tally::default()), Visit::Keep);
        assert_eq!(f.decide(&file_entry("c", 500), &Tally::default()), Visit::Ignore);
    }

    #[test]
    fn exact_size() {
        let criteria = Criteria {
            file_size: Some(42),
            ..Criteria::default()
        };
        let f = filter(&criteria);
        assert_eq!(f.decide(&file_entry("a", 42), &Tally::default()), Visit::Keep);
        assert_eq!(f.decide(&file_entry("b", 41), &Tally::default()), Visit::Ignore);
    }

    #[test]
    fn match_caps_stop_further_matches() {
        let criteria = Criteria {
            max_files: Some(2),
            max_dirs: Some(1),
            ..Criteria::default()
        };
        let f = filter(&criteria);
        let below = Tally {
            files: 1,
            directories: 0,
            ignored: 0,
        };
        assert_eq!(f.decide(&file_entry("a", 1), &below), Visit::Keep);
        let at_cap = Tally {
            files: 2,
            directories: 1,
            ignored: 0,
        };
        assert_eq!(f.decide(&file_entry("a", 1), &at_cap), Visit::Ignore);
        assert_eq!(f.decide(&dir_entry("sub"), &at_cap), Visit::Ignore);
    }

    #[test]
    fn date_rule_filters_files() {
        let criteria = Criteria {
            modified_date: Some(DateRule::parse(DateOp::After, "2999-01-01").unwrap()),
            ..Criteria::default()
        };
        let f = filter(&criteria);
        assert_eq!(f.decide(&file_entry("a", 1), &Tally::default()), Visit::Ignore);
    }

    #[test]
    fn missing_timestamps_pass_date_rules() {
        let criteria = Criteria {
            modified_date: Some(DateRule::parse(DateOp::After, "2999-01-01").unwrap()),
            ..Criteria::default()
        };
        let f = filter(&criteria);
        // Directory metadata here has no timestamps at all.
        assert_eq!(f.decide(&dir_entry("sub"), &Tally::default()), Visit::Keep);
    }

    #[test]
    fn bad_pattern_is_a_construction_error() {
        let criteria = Criteria {
            file_include: "(".to_string(),
            ..Criteria::default()
        };
        assert!(matches!(
            EntryFilter::from_criteria(&criteria),
            Err(CriteriaError::Pattern { .. })
        ));
    }
}
