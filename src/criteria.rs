//! Criteria: the per-invocation configuration consumed by the engines
//!
//! A `Criteria` is built once from the command line (optionally overlaid on a
//! TOML configuration file), then read-only for the rest of the invocation.
//! Every field carries a default, so nothing faults when an option is absent.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CriteriaError {
    #[error("invalid regular expression '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid date '{0}': expected YYYY-MM-DD or 'YYYY-MM-DD HH:MM:SS'")]
    Date(String),

    #[error("invalid date operator '{0}': expected '==', 'before' or 'after'")]
    DateOp(String),

    #[error("invalid time budget '{0}': expected seconds or a duration like '500ms'")]
    TimeBudget(String),

    #[error("cannot read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Comparison operator for date criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateOp {
    /// `==`: the entry's timestamp equals the bound.
    #[default]
    On,
    Before,
    After,
}

impl FromStr for DateOp {
    type Err = CriteriaError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim() {
            "==" | "on" => Ok(DateOp::On),
            "before" | "<" => Ok(DateOp::Before),
            "after" | ">" => Ok(DateOp::After),
            other => Err(CriteriaError::DateOp(other.to_string())),
        }
    }
}

/// A date bound plus its comparison operator.
///
/// A date-only bound (`YYYY-MM-DD`) compares whole calendar days; a bound
/// with a time compares to the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRule {
    pub op: DateOp,
    pub date: NaiveDateTime,
    whole_day: bool,
}

impl DateRule {
    pub fn parse(op: DateOp, text: &str) -> Result<Self, CriteriaError> {
        let text = text.trim();
        if let Ok(date) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
            return Ok(Self {
                op,
                date,
                whole_day: false,
            });
        }
        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return Ok(Self {
                op,
                date: date.and_time(NaiveTime::MIN),
                whole_day: true,
            });
        }
        Err(CriteriaError::Date(text.to_string()))
    }

    /// Test a filesystem timestamp against this rule, in local time.
    pub fn matches(&self, timestamp: SystemTime) -> bool {
        let moment = DateTime::<Local>::from(timestamp).naive_local();
        if self.whole_day {
            let day = self.date.date();
            match self.op {
                DateOp::On => moment.date() == day,
                DateOp::Before => moment.date() < day,
                DateOp::After => moment.date() > day,
            }
        } else {
            let moment = moment.with_nanosecond(0).unwrap_or(moment);
            match self.op {
                DateOp::On => moment == self.date,
                DateOp::Before => moment < self.date,
                DateOp::After => moment > self.date,
            }
        }
    }
}

/// Everything one invocation needs to know, defaulted and read-only.
///
/// Pattern fields hold regular expression source text (empty = no filter);
/// they are compiled once by [`EntryFilter`](crate::filter::EntryFilter).
#[derive(Debug, Clone, Serialize)]
pub struct Criteria {
    pub directory: PathBuf,
    pub max_time: Option<Duration>,
    pub max_levels: Option<usize>,

    pub file_include: String,
    pub file_exclude: String,
    pub dir_include: String,
    pub dir_exclude: String,

    pub file_size: Option<u64>,
    pub min_file_size: Option<u64>,
    pub max_file_size: Option<u64>,
    pub max_dirs: Option<usize>,
    pub max_files: Option<usize>,
    pub creation_date: Option<DateRule>,
    pub modified_date: Option<DateRule>,

    pub non_recursive: bool,
    pub no_files: bool,
    pub no_dirs: bool,
    pub quit_on_walk_error: bool,

    // Export
    pub template: Option<PathBuf>,
    pub output_file: PathBuf,
    pub item_separator: String,
    pub title: String,
    pub introduction: String,
    pub css: String,

    // Compare / synchronize
    pub left_directory: Option<PathBuf>,
    pub right_directory: Option<PathBuf>,
}

impl Default for Criteria {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            max_time: None,
            max_levels: None,
            file_include: String::new(),
            file_exclude: String::new(),
            dir_include: String::new(),
            dir_exclude: String::new(),
            file_size: None,
            min_file_size: None,
            max_file_size: None,
            max_dirs: None,
            max_files: None,
            creation_date: None,
            modified_date: None,
            non_recursive: false,
            no_files: false,
            no_dirs: false,
            quit_on_walk_error: false,
            template: None,
            output_file: PathBuf::from("index.html"),
            item_separator: String::new(),
            title: String::new(),
            introduction: String::new(),
            css: String::new(),
            left_directory: None,
            right_directory: None,
        }
    }
}

/// Optional TOML configuration file merged beneath command-line options.
///
/// Keys mirror the command-line option names; unknown keys are rejected so
/// typos surface instead of silently doing nothing.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub directory: Option<PathBuf>,
    pub max_time: Option<f64>,
    pub max_levels: Option<i64>,
    pub file_include: Option<String>,
    pub file_exclude: Option<String>,
    pub dir_include: Option<String>,
    pub dir_exclude: Option<String>,
    pub file_size: Option<i64>,
    pub min_file_size: Option<i64>,
    pub max_file_size: Option<i64>,
    pub max_dirs: Option<i64>,
    pub max_files: Option<i64>,
    pub creation_date_op: Option<String>,
    pub creation_date: Option<String>,
    pub modified_date_op: Option<String>,
    pub modified_date: Option<String>,
    pub non_recursive: Option<bool>,
    pub no_files: Option<bool>,
    pub no_dirs: Option<bool>,
    pub quit_on_walk_error: Option<bool>,
    pub template: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub separator: Option<String>,
    pub title: Option<String>,
    pub introduction: Option<String>,
    pub css: Option<String>,
    pub left: Option<PathBuf>,
    pub right: Option<PathBuf>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, CriteriaError> {
        let text = fs::read_to_string(path).map_err(|source| CriteriaError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| CriteriaError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Parse a wall-clock budget: plain numbers are seconds (the original
/// tool's convention), anything else goes through humantime (`500ms`, `2m`).
/// Non-positive values disable the budget.
pub fn parse_time_budget(text: &str) -> Result<Option<Duration>, CriteriaError> {
    let text = text.trim();
    if let Ok(secs) = text.parse::<f64>() {
        if !(secs > 0.0) || !secs.is_finite() {
            return Ok(None);
        }
        return Ok(Some(Duration::from_secs_f64(secs)));
    }
    match humantime::parse_duration(text) {
        Ok(duration) if duration.is_zero() => Ok(None),
        Ok(duration) => Ok(Some(duration)),
        Err(_) => Err(CriteriaError::TimeBudget(text.to_string())),
    }
}

/// Config-file variant of [`parse_time_budget`]: seconds, non-positive disables.
pub fn time_budget_from_secs(secs: f64) -> Option<Duration> {
    (secs > 0.0 && secs.is_finite()).then(|| Duration::from_secs_f64(secs))
}

/// `<= 0` disables, per the original option convention.
pub fn positive_count(value: i64) -> Option<usize> {
    (value > 0).then_some(value as usize)
}

/// `<= 0` disables, per the original option convention.
pub fn positive_size(value: i64) -> Option<u64> {
    (value > 0).then_some(value as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestTree;

    #[test]
    fn time_budget_accepts_seconds_and_durations() {
        assert_eq!(
            parse_time_budget("1.5").unwrap(),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(
            parse_time_budget("500ms").unwrap(),
            Some(Duration::from_millis(500))
        );
        assert_eq!(parse_time_budget("-1").unwrap(), None);
        assert_eq!(parse_time_budget("0").unwrap(), None);
        assert!(parse_time_budget("soon").is_err());
    }

    #[test]
    fn date_op_parsing() {
        assert_eq!("==".parse::<DateOp>().unwrap(), DateOp::On);
        assert_eq!("before".parse::<DateOp>().unwrap(), DateOp::Before);
        assert_eq!("after".parse::<DateOp>().unwrap(), DateOp::After);
        assert!("around".parse::<DateOp>().is_err());
    }

    #[test]
    fn date_rule_before_and_after() {
        let now = SystemTime::now();
        let past = DateRule::parse(DateOp::After, "1999-01-01").unwrap();
        assert!(past.matches(now));
        let future = DateRule::parse(DateOp::Before, "2999-01-01").unwrap();
        assert!(future.matches(now));
        let never = DateRule::parse(DateOp::After, "2999-01-01").unwrap();
        assert!(!never.matches(now));
    }

    #[test]
    fn date_rule_rejects_garbage() {
        assert!(DateRule::parse(DateOp::On, "yesterday").is_err());
    }

    #[test]
    fn date_rule_with_time_component() {
        let rule = DateRule::parse(DateOp::Before, "2999-06-15 12:30:00").unwrap();
        assert!(!rule.whole_day);
        assert!(rule.matches(SystemTime::now()));
    }

    #[test]
    fn positive_helpers_treat_non_positive_as_disabled() {
        assert_eq!(positive_count(3), Some(3));
        assert_eq!(positive_count(0), None);
        assert_eq!(positive_count(-1), None);
        assert_eq!(positive_size(1024), Some(1024));
        assert_eq!(positive_size(-5), None);
    }

    #[test]
    fn config_file_round_trip() {
        let tree = TestTree::new();
        let path = tree.add_file(
            "dirwalk.toml",
            "max_levels = 3\nfile_exclude = \"\\\\.log$\"\nnon_recursive = true\n",
        );
        let config = ConfigFile::load(&path).unwrap();
        assert_eq!(config.max_levels, Some(3));
        assert_eq!(config.file_exclude.as_deref(), Some("\\.log$"));
        assert_eq!(config.non_recursive, Some(true));
        assert!(config.directory.is_none());
    }

    #[test]
    fn config_file_rejects_unknown_keys() {
        let tree = TestTree::new();
        let path = tree.add_file("bad.toml", "max_levles = 3\n");
        assert!(matches!(
            ConfigFile::load(&path),
            Err(CriteriaError::ConfigParse { .. })
        ));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(matches!(
            ConfigFile::load(Path::new("/nonexistent/dirwalk.toml")),
            Err(CriteriaError::ConfigRead { .. })
        ));
    }
}
