//! CLI entry point for dirwalk

use std::fs;
use std::io::{BufRead, IsTerminal};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use regex::Regex;

use dirwalk::{
    CancelToken, ConfigFile, ConsoleProgress, Criteria, CriteriaError, DateOp, DateRule,
    DiffEngine, ExportVisitor, Progress, SearchVisitor, Status, SyncEngine, SyncMode, Template,
    Visitor, Walker,
    criteria::{parse_time_budget, positive_count, positive_size, time_budget_from_secs},
    report,
};

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            std::io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "dirwalk")]
#[command(about = "Walk a directory tree to export, search, or compare/synchronize it")]
#[command(version)]
struct Args {
    /// Directory to walk (export and search modes)
    #[arg(short = 'd', long)]
    directory: Option<PathBuf>,

    /// TOML configuration file supplying defaults for any option
    /// (dirwalk.toml is picked up automatically when present)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Wall-clock budget for the walk: seconds or a duration like "500ms"; <= 0 disables
    #[arg(long = "max-time", value_name = "TIME")]
    max_time: Option<String>,

    /// Deepest level to descend into; <= 0 disables
    #[arg(long = "max-levels", value_name = "N")]
    max_levels: Option<i64>,

    /// Regular expression file names must match
    #[arg(long = "file-include", value_name = "REGEX")]
    file_include: Option<String>,

    /// Regular expression that excludes matching file names
    #[arg(long = "file-exclude", value_name = "REGEX")]
    file_exclude: Option<String>,

    /// Regular expression directory names must match
    #[arg(long = "dir-include", value_name = "REGEX")]
    dir_include: Option<String>,

    /// Regular expression that excludes matching directory names
    #[arg(long = "dir-exclude", value_name = "REGEX")]
    dir_exclude: Option<String>,

    /// Exact file size in bytes; <= 0 disables
    #[arg(long = "file-size", value_name = "BYTES")]
    file_size: Option<i64>,

    /// Smallest file size in bytes; <= 0 disables
    #[arg(long = "min-file-size", value_name = "BYTES")]
    min_file_size: Option<i64>,

    /// Largest file size in bytes; <= 0 disables
    #[arg(long = "max-file-size", value_name = "BYTES")]
    max_file_size: Option<i64>,

    /// Stop matching directories after this many; <= 0 disables
    #[arg(long = "max-dirs", value_name = "N")]
    max_dirs: Option<i64>,

    /// Stop matching files after this many; <= 0 disables
    #[arg(long = "max-files", value_name = "N")]
    max_files: Option<i64>,

    /// Creation date comparison operator: ==, before, after
    #[arg(long = "creation-date-op", value_name = "OP")]
    creation_date_op: Option<String>,

    /// Creation date bound: YYYY-MM-DD or "YYYY-MM-DD HH:MM:SS"
    #[arg(long = "creation-date", value_name = "DATE")]
    creation_date: Option<String>,

    /// Modification date comparison operator: ==, before, after
    #[arg(long = "modified-date-op", value_name = "OP")]
    modified_date_op: Option<String>,

    /// Modification date bound: YYYY-MM-DD or "YYYY-MM-DD HH:MM:SS"
    #[arg(long = "modified-date", value_name = "DATE")]
    modified_date: Option<String>,

    /// Do not descend into subdirectories
    #[arg(short = 'N', long = "non-recursive")]
    non_recursive: bool,

    /// Exclude files from search results
    #[arg(long = "no-files")]
    no_files: bool,

    /// Walk directories but leave them out of search results
    #[arg(long = "no-dirs")]
    no_dirs: bool,

    /// Read search queries from stdin until "eof"
    #[arg(short = 'I', long)]
    interactive: bool,

    /// Print a live progress line to stderr while walking
    #[arg(short = 'P', long)]
    progress: bool,

    /// Abort the walk when a directory level cannot be read
    #[arg(long = "quit-on-walk-error")]
    quit_on_walk_error: bool,

    /// Template file with page/directory/file sections (built-in HTML when omitted)
    #[arg(short = 't', long, value_name = "FILE")]
    template: Option<PathBuf>,

    /// Separator inserted between rendered sibling items
    #[arg(long, value_name = "TEXT")]
    separator: Option<String>,

    /// Output file for the exported document
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Comma-separated stylesheet paths linked from the exported page
    #[arg(long, value_name = "LIST")]
    css: Option<String>,

    /// Introduction paragraph for the exported page
    #[arg(short = 'i', long, value_name = "TEXT")]
    introduction: Option<String>,

    /// Title of the exported page
    #[arg(long, value_name = "TEXT")]
    title: Option<String>,

    /// Left directory for comparison; presence selects compare mode
    #[arg(short = 'L', long, value_name = "DIR")]
    left: Option<PathBuf>,

    /// Right directory for comparison; presence selects compare mode
    #[arg(short = 'R', long, value_name = "DIR")]
    right: Option<PathBuf>,

    /// Synchronize both sides after comparing
    #[arg(long, conflicts_with_all = ["from_left_only", "from_right_only"])]
    sync: bool,

    /// Copy differences from the left side only
    #[arg(long = "from-left-only", conflicts_with = "from_right_only")]
    from_left_only: bool,

    /// Copy differences from the right side only
    #[arg(long = "from-right-only")]
    from_right_only: bool,

    /// Control color output: auto, always, never
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Search query (regular expression); presence selects search mode
    #[arg(value_name = "QUERY")]
    query: Vec<String>,
}

enum Mode {
    Export,
    Search,
    Compare,
}

fn main() {
    let args = Args::parse();
    let use_color = should_use_color(args.color);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("dirwalk: {err}");
            process::exit(1);
        }
    };

    let criteria = match build_criteria(&args, &config) {
        Ok(criteria) => criteria,
        Err(err) => {
            eprintln!("dirwalk: {err}");
            process::exit(1);
        }
    };

    let cancel = CancelToken::new();
    install_interrupt_handler(&cancel);

    // Mode inference mirrors the original tool: a trailing query means
    // search, comparison options mean compare, everything else exports.
    let mode = if !args.query.is_empty() || args.interactive {
        Mode::Search
    } else if criteria.left_directory.is_some()
        || criteria.right_directory.is_some()
        || args.sync
        || args.from_left_only
        || args.from_right_only
    {
        Mode::Compare
    } else {
        Mode::Export
    };

    let status = match mode {
        Mode::Export => run_export(&criteria, &cancel, args.progress, use_color),
        Mode::Search => run_search(&args, &criteria, &cancel, use_color),
        Mode::Compare => run_compare(&args, &criteria, &cancel, use_color),
    };

    process::exit(exit_code(status));
}

/// Expected truncation exits cleanly; user errors exit 1; interrupts follow
/// the 128 + SIGINT convention.
fn exit_code(status: Status) -> i32 {
    match status {
        Status::Ok | Status::TimeBudget => 0,
        Status::Interrupted => 130,
        _ => 1,
    }
}

fn load_config(args: &Args) -> Result<ConfigFile, CriteriaError> {
    match &args.config {
        Some(path) => ConfigFile::load(path),
        None => {
            let fallback = Path::new("dirwalk.toml");
            if fallback.is_file() {
                ConfigFile::load(fallback)
            } else {
                Ok(ConfigFile::default())
            }
        }
    }
}

/// Merge command line over config file over defaults into one `Criteria`.
fn build_criteria(args: &Args, config: &ConfigFile) -> Result<Criteria, CriteriaError> {
    let defaults = Criteria::default();

    let max_time = match args.max_time.as_deref() {
        Some(text) => parse_time_budget(text)?,
        None => config.max_time.and_then(time_budget_from_secs),
    };

    let creation_date = date_rule(
        args.creation_date_op
            .as_deref()
            .or(config.creation_date_op.as_deref()),
        args.creation_date
            .as_deref()
            .or(config.creation_date.as_deref()),
    )?;
    let modified_date = date_rule(
        args.modified_date_op
            .as_deref()
            .or(config.modified_date_op.as_deref()),
        args.modified_date
            .as_deref()
            .or(config.modified_date.as_deref()),
    )?;

    Ok(Criteria {
        directory: args
            .directory
            .clone()
            .or_else(|| config.directory.clone())
            .unwrap_or(defaults.directory),
        max_time,
        max_levels: args.max_levels.or(config.max_levels).and_then(positive_count),
        file_include: pick_string(&args.file_include, &config.file_include),
        file_exclude: pick_string(&args.file_exclude, &config.file_exclude),
        dir_include: pick_string(&args.dir_include, &config.dir_include),
        dir_exclude: pick_string(&args.dir_exclude, &config.dir_exclude),
        file_size: args.file_size.or(config.file_size).and_then(positive_size),
        min_file_size: args
            .min_file_size
            .or(config.min_file_size)
            .and_then(positive_size),
        max_file_size: args
            .max_file_size
            .or(config.max_file_size)
            .and_then(positive_size),
        max_dirs: args.max_dirs.or(config.max_dirs).and_then(positive_count),
        max_files: args.max_files.or(config.max_files).and_then(positive_count),
        creation_date,
        modified_date,
        non_recursive: args.non_recursive || config.non_recursive.unwrap_or(false),
        no_files: args.no_files || config.no_files.unwrap_or(false),
        no_dirs: args.no_dirs || config.no_dirs.unwrap_or(false),
        quit_on_walk_error: args.quit_on_walk_error || config.quit_on_walk_error.unwrap_or(false),
        template: args.template.clone().or_else(|| config.template.clone()),
        output_file: args
            .output
            .clone()
            .or_else(|| config.output.clone())
            .unwrap_or(defaults.output_file),
        item_separator: pick_string(&args.separator, &config.separator),
        title: pick_string(&args.title, &config.title),
        introduction: pick_string(&args.introduction, &config.introduction),
        css: pick_string(&args.css, &config.css),
        left_directory: args.left.clone().or_else(|| config.left.clone()),
        right_directory: args.right.clone().or_else(|| config.right.clone()),
    })
}

fn pick_string(cli: &Option<String>, config: &Option<String>) -> String {
    cli.clone().or_else(|| config.clone()).unwrap_or_default()
}

fn date_rule(op: Option<&str>, date: Option<&str>) -> Result<Option<DateRule>, CriteriaError> {
    let Some(date) = date else {
        return Ok(None);
    };
    let op = match op {
        Some(text) => text.parse()?,
        None => DateOp::On,
    };
    DateRule::parse(op, date).map(Some)
}

fn run_export(criteria: &Criteria, cancel: &CancelToken, progress: bool, use_color: bool) -> Status {
    if !criteria.directory.is_dir() {
        eprintln!(
            "dirwalk: no such directory: {}",
            criteria.directory.display()
        );
        return Status::WalkError;
    }

    let template = match &criteria.template {
        Some(path) => match Template::load(path) {
            Ok(template) => template,
            Err(err) => {
                eprintln!("dirwalk: {err}");
                return Status::WalkError;
            }
        },
        None => Template::builtin(),
    };

    let mut visitor = match ExportVisitor::new(criteria, &template) {
        Ok(visitor) => visitor,
        Err(err) => {
            eprintln!("dirwalk: {err}");
            return Status::WalkError;
        }
    };

    let mut console = progress.then(ConsoleProgress::new);
    let mut walker = Walker::new().with_cancel(cancel.clone());
    if let Some(observer) = console.as_mut() {
        walker = walker.with_progress(observer);
    }
    let outcome = walker.run(&criteria.directory, &mut visitor);
    if let Some(observer) = console.as_mut() {
        observer.finish();
    }

    if outcome.status == Status::TimeBudget {
        eprintln!("dirwalk: time budget exhausted, export truncated");
    }

    let tally = visitor.tally();
    let document = visitor.into_document(&outcome);
    if let Err(err) = fs::write(&criteria.output_file, document) {
        eprintln!(
            "dirwalk: cannot write {}: {err}",
            criteria.output_file.display()
        );
        return Status::WalkError;
    }

    let _ = report::print_walk_summary(&outcome, &tally, use_color);
    outcome.status
}

fn run_search(args: &Args, criteria: &Criteria, cancel: &CancelToken, use_color: bool) -> Status {
    if !criteria.directory.is_dir() {
        eprintln!(
            "dirwalk: no such directory: {}",
            criteria.directory.display()
        );
        return Status::WalkError;
    }

    if args.interactive {
        return interactive_search(args, criteria, cancel, use_color);
    }

    let query = args.query.join(" ");
    search_once(criteria, &query, cancel, args.progress, use_color)
}

fn search_once(
    criteria: &Criteria,
    query: &str,
    cancel: &CancelToken,
    progress: bool,
    use_color: bool,
) -> Status {
    let criteria = seeded_with_query(criteria.clone(), query);

    let mut visitor = match SearchVisitor::new(&criteria, use_color) {
        Ok(visitor) => visitor,
        Err(err) => {
            eprintln!("dirwalk: {err}");
            return Status::WalkError;
        }
    };

    let mut console = progress.then(ConsoleProgress::new);
    let mut walker = Walker::new().with_cancel(cancel.clone());
    if let Some(observer) = console.as_mut() {
        walker = walker.with_progress(observer);
    }
    let outcome = walker.run(&criteria.directory, &mut visitor);
    if let Some(observer) = console.as_mut() {
        observer.finish();
    }

    if outcome.status == Status::TimeBudget {
        eprintln!("dirwalk: time budget exhausted, search truncated");
    }

    let _ = report::print_search_summary(&visitor.tally(), use_color);
    outcome.status
}

/// A non-empty query overrides both inclusion patterns, as the original
/// tool did. Case-insensitive queries spell it inline: `(?i)name`.
fn seeded_with_query(mut criteria: Criteria, query: &str) -> Criteria {
    if !query.is_empty() {
        let pattern = format!("({query})");
        criteria.file_include = pattern.clone();
        criteria.dir_include = pattern;
    }
    criteria
}

fn interactive_search(
    args: &Args,
    criteria: &Criteria,
    cancel: &CancelToken,
    use_color: bool,
) -> Status {
    let stdin = std::io::stdin();
    let mut last = Status::Ok;
    println!("Give a query per line (regular expression); 'eof' terminates.");
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("eof") {
            break;
        }
        last = search_once(criteria, query, cancel, args.progress, use_color);
        if last == Status::Interrupted {
            break;
        }
    }
    last
}

fn run_compare(args: &Args, criteria: &Criteria, cancel: &CancelToken, use_color: bool) -> Status {
    let (Some(left), Some(right)) = (
        criteria.left_directory.as_ref(),
        criteria.right_directory.as_ref(),
    ) else {
        eprintln!("dirwalk: compare mode needs both --left and --right");
        return Status::CompareError;
    };

    let name_filter = if criteria.file_include.is_empty() {
        None
    } else {
        match Regex::new(&criteria.file_include) {
            Ok(filter) => Some(filter),
            Err(err) => {
                eprintln!(
                    "dirwalk: invalid regular expression '{}': {err}",
                    criteria.file_include
                );
                return Status::CompareError;
            }
        }
    };

    let engine = DiffEngine::new()
        .max_levels(criteria.max_levels)
        .dirs_only(criteria.no_files)
        .name_filter(name_filter)
        .with_cancel(cancel.clone());
    let diff = engine.diff(left, right);

    let _ = report::print_diff_report(left, right, &diff, use_color);
    if diff.status.is_abort() {
        return diff.status;
    }

    let mode = if args.sync {
        Some(SyncMode::TwoWay)
    } else if args.from_left_only {
        Some(SyncMode::LeftToRight)
    } else if args.from_right_only {
        Some(SyncMode::RightToLeft)
    } else {
        None
    };

    if let Some(mode) = mode {
        println!("Synchronizing...");
        let stats = SyncEngine::new(left, right, mode).synchronize(&diff);
        println!(
            "Synchronized {} directories and {} files ({} failures)",
            stats.copied_dirs, stats.copied_files, stats.failures
        );
    }

    diff.status
}

#[cfg(unix)]
fn install_interrupt_handler(token: &CancelToken) {
    use std::sync::OnceLock;

    static TOKEN: OnceLock<CancelToken> = OnceLock::new();

    extern "C" fn on_sigint(_: libc::c_int) {
        if let Some(token) = TOKEN.get() {
            token.cancel();
        }
    }

    if TOKEN.set(token.clone()).is_ok() {
        let handler: extern "C" fn(libc::c_int) = on_sigint;
        unsafe {
            libc::signal(libc::SIGINT, handler as libc::sighandler_t);
        }
    }
}

#[cfg(not(unix))]
fn install_interrupt_handler(_token: &CancelToken) {}
