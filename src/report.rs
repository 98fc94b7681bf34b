//! Console reporting for comparison results and walk summaries

use std::io::{self, Write};
use std::path::Path;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::diff::{DiffReport, SideSet};
use crate::walk::{Outcome, Tally};

fn stream(use_color: bool) -> StandardStream {
    let choice = if use_color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

fn bold() -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_bold(true);
    spec
}

/// Print the classified comparison of `left` and `right` as a sectioned table.
pub fn print_diff_report(
    left: &Path,
    right: &Path,
    report: &DiffReport,
    use_color: bool,
) -> io::Result<()> {
    let mut stdout = stream(use_color);

    stdout.set_color(&bold())?;
    writeln!(stdout, "Comparing {} <-> {}", left.display(), right.display())?;
    stdout.reset()?;

    print_side(&mut stdout, &format!("Only in {}", left.display()), &report.left_only)?;
    print_side(
        &mut stdout,
        &format!("Only in {}", right.display()),
        &report.right_only,
    )?;
    print_side(&mut stdout, "Common", &report.common)?;

    writeln!(stdout)?;
    writeln!(
        stdout,
        "{} objects classified, status {}",
        report.total,
        report.status.code()
    )?;
    Ok(())
}

fn print_side(stdout: &mut StandardStream, heading: &str, side: &SideSet) -> io::Result<()> {
    stdout.set_color(&bold())?;
    writeln!(stdout, "{heading}:")?;
    stdout.reset()?;

    if side.is_empty() {
        writeln!(stdout, "  (none)")?;
        return Ok(());
    }

    let mut dir_color = ColorSpec::new();
    dir_color.set_fg(Some(Color::Blue)).set_bold(true);

    for dir in &side.dirs {
        write!(stdout, "  [D] ")?;
        stdout.set_color(&dir_color)?;
        writeln!(stdout, "{}", dir.display())?;
        stdout.reset()?;
    }
    for file in &side.files {
        writeln!(stdout, "  [F] {}", file.display())?;
    }
    Ok(())
}

/// Closing line of a search run.
pub fn print_search_summary(tally: &Tally, use_color: bool) -> io::Result<()> {
    let mut stdout = stream(use_color);
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::Magenta));
    stdout.set_color(&spec)?;
    writeln!(
        stdout,
        "Found {} files and {} directories. Ignored: {}",
        tally.files, tally.directories, tally.ignored
    )?;
    stdout.reset()?;
    Ok(())
}

/// Closing line of an export run.
pub fn print_walk_summary(outcome: &Outcome, tally: &Tally, use_color: bool) -> io::Result<()> {
    let mut stdout = stream(use_color);
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::Yellow));
    stdout.set_color(&spec)?;
    writeln!(
        stdout,
        "{} directories, {} files (top level: {}/{}), ignored {}, status {}",
        outcome.total_dirs,
        outcome.total_files,
        outcome.local_dirs,
        outcome.local_files,
        tally.ignored,
        outcome.status.code()
    )?;
    stdout.reset()?;
    Ok(())
}
