//! Edge case tests for dirwalk


use harness::{TestTree, run_dirwalk};
use std::fs;

// ============================================================================
// Empty and odd trees
// ============================================================================

#[test]
fn test_export_of_empty_directory() {
    let tree = TestTree::new();
    tree.add_dir("empty");

    let (stdout, _stderr, success) = run_dirwalk(tree.path(), &["-d", "empty", "-o", "out.html"]);
    assert!(success);
    let document = fs::read_to_string(tree.path().join("out.html")).unwrap();
    assert!(document.contains("status 0"));
    assert!(stdout.contains("0 directories, 0 files"), "stdout: {stdout}");
}

#[test]
fn test_dotfiles_are_walked() {
    let tree = TestTree::new();
    tree.add_file(".hidden", "h");
    tree.add_file("visible.txt", "v");

    let (_stdout, _stderr, success) = run_dirwalk(tree.path(), &["-o", "out.html"]);
    assert!(success);
    let document = fs::read_to_string(tree.path().join("out.html")).unwrap();
    assert!(document.contains(".hidden"));
    assert!(document.contains("visible.txt"));
}

#[test]
fn test_deeply_nested_tree() {
    let tree = TestTree::new();
    tree.add_file("a/b/c/d/e/f/g/leaf.txt", "deep");

    let (stdout, _stderr, success) = run_dirwalk(tree.path(), &["leaf|^[a-g]$"]);
    assert!(success);
    assert!(stdout.contains("leaf.txt"), "stdout: {stdout}");
    assert!(stdout.contains("Found 1 files and 7 directories"), "stdout: {stdout}");
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_skipped() {
    use std::os::unix::fs::symlink;

    let tree = TestTree::new();
    tree.add_file("real/file.txt", "f");
    symlink(tree.path().join("real"), tree.path().join("link"))
        .expect("Failed to create symlink");

    let (_stdout, _stderr, success) = run_dirwalk(tree.path(), &["-o", "out.html"]);
    assert!(success);
    let document = fs::read_to_string(tree.path().join("out.html")).unwrap();
    assert!(document.contains("real/"));
    assert!(!document.contains("link/"), "symlink not rendered");
}

// ============================================================================
// Budgets and policies
// ============================================================================

#[test]
fn test_zero_max_time_disables_the_budget() {
    let tree = TestTree::new();
    tree.add_file("a.txt", "a");

    let (_stdout, _stderr, success) = run_dirwalk(tree.path(), &["--max-time", "0", "-o", "o.html"]);
    assert!(success);
}

#[test]
fn test_time_budget_exit_is_clean_but_reported() {
    let tree = TestTree::new();
    for i in 0..20 {
        tree.add_file(&format!("d{i}/f.txt"), "f");
    }

    // A one-nanosecond budget trips on the first recursion.
    let (_stdout, stderr, success) =
        run_dirwalk(tree.path(), &["--max-time", "0.000000001", "-o", "o.html"]);
    assert!(success, "budget truncation is an expected condition");
    assert!(stderr.contains("time budget"), "stderr: {stderr}");
    let document = fs::read_to_string(tree.path().join("o.html")).unwrap();
    assert!(document.contains("status -10"), "document: {document}");
}

#[test]
fn test_quit_on_walk_error_with_missing_root() {
    let tree = TestTree::new();
    let (_stdout, _stderr, success) =
        run_dirwalk(tree.path(), &["-d", "gone", "--quit-on-walk-error"]);
    assert!(!success);
}

#[test]
fn test_max_files_caps_search_results() {
    let tree = TestTree::new();
    for i in 0..10 {
        tree.add_file(&format!("f{i}.txt"), "x");
    }

    let (stdout, _stderr, success) = run_dirwalk(tree.path(), &["--max-files", "3", "txt"]);
    assert!(success);
    assert!(stdout.contains("Found 3 files"), "stdout: {stdout}");
}

// ============================================================================
// Date criteria
// ============================================================================

#[test]
fn test_modified_date_filter() {
    let tree = TestTree::new();
    let old = tree.add_file("old.txt", "o");
    tree.add_file("new.txt", "n");
    // Push one file's mtime far into the past.
    filetime::set_file_mtime(&old, filetime::FileTime::from_unix_time(946_684_800, 0))
        .expect("Failed to set mtime"); // 2000-01-01

    let (stdout, _stderr, success) = run_dirwalk(
        tree.path(),
        &["--modified-date-op", "before", "--modified-date", "2001-01-01", "txt"],
    );
    assert!(success);
    assert!(stdout.contains("old.txt"), "stdout: {stdout}");
    assert!(!stdout.contains("new.txt"), "stdout: {stdout}");

    let (stdout, _stderr, success) = run_dirwalk(
        tree.path(),
        &["--modified-date-op", "after", "--modified-date", "2001-01-01", "txt"],
    );
    assert!(success);
    assert!(stdout.contains("new.txt"), "stdout: {stdout}");
    assert!(!stdout.contains("old.txt"), "stdout: {stdout}");
}

#[test]
fn test_bad_date_fails_fast() {
    let tree = TestTree::new();
    tree.add_file("a.txt", "a");

    let (_stdout, stderr, success) = run_dirwalk(
        tree.path(),
        &["--modified-date-op", "before", "--modified-date", "someday", "txt"],
    );
    assert!(!success);
    assert!(stderr.contains("invalid date"), "stderr: {stderr}");
}

#[test]
fn test_bad_pattern_fails_fast() {
    let tree = TestTree::new();
    tree.add_file("a.txt", "a");

    let (_stdout, stderr, success) = run_dirwalk(tree.path(), &["--file-exclude", "(", "txt"]);
    assert!(!success);
    assert!(stderr.contains("invalid regular expression"), "stderr: {stderr}");
}

// ============================================================================
// Comparison corners
// ============================================================================

#[test]
fn test_compare_kind_conflicts_are_omitted() {
    let tree = TestTree::new();
    tree.add_file("L/thing", "a file");
    tree.add_dir("R/thing");

    let (stdout, _stderr, success) = run_dirwalk(tree.path(), &["-L", "L", "-R", "R"]);
    assert!(success);
    assert!(stdout.contains("0 objects classified"), "stdout: {stdout}");
}

#[test]
fn test_compare_dirs_only() {
    let tree = TestTree::new();
    tree.add_file("L/solo/keep.txt", "k");
    tree.add_file("L/stray.txt", "s");
    tree.add_dir("R");

    let (stdout, _stderr, success) =
        run_dirwalk(tree.path(), &["-L", "L", "-R", "R", "--no-files"]);
    assert!(success);
    assert!(stdout.contains("solo"), "stdout: {stdout}");
    assert!(!stdout.contains("stray.txt"), "files suppressed: {stdout}");
}

#[test]
fn test_sync_merges_into_partially_existing_destination() {
    let tree = TestTree::new();
    tree.add_file("L/pack/new.txt", "n");
    tree.add_file("L/pack/sub/deep.txt", "d");
    tree.add_dir("R");

    let (stdout, _stderr, success) =
        run_dirwalk(tree.path(), &["-L", "L", "-R", "R", "--from-left-only"]);
    assert!(success, "stdout: {stdout}");
    assert!(tree.path().join("R/pack/new.txt").is_file());
    assert!(tree.path().join("R/pack/sub/deep.txt").is_file());
    assert!(stdout.contains("0 failures"), "stdout: {stdout}");
}
