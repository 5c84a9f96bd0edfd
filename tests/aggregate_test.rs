use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use pfind::{
    count_by_parent, parse_timeout, prune_descendants, write_results, CountEntry, Dedup, FindError,
    MatchResult, OutputMode,
};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn files(paths: &[&str]) -> Vec<MatchResult> {
    paths.iter().map(|p| MatchResult::file(*p)).collect()
}

fn paths(matches: &[MatchResult]) -> Vec<String> {
    matches.iter().map(|m| m.path.display().to_string()).collect()
}

fn sorted(mut matches: Vec<MatchResult>) -> Vec<MatchResult> {
    matches.sort_by(|a, b| a.path.cmp(&b.path));
    matches
}

fn render(mode: OutputMode, matches: Vec<MatchResult>) -> String {
    let mut out = Vec::new();
    write_results(mode, matches.into_iter().map(Ok::<_, FindError>), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

// ---------------------------------------------------------------------------
// Pruning
// ---------------------------------------------------------------------------

#[test]
fn prune_keeps_only_topmost_matches() {
    let pruned = prune_descendants(files(&["/a", "/a/b", "/a/c", "/b"]));
    assert_eq!(paths(&pruned), vec!["/a", "/b"]);
}

#[test]
fn prune_removes_whole_subtree() {
    let pruned = prune_descendants(files(&["/a", "/a/b", "/a/b/c", "/a/b/c/d", "/a/e"]));
    assert_eq!(paths(&pruned), vec!["/a"]);
}

#[test]
fn prune_requires_separator_not_text_prefix() {
    let pruned = prune_descendants(files(&["/a", "/ab", "/ab/c"]));
    assert_eq!(paths(&pruned), vec!["/a", "/ab"]);
}

#[test]
fn prune_handles_names_sorting_before_separator() {
    // Byte order would put "/a-b" and "/a.txt" between "/a" and "/a/b".
    let input = sorted(files(&["/a/b", "/a-b", "/a.txt", "/a", "/a/b/c"]));
    assert_eq!(paths(&input), vec!["/a", "/a/b", "/a/b/c", "/a-b", "/a.txt"]);

    let pruned = prune_descendants(input);
    assert_eq!(paths(&pruned), vec!["/a", "/a-b", "/a.txt"]);
}

#[test]
fn prune_of_empty_is_empty() {
    assert!(prune_descendants(Vec::new()).is_empty());
}

// ---------------------------------------------------------------------------
// Dedup
// ---------------------------------------------------------------------------

#[test]
fn dedup_keeps_first_occurrence_order() {
    let merged = files(&["/x/y", "/z", "/x/y", "/w", "/z"]);
    let deduped: Vec<MatchResult> = Dedup::new(merged.into_iter()).collect();
    assert_eq!(paths(&deduped), vec!["/x/y", "/z", "/w"]);
}

// ---------------------------------------------------------------------------
// Counts
// ---------------------------------------------------------------------------

#[test]
fn counts_group_by_parent_descending() {
    let counts = count_by_parent(files(&["/a/f1", "/a/f2", "/b/f3"]));
    assert_eq!(
        counts,
        vec![
            CountEntry { parent: PathBuf::from("/a"), count: 2 },
            CountEntry { parent: PathBuf::from("/b"), count: 1 },
        ]
    );
}

#[test]
fn counts_break_ties_by_parent_path() {
    let counts = count_by_parent(files(&["/c/1", "/b/1", "/a/1", "/b/2"]));
    let order: Vec<_> = counts.iter().map(|c| c.parent.display().to_string()).collect();
    assert_eq!(order, vec!["/b", "/a", "/c"]);
}

#[test]
fn counts_strip_trailing_slash_and_use_root_for_top_level() {
    let matches = vec![
        MatchResult::dir("/a/sub/"),
        MatchResult::file("/a/file"),
        MatchResult::file("/top"),
    ];
    let counts = count_by_parent(matches);
    assert_eq!(
        counts,
        vec![
            CountEntry { parent: PathBuf::from("/a"), count: 2 },
            CountEntry { parent: PathBuf::from("/"), count: 1 },
        ]
    );
}

#[test]
fn counts_mode_output_format() {
    let text = render(OutputMode::Counts, files(&["/a/f1", "/a/f2", "/b/f3"]));
    assert_eq!(text, "2 /a\n1 /b\n");
}

// ---------------------------------------------------------------------------
// Plain and info output
// ---------------------------------------------------------------------------

#[test]
fn plain_output_marks_directories() {
    let text = render(
        OutputMode::Plain,
        vec![MatchResult::dir("/a/dir"), MatchResult::file("/a/file")],
    );
    assert_eq!(text, "/a/dir/\n/a/file\n");
}

#[test]
fn info_output_has_date_and_size() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("sized.txt");
    fs::write(&file, "12345").unwrap();

    let text = render(OutputMode::Info, vec![MatchResult::file(&file)]);
    let line = text.lines().next().unwrap();
    let fields: Vec<&str> = line.splitn(4, ' ').collect();

    assert_eq!(fields.len(), 4, "date time size path: {line}");
    assert_eq!(fields[0].len(), "2024-01-31".len());
    assert_eq!(fields[1].len(), "12:00:00".len());
    assert_eq!(fields[2], "5");
    assert_eq!(fields[3], file.display().to_string());
}

#[test]
fn info_output_drops_vanished_entries() {
    let dir = tempfile::tempdir().unwrap();
    let kept = dir.path().join("kept");
    let gone = dir.path().join("gone");
    fs::write(&kept, "x").unwrap();

    let text = render(
        OutputMode::Info,
        vec![MatchResult::file(&gone), MatchResult::file(&kept)],
    );
    assert_eq!(text.lines().count(), 1);
    assert!(text.trim_end().ends_with(&kept.display().to_string()));
}

#[test]
fn write_stops_at_fatal_error_after_flushing() {
    let stream = vec![
        Ok(MatchResult::file("/a")),
        Err(FindError::NotFound(PathBuf::from("/gone"))),
        Ok(MatchResult::file("/b")),
    ];
    let mut out = Vec::new();
    let err = write_results(OutputMode::Plain, stream, &mut out).unwrap_err();

    assert!(matches!(err, FindError::NotFound(_)));
    assert_eq!(String::from_utf8(out).unwrap(), "/a\n");
}

// ---------------------------------------------------------------------------
// Timeout parsing
// ---------------------------------------------------------------------------

#[test]
fn timeout_bare_integer_is_seconds() {
    assert_eq!(parse_timeout("5").unwrap(), Some(Duration::from_secs(5)));
}

#[test]
fn timeout_accepts_suffixes() {
    assert_eq!(parse_timeout("250ms").unwrap(), Some(Duration::from_millis(250)));
    assert_eq!(parse_timeout("10s").unwrap(), Some(Duration::from_secs(10)));
    assert_eq!(parse_timeout("2m").unwrap(), Some(Duration::from_secs(120)));
    assert_eq!(parse_timeout("1h").unwrap(), Some(Duration::from_secs(3600)));
}

#[test]
fn timeout_zero_disables() {
    assert_eq!(parse_timeout("0").unwrap(), None);
    assert_eq!(parse_timeout("0s").unwrap(), None);
}

#[test]
fn timeout_rejects_garbage() {
    for raw in ["", "abc", "5x", "1.5s", "-3", "ms"] {
        let err = parse_timeout(raw).unwrap_err();
        assert_eq!(err.exit_code(), 2, "{raw:?} should be a usage error");
    }
}
