use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::entry::{EntryInfo, MatchResult};
use crate::error::FindError;

// ---------------------------------------------------------------------------
// Dedup
// ---------------------------------------------------------------------------

/// Suppresses repeated paths, keeping the first occurrence.
///
/// Owned by the single consumer of a merged stream, so the seen-set needs no
/// locking.
pub struct Dedup<I> {
    inner: I,
    seen:  HashSet<PathBuf>,
}

impl<I> Dedup<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            seen: HashSet::new(),
        }
    }
}

impl<I: Iterator<Item = MatchResult>> Iterator for Dedup<I> {
    type Item = MatchResult;

    fn next(&mut self) -> Option<MatchResult> {
        loop {
            let m = self.inner.next()?;
            if self.seen.insert(m.path.clone()) {
                return Some(m);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Output modes
// ---------------------------------------------------------------------------

/// How matches are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// One path per line.
    #[default]
    Plain,
    /// `modified size path` per line; entries that can't be stat'ed are dropped.
    Info,
    /// `count parent` per parent directory.
    Counts,
}

/// Matches under one parent directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountEntry {
    pub parent: PathBuf,
    pub count:  usize,
}

/// Group matches by immediate parent, most populated parent first, ties by
/// parent path.
pub fn count_by_parent<I>(matches: I) -> Vec<CountEntry>
where
    I: IntoIterator<Item = MatchResult>,
{
    let mut counts: HashMap<PathBuf, usize> = HashMap::new();
    for m in matches {
        *counts.entry(parent_of(&m.path)).or_default() += 1;
    }

    let mut entries: Vec<CountEntry> = counts
        .into_iter()
        .map(|(parent, count)| CountEntry { parent, count })
        .collect();
    entries.sort_by(|a, b| {
        Reverse(a.count)
            .cmp(&Reverse(b.count))
            .then_with(|| a.parent.cmp(&b.parent))
    });
    entries
}

fn parent_of(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    let trimmed = text.trim_end_matches('/');
    match Path::new(trimmed).parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("/"),
    }
}

/// The info-mode line for `m`, or `None` if it can no longer be stat'ed.
pub fn info_line(m: &MatchResult) -> Option<String> {
    let info = EntryInfo::lookup(&m.path)?;
    let modified: DateTime<Local> = info.modified.into();
    Some(format!("{} {} {m}", modified.format("%Y-%m-%d %H:%M:%S"), info.size))
}

/// Drain `stream` into `out` in the given mode and return the number of
/// matches consumed.
///
/// Each line goes out in one `writeln!` from this single consumer, so lines
/// are never interleaved. A fatal stream error stops the drain after what was
/// already written is flushed.
pub fn write_results<I, W>(mode: OutputMode, stream: I, out: &mut W) -> Result<usize, FindError>
where
    I: IntoIterator<Item = Result<MatchResult, FindError>>,
    W: Write,
{
    let mut consumed = 0;
    let mut pending: Option<FindError> = None;
    let mut collected = Vec::new();

    for item in stream {
        let m = match item {
            Ok(m) => m,
            Err(e) => {
                pending = Some(e);
                break;
            }
        };
        consumed += 1;

        match mode {
            OutputMode::Plain => writeln!(out, "{m}").map_err(output_error)?,
            OutputMode::Info => {
                if let Some(line) = info_line(&m) {
                    writeln!(out, "{line}").map_err(output_error)?;
                } else {
                    tracing::debug!(path = %m.path.display(), "dropped from info output");
                }
            }
            OutputMode::Counts => collected.push(m),
        }
    }

    if mode == OutputMode::Counts {
        for entry in count_by_parent(collected) {
            writeln!(out, "{} {}", entry.count, entry.parent.display()).map_err(output_error)?;
        }
    }

    out.flush().map_err(output_error)?;
    match pending {
        Some(e) => Err(e),
        None => Ok(consumed),
    }
}

fn output_error(source: std::io::Error) -> FindError {
    FindError::Io {
        path: PathBuf::from("<stdout>"),
        source,
    }
}
