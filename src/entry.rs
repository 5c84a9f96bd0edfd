use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A single path produced by a [`FileMatcher`](crate::traits::FileMatcher).
///
/// `path` never carries a trailing separator; directories get one only when
/// rendered through [`Display`](fmt::Display).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchResult {
    /// Absolute path of the match.
    pub path: PathBuf,

    /// What kind of entry matched.
    pub kind: EntryKind,
}

impl MatchResult {
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(path, EntryKind::File)
    }

    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self::new(path, EntryKind::Dir)
    }

    /// The path as matched by full-path patterns.
    pub fn path_text(&self) -> std::borrow::Cow<'_, str> {
        self.path.to_string_lossy()
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.path.to_string_lossy();
        if self.kind == EntryKind::Dir && !text.ends_with('/') {
            write!(f, "{text}/")
        } else {
            f.write_str(&text)
        }
    }
}

/// The kind of a matched entry.
///
/// Walkers map file types to these variants; `--file` selects `File` only and
/// `--dir` selects `Dir` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A directory.
    Dir,

    /// A symbolic link that is not followed.
    Symlink,

    /// Anything else (device files, pipes, sockets, etc.).
    Other,
}

/// Metadata shown in info mode.
#[derive(Debug, Clone)]
pub struct EntryInfo {
    pub modified: SystemTime,
    pub size: u64,
}

impl EntryInfo {
    /// Look up modification time and size for `path`.
    ///
    /// Returns `None` when the entry is gone or cannot be stat'ed; info mode
    /// drops such lines.
    pub fn lookup(path: &Path) -> Option<Self> {
        let meta = std::fs::symlink_metadata(path).ok()?;
        let modified = meta.modified().ok()?;
        Some(Self {
            modified,
            size: meta.len(),
        })
    }
}
