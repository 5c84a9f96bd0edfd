use std::path::{Path, PathBuf};

use crate::error::FindError;
use crate::pattern::{self, PatternSpec};

/// Where a search runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTarget {
    /// One existing directory, absolute and canonical.
    Root(PathBuf),

    /// Every directory below the traversal origin whose basename matches.
    /// Each one becomes a root of its own.
    DirectoryPattern(PatternSpec),
}

/// Decide how a search-dir argument is searched.
///
/// An existing directory always wins unless `bypass` is set or the argument is
/// a regex. A quoted argument gets its interior probed the same way. Anything
/// else is compiled as a directory-basename pattern.
///
/// An `r"…"` marker on `raw` implies `regex_mode`.
pub fn resolve(raw: &str, regex_mode: bool, bypass: bool) -> Result<SearchTarget, FindError> {
    let regex_mode = regex_mode || pattern::regex_marker(raw).is_some();

    if !bypass && !regex_mode {
        if let Some(root) = probe_dir(Path::new(raw))? {
            return Ok(SearchTarget::Root(root));
        }
        if let Some(root) = pattern::unquote(raw)
            .filter(|inner| !inner.is_empty())
            .map(|inner| probe_dir(Path::new(inner)))
            .transpose()?
            .flatten()
        {
            return Ok(SearchTarget::Root(root));
        }
    }

    let spec = pattern::compile_dir_pattern(raw, regex_mode)?;
    tracing::debug!(raw, regex = %spec.regex, "search dir resolved to directory pattern");
    Ok(SearchTarget::DirectoryPattern(spec))
}

/// The canonical form of `path` if it is an existing directory.
fn probe_dir(path: &Path) -> Result<Option<PathBuf>, FindError> {
    if path.as_os_str().is_empty() || !path.is_dir() {
        return Ok(None);
    }
    std::fs::canonicalize(path)
        .map(Some)
        .map_err(|source| FindError::Io {
            path: path.to_path_buf(),
            source,
        })
}
