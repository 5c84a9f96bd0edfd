use std::path::PathBuf;

use crossbeam_channel::Sender;
use ignore::{DirEntry, WalkBuilder, WalkState};

use crate::entry::{EntryKind, MatchResult};
use crate::error::FindError;
use crate::pattern::PathScope;
use crate::traits::{CancelToken, FileMatcher, MatchParams};

// ---------------------------------------------------------------------------
// WalkMatcher
// ---------------------------------------------------------------------------

/// The in-process [`FileMatcher`]: a parallel recursive walk (via `ignore`)
/// with regex matching on each entry.
///
/// Hidden entries are always visited, symlinks are not followed, and the
/// `exclude_paths` subtrees are skipped without being read.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkMatcher;

impl FileMatcher for WalkMatcher {
    fn search(
        &self,
        params: &MatchParams,
        cancel: &CancelToken,
        sink: &Sender<Result<MatchResult, FindError>>,
    ) -> Result<(), FindError> {
        let root = &params.root;
        if !root.exists() {
            return Err(FindError::NotFound(root.clone()));
        }
        if !root.is_dir() {
            return Err(FindError::NotADirectory(root.clone()));
        }

        let honor = params.honor_ignore_files;
        let mut builder = WalkBuilder::new(root);
        builder
            .standard_filters(false)
            .hidden(false)
            .ignore(honor)
            .git_ignore(honor)
            .git_global(honor)
            .git_exclude(honor)
            .parents(honor)
            .require_git(false)
            .follow_links(false)
            .same_file_system(false)
            .threads(params.threads.max(1));

        let excluded = params.exclude_paths.clone();
        builder.filter_entry(move |entry| {
            !(entry.depth() > 0 && excluded.iter().any(|p| entry.path() == p.as_path()))
        });

        let walker = builder.build_parallel();

        walker.run(|| {
            let params = params.clone();
            let cancel = cancel.clone();
            let sink = sink.clone();

            Box::new(move |res: Result<DirEntry, ignore::Error>| -> WalkState {
                if cancel.is_cancelled() {
                    return WalkState::Quit;
                }

                let entry = match res {
                    Ok(e) => e,
                    Err(e) => {
                        return if sink.send(Err(map_ignore_error(e))).is_ok() {
                            WalkState::Continue
                        } else {
                            WalkState::Quit
                        };
                    }
                };

                // Skip the root itself
                if entry.depth() == 0 {
                    return WalkState::Continue;
                }

                let kind = match entry.file_type() {
                    Some(ft) if ft.is_dir() => EntryKind::Dir,
                    Some(ft) if ft.is_file() => EntryKind::File,
                    Some(ft) if ft.is_symlink() => EntryKind::Symlink,
                    _ => EntryKind::Other,
                };

                if !params.type_constraint.admits(kind) {
                    return WalkState::Continue;
                }

                let hit = match params.path_scope {
                    PathScope::Basename => params
                        .regex
                        .is_match(&entry.file_name().to_string_lossy()),
                    PathScope::FullPath => params
                        .regex
                        .is_match(&entry.path().to_string_lossy()),
                };
                if !hit {
                    return WalkState::Continue;
                }

                let result = MatchResult::new(entry.into_path(), kind);
                if sink.send(Ok(result)).is_ok() {
                    WalkState::Continue
                } else {
                    // Receiver gone: the engine hit its hard deadline.
                    WalkState::Quit
                }
            })
        });

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Map ignore::Error to FindError
// ---------------------------------------------------------------------------

fn map_ignore_error(e: ignore::Error) -> FindError {
    match e {
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(io_err) => {
                if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                    FindError::PermissionDenied(path)
                } else {
                    FindError::Io { path, source: io_err }
                }
            }
            other => FindError::Walk(format!("{}: {other}", path.display())),
        },
        ignore::Error::WithDepth { err, .. } => map_ignore_error(*err),
        ignore::Error::Loop { child, .. } => FindError::SymlinkLoop(child),
        ignore::Error::Io(io_err) => FindError::Io {
            path: PathBuf::new(),
            source: io_err,
        },
        other => FindError::Walk(other.to_string()),
    }
}
