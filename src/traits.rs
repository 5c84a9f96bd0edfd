use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use regex::Regex;

use crate::entry::MatchResult;
use crate::error::FindError;
use crate::pattern::{PathScope, TypeConstraint};

/// Everything a [`FileMatcher`] needs for one invocation.
///
/// Matching is always case-insensitive (the regex is built that way) and
/// hidden entries are always included.
#[derive(Debug, Clone)]
pub struct MatchParams {
    /// Directory to search below. Never yielded itself.
    pub root: PathBuf,
    pub regex: Regex,
    pub type_constraint: TypeConstraint,
    pub path_scope: PathScope,
    /// Subtrees that are never entered.
    pub exclude_paths: Vec<PathBuf>,
    /// Honor `.gitignore`, `.ignore` and friends.
    pub honor_ignore_files: bool,
    /// Worker threads the matcher may use for its own traversal.
    pub threads: usize,
}

/// Cooperative cancellation shared between the engine and a running matcher.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The recursive file matcher capability.
///
/// Given a root and a compiled pattern, push every matching path into `sink`
/// as it is found. The engine owns time limits: it cancels `cancel` at the
/// soft deadline and drops the receiving end of `sink` at the hard deadline,
/// so implementations should check the token regularly and stop as soon as a
/// send fails.
///
/// Recoverable per-entry failures go into the sink as `Err` and the walk keeps
/// going. A returned `Err` means the root could not be searched at all.
///
/// # Thread Safety
///
/// `Send + Sync` are required: the engine runs one invocation per root on its
/// own thread, several at a time.
///
/// # Example
///
/// ```rust
/// use crossbeam_channel::Sender;
/// use pfind::{CancelToken, FileMatcher, FindError, MatchParams, MatchResult};
///
/// /// Pretends every root contains exactly one file called `hit`.
/// struct OneHit;
///
/// impl FileMatcher for OneHit {
///     fn search(
///         &self,
///         params: &MatchParams,
///         _cancel: &CancelToken,
///         sink: &Sender<Result<MatchResult, FindError>>,
///     ) -> Result<(), FindError> {
///         let _ = sink.send(Ok(MatchResult::file(params.root.join("hit"))));
///         Ok(())
///     }
/// }
/// ```
pub trait FileMatcher: Send + Sync {
    fn search(
        &self,
        params: &MatchParams,
        cancel: &CancelToken,
        sink: &Sender<Result<MatchResult, FindError>>,
    ) -> Result<(), FindError>;
}
