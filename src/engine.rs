use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError};

use crate::entry::MatchResult;
use crate::error::FindError;
use crate::options::SearchOptions;
use crate::output::Dedup;
use crate::pattern::PatternSpec;
use crate::resolve::SearchTarget;
use crate::results::StatCounters;
use crate::traits::{CancelToken, FileMatcher, MatchParams};

/// Buffered matches between a matcher thread and its consumer.
const CHANNEL_CAPACITY: usize = 1024;

/// A lazy stream of matches. `Err` items are fatal for the stream.
pub type MatchStream = Box<dyn Iterator<Item = Result<MatchResult, FindError>> + Send>;

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Runs a [`FileMatcher`] against search targets under per-root deadlines.
///
/// Cheap to clone: every clone shares the matcher and the stat counters.
#[derive(Clone)]
pub struct Engine {
    matcher: Arc<dyn FileMatcher>,
    options: SearchOptions,
    stats:   Arc<StatCounters>,
}

impl Engine {
    pub fn new(matcher: Arc<dyn FileMatcher>, options: SearchOptions) -> Self {
        Self {
            matcher,
            options,
            stats: Arc::new(StatCounters::default()),
        }
    }

    pub(crate) fn counters(&self) -> Arc<StatCounters> {
        Arc::clone(&self.stats)
    }

    /// Search `target` for `spec`.
    ///
    /// A single root's fatal failure shows up as an `Err` item. In
    /// directory-pattern mode each discovered root is searched on the worker
    /// pool; failures there are logged and skipped, and the merged stream is
    /// deduplicated by path.
    pub fn search(&self, target: &SearchTarget, spec: &PatternSpec) -> Result<MatchStream, FindError> {
        match target {
            SearchTarget::Root(root) => Ok(Box::new(self.search_root(root, spec)?)),
            SearchTarget::DirectoryPattern(dir_spec) => {
                let roots = self.discover_roots(dir_spec)?;
                self.search_many(roots, spec)
            }
        }
    }

    /// One time-bounded matcher invocation below `root`.
    pub fn search_root(&self, root: &Path, spec: &PatternSpec) -> Result<RootStream, FindError> {
        let params = MatchParams {
            root:               root.to_path_buf(),
            regex:              spec.build_regex()?,
            type_constraint:    spec.type_constraint,
            path_scope:         spec.path_scope,
            exclude_paths:      self.options.exclude_paths.clone(),
            honor_ignore_files: self.options.honor_ignore_files,
            threads:            self.options.threads,
        };

        let (tx, rx) = bounded(CHANNEL_CAPACITY);
        let cancel = CancelToken::new();
        let matcher = Arc::clone(&self.matcher);
        let producer_cancel = cancel.clone();

        thread::Builder::new()
            .name("pfind-matcher".into())
            .spawn(move || {
                if let Err(e) = matcher.search(&params, &producer_cancel, &tx) {
                    let _ = tx.send(Err(e));
                }
            })
            .map_err(|e| FindError::Worker(e.to_string()))?;

        self.stats.root_started();
        tracing::debug!(root = %root.display(), regex = %spec.regex, "root search started");

        // A deadline past the end of the clock is no deadline.
        let soft = self.options.timeout.and_then(|t| Instant::now().checked_add(t));
        Ok(RootStream {
            rx,
            cancel,
            soft,
            hard: soft.and_then(|s| s.checked_add(self.options.grace)),
            root: root.to_path_buf(),
            stats: Arc::clone(&self.stats),
            timed_out: false,
            done: false,
        })
    }

    /// Every directory below the origin whose basename matches `dir_spec`.
    ///
    /// Roots come back absolute: a relative origin is canonicalized first.
    pub fn discover_roots(&self, dir_spec: &PatternSpec) -> Result<Vec<PathBuf>, FindError> {
        let origin = self.origin()?;
        let roots = self
            .search_root(&origin, dir_spec)?
            .map(|item| item.map(|m| m.path))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(
            origin = %origin.display(),
            regex = %dir_spec.regex,
            roots = roots.len(),
            "directory pattern discovery finished"
        );
        Ok(roots)
    }

    /// The traversal origin in canonical form.
    ///
    /// An absolute origin that cannot be canonicalized is used as given and
    /// left for the matcher to report.
    fn origin(&self) -> Result<PathBuf, FindError> {
        let origin = &self.options.origin;
        match std::fs::canonicalize(origin) {
            Ok(canonical) => Ok(canonical),
            Err(_) if origin.is_absolute() => Ok(origin.clone()),
            Err(source) => Err(FindError::Io {
                path: origin.clone(),
                source,
            }),
        }
    }

    /// Fan `roots` out over `jobs` workers and merge their matches.
    fn search_many(&self, roots: Vec<PathBuf>, spec: &PatternSpec) -> Result<MatchStream, FindError> {
        // Compile once up front so a bad pattern fails the call, not each root.
        spec.build_regex()?;

        let workers = self.options.jobs.max(1).min(roots.len().max(1));
        let (root_tx, root_rx) = unbounded::<PathBuf>();
        for root in roots {
            let _ = root_tx.send(root);
        }
        drop(root_tx);

        let (out_tx, out_rx) = bounded::<MatchResult>(CHANNEL_CAPACITY);

        for _ in 0..workers {
            let engine  = self.clone();
            let spec    = spec.clone();
            let root_rx = root_rx.clone();
            let out_tx  = out_tx.clone();

            thread::Builder::new()
                .name("pfind-root".into())
                .spawn(move || {
                    for root in root_rx.iter() {
                        if !engine.forward_root(&root, &spec, &out_tx) {
                            return;
                        }
                    }
                })
                .map_err(|e| FindError::Worker(e.to_string()))?;
        }
        drop(out_tx);

        Ok(Box::new(Dedup::new(out_rx.into_iter()).map(Ok::<_, FindError>)))
    }

    /// Search one root and forward its matches. Returns `false` once the
    /// consumer is gone.
    fn forward_root(
        &self,
        root: &Path,
        spec: &PatternSpec,
        out: &crossbeam_channel::Sender<MatchResult>,
    ) -> bool {
        let stream = match self.search_root(root, spec) {
            Ok(s) => s,
            Err(e) => {
                self.skip_root(root, &e);
                return true;
            }
        };

        for item in stream {
            match item {
                Ok(m) => {
                    if out.send(m).is_err() {
                        return false;
                    }
                }
                Err(e) => {
                    self.skip_root(root, &e);
                    break;
                }
            }
        }
        true
    }

    fn skip_root(&self, root: &Path, e: &FindError) {
        self.stats.root_failed();
        let at = e.path().unwrap_or(root);
        tracing::warn!(root = %root.display(), at = %at.display(), error = %e, "skipping root");
    }
}

// ---------------------------------------------------------------------------
// RootStream
// ---------------------------------------------------------------------------

/// The matches of one matcher invocation, bounded in time.
///
/// At the soft deadline the matcher is cancelled and whatever it still
/// delivers within the grace period is yielded. At the hard deadline the
/// stream ends and the matcher thread is abandoned. A timeout is not an
/// error: the stream simply ends.
///
/// Recoverable per-entry errors are logged and skipped. A fatal error is
/// yielded once and ends the stream.
pub struct RootStream {
    rx:        Receiver<Result<MatchResult, FindError>>,
    cancel:    CancelToken,
    soft:      Option<Instant>,
    hard:      Option<Instant>,
    root:      PathBuf,
    stats:     Arc<StatCounters>,
    timed_out: bool,
    done:      bool,
}

impl RootStream {
    /// Whether the soft deadline passed before the matcher finished.
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    fn deadline(&self) -> Option<Instant> {
        if self.timed_out { self.hard } else { self.soft }
    }
}

impl Iterator for RootStream {
    type Item = Result<MatchResult, FindError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let msg = match self.deadline() {
                Some(deadline) => self.rx.recv_deadline(deadline),
                None => self.rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match msg {
                Ok(Ok(m)) => return Some(Ok(m)),
                Ok(Err(e)) if e.is_recoverable() => {
                    tracing::debug!(root = %self.root.display(), error = %e, "skipped entry");
                }
                Ok(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    self.done = true;
                    tracing::debug!(root = %self.root.display(), "root search finished");
                }
                Err(RecvTimeoutError::Timeout) if !self.timed_out => {
                    self.timed_out = true;
                    self.cancel.cancel();
                    self.stats.root_timed_out();
                    tracing::warn!(root = %self.root.display(), "search timed out, keeping partial results");
                }
                Err(RecvTimeoutError::Timeout) => {
                    // Dropping the receiver makes the matcher's next send fail.
                    self.rx = crossbeam_channel::never();
                    self.done = true;
                    tracing::warn!(root = %self.root.display(), "matcher ignored cancellation, abandoning it");
                }
            }
        }
        None
    }
}

impl Drop for RootStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
