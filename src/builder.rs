use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::compose::compose;
use crate::engine::{Engine, MatchStream};
use crate::entry::MatchResult;
use crate::error::FindError;
use crate::options::SearchOptions;
use crate::pattern::{compile, CompileOptions, PatternSpec, TypeConstraint};
use crate::resolve::{resolve, SearchTarget};
use crate::results::{Results, ScanStats, StatCounters};
use crate::traits::FileMatcher;
use crate::walker::WalkMatcher;

// ---------------------------------------------------------------------------
// SearchBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing a search.
///
/// Created via [`pfind::search()`](crate::search). Add one or more name
/// patterns, optionally a location, then call [`stream()`](SearchBuilder::stream)
/// or [`run()`](SearchBuilder::run).
///
/// # Example
///
/// ```rust,ignore
/// let results = pfind::search()
///     .pattern("/invoice")
///     .location("~/documents")
///     .kind(TypeConstraint::File)
///     .timeout(Some(Duration::from_secs(5)))
///     .run()?;
/// ```
pub struct SearchBuilder {
    patterns:   Vec<String>,
    location:   Option<String>,
    matcher:    Option<Arc<dyn FileMatcher>>,
    kind:       Option<TypeConstraint>,
    full_path:  bool,
    regex_mode: bool,
    bypass:     bool,
    options:    SearchOptions,
}

impl Default for SearchBuilder {
    fn default() -> Self {
        Self {
            patterns:   Vec::new(),
            location:   None,
            matcher:    None,
            kind:       None,
            full_path:  false,
            regex_mode: false,
            bypass:     false,
            options:    SearchOptions::default(),
        }
    }
}

impl SearchBuilder {
    // ── Patterns ──────────────────────────────────────────────────────────

    /// Add a name pattern. Several patterns are AND-composed and need
    /// [`full_path`](Self::full_path).
    pub fn pattern(mut self, raw: impl Into<String>) -> Self {
        self.patterns.push(raw.into());
        self
    }

    pub fn patterns<I, S>(mut self, raws: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns.extend(raws.into_iter().map(Into::into));
        self
    }

    /// Where to search: an existing directory or a directory-name pattern.
    /// Defaults to the current directory.
    pub fn location(mut self, raw: impl Into<String>) -> Self {
        self.location = Some(raw.into());
        self
    }

    /// Override the type constraint derived from pattern notation.
    pub fn kind(mut self, kind: TypeConstraint) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Match full paths instead of basenames.
    pub fn full_path(mut self, yes: bool) -> Self {
        self.full_path = yes;
        self
    }

    /// Treat every name pattern as a raw regex.
    pub fn regex_mode(mut self, yes: bool) -> Self {
        self.regex_mode = yes;
        self
    }

    /// Resolve the location as a directory pattern even if it exists on disk.
    pub fn bypass(mut self, yes: bool) -> Self {
        self.bypass = yes;
        self
    }

    // ── Matcher ───────────────────────────────────────────────────────────

    /// Replace the built-in [`WalkMatcher`].
    pub fn with_matcher(mut self, m: impl FileMatcher + 'static) -> Self {
        self.matcher = Some(Arc::new(m));
        self
    }

    // ── Options ───────────────────────────────────────────────────────────

    /// Per-root soft deadline. `None` disables it.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.options.timeout = timeout;
        self
    }

    pub fn grace(mut self, grace: Duration) -> Self {
        self.options.grace = grace;
        self
    }

    /// Threads per matcher invocation.
    pub fn threads(mut self, n: usize) -> Self {
        self.options.threads = n.max(1);
        self
    }

    /// Roots searched concurrently in directory-pattern mode.
    pub fn jobs(mut self, n: usize) -> Self {
        self.options.jobs = n.max(1);
        self
    }

    pub fn honor_ignore_files(mut self, yes: bool) -> Self {
        self.options.honor_ignore_files = yes;
        self
    }

    /// Where directory-pattern discovery starts.
    pub fn origin(mut self, origin: impl Into<PathBuf>) -> Self {
        self.options.origin = origin.into();
        self
    }

    pub fn exclude_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.options.exclude_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Compile the name patterns with the builder's flags applied.
    pub fn compile_patterns(&self) -> Result<Vec<PatternSpec>, FindError> {
        if self.patterns.is_empty() {
            return Err(FindError::usage("missing name pattern"));
        }
        if self.patterns.len() > 1 && !self.full_path {
            return Err(FindError::usage(
                "multiple name patterns require --full",
            ));
        }

        let opts = CompileOptions {
            regex_mode: self.regex_mode,
            full_path:  self.full_path,
        };
        self.patterns
            .iter()
            .map(|raw| {
                let spec = compile(raw, opts)?;
                Ok(match self.kind {
                    Some(kind) => spec.with_type(kind),
                    None => spec,
                })
            })
            .collect()
    }

    /// Resolve the location, defaulting to the current directory.
    pub fn resolve_target(&self) -> Result<SearchTarget, FindError> {
        match &self.location {
            Some(raw) => resolve(raw, false, self.bypass),
            None => {
                let cwd = std::env::current_dir().map_err(|source| FindError::Io {
                    path: PathBuf::from("."),
                    source,
                })?;
                Ok(SearchTarget::Root(cwd))
            }
        }
    }

    /// Start the search and return its lazy match stream.
    ///
    /// # Errors
    ///
    /// Usage errors (no pattern, empty fragment, several patterns without
    /// full-path mode), invalid regexes, and failure to start the search.
    pub fn stream(self) -> Result<Search, FindError> {
        let specs = self.compile_patterns()?;
        let target = self.resolve_target()?;
        let started = Instant::now();

        let matcher: Arc<dyn FileMatcher> = match self.matcher {
            Some(m) => m,
            None => Arc::new(WalkMatcher),
        };
        let engine = Engine::new(matcher, self.options);

        tracing::debug!(?target, patterns = specs.len(), "search starting");
        let stream = if specs.len() > 1 {
            compose(&engine, &specs, &target)?
        } else {
            engine.search(&target, &specs[0])?
        };

        Ok(Search {
            stream,
            stats: engine.counters(),
            started,
        })
    }

    /// Execute the search and collect every match.
    ///
    /// Blocks until the search completes or times out.
    pub fn run(self) -> Result<Results, FindError> {
        let mut search = self.stream()?;
        let matches = search.by_ref().collect::<Result<Vec<_>, _>>()?;
        Ok(Results {
            matches,
            stats: search.stats(),
        })
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// A running search. Iterate it for matches.
pub struct Search {
    stream:  MatchStream,
    stats:   Arc<StatCounters>,
    started: Instant,
}

impl Search {
    /// Counters so far.
    pub fn stats(&self) -> ScanStats {
        self.stats.snapshot(self.started.elapsed())
    }
}

impl Iterator for Search {
    type Item = Result<MatchResult, FindError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.stream.next()
    }
}
