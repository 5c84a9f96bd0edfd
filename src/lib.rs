//! # pfind
//!
//! Pattern-compiling parallel file finder.
//!
//! pfind turns a user-supplied name pattern (shorthand, quoted wildcard or
//! explicit regex) into one normalized [`PatternSpec`], resolves where to
//! search, and runs a recursive [`FileMatcher`] per root under a per-root
//! timeout. With several full-path patterns it AND-composes them and prunes
//! matches that lie inside other matches.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! let results = pfind::search()
//!     .pattern("/invoice")          // basename starts with "invoice"
//!     .location(".")                // an existing directory: searched directly
//!     .run()
//!     .unwrap();
//!
//! for m in &results.matches {
//!     println!("{m}");
//! }
//! println!("{} roots in {:.3}s",
//!     results.stats.roots_searched,
//!     results.stats.duration.as_secs_f64()
//! );
//! ```
//!
//! # Pattern notations
//!
//! ```rust
//! use pfind::{compile, CompileOptions, TypeConstraint};
//!
//! let opts = CompileOptions::default();
//! assert_eq!(compile("abc", opts).unwrap().regex, "abc");
//! assert_eq!(compile("/abc", opts).unwrap().regex, "^abc");
//! assert_eq!(compile("\"abc*\"", opts).unwrap().regex, "^abc");
//! assert_eq!(compile("r\"a.c\"", opts).unwrap().regex, "a.c");
//!
//! let dir = compile("/abc/", opts).unwrap();
//! assert_eq!(dir.regex, "^abc$");
//! assert_eq!(dir.type_constraint, TypeConstraint::Dir);
//! ```
//!
//! # Search locations
//!
//! A location that exists on disk is searched directly. Anything else is
//! compiled as a directory-basename pattern: every matching directory below
//! the traversal origin is searched, concurrently, and the merged output is
//! deduplicated.
//!
//! ```rust,no_run
//! use pfind::{resolve, SearchTarget};
//!
//! assert!(matches!(resolve(".", false, false).unwrap(), SearchTarget::Root(_)));
//! assert!(matches!(resolve(".", false, true).unwrap(), SearchTarget::DirectoryPattern(_)));
//! ```

#![forbid(unsafe_code)]

pub mod engine;
pub mod output;
pub mod pattern;

mod builder;
mod compose;
mod entry;
mod error;
mod options;
mod resolve;
mod results;
mod traits;
mod walker;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::{Search, SearchBuilder};
pub use compose::{compose, prune_descendants};
pub use engine::{Engine, MatchStream, RootStream};
pub use entry::{EntryInfo, EntryKind, MatchResult};
pub use error::FindError;
pub use options::{parse_timeout, SearchOptions};
pub use output::{count_by_parent, write_results, CountEntry, Dedup, OutputMode};
pub use pattern::{compile, compile_dir_pattern, CompileOptions, PathScope, PatternSpec, TypeConstraint};
pub use resolve::{resolve, SearchTarget};
pub use results::{Results, ScanStats};
pub use traits::{CancelToken, FileMatcher, MatchParams};
pub use walker::WalkMatcher;

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`SearchBuilder`] to configure and run a search.
///
/// # Example
///
/// ```rust,no_run
/// let results = pfind::search()
///     .patterns(["src", "main"])
///     .full_path(true)
///     .run()
///     .unwrap();
///
/// // Only the shallowest match of each subtree is kept.
/// println!("{} matches", results.matches.len());
/// ```
pub fn search() -> SearchBuilder {
    SearchBuilder::default()
}
