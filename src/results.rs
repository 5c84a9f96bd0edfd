use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::entry::MatchResult;

/// The output of a completed search collected by
/// [`SearchBuilder::run`](crate::SearchBuilder::run).
pub struct Results {
    /// Matched entries, in emission order.
    pub matches: Vec<MatchResult>,

    /// Per-root bookkeeping for the whole invocation.
    pub stats: ScanStats,
}

/// Statistics for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Matcher invocations started, discovery included.
    pub roots_searched: usize,

    /// Invocations that hit their soft deadline. Their partial output is kept.
    pub roots_timed_out: usize,

    /// Invocations that failed outright and were skipped.
    pub roots_failed: usize,

    /// Wall-clock time from search start to the snapshot.
    pub duration: Duration,
}

/// Live counters shared by every root search of one invocation.
#[derive(Debug, Default)]
pub(crate) struct StatCounters {
    searched:  AtomicUsize,
    timed_out: AtomicUsize,
    failed:    AtomicUsize,
}

impl StatCounters {
    pub(crate) fn root_started(&self) {
        self.searched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn root_timed_out(&self) {
        self.timed_out.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn root_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, duration: Duration) -> ScanStats {
        ScanStats {
            roots_searched:  self.searched.load(Ordering::Relaxed),
            roots_timed_out: self.timed_out.load(Ordering::Relaxed),
            roots_failed:    self.failed.load(Ordering::Relaxed),
            duration,
        }
    }
}
