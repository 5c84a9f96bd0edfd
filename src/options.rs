use std::path::PathBuf;
use std::time::Duration;

use crate::error::FindError;

/// Per-root wall clock used when the caller does not choose one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// How long a cancelled matcher may keep delivering results.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(2);

/// Subtrees never entered by the native walker.
pub const DEFAULT_EXCLUDES: [&str; 4] = ["/proc", "/sys", "/dev", "/run"];

/// Execution parameters shared by every root searched in one invocation.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Soft deadline per matcher invocation. `None` means unbounded.
    pub timeout: Option<Duration>,
    /// Time between the soft deadline and giving up on the matcher.
    pub grace: Duration,
    /// Threads each matcher invocation may use.
    pub threads: usize,
    /// Roots searched concurrently in directory-pattern mode.
    pub jobs: usize,
    pub honor_ignore_files: bool,
    /// Where directory-pattern discovery starts.
    pub origin: PathBuf,
    pub exclude_paths: Vec<PathBuf>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        let threads = num_cpus();
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            grace: DEFAULT_GRACE,
            threads,
            jobs: threads.min(8),
            honor_ignore_files: true,
            origin: PathBuf::from("/"),
            exclude_paths: DEFAULT_EXCLUDES.iter().map(PathBuf::from).collect(),
        }
    }
}

/// Parse a `--timeout` value.
///
/// A bare integer is seconds; `ms`, `s`, `m` and `h` suffixes are accepted.
/// `0` disables the timeout.
pub fn parse_timeout(raw: &str) -> Result<Option<Duration>, FindError> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);

    let value: u64 = digits.parse().map_err(|_| {
        FindError::usage(format!(
            "invalid timeout '{raw}': use N, Nms, Ns, Nm or Nh"
        ))
    })?;

    let duration = match unit {
        "" | "s" => Duration::from_secs(value),
        "ms" => Duration::from_millis(value),
        "m" => Duration::from_secs(value.saturating_mul(60)),
        "h" => Duration::from_secs(value.saturating_mul(60 * 60)),
        other => {
            return Err(FindError::usage(format!(
                "unsupported timeout unit '{other}' in '{raw}': use ms, s, m or h"
            )))
        }
    };

    Ok((!duration.is_zero()).then_some(duration))
}

/// Get the logical CPU count, with a safe fallback.
pub(crate) fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
