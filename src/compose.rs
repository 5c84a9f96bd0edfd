//! AND-composition of full-path patterns with descendant pruning.

use regex::Regex;

use crate::engine::{Engine, MatchStream};
use crate::entry::MatchResult;
use crate::error::FindError;
use crate::pattern::{PatternSpec, TypeConstraint};
use crate::resolve::SearchTarget;

/// Search `target` for entries matching every spec in `specs`, then drop
/// every match that lies below another match.
///
/// `specs[0]` drives the matcher; the rest filter its output by full path.
/// The result is sorted by path component.
pub fn compose(
    engine: &Engine,
    specs: &[PatternSpec],
    target: &SearchTarget,
) -> Result<MatchStream, FindError> {
    let (primary, rest) = specs
        .split_first()
        .ok_or_else(|| FindError::usage("missing name pattern"))?;

    let filters = rest
        .iter()
        .map(|spec| Ok((spec.build_regex()?, spec.type_constraint)))
        .collect::<Result<Vec<(Regex, TypeConstraint)>, FindError>>()?;

    let mut matches = Vec::new();
    for item in engine.search(target, primary)? {
        let m = item?;
        let text = m.path_text();
        if filters
            .iter()
            .all(|(re, kind)| kind.admits(m.kind) && re.is_match(&text))
        {
            matches.push(m);
        }
    }

    matches.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(matches = matches.len(), filters = filters.len(), "pruning composed matches");

    Ok(Box::new(prune_descendants(matches).into_iter().map(Ok::<_, FindError>)))
}

/// Drop every entry that is a proper descendant of the last kept entry.
///
/// `sorted` must be in `Path` order. Component-wise order keeps a subtree
/// contiguous right after its root, so one look-back pointer prunes it all.
pub fn prune_descendants(sorted: Vec<MatchResult>) -> Vec<MatchResult> {
    let mut kept: Vec<MatchResult> = Vec::with_capacity(sorted.len());
    for m in sorted {
        if let Some(last) = kept.last() {
            if is_descendant(&m.path_text(), &last.path_text()) {
                continue;
            }
        }
        kept.push(m);
    }
    kept
}

/// `path` is `ancestor` + `/` + something. A shared text prefix is not enough.
fn is_descendant(path: &str, ancestor: &str) -> bool {
    path.strip_prefix(ancestor.trim_end_matches('/'))
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|rest| !rest.is_empty())
}
