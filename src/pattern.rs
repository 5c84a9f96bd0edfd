//! Name-pattern compilation.
//!
//! Users write patterns in three notations that all end up as one
//! [`PatternSpec`]:
//!
//! | notation          | example    | intent                          |
//! |-------------------|------------|---------------------------------|
//! | shorthand         | `abc`      | basename contains `abc`         |
//! |                   | `/abc`     | basename starts with `abc`      |
//! |                   | `abc/`     | directory basename ends `abc`   |
//! |                   | `/abc/`    | directory basename is `abc`     |
//! | quoted wildcard   | `"abc*"`   | anchored, `*` is the only token |
//! | explicit regex    | `r"^a.c"`  | used verbatim                   |
//!
//! Wildcards are not POSIX globs: only an unescaped `*` is live, everything
//! else is matched literally. `\*` is a literal asterisk.

use regex::{Regex, RegexBuilder};

use crate::entry::EntryKind;
use crate::error::FindError;

/// Which kinds of entry a pattern admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeConstraint {
    /// Files, directories and everything else.
    #[default]
    Any,
    File,
    Dir,
}

impl TypeConstraint {
    pub fn admits(self, kind: EntryKind) -> bool {
        match self {
            Self::Any => true,
            Self::File => kind == EntryKind::File,
            Self::Dir => kind == EntryKind::Dir,
        }
    }
}

/// What text a pattern's regex is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathScope {
    /// The final path component only.
    #[default]
    Basename,
    /// The whole absolute path.
    FullPath,
}

/// A normalized name pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSpec {
    pub regex: String,
    pub type_constraint: TypeConstraint,
    pub path_scope: PathScope,
}

impl PatternSpec {
    /// Replace the type constraint, e.g. from `--file` / `--dir`.
    pub fn with_type(mut self, type_constraint: TypeConstraint) -> Self {
        self.type_constraint = type_constraint;
        self
    }

    pub fn with_scope(mut self, path_scope: PathScope) -> Self {
        self.path_scope = path_scope;
        self
    }

    /// Build the case-insensitive matcher for this spec.
    pub fn build_regex(&self) -> Result<Regex, FindError> {
        RegexBuilder::new(&self.regex)
            .case_insensitive(true)
            .build()
            .map_err(|source| FindError::InvalidPattern {
                pattern: self.regex.clone(),
                source,
            })
    }
}

/// Caller-side switches for [`compile`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    /// Treat the raw pattern as a regex (`--regex`).
    pub regex_mode: bool,
    /// Match against full paths (`--full`).
    pub full_path: bool,
}

/// Compile a raw user pattern into a [`PatternSpec`].
///
/// The only failure is a structurally empty pattern, reported as
/// [`FindError::Usage`].
pub fn compile(raw: &str, opts: CompileOptions) -> Result<PatternSpec, FindError> {
    if raw.is_empty() {
        return Err(FindError::usage("empty name pattern"));
    }

    if let Some(body) = regex_marker(raw) {
        return verbatim(body, opts.full_path);
    }
    if opts.regex_mode {
        return verbatim(raw, opts.full_path);
    }

    if let Some(body) = unquote(raw) {
        return wildcard(body, opts.full_path);
    }
    if raw.contains('*') {
        return wildcard(raw, opts.full_path);
    }

    shorthand(raw, opts.full_path)
}

/// Compile a pattern that selects directory basenames, for search-dir
/// resolution. Same notations as [`compile`], scope forced to basenames.
pub fn compile_dir_pattern(raw: &str, regex_mode: bool) -> Result<PatternSpec, FindError> {
    let opts = CompileOptions {
        regex_mode,
        full_path: false,
    };
    Ok(compile(raw, opts)?
        .with_scope(PathScope::Basename)
        .with_type(TypeConstraint::Dir))
}

/// The interior of `r"…"` / `r'…'`, if `raw` carries the regex marker.
pub(crate) fn regex_marker(raw: &str) -> Option<&str> {
    raw.strip_prefix('r').and_then(unquote)
}

/// The interior of `"…"` / `'…'`.
pub(crate) fn unquote(raw: &str) -> Option<&str> {
    ['"', '\''].into_iter().find_map(|q| {
        raw.strip_prefix(q)
            .and_then(|rest| rest.strip_suffix(q))
    })
}

fn verbatim(body: &str, full_path: bool) -> Result<PatternSpec, FindError> {
    if body.is_empty() {
        return Err(FindError::usage("empty regex pattern"));
    }
    Ok(PatternSpec {
        regex: body.to_string(),
        type_constraint: TypeConstraint::Any,
        path_scope: scope_for(full_path, body),
    })
}

fn wildcard(body: &str, full_path: bool) -> Result<PatternSpec, FindError> {
    // Full paths keep their slashes: they are separators, not shorthand.
    if full_path {
        if body.is_empty() {
            return Err(FindError::usage("empty quoted pattern"));
        }
        return Ok(PatternSpec {
            regex: wildcard_regex(body),
            type_constraint: TypeConstraint::Any,
            path_scope: PathScope::FullPath,
        });
    }

    let body = body.strip_prefix('/').unwrap_or(body);
    let (body, dir_only) = match body.strip_suffix('/') {
        Some(rest) => (rest, true),
        None => (body, false),
    };
    if body.is_empty() {
        return Err(FindError::usage("empty pattern fragment inside quotes"));
    }

    Ok(PatternSpec {
        regex: wildcard_regex(body),
        type_constraint: if dir_only { TypeConstraint::Dir } else { TypeConstraint::Any },
        path_scope: scope_for(false, body),
    })
}

fn shorthand(raw: &str, full_path: bool) -> Result<PatternSpec, FindError> {
    let (body, starts) = match raw.strip_prefix('/') {
        Some(rest) => (rest, true),
        None => (raw, false),
    };
    let (body, ends) = match body.strip_suffix('/') {
        Some(rest) => (rest, true),
        None => (body, false),
    };
    if body.is_empty() {
        return Err(FindError::usage(format!(
            "empty pattern fragment in `{raw}`"
        )));
    }

    let literal = regex::escape(body);
    let path_scope = scope_for(full_path, body);
    let regex = match path_scope {
        PathScope::Basename => format!(
            "{}{literal}{}",
            if starts { "^" } else { "" },
            if ends { "$" } else { "" },
        ),
        // `/` is a real separator here; a directory path has no trailing one.
        PathScope::FullPath => format!(
            "{}{literal}{}",
            if starts { "/" } else { "" },
            if ends { "/?$" } else { "" },
        ),
    };

    Ok(PatternSpec {
        regex,
        type_constraint: if ends { TypeConstraint::Dir } else { TypeConstraint::Any },
        path_scope,
    })
}

/// An internal separator can never match a basename, so it implies full paths.
fn scope_for(full_path: bool, body: &str) -> PathScope {
    if full_path || body.contains('/') {
        PathScope::FullPath
    } else {
        PathScope::Basename
    }
}

// ---------------------------------------------------------------------------
// Wildcard tokenizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    /// An unescaped `*`.
    Star,
    Literal(char),
}

fn tokenize(body: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        let token = match c {
            '\\' if chars.peek() == Some(&'*') => {
                chars.next();
                Token::Literal('*')
            }
            '*' => Token::Star,
            other => Token::Literal(other),
        };
        tokens.push(token);
    }
    tokens
}

/// Translate a wildcard body into an anchored regex.
///
/// A leading star drops `^`, a trailing star drops `$`, any other star becomes
/// `.*`. Literals are regex-escaped one by one.
pub(crate) fn wildcard_regex(body: &str) -> String {
    let tokens = tokenize(body);

    let open = tokens.first() == Some(&Token::Star);
    let start = usize::from(open);
    let close = tokens.len() > start && tokens.last() == Some(&Token::Star);
    let end = tokens.len() - usize::from(close);

    let mut out = String::with_capacity(body.len() * 2 + 2);
    if !open {
        out.push('^');
    }
    let mut buf = [0u8; 4];
    for token in &tokens[start..end] {
        match token {
            Token::Star => out.push_str(".*"),
            Token::Literal(c) => out.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }
    if !close && !(open && tokens.len() == 1) {
        out.push('$');
    }
    out
}
