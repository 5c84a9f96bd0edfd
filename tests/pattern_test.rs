use pfind::{compile, compile_dir_pattern, CompileOptions, FindError, PathScope, PatternSpec, TypeConstraint};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

const CORPUS: [&str; 4] = ["abc", "xabc", "abcx", "xabcx"];

fn basic(raw: &str) -> PatternSpec {
    compile(raw, CompileOptions::default()).unwrap()
}

fn full(raw: &str) -> PatternSpec {
    compile(
        raw,
        CompileOptions {
            regex_mode: false,
            full_path: true,
        },
    )
    .unwrap()
}

/// The names in `CORPUS` that `spec` matches.
fn hits(spec: &PatternSpec) -> Vec<&'static str> {
    let re = spec.build_regex().unwrap();
    CORPUS.iter().copied().filter(|n| re.is_match(n)).collect()
}

fn assert_usage(raw: &str) {
    match compile(raw, CompileOptions::default()) {
        Err(FindError::Usage(_)) => {}
        other => panic!("expected usage error for {raw:?}, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Shorthand
// ---------------------------------------------------------------------------

#[test]
fn bare_word_is_contains() {
    let spec = basic("abc");
    assert_eq!(spec.regex, "abc");
    assert_eq!(spec.type_constraint, TypeConstraint::Any);
    assert_eq!(spec.path_scope, PathScope::Basename);
    assert_eq!(hits(&spec), CORPUS.to_vec());
}

#[test]
fn leading_slash_is_starts_with() {
    let spec = basic("/abc");
    assert_eq!(spec.regex, "^abc");
    assert_eq!(spec.type_constraint, TypeConstraint::Any);
    assert_eq!(hits(&spec), vec!["abc", "abcx"]);
}

#[test]
fn trailing_slash_is_ends_with_directory() {
    let spec = basic("abc/");
    assert_eq!(spec.regex, "abc$");
    assert_eq!(spec.type_constraint, TypeConstraint::Dir);
    assert_eq!(hits(&spec), vec!["abc", "xabc"]);
}

#[test]
fn both_slashes_is_exact_directory() {
    let spec = basic("/abc/");
    assert_eq!(spec.regex, "^abc$");
    assert_eq!(spec.type_constraint, TypeConstraint::Dir);
    assert_eq!(spec.path_scope, PathScope::Basename);
    assert_eq!(hits(&spec), vec!["abc"]);
}

#[test]
fn internal_slash_switches_to_full_path() {
    let spec = basic("src/main");
    assert_eq!(spec.regex, "src/main");
    assert_eq!(spec.path_scope, PathScope::FullPath);

    let spec = basic("/usr/lib");
    assert_eq!(spec.regex, "/usr/lib");
    assert_eq!(spec.path_scope, PathScope::FullPath);
}

// ---------------------------------------------------------------------------
// Quoted wildcards
// ---------------------------------------------------------------------------

#[test]
fn quoted_without_star_is_exact() {
    for raw in ["\"abc\"", "'abc'"] {
        let spec = basic(raw);
        assert_eq!(spec.regex, "^abc$");
        assert_eq!(spec.type_constraint, TypeConstraint::Any);
        assert_eq!(hits(&spec), vec!["abc"]);
    }
}

#[test]
fn quoted_strips_one_slash_each_side() {
    let spec = basic("\"/abc/\"");
    assert_eq!(spec.regex, "^abc$");
    assert_eq!(spec.type_constraint, TypeConstraint::Dir);

    let spec = basic("\"/abc\"");
    assert_eq!(spec.regex, "^abc$");
    assert_eq!(spec.type_constraint, TypeConstraint::Any);
}

#[test]
fn leading_star_drops_start_anchor() {
    let spec = basic("\"*abc\"");
    assert_eq!(spec.regex, "abc$");
    assert_eq!(hits(&spec), vec!["abc", "xabc"]);
}

#[test]
fn trailing_star_drops_end_anchor() {
    let spec = basic("\"abc*\"");
    assert_eq!(spec.regex, "^abc");
    assert_eq!(hits(&spec), vec!["abc", "abcx"]);
}

#[test]
fn inner_star_expands_to_dot_star() {
    let spec = basic("\"a*c\"");
    assert_eq!(spec.regex, "^a.*c$");

    let spec = basic("\"x*b*x\"");
    assert_eq!(spec.regex, "^x.*b.*x$");
    assert_eq!(hits(&spec), vec!["xabcx"]);
}

#[test]
fn lone_star_matches_everything() {
    let spec = basic("\"*\"");
    assert_eq!(spec.regex, "");
    assert_eq!(hits(&spec), CORPUS.to_vec());
}

#[test]
fn unquoted_star_compiles_like_quoted() {
    assert_eq!(basic("*abc*"), basic("\"*abc*\""));
    assert_eq!(basic("abc*"), basic("'abc*'"));
}

#[test]
fn metacharacters_are_escaped() {
    assert_eq!(basic("\"a.b\"").regex, r"^a\.b$");
    assert_eq!(basic("a+b").regex, r"a\+b");
    assert_eq!(basic("\"(x)*\"").regex, r"^\(x\)");

    let spec = basic("\"[ab]{2}|^$?\"");
    let re = spec.build_regex().unwrap();
    assert!(re.is_match("[ab]{2}|^$?"));
    assert!(!re.is_match("aa"));
}

#[test]
fn escaped_star_stays_literal() {
    let spec = basic("\"abc\\*\"");
    assert_eq!(spec.regex, r"^abc\*$");
    let re = spec.build_regex().unwrap();
    assert!(re.is_match("abc*"));
    assert!(!re.is_match("abcx"));

    // An escaped star at the start keeps the start anchor.
    assert_eq!(basic("\"\\*abc*\"").regex, r"^\*abc");
}

#[test]
fn lone_backslash_is_literal() {
    let spec = basic("\"a\\b\"");
    assert_eq!(spec.regex, r"^a\\b$");
    assert!(spec.build_regex().unwrap().is_match("a\\b"));
}

// ---------------------------------------------------------------------------
// Regex notation
// ---------------------------------------------------------------------------

#[test]
fn regex_marker_is_verbatim() {
    let spec = basic("r\"^a.c$\"");
    assert_eq!(spec.regex, "^a.c$");
    assert_eq!(spec.type_constraint, TypeConstraint::Any);
    assert_eq!(spec.path_scope, PathScope::Basename);

    assert_eq!(basic("r'x+'").regex, "x+");
}

#[test]
fn regex_mode_is_verbatim() {
    let opts = CompileOptions {
        regex_mode: true,
        full_path: false,
    };
    let spec = compile("/abc/", opts).unwrap();
    assert_eq!(spec.regex, "/abc/");
    assert_eq!(spec.path_scope, PathScope::FullPath);

    assert_eq!(compile("a.c", opts).unwrap().regex, "a.c");
}

#[test]
fn invalid_regex_fails_to_build() {
    let spec = basic("r\"(unclosed\"");
    assert!(matches!(
        spec.build_regex(),
        Err(FindError::InvalidPattern { .. })
    ));
}

#[test]
fn equivalent_notations_match_the_same_names() {
    let contains = hits(&basic("abc"));
    assert_eq!(contains, hits(&basic("\"*abc*\"")));
    assert_eq!(contains, hits(&basic("r\"abc\"")));

    let starts = hits(&basic("/abc"));
    assert_eq!(starts, hits(&basic("\"abc*\"")));
    assert_eq!(starts, hits(&basic("r\"^abc\"")));

    let exact = hits(&basic("\"abc\""));
    assert_eq!(exact, hits(&basic("r\"^abc$\"")));
}

#[test]
fn matching_is_case_insensitive() {
    let re = basic("/abc").build_regex().unwrap();
    assert!(re.is_match("ABCdef"));
}

// ---------------------------------------------------------------------------
// Full-path scope
// ---------------------------------------------------------------------------

#[test]
fn full_path_shorthand_keeps_separators() {
    assert_eq!(full("abc").regex, "abc");
    assert_eq!(full("/abc").regex, "/abc");

    let ends = full("abc/");
    assert_eq!(ends.regex, "abc/?$");
    assert_eq!(ends.type_constraint, TypeConstraint::Dir);

    let exact = full("/abc/");
    assert_eq!(exact.regex, "/abc/?$");
    assert_eq!(exact.path_scope, PathScope::FullPath);

    let re = exact.build_regex().unwrap();
    assert!(re.is_match("/home/me/abc"));
    assert!(!re.is_match("/home/me/xabc"));
    assert!(!re.is_match("/home/me/abc/file"));
}

#[test]
fn full_path_wildcards_anchor_to_whole_path() {
    let spec = full("\"*/src/*\"");
    assert_eq!(spec.regex, "/src/");
    assert_eq!(spec.path_scope, PathScope::FullPath);

    let spec = full("\"*.rs\"");
    assert_eq!(spec.regex, r"\.rs$");
}

// ---------------------------------------------------------------------------
// Empty fragments
// ---------------------------------------------------------------------------

#[test]
fn empty_fragments_are_usage_errors() {
    for raw in ["", "/", "//", "\"\"", "''", "r\"\"", "\"/\"", "\"//\""] {
        assert_usage(raw);
    }
}

#[test]
fn usage_errors_exit_with_two() {
    let err = compile("/", CompileOptions::default()).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

// ---------------------------------------------------------------------------
// Directory patterns
// ---------------------------------------------------------------------------

#[test]
fn dir_patterns_are_basename_directories() {
    let spec = compile_dir_pattern("src", false).unwrap();
    assert_eq!(spec.regex, "src");
    assert_eq!(spec.type_constraint, TypeConstraint::Dir);
    assert_eq!(spec.path_scope, PathScope::Basename);

    let spec = compile_dir_pattern("/target/", false).unwrap();
    assert_eq!(spec.regex, "^target$");

    let spec = compile_dir_pattern("r\"^t.+t$\"", false).unwrap();
    assert_eq!(spec.regex, "^t.+t$");
    assert_eq!(spec.path_scope, PathScope::Basename);
}
