//! Dialect pre-sanitizer for the SQL AST collaborator.
//!
//! The AST parser only needs to recover a statement's shape (its kind
//! and referenced table), so this rewriting is deliberately lossy: the
//! output is not meant to be re-executed, only parsed. Dialect
//! constructs the parser rejects are rewritten to accepted stand-ins,
//! and known troublesome function calls are stripped outright.
//!
//! All rewrite patterns are immutable statics initialized once and
//! shared across calls.

use std::sync::LazyLock;

use regex::Regex;

use crate::bind::strip_comments;

/// Function calls the AST collaborator rejects; replaced by a literal
/// before parsing.
static STRIPPED_FUNCTIONS: &[&str] = &[
    "GROUP_CONCAT",
    "JSON_ARRAYAGG",
    "JSON_OBJECTAGG",
    "ANY_VALUE",
    "CONVERT_TZ",
    "DATE_FORMAT",
    "STR_TO_DATE",
    "TIMESTAMPDIFF",
    "TIMESTAMPADD",
];

static FUNCTION_CALL: LazyLock<Regex> = LazyLock::new(|| {
    let names = STRIPPED_FUNCTIONS.join("|");
    Regex::new(&format!(r"(?i)\b(?:{names})\s*\([^()]*\)")).unwrap()
});

static SHOW_STMT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^\s*SHOW\s+(.+)$").unwrap());

static INTERVAL_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bINTERVAL\s+(\d+)\s+(YEAR|QUARTER|MONTH|WEEK|DAY|HOUR|MINUTE|SECOND)\b")
        .unwrap()
});

static LIMIT_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bLIMIT\s+(\d+)\s*,\s*(\d+)").unwrap());

static LOCK_MODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bLOCK\s+IN\s+\w+\s+MODE\b").unwrap());

static SET_STMT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^\s*SET\s+(?:GLOBAL\s+)?\S+\s*=\s*.*$").unwrap());

/// Rewrites dialect-variant SQL into a form the AST collaborator
/// accepts.
///
/// Applied in order: comment stripping, `?`→dummy positional token,
/// `SHOW x` shorthand, MySQL `INTERVAL n unit`, MySQL `LIMIT a,b`,
/// `LOCK IN … MODE`, `SET [GLOBAL] x = y`, known-function stripping.
#[must_use]
pub fn sanitize(sql: &str) -> String {
    let mut out = strip_comments(sql);
    out = rewrite_placeholders(&out);
    out = SHOW_STMT.replace(&out, "SELECT '$1' AS show_target").into_owned();
    out = INTERVAL_LITERAL
        .replace_all(&out, "CAST('$1 $2' AS INTERVAL)")
        .into_owned();
    out = LIMIT_PAIR.replace_all(&out, "LIMIT $2 OFFSET $1").into_owned();
    out = LOCK_MODE.replace_all(&out, "").into_owned();
    out = SET_STMT.replace(&out, "SET dummy_variable = 0").into_owned();
    strip_functions(&out)
}

/// Replaces every `?` placeholder outside string literals with a dummy
/// positional token the parser accepts.
fn rewrite_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut in_string = false;
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    out.push('\'');
                    chars.next();
                    continue;
                }
                in_string = false;
            }
            continue;
        }
        match c {
            '\'' => {
                in_string = true;
                out.push(c);
            }
            '?' => out.push_str("$1"),
            _ => out.push(c),
        }
    }
    out
}

fn strip_functions(sql: &str) -> String {
    // Repeated passes unwind simple nesting from the inside out.
    let mut current = sql.to_string();
    loop {
        let next = FUNCTION_CALL.replace_all(&current, "0").into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}
