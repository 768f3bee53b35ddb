//! Bind-parameter normalization.
//!
//! Rewrites a SQL string's named placeholders (`:name`) into the form a
//! driver requires and produces the ordered bind-value array to go with
//! it. Two entry points share one scanner: [`to_positioned`] emits
//! `$1,$2,…` (one position per distinct name, reused across
//! occurrences) and [`to_simple`] emits `?` (one bound value per
//! syntactic occurrence).
//!
//! A parameter token is a colon not preceded by another colon, followed
//! by an identifier — `::`-cast syntax never matches. Comments are
//! stripped first so they cannot contribute false matches, and the
//! scanner is single-quote aware, so `':x'` is data, not a parameter.

use std::collections::{BTreeMap, BTreeSet};

use quarry_model::{BindMap, Value};
use tracing::debug;

use crate::error::{BindError, Result};

/// Rewritten SQL plus the ordered bind-value array.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// SQL with driver-style placeholders.
    pub sql: String,
    /// Bind values in placeholder order.
    pub binds: Vec<Value>,
}

/// Rewrites `:name` placeholders to positioned `$N` form.
///
/// Every distinct name is assigned one position block on first
/// occurrence; later occurrences reuse the identical placeholder list,
/// so the bind array holds exactly one slot per distinct scalar name.
///
/// # Errors
///
/// [`BindError::MissingParameter`] / [`BindError::MissingParameters`]
/// when the SQL references names absent from the bind map.
pub fn to_positioned(sql: &str, binds: &BindMap) -> Result<Normalized> {
    normalize(sql, binds, Style::Positioned)
}

/// Rewrites `:name` placeholders to simple `?` form.
///
/// Each syntactic occurrence consumes the next `?` and pushes its value
/// again, so a name referenced twice binds its value twice.
///
/// # Errors
///
/// [`BindError::MissingParameter`] / [`BindError::MissingParameters`]
/// when the SQL references names absent from the bind map.
pub fn to_simple(sql: &str, binds: &BindMap) -> Result<Normalized> {
    normalize(sql, binds, Style::Simple)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Positioned,
    Simple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotKind {
    Single,
    Multiple,
}

/// Per-name scratch record: created lazily on a parameter's first
/// occurrence, discarded when the call returns.
#[derive(Debug)]
struct BindSlot {
    first_position: usize,
    kind: SlotKind,
    num_of_binds: usize,
}

impl BindSlot {
    /// The placeholder text every occurrence of this name emits.
    /// An empty array expands to the literal ` null ` so `IN ()`-style
    /// SQL stays valid.
    fn placeholders(&self) -> String {
        if self.num_of_binds == 0 {
            return String::from(" null ");
        }
        match self.kind {
            SlotKind::Single => format!("${}", self.first_position),
            SlotKind::Multiple => {
                let parts: Vec<String> = (0..self.num_of_binds)
                    .map(|i| format!("${}", self.first_position + i))
                    .collect();
                parts.join(",")
            }
        }
    }
}

struct Normalizer<'a> {
    style: Style,
    supplied: &'a BindMap,
    slots: BTreeMap<String, BindSlot>,
    next_position: usize,
    out: String,
    binds: Vec<Value>,
    missing: BTreeSet<String>,
}

impl Normalizer<'_> {
    fn emit_param(&mut self, name: &str) {
        let Some(value) = self.supplied.get(name) else {
            self.missing.insert(name.to_string());
            return;
        };
        match self.style {
            Style::Simple => self.emit_simple(value),
            Style::Positioned => self.emit_positioned(name, value),
        }
    }

    fn emit_simple(&mut self, value: &Value) {
        match value.as_array() {
            Some([]) => self.out.push_str(" null "),
            Some(items) => {
                let placeholders = vec!["?"; items.len()].join(",");
                self.out.push_str(&placeholders);
                self.binds.extend(items.iter().cloned());
            }
            None => {
                self.out.push('?');
                self.binds.push(value.clone());
            }
        }
    }

    fn emit_positioned(&mut self, name: &str, value: &Value) {
        if let Some(slot) = self.slots.get(name) {
            self.out.push_str(&slot.placeholders());
            return;
        }
        let slot = match value.as_array() {
            Some(items) => {
                let first_position = self.next_position;
                self.next_position += items.len();
                self.binds.extend(items.iter().cloned());
                BindSlot {
                    first_position,
                    kind: SlotKind::Multiple,
                    num_of_binds: items.len(),
                }
            }
            None => {
                let first_position = self.next_position;
                self.next_position += 1;
                self.binds.push(value.clone());
                BindSlot {
                    first_position,
                    kind: SlotKind::Single,
                    num_of_binds: 1,
                }
            }
        };
        self.out.push_str(&slot.placeholders());
        self.slots.insert(name.to_string(), slot);
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn normalize(sql: &str, supplied: &BindMap, style: Style) -> Result<Normalized> {
    let stripped = strip_comments(sql);
    let chars: Vec<char> = stripped.chars().collect();
    let mut n = Normalizer {
        style,
        supplied,
        slots: BTreeMap::new(),
        next_position: 1,
        out: String::with_capacity(stripped.len()),
        binds: Vec::new(),
        missing: BTreeSet::new(),
    };

    let mut i = 0;
    let mut prev: Option<char> = None;
    let mut in_string = false;
    while i < chars.len() {
        let c = chars[i];
        if in_string {
            n.out.push(c);
            if c == '\'' {
                if chars.get(i + 1) == Some(&'\'') {
                    n.out.push('\'');
                    prev = Some('\'');
                    i += 2;
                    continue;
                }
                in_string = false;
            }
            prev = Some(c);
            i += 1;
            continue;
        }
        match c {
            '\'' => {
                in_string = true;
                n.out.push(c);
            }
            ':' if prev != Some(':')
                && chars.get(i + 1).copied().is_some_and(is_ident_start) =>
            {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && is_ident_char(chars[end]) {
                    end += 1;
                }
                let name: String = chars[start..end].iter().collect();
                n.emit_param(&name);
                prev = Some(chars[end - 1]);
                i = end;
                continue;
            }
            _ => n.out.push(c),
        }
        prev = Some(c);
        i += 1;
    }

    if !n.missing.is_empty() {
        let mut names: Vec<String> = n.missing.into_iter().collect();
        return Err(if names.len() == 1 {
            BindError::MissingParameter(names.remove(0))
        } else {
            BindError::MissingParameters(names)
        });
    }
    debug!(
        distinct = n.slots.len(),
        binds = n.binds.len(),
        "normalized bind parameters"
    );
    Ok(Normalized {
        sql: n.out,
        binds: n.binds,
    })
}

/// Strips `/* */` block comments and `--`/`#` line comments.
///
/// Single-quote aware: comment markers inside string literals are data.
/// A block comment is replaced by a single space so tokens on either
/// side do not glue together; line comments keep their newline.
#[must_use]
pub fn strip_comments(sql: &str) -> String {
    let chars: Vec<char> = sql.chars().collect();
    let mut out = String::with_capacity(sql.len());
    let mut i = 0;
    let mut in_string = false;
    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if c == '\'' {
                if chars.get(i + 1) == Some(&'\'') {
                    out.push('\'');
                    i += 2;
                    continue;
                }
                in_string = false;
            }
            i += 1;
            continue;
        }
        match c {
            '\'' => {
                in_string = true;
                out.push(c);
                i += 1;
            }
            '-' if chars.get(i + 1) == Some(&'-') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() {
                    if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
                out.push(' ');
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}
