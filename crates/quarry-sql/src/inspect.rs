//! Best-effort statement inspection.
//!
//! Wraps the SQL AST collaborator behind a small facade that only
//! recovers a statement's shape: its kind and the table it references.
//! Parsing dialect SQL is expected to fail routinely, so failure is a
//! plain `None` rather than an error — callers pattern-match on
//! parsed/unparseable and fall back to "unknown table".

use sqlparser::ast::{FromTable, ObjectName, Query, SetExpr, Statement, TableFactor, TableWithJoins};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use tracing::debug;

use crate::sanitize::sanitize;

/// The shape of a statement: what it does and to which table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementInfo {
    /// Statement kind.
    pub kind: StatementKind,
    /// Referenced table, when one could be recovered.
    pub table: Option<String>,
}

/// Coarse statement classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// `SELECT`-shaped query.
    Select,
    /// Row insertion.
    Insert,
    /// Row update.
    Update,
    /// Row deletion.
    Delete,
    /// `SHOW`-family introspection shorthand.
    Show,
    /// Schema definition (`CREATE`/`ALTER`/`DROP`/`TRUNCATE`).
    Ddl,
    /// Anything else the parser accepted.
    Other,
}

/// Extracts a statement's shape on a best-effort basis.
///
/// The SQL is pre-sanitized (see [`crate::sanitize::sanitize`]) so the
/// collaborator accepts dialect variants it does not natively support.
/// Unparseable SQL yields `None`.
#[must_use]
pub fn inspect(sql: &str) -> Option<StatementInfo> {
    let trimmed = sql.trim_start();
    if starts_with_keyword(trimmed, "SHOW") {
        return Some(StatementInfo {
            kind: StatementKind::Show,
            table: None,
        });
    }
    for keyword in ["CREATE", "ALTER", "DROP", "TRUNCATE"] {
        if starts_with_keyword(trimmed, keyword) {
            return Some(StatementInfo {
                kind: StatementKind::Ddl,
                table: None,
            });
        }
    }

    let sanitized = sanitize(sql);
    let statements = match Parser::parse_sql(&GenericDialect {}, &sanitized) {
        Ok(statements) => statements,
        Err(err) => {
            debug!(%err, "statement not parseable, shape unknown");
            return None;
        }
    };
    statements.first().map(classify)
}

fn starts_with_keyword(sql: &str, keyword: &str) -> bool {
    sql.len() >= keyword.len()
        && sql[..keyword.len()].eq_ignore_ascii_case(keyword)
        && sql[keyword.len()..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric())
}

fn classify(statement: &Statement) -> StatementInfo {
    match statement {
        Statement::Query(query) => StatementInfo {
            kind: StatementKind::Select,
            table: query_table(query),
        },
        Statement::Insert(insert) => StatementInfo {
            kind: StatementKind::Insert,
            table: object_name(&insert.table_name),
        },
        Statement::Update { table, .. } => StatementInfo {
            kind: StatementKind::Update,
            table: relation_table(table),
        },
        Statement::Delete(delete) => {
            let tables = match &delete.from {
                FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => tables,
            };
            StatementInfo {
                kind: StatementKind::Delete,
                table: tables.first().and_then(relation_table),
            }
        }
        _ => StatementInfo {
            kind: StatementKind::Other,
            table: None,
        },
    }
}

fn query_table(query: &Query) -> Option<String> {
    match query.body.as_ref() {
        SetExpr::Select(select) => select.from.first().and_then(relation_table),
        _ => None,
    }
}

fn relation_table(table: &TableWithJoins) -> Option<String> {
    match &table.relation {
        TableFactor::Table { name, .. } => object_name(name),
        _ => None,
    }
}

fn object_name(name: &ObjectName) -> Option<String> {
    name.0.last().map(|ident| ident.value.clone())
}
