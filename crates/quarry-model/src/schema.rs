//! The schema tree supplied by driver introspection.
//!
//! A connection's schema model is a tree of schema → table → column
//! nodes. The core consumes it for column-type lookup (clause compiler)
//! and for default-schema resolution; building the tree is a driver
//! concern.

use serde::{Deserialize, Serialize};

use crate::types::{ColumnDescriptor, SemanticType};

/// A table: name plus column descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableNode {
    /// Table name.
    pub name: String,
    /// Column descriptors in definition order.
    pub columns: Vec<ColumnDescriptor>,
}

impl TableNode {
    /// Creates a table node.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }
}

/// A schema: name plus tables, optionally flagged as the connection's
/// default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Schema name.
    pub name: String,
    /// Tables in this schema.
    pub tables: Vec<TableNode>,
    /// Whether this is the connection's default schema.
    #[serde(default, rename = "isDefault")]
    pub is_default: bool,
}

impl SchemaNode {
    /// Creates a schema node.
    #[must_use]
    pub fn new(name: impl Into<String>, tables: Vec<TableNode>) -> Self {
        Self {
            name: name.into(),
            tables,
            is_default: false,
        }
    }

    /// Looks up a column's semantic type within this schema.
    #[must_use]
    pub fn column_type(&self, table: &str, column: &str) -> Option<SemanticType> {
        self.tables
            .iter()
            .find(|t| t.name == table)?
            .columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.semantic_type)
    }
}

/// The full schema model of one connection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaModel {
    /// Child schemas.
    pub schemas: Vec<SchemaNode>,
}

impl SchemaModel {
    /// Creates a schema model.
    #[must_use]
    pub fn new(schemas: Vec<SchemaNode>) -> Self {
        Self { schemas }
    }

    /// Resolves and flags the default schema: the first schema matching
    /// the configured database name, then the configured user name,
    /// then `"public"`, else the first child. Returns the winner's
    /// name.
    pub fn resolve_default(&mut self, database: Option<&str>, user: Option<&str>) -> Option<String> {
        let index = self
            .find_index(database)
            .or_else(|| self.find_index(user))
            .or_else(|| self.find_index(Some("public")))
            .or(if self.schemas.is_empty() { None } else { Some(0) })?;
        for (i, schema) in self.schemas.iter_mut().enumerate() {
            schema.is_default = i == index;
        }
        Some(self.schemas[index].name.clone())
    }

    fn find_index(&self, name: Option<&str>) -> Option<usize> {
        let name = name?;
        self.schemas.iter().position(|s| s.name == name)
    }

    /// The currently flagged default schema, if any.
    #[must_use]
    pub fn default_schema(&self) -> Option<&SchemaNode> {
        self.schemas.iter().find(|s| s.is_default)
    }

    /// Looks up a column's semantic type in the default schema first,
    /// then in every other schema.
    #[must_use]
    pub fn column_type(&self, table: &str, column: &str) -> Option<SemanticType> {
        if let Some(ty) = self
            .default_schema()
            .and_then(|s| s.column_type(table, column))
        {
            return Some(ty);
        }
        self.schemas
            .iter()
            .find_map(|s| s.column_type(table, column))
    }
}
