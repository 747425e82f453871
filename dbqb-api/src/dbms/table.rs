//! This module contains the raw table metadata a driver reports during introspection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of relation reported by the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Table,
    Partition,
    View,
}

/// A relation listed by the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableInfo {
    /// The name of the relation.
    pub name: String,
    /// Whether it is a plain table, a partition or a view.
    pub kind: TableKind,
    /// Comment attached to the relation, if any.
    pub comment: Option<String>,
}

impl TableInfo {
    pub fn new(name: impl Into<String>, kind: TableKind) -> Self {
        Self {
            name: name.into(),
            kind,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// The type code a driver reports for a column.
///
/// Postgres-like drivers report numeric type OIDs, SQLite-like drivers report the declared type name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeCode {
    Oid(u32),
    Name(String),
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeCode::Oid(oid) => write!(f, "{oid}"),
            TypeCode::Name(name) => write!(f, "{name}"),
        }
    }
}

/// Describes a column as reported by the driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// The name of the column.
    pub name: String,
    /// Driver type code.
    pub type_code: TypeCode,
    /// Indicates if this column can contain NULL values.
    pub nullable: bool,
    /// Maximum display size (e.g. `varchar(n)` length), if reported.
    pub display_size: Option<u32>,
    /// Internal storage size, if reported.
    pub internal_size: Option<i32>,
    /// Numeric precision, if reported.
    pub precision: Option<u32>,
    /// Numeric scale, if reported.
    pub scale: Option<u32>,
    /// Default expression, as text.
    pub default: Option<String>,
    /// Collation name, if any.
    pub collation: Option<String>,
    /// Column comment, if any.
    pub comment: Option<String>,
    /// Whether the column is backed by an identity / serial generator.
    pub is_autofield: bool,
}

impl ColumnDescriptor {
    /// Creates a non-nullable column with no refinements.
    pub fn new(name: impl Into<String>, type_code: TypeCode) -> Self {
        Self {
            name: name.into(),
            type_code,
            nullable: false,
            display_size: None,
            internal_size: None,
            precision: None,
            scale: None,
            default: None,
            collation: None,
            comment: None,
            is_autofield: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn display_size(mut self, size: u32) -> Self {
        self.display_size = Some(size);
        self
    }

    pub fn numeric(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    pub fn default_expr(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn autofield(mut self) -> Self {
        self.is_autofield = true;
        self
    }
}

/// Defines a foreign key relationship for a column.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ForeignKeyDef {
    /// Name of the local column that holds the foreign key (e.g. "user_id")
    pub local_column: String,
    /// Name of the foreign table (e.g. "users")
    pub foreign_table: String,
    /// Name of the foreign column that the FK points to (e.g. "id")
    pub foreign_column: String,
}

impl ForeignKeyDef {
    pub fn new(
        local_column: impl Into<String>,
        foreign_table: impl Into<String>,
        foreign_column: impl Into<String>,
    ) -> Self {
        Self {
            local_column: local_column.into(),
            foreign_table: foreign_table.into(),
            foreign_column: foreign_column.into(),
        }
    }
}

/// A unique constraint, possibly spanning several columns.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UniqueConstraint {
    pub name: String,
    pub columns: Vec<String>,
}

impl UniqueConstraint {
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the only column of a single-column constraint.
    pub fn single_column(&self) -> Option<&str> {
        match self.columns.as_slice() {
            [column] => Some(column.as_str()),
            _ => None,
        }
    }
}
