use std::collections::HashSet;
use std::time::Duration;

use dbqb_api::prelude::{
    ColumnDescriptor, Dialect, ForeignKeyDef, TableInfo, TableKind, UniqueConstraint, Value,
};

/// The optional introspection capabilities a [`MemoryDatabase`] reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub primary_keys: bool,
    pub unique_constraints: bool,
    pub foreign_keys: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            primary_keys: true,
            unique_constraints: true,
            foreign_keys: true,
        }
    }
}

/// A table held in memory: its catalog metadata and its rows.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryTable {
    pub(super) info: TableInfo,
    pub(super) columns: Vec<ColumnDescriptor>,
    pub(super) primary_key: Vec<String>,
    pub(super) uniques: Vec<UniqueConstraint>,
    pub(super) foreign_keys: Vec<ForeignKeyDef>,
    /// Rows, one value per column in column order.
    pub(super) rows: Vec<Vec<Value>>,
}

impl MemoryTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: TableInfo::new(name, TableKind::Table),
            columns: Vec::new(),
            primary_key: Vec::new(),
            uniques: Vec::new(),
            foreign_keys: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn kind(mut self, kind: TableKind) -> Self {
        self.info.kind = kind;
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.info.comment = Some(comment.into());
        self
    }

    pub fn column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }

    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn unique(mut self, constraint: UniqueConstraint) -> Self {
        self.uniques.push(constraint);
        self
    }

    pub fn foreign_key(mut self, foreign_key: ForeignKeyDef) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Appends a row; values are given in column order.
    pub fn row<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.rows.push(values.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the index of `column`.
    pub(super) fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == column)
    }
}

/// A set of [`MemoryTable`]s served by a [`super::MemoryDriver`].
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryDatabase {
    pub(super) dialect: Dialect,
    pub(super) tables: Vec<MemoryTable>,
    pub(super) capabilities: Capabilities,
    /// Tables whose reads fail with a query error.
    pub(super) failing_reads: HashSet<String>,
    /// Tables whose description drops the connection.
    pub(super) connection_drops: HashSet<String>,
    /// Query error returned when listing tables.
    pub(super) catalog_error: Option<String>,
    /// Delay applied to every operation.
    pub(super) latency: Option<Duration>,
}

impl MemoryDatabase {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            tables: Vec::new(),
            capabilities: Capabilities::default(),
            failing_reads: HashSet::new(),
            connection_drops: HashSet::new(),
            catalog_error: None,
            latency: None,
        }
    }

    /// Adds `table`, replacing a table with the same name.
    pub fn add_table(&mut self, table: MemoryTable) {
        match self.tables.iter_mut().find(|t| t.name() == table.name()) {
            Some(existing) => *existing = table,
            None => self.tables.push(table),
        }
    }

    pub fn with_table(mut self, table: MemoryTable) -> Self {
        self.add_table(table);
        self
    }

    pub fn set_capabilities(&mut self, capabilities: Capabilities) {
        self.capabilities = capabilities;
    }

    /// Makes every read of `table` fail.
    pub fn fail_reads_of(&mut self, table: impl Into<String>) {
        self.failing_reads.insert(table.into());
    }

    /// Makes describing the columns of `table` drop the connection.
    pub fn drop_connection_on(&mut self, table: impl Into<String>) {
        self.connection_drops.insert(table.into());
    }

    /// Makes listing the tables fail with a query error carrying `message`.
    pub fn fail_table_list(&mut self, message: impl Into<String>) {
        self.catalog_error = Some(message.into());
    }

    /// Delays every operation by `latency`.
    pub fn set_latency(&mut self, latency: Duration) {
        self.latency = Some(latency);
    }

    pub(super) fn table(&self, name: &str) -> Option<&MemoryTable> {
        self.tables.iter().find(|t| t.name() == name)
    }
}
