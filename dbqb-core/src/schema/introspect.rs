//! Best-effort catalog introspection over one live connection.

use std::collections::{BTreeMap, BTreeSet};

use dbqb_api::prelude::{
    ColumnDescriptor, Connection, DriverError, DriverResult, TableInfo, TableKind,
};

use crate::config::ScanConfig;
use crate::{DbqbError, DbqbResult};

/// Everything known about one table after introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    pub name: String,
    pub kind: TableKind,
    pub comment: Option<String>,
    /// Columns in driver order.
    pub columns: Vec<ColumnDescriptor>,
    /// The primary key column kept for projection: the first one of the key.
    pub primary_key: Option<String>,
    /// Every primary key column, in key order.
    pub primary_key_columns: Vec<String>,
    /// Columns carrying a single-column unique constraint.
    pub unique_columns: BTreeSet<String>,
    /// Column sets of multi-column unique constraints.
    pub unique_together: Vec<Vec<String>>,
    /// Foreign keys: local column -> (target column, target table).
    pub foreign_keys: BTreeMap<String, (String, String)>,
}

impl TableDescriptor {
    /// Returns whether the primary key spans more than one column.
    pub fn has_composite_primary_key(&self) -> bool {
        self.primary_key_columns.len() > 1
    }
}

/// Issues the introspection operations against a connection.
///
/// Every operation is best effort: an unsupported capability or a failing statement yields an
/// empty result for that operation only, while a connectivity failure aborts the scan.
pub struct SchemaIntrospector<'a, C>
where
    C: Connection + ?Sized,
{
    connection: &'a mut C,
    config: &'a ScanConfig,
}

impl<'a, C> SchemaIntrospector<'a, C>
where
    C: Connection + ?Sized,
{
    pub fn new(connection: &'a mut C, config: &'a ScanConfig) -> Self {
        Self { connection, config }
    }

    /// Lists the tables, partitions and views selected by the config, sorted by name.
    ///
    /// Only a driver without catalog support yields an empty list; any other failure aborts.
    pub fn table_list(&mut self) -> DbqbResult<Vec<TableInfo>> {
        let tables = match self.connection.table_list() {
            Ok(tables) => tables,
            Err(DriverError::Unsupported { .. }) => {
                tracing::debug!("table listing not supported, assuming empty catalog");
                Vec::new()
            }
            Err(err) => {
                return Err(DbqbError::Introspection {
                    operation: "table_list",
                    source: err,
                });
            }
        };
        let mut tables = tables
            .into_iter()
            .filter(|table| self.config.includes(table))
            .collect::<Vec<_>>();
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        tables.dedup_by(|a, b| a.name == b.name);
        Ok(tables)
    }

    /// Describes the columns of `table`.
    ///
    /// Returns `None` when the table cannot be described at all.
    pub fn columns(&mut self, table: &str) -> DbqbResult<Option<Vec<ColumnDescriptor>>> {
        match self.connection.columns(table) {
            Ok(columns) => Ok(Some(columns)),
            Err(err) if err.is_connectivity() => Err(DbqbError::Introspection {
                operation: "columns",
                source: err,
            }),
            Err(err) => {
                tracing::warn!(table, error = %err, "unable to inspect table, skipping it");
                Ok(None)
            }
        }
    }

    /// Lists the primary key columns of `table`.
    pub fn primary_key_columns(&mut self, table: &str) -> DbqbResult<Vec<String>> {
        let result = self.connection.primary_key_columns(table);
        degrade("primary_key_columns", Some(table), result)
    }

    /// Returns the single-column unique set and the multi-column unique sets of `table`.
    pub fn unique_constraints(
        &mut self,
        table: &str,
    ) -> DbqbResult<(BTreeSet<String>, Vec<Vec<String>>)> {
        let result = self.connection.unique_constraints(table);
        let constraints = degrade("unique_constraints", Some(table), result)?;

        let mut single = BTreeSet::new();
        let mut together = Vec::new();
        for constraint in constraints {
            match constraint.single_column() {
                Some(column) => {
                    single.insert(column.to_string());
                }
                None if !constraint.columns.is_empty() => together.push(constraint.columns),
                None => {}
            }
        }
        Ok((single, together))
    }

    /// Maps the foreign key columns of `table` to their (target column, target table).
    pub fn foreign_keys(&mut self, table: &str) -> DbqbResult<BTreeMap<String, (String, String)>> {
        let result = self.connection.foreign_keys(table);
        Ok(degrade("foreign_keys", Some(table), result)?
            .into_iter()
            .map(|fk| (fk.local_column, (fk.foreign_column, fk.foreign_table)))
            .collect())
    }

    /// Runs every operation for `table` and assembles its [`TableDescriptor`].
    ///
    /// Returns `None` when the table's columns cannot be described.
    pub fn describe(&mut self, table: &TableInfo) -> DbqbResult<Option<TableDescriptor>> {
        let Some(columns) = self.columns(&table.name)? else {
            return Ok(None);
        };
        let primary_key_columns = self.primary_key_columns(&table.name)?;
        let (unique_columns, unique_together) = self.unique_constraints(&table.name)?;
        let foreign_keys = self.foreign_keys(&table.name)?;

        tracing::debug!(
            table = %table.name,
            columns = columns.len(),
            primary_key = ?primary_key_columns,
            foreign_keys = foreign_keys.len(),
            "table described"
        );

        Ok(Some(TableDescriptor {
            name: table.name.clone(),
            kind: table.kind,
            comment: table.comment.clone(),
            columns,
            primary_key: primary_key_columns.first().cloned(),
            primary_key_columns,
            unique_columns,
            unique_together,
            foreign_keys,
        }))
    }
}

/// Turns a non-fatal driver failure into an empty result.
fn degrade<T>(operation: &'static str, table: Option<&str>, result: DriverResult<T>) -> DbqbResult<T>
where
    T: Default,
{
    match result {
        Ok(value) => Ok(value),
        Err(err) if err.is_connectivity() => Err(DbqbError::Introspection {
            operation,
            source: err,
        }),
        Err(DriverError::Unsupported { .. }) => {
            tracing::debug!(operation, table, "capability not supported, assuming empty");
            Ok(T::default())
        }
        Err(err) => {
            tracing::warn!(operation, table, error = %err, "introspection failed, assuming empty");
            Ok(T::default())
        }
    }
}
