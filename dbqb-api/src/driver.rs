//! The driver seam: what the engine needs from a relational driver.

use std::time::Duration;

use crate::connection::ConnectionDescriptor;
use crate::dbms::query::{ReadPlan, Row};
use crate::dbms::table::{ColumnDescriptor, ForeignKeyDef, TableInfo, UniqueConstraint};
use crate::error::{DriverError, DriverResult};

/// The SQL dialect spoken by a connection; selects the type-code lookup table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Reports numeric type OIDs.
    Postgres,
    /// Reports declared type names.
    Sqlite,
    /// Reports declared type names with no dialect-specific knowledge.
    Generic,
}

/// A relational driver able to open [`Connection`]s.
pub trait Driver {
    /// The connection type opened by this driver.
    type Connection: Connection;

    /// Opens a new session for the given data source.
    fn connect(&self, descriptor: &ConnectionDescriptor) -> DriverResult<Self::Connection>;
}

/// A live session against one data source.
///
/// The constraint introspection operations are optional: the default implementations report
/// [`DriverError::Unsupported`], which the engine degrades to an empty result.
pub trait Connection {
    /// Returns the dialect of this connection.
    fn dialect(&self) -> Dialect;

    /// Lists every relation of the catalog.
    fn table_list(&mut self) -> DriverResult<Vec<TableInfo>>;

    /// Describes the columns of `table`, in driver order.
    fn columns(&mut self, table: &str) -> DriverResult<Vec<ColumnDescriptor>>;

    /// Lists the primary key columns of `table`, in key order.
    fn primary_key_columns(&mut self, _table: &str) -> DriverResult<Vec<String>> {
        Err(DriverError::Unsupported {
            operation: "primary_key_columns",
        })
    }

    /// Lists the unique constraints of `table`.
    fn unique_constraints(&mut self, _table: &str) -> DriverResult<Vec<UniqueConstraint>> {
        Err(DriverError::Unsupported {
            operation: "unique_constraints",
        })
    }

    /// Lists the foreign keys declared on `table`.
    fn foreign_keys(&mut self, _table: &str) -> DriverResult<Vec<ForeignKeyDef>> {
        Err(DriverError::Unsupported {
            operation: "foreign_keys",
        })
    }

    /// Executes a [`ReadPlan`], returning every row.
    fn read(&mut self, plan: &ReadPlan) -> DriverResult<Vec<Row>>;

    /// Bounds the duration of the statements issued from now on.
    fn set_timeout(&mut self, _timeout: Duration) -> DriverResult<()> {
        Ok(())
    }

    /// Releases the session.
    fn close(&mut self) -> DriverResult<()> {
        Ok(())
    }
}
