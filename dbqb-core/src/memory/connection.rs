use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use dbqb_api::prelude::{
    ColumnDescriptor, Connection, Dialect, DriverError, DriverResult, ForeignKeyDef, JoinPlan,
    ReadPlan, Row, TableInfo, UniqueConstraint, Value,
};

use super::Counters;
use super::database::{MemoryDatabase, MemoryTable};

/// A session on a [`MemoryDatabase`].
#[derive(Debug)]
pub struct MemoryConnection {
    database: Arc<MemoryDatabase>,
    counters: Arc<Counters>,
    timeout: Option<Duration>,
    lost: bool,
    closed: bool,
}

impl MemoryConnection {
    pub(super) fn new(database: Arc<MemoryDatabase>, counters: Arc<Counters>) -> Self {
        Self {
            database,
            counters,
            timeout: None,
            lost: false,
            closed: false,
        }
    }

    /// Returns the statement timeout last set on this connection.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Checks the session is usable and applies the configured latency.
    fn begin(&self) -> DriverResult<()> {
        if self.closed || self.lost {
            return Err(DriverError::Connection("connection already closed".to_string()));
        }
        match (self.database.latency, self.timeout) {
            (Some(latency), Some(timeout)) if latency > timeout => {
                std::thread::sleep(timeout);
                Err(DriverError::Timeout)
            }
            (Some(latency), _) => {
                std::thread::sleep(latency);
                Ok(())
            }
            (None, _) => Ok(()),
        }
    }

    fn table(&self, name: &str) -> DriverResult<&MemoryTable> {
        self.database
            .table(name)
            .ok_or_else(|| DriverError::Query(format!("relation \"{name}\" does not exist")))
    }

    fn column_index(table: &MemoryTable, column: &str) -> DriverResult<usize> {
        table.column_index(column).ok_or_else(|| {
            DriverError::Query(format!(
                "column \"{column}\" of relation \"{}\" does not exist",
                table.name()
            ))
        })
    }

    /// Returns the rows of `join` matching `local`; a single row of nulls when none does.
    fn join_rows(&self, join: &JoinPlan, local: &Value) -> DriverResult<Vec<Row>> {
        let table = self.table(&join.table)?;
        let foreign = Self::column_index(table, &join.foreign_column)?;
        let selected = join
            .columns
            .iter()
            .map(|column| Self::column_index(table, column))
            .collect::<DriverResult<Vec<_>>>()?;

        let matches = table
            .rows
            .iter()
            .filter(|row| row.get(foreign).is_some_and(|value| value.sql_eq(local)))
            .map(|row| project(row, &selected))
            .collect::<Vec<_>>();
        if matches.is_empty() {
            Ok(vec![vec![Value::Null; selected.len()]])
        } else {
            Ok(matches)
        }
    }
}

/// Picks the values at `indexes` out of `row`; missing cells read as null.
fn project(row: &[Value], indexes: &[usize]) -> Row {
    indexes
        .iter()
        .map(|index| row.get(*index).cloned().unwrap_or(Value::Null))
        .collect()
}

impl Connection for MemoryConnection {
    fn dialect(&self) -> Dialect {
        self.database.dialect
    }

    fn table_list(&mut self) -> DriverResult<Vec<TableInfo>> {
        self.begin()?;
        if let Some(message) = &self.database.catalog_error {
            return Err(DriverError::Query(message.clone()));
        }
        Ok(self.database.tables.iter().map(|t| t.info.clone()).collect())
    }

    fn columns(&mut self, table: &str) -> DriverResult<Vec<ColumnDescriptor>> {
        self.begin()?;
        if self.database.connection_drops.contains(table) {
            self.lost = true;
            return Err(DriverError::Connection(
                "server closed the connection unexpectedly".to_string(),
            ));
        }
        Ok(self.table(table)?.columns.clone())
    }

    fn primary_key_columns(&mut self, table: &str) -> DriverResult<Vec<String>> {
        self.begin()?;
        if !self.database.capabilities.primary_keys {
            return Err(DriverError::Unsupported {
                operation: "primary_key_columns",
            });
        }
        Ok(self.table(table)?.primary_key.clone())
    }

    fn unique_constraints(&mut self, table: &str) -> DriverResult<Vec<UniqueConstraint>> {
        self.begin()?;
        if !self.database.capabilities.unique_constraints {
            return Err(DriverError::Unsupported {
                operation: "unique_constraints",
            });
        }
        Ok(self.table(table)?.uniques.clone())
    }

    fn foreign_keys(&mut self, table: &str) -> DriverResult<Vec<ForeignKeyDef>> {
        self.begin()?;
        if !self.database.capabilities.foreign_keys {
            return Err(DriverError::Unsupported {
                operation: "foreign_keys",
            });
        }
        Ok(self.table(table)?.foreign_keys.clone())
    }

    fn read(&mut self, plan: &ReadPlan) -> DriverResult<Vec<Row>> {
        self.begin()?;
        if self.database.failing_reads.contains(&plan.table) {
            return Err(DriverError::Query(format!(
                "permission denied for table {}",
                plan.table
            )));
        }

        let base = self.table(&plan.table)?;
        let selected = plan
            .columns
            .iter()
            .map(|column| Self::column_index(base, column))
            .collect::<DriverResult<Vec<_>>>()?;
        let locals = plan
            .joins
            .iter()
            .map(|join| Self::column_index(base, &join.local_column))
            .collect::<DriverResult<Vec<_>>>()?;

        let mut rows = Vec::with_capacity(base.rows.len());
        for base_row in &base.rows {
            // every join multiplies the partial rows by its matches
            let mut partial = vec![project(base_row, &selected)];
            for (join, local) in plan.joins.iter().zip(&locals) {
                let local_value = base_row.get(*local).cloned().unwrap_or(Value::Null);
                let matches = self.join_rows(join, &local_value)?;
                partial = partial
                    .into_iter()
                    .flat_map(|row| {
                        matches.iter().map(move |matched| {
                            let mut row = row.clone();
                            row.extend(matched.iter().cloned());
                            row
                        })
                    })
                    .collect();
            }
            rows.extend(partial);
        }

        tracing::trace!(sql = %plan.to_sql(), rows = rows.len(), "memory read");
        Ok(rows)
    }

    fn set_timeout(&mut self, timeout: Duration) -> DriverResult<()> {
        self.timeout = Some(timeout);
        Ok(())
    }

    fn close(&mut self) -> DriverResult<()> {
        if !self.closed {
            self.closed = true;
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {

    use dbqb_api::prelude::TypeCode;

    use super::*;
    use crate::memory::MemoryDriver;

    fn int(name: &str) -> ColumnDescriptor {
        ColumnDescriptor::new(name, TypeCode::Name("integer".to_string()))
    }

    fn text(name: &str) -> ColumnDescriptor {
        ColumnDescriptor::new(name, TypeCode::Name("text".to_string()))
    }

    fn connection() -> MemoryConnection {
        let database = MemoryDatabase::new(Dialect::Sqlite)
            .with_table(
                MemoryTable::new("customers")
                    .column(int("id"))
                    .column(text("name"))
                    .primary_key(["id"])
                    .row([Value::from(1), Value::from("Alice")])
                    .row([Value::from(2), Value::from("Bob")]),
            )
            .with_table(
                MemoryTable::new("orders")
                    .column(int("id"))
                    .column(int("customer_id"))
                    .primary_key(["id"])
                    .row([Value::from(10), Value::from(1)])
                    .row([Value::from(11), Value::from(3)])
                    .row([Value::from(12), Value::Null]),
            );
        MemoryDriver::default()
            .with_database("shop", database)
            .open("shop")
            .unwrap()
    }

    #[test]
    fn test_should_read_base_table() {
        let mut connection = connection();
        let plan = ReadPlan::builder("customers").columns(["name", "id"]).build();
        let rows = connection.read(&plan).unwrap();
        assert_eq!(
            rows,
            vec![
                vec![Value::from("Alice"), Value::from(1)],
                vec![Value::from("Bob"), Value::from(2)],
            ]
        );
    }

    #[test]
    fn test_should_left_join() {
        let mut connection = connection();
        let plan = ReadPlan::builder("orders")
            .column("id")
            .join("customers", "customer_id", "id", ["id", "name"])
            .build();
        let rows = connection.read(&plan).unwrap();
        assert_eq!(
            rows,
            vec![
                vec![Value::from(10), Value::from(1), Value::from("Alice")],
                vec![Value::from(11), Value::Null, Value::Null],
                vec![Value::from(12), Value::Null, Value::Null],
            ]
        );
    }

    #[test]
    fn test_should_report_unknown_column() {
        let mut connection = connection();
        let plan = ReadPlan::builder("orders").column("total").build();
        assert!(matches!(
            connection.read(&plan).unwrap_err(),
            DriverError::Query(_)
        ));
    }

    #[test]
    fn test_should_refuse_operations_after_close() {
        let mut connection = connection();
        connection.close().unwrap();
        assert!(connection.is_closed());
        assert!(connection.table_list().unwrap_err().is_connectivity());
    }

    #[test]
    fn test_should_time_out_slow_operations() {
        let mut database = MemoryDatabase::new(Dialect::Sqlite);
        database.set_latency(Duration::from_millis(50));
        let mut connection = MemoryDriver::default()
            .with_database("slow", database)
            .open("slow")
            .unwrap();
        connection.set_timeout(Duration::from_millis(1)).unwrap();
        assert_eq!(connection.timeout(), Some(Duration::from_millis(1)));
        assert!(matches!(
            connection.table_list().unwrap_err(),
            DriverError::Timeout
        ));
    }
}
