//! In-memory reference driver.
//!
//! [`MemoryDriver`] implements the driver seam over heap-held tables. Capabilities can be
//! switched off and failures injected, so every degradation path of the engine can be exercised
//! without a database server.

mod connection;
mod database;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dbqb_api::prelude::{ConnectionDescriptor, Driver, DriverError, DriverResult};

pub use self::connection::MemoryConnection;
pub use self::database::{Capabilities, MemoryDatabase, MemoryTable};

/// Session counters shared by a driver and the connections it opens.
#[derive(Debug, Default)]
struct Counters {
    attempts: AtomicUsize,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// A driver serving [`MemoryDatabase`]s, keyed by database name.
///
/// Clones share the same databases and counters.
#[derive(Debug, Clone, Default)]
pub struct MemoryDriver {
    databases: HashMap<String, Arc<MemoryDatabase>>,
    counters: Arc<Counters>,
    unreachable: bool,
}

impl MemoryDriver {
    /// Registers `database` under `name`.
    pub fn with_database(mut self, name: impl Into<String>, database: MemoryDatabase) -> Self {
        self.databases.insert(name.into(), Arc::new(database));
        self
    }

    /// Makes every connection attempt fail.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Opens a session on the database registered as `database`.
    pub fn open(&self, database: &str) -> DriverResult<MemoryConnection> {
        self.counters.attempts.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(DriverError::Connection(
                "could not connect to server".to_string(),
            ));
        }
        let database = self.databases.get(database).cloned().ok_or_else(|| {
            DriverError::Connection(format!("database \"{database}\" does not exist"))
        })?;
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryConnection::new(database, Arc::clone(&self.counters)))
    }

    /// Number of connection attempts, successful or not.
    pub fn attempts(&self) -> usize {
        self.counters.attempts.load(Ordering::SeqCst)
    }

    /// Number of connections opened.
    pub fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Number of connections closed.
    pub fn closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }

    /// Number of connections opened and not closed yet.
    pub fn open_connections(&self) -> usize {
        self.opened().saturating_sub(self.closed())
    }
}

impl Driver for MemoryDriver {
    type Connection = MemoryConnection;

    fn connect(&self, descriptor: &ConnectionDescriptor) -> DriverResult<Self::Connection> {
        tracing::debug!(
            data_source = %descriptor.name,
            database = %descriptor.database,
            "opening memory connection"
        );
        self.open(&descriptor.database)
    }
}

#[cfg(test)]
mod tests {

    use dbqb_api::prelude::{Connection, Dialect};

    use super::*;

    fn descriptor(database: &str) -> ConnectionDescriptor {
        ConnectionDescriptor {
            name: "main".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            database: database.to_string(),
            user: "reader".to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn test_should_connect_to_registered_database() {
        let driver =
            MemoryDriver::default().with_database("shop", MemoryDatabase::new(Dialect::Sqlite));
        let mut connection = driver.connect(&descriptor("shop")).unwrap();
        assert_eq!(connection.dialect(), Dialect::Sqlite);
        assert_eq!(driver.opened(), 1);
        assert_eq!(driver.open_connections(), 1);

        connection.close().unwrap();
        connection.close().unwrap();
        assert_eq!(driver.closed(), 1);
        assert_eq!(driver.open_connections(), 0);
    }

    #[test]
    fn test_should_fail_on_unknown_database() {
        let driver = MemoryDriver::default();
        let err = driver.connect(&descriptor("shop")).unwrap_err();
        assert!(matches!(err, DriverError::Connection(_)));
        assert_eq!(driver.attempts(), 1);
        assert_eq!(driver.opened(), 0);
    }

    #[test]
    fn test_should_fail_when_unreachable() {
        let driver = MemoryDriver::default()
            .with_database("shop", MemoryDatabase::new(Dialect::Sqlite))
            .unreachable();
        assert!(driver.connect(&descriptor("shop")).is_err());
    }

    #[test]
    fn test_should_share_counters_between_clones() {
        let driver =
            MemoryDriver::default().with_database("shop", MemoryDatabase::new(Dialect::Sqlite));
        let handle = driver.clone();
        let _connection = driver.open("shop").unwrap();
        assert_eq!(handle.opened(), 1);
    }
}
