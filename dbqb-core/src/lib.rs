#![crate_name = "dbqb_core"]
#![crate_type = "lib"]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # dbqb core
//!
//! Introspects a relational data source whose schema is not known in advance, synthesizes a
//! relation-aware model for every table and reads every table back as generic [`Record`]s.
//!
//! ```
//! use dbqb_core::prelude::*;
//!
//! let database = MemoryDatabase::new(Dialect::Sqlite).with_table(
//!     MemoryTable::new("customers")
//!         .column(ColumnDescriptor::new("id", TypeCode::Name("integer".to_string())))
//!         .column(ColumnDescriptor::new("name", TypeCode::Name("varchar(50)".to_string())))
//!         .primary_key(["id"])
//!         .row([Value::from(1), Value::from("Alice")]),
//! );
//! let registry = MemoryRegistry::new().with(ConnectionDescriptor {
//!     name: "shop".to_string(),
//!     host: "localhost".to_string(),
//!     port: 5432,
//!     database: "shop".to_string(),
//!     user: "reader".to_string(),
//!     password: "secret".to_string(),
//! });
//! let driver = MemoryDriver::default().with_database("shop", database);
//!
//! let pipeline = Pipeline::new(registry, driver, ScanConfig::default());
//! let records = pipeline.select("shop").unwrap();
//! assert_eq!(records[0].value("name"), Some(&Value::from("Alice")));
//! ```
//!
//! [`Record`]: dbqb_api::prelude::Record

use std::time::Duration;

use dbqb_api::prelude::DriverError;
use thiserror::Error;

pub mod config;
pub mod memory;
pub mod pipeline;
pub mod prelude;
pub mod query;
pub mod registry;
pub mod schema;

/// dbqb Error type
#[derive(Debug, Error)]
pub enum DbqbError {
    #[error("Data source not found: {0}")]
    ConnectionNotFound(String),
    #[error("Failed to connect to data source '{data_source}': {source}")]
    Connect {
        data_source: String,
        #[source]
        source: DriverError,
    },
    #[error("Introspection failed during {operation}: {source}")]
    Introspection {
        operation: &'static str,
        #[source]
        source: DriverError,
    },
    #[error("Failed to read table '{table}': {source}")]
    Read {
        table: String,
        #[source]
        source: DriverError,
    },
    #[error("Malformed row read from '{table}': expected {expected} values, found {found}")]
    MalformedRow {
        table: String,
        expected: usize,
        found: usize,
    },
    #[error("Deadline of {budget:?} exceeded while {stage}")]
    DeadlineExceeded {
        stage: &'static str,
        budget: Duration,
    },
    #[error("Schema graph must be linked before it is queried")]
    NotLinked,
    #[error("Relation '{relation}' of model '{model}' targets table '{target}', which is not part of the schema")]
    UnresolvedRelation {
        model: String,
        relation: String,
        target: String,
    },
    #[error("Table '{table}' has a composite primary key ({}), which is not supported", .columns.join(", "))]
    CompositePrimaryKey { table: String, columns: Vec<String> },
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// dbqb Result type
pub type DbqbResult<T> = Result<T, DbqbError>;
