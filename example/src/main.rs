//! Scans an in-memory shop and prints its models and rows as JSON.
//!
//! Usage: `dbqb-example [config.toml]`. Log verbosity follows `RUST_LOG` (default `info`).

use std::error::Error;

use dbqb_core::prelude::*;
use tracing_subscriber::EnvFilter;

const DATA_SOURCE: &str = "shop";

fn price(cents: i64) -> Value {
    Value::Decimal(Decimal::from(rust_decimal::Decimal::new(cents, 2)))
}

fn shop() -> MemoryDatabase {
    MemoryDatabase::new(Dialect::Postgres)
        .with_table(
            MemoryTable::new("customers")
                .column(ColumnDescriptor::new("id", TypeCode::Oid(23)).autofield())
                .column(ColumnDescriptor::new("name", TypeCode::Oid(1043)).display_size(50))
                .column(ColumnDescriptor::new("Email Address", TypeCode::Oid(1043)).nullable())
                .primary_key(["id"])
                .unique(UniqueConstraint::new("customers_email_key", ["Email Address"]))
                .row([Value::from(1), Value::from("Alice"), Value::from("alice@example.com")])
                .row([Value::from(2), Value::from("Bob"), Value::Null]),
        )
        .with_table(
            MemoryTable::new("orders")
                .column(ColumnDescriptor::new("id", TypeCode::Oid(23)).autofield())
                .column(ColumnDescriptor::new("customer_id", TypeCode::Oid(23)))
                .column(ColumnDescriptor::new("total", TypeCode::Oid(1700)).numeric(10, 2))
                .column(ColumnDescriptor::new("shipped", TypeCode::Oid(16)))
                .primary_key(["id"])
                .foreign_key(ForeignKeyDef::new("customer_id", "customers", "id"))
                .row([Value::from(10), Value::from(1), price(1999), Value::from(true)])
                .row([Value::from(11), Value::from(2), price(500), Value::from(false)]),
        )
        .with_table(
            MemoryTable::new("order_report")
                .kind(TableKind::View)
                .column(ColumnDescriptor::new("customer", TypeCode::Oid(25)))
                .column(ColumnDescriptor::new("orders", TypeCode::Oid(20)))
                .row([Value::from("Alice"), Value::from(1_i64)])
                .row([Value::from("Bob"), Value::from(1_i64)]),
        )
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ScanConfig::load(path)?,
        None => ScanConfig::default(),
    };

    let registry = MemoryRegistry::new().with(ConnectionDescriptor {
        name: DATA_SOURCE.to_string(),
        host: "localhost".to_string(),
        port: 5432,
        database: "shop".to_string(),
        user: "reader".to_string(),
        password: "secret".to_string(),
    });
    let driver = MemoryDriver::default().with_database("shop", shop());
    let pipeline = Pipeline::new(registry, driver, config);

    let graph = pipeline.scan(DATA_SOURCE)?;
    let models = graph.models().collect::<Vec<_>>();
    println!("{}", serde_json::to_string_pretty(&models)?);

    let records = pipeline.select(DATA_SOURCE)?;
    tracing::info!(rows = records.len(), "rows selected");
    println!("{}", serde_json::to_string_pretty(&records)?);

    Ok(())
}
