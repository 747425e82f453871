//! Products and categories, as a SQLite-like driver reports them.
//!
//! `products` references `categories` twice; `product_tags` has a two-column primary key.

use dbqb_api::prelude::{
    ColumnDescriptor, Dialect, ForeignKeyDef, TableKind, TypeCode, UniqueConstraint, Value,
};

use crate::memory::{MemoryDatabase, MemoryTable};

fn declared(name: &str, declared: &str) -> ColumnDescriptor {
    ColumnDescriptor::new(name, TypeCode::Name(declared.to_string()))
}

pub fn categories() -> MemoryTable {
    MemoryTable::new("categories")
        .column(declared("id", "INTEGER"))
        .column(declared("title", "VARCHAR(40)"))
        .primary_key(["id"])
        .row([Value::from(1), Value::from("Books")])
        .row([Value::from(2), Value::from("Music")])
}

pub fn products() -> MemoryTable {
    MemoryTable::new("products")
        .column(declared("id", "INTEGER"))
        .column(declared("sku", "TEXT"))
        .column(declared("category_id", "INTEGER"))
        .column(declared("category", "INTEGER").nullable())
        .column(declared("location", "POINT").nullable())
        .primary_key(["id"])
        .unique(UniqueConstraint::new("products_sku", ["sku"]))
        .foreign_key(ForeignKeyDef::new("category_id", "categories", "id"))
        .foreign_key(ForeignKeyDef::new("category", "categories", "id"))
        .row([
            Value::from(1),
            Value::from("BK-1"),
            Value::from(1),
            Value::from(2),
            Value::Null,
        ])
        .row([
            Value::from(2),
            Value::from("MU-1"),
            Value::from(2),
            Value::Null,
            Value::from("(1,2)"),
        ])
}

pub fn product_tags() -> MemoryTable {
    MemoryTable::new("product_tags")
        .column(declared("product_sku", "TEXT"))
        .column(declared("tag", "TEXT"))
        .column(declared("weight", "REAL").nullable())
        .primary_key(["product_sku", "tag"])
        .row([Value::from("BK-1"), Value::from("paper"), Value::Null])
}

pub fn category_report() -> MemoryTable {
    MemoryTable::new("category_report")
        .kind(TableKind::View)
        .column(declared("title", "TEXT"))
        .column(declared("products", "INTEGER"))
        .row([Value::from("Books"), Value::from(1)])
}

pub fn database() -> MemoryDatabase {
    MemoryDatabase::new(Dialect::Sqlite)
        .with_table(products())
        .with_table(categories())
        .with_table(product_tags())
        .with_table(category_report())
}
