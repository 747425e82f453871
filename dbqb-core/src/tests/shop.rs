//! Orders and customers, as a Postgres-like driver reports them.
//!
//! `orders.coupon_id` references `coupons`, which is not part of the catalog.

use dbqb_api::prelude::{
    ColumnDescriptor, Decimal, Dialect, ForeignKeyDef, TypeCode, Value,
};

use crate::memory::{MemoryDatabase, MemoryTable};

const INT4: u32 = 23;
const VARCHAR: u32 = 1043;
const NUMERIC: u32 = 1700;

fn total(cents: i64) -> Value {
    Value::Decimal(Decimal::from(rust_decimal::Decimal::new(cents, 2)))
}

pub fn customers() -> MemoryTable {
    MemoryTable::new("customers")
        .column(
            ColumnDescriptor::new("id", TypeCode::Oid(INT4))
                .default_expr("nextval('customers_id_seq'::regclass)"),
        )
        .column(ColumnDescriptor::new("name", TypeCode::Oid(VARCHAR)).display_size(50))
        .primary_key(["id"])
        .row([Value::from(1), Value::from("Alice")])
        .row([Value::from(2), Value::from("Bob")])
}

pub fn orders() -> MemoryTable {
    MemoryTable::new("orders")
        .column(ColumnDescriptor::new("id", TypeCode::Oid(INT4)).autofield())
        .column(ColumnDescriptor::new("customer_id", TypeCode::Oid(INT4)).nullable())
        .column(ColumnDescriptor::new("total", TypeCode::Oid(NUMERIC)).numeric(10, 2))
        .column(ColumnDescriptor::new("coupon_id", TypeCode::Oid(INT4)).nullable())
        .primary_key(["id"])
        .foreign_key(ForeignKeyDef::new("customer_id", "customers", "id"))
        .foreign_key(ForeignKeyDef::new("coupon_id", "coupons", "id"))
        .row([Value::from(100), Value::from(1), total(1999), Value::from(5)])
        .row([Value::from(101), Value::from(2), total(500), Value::Null])
        .row([Value::from(102), Value::Null, total(42), Value::Null])
}

pub fn database() -> MemoryDatabase {
    MemoryDatabase::new(Dialect::Postgres)
        .with_table(orders())
        .with_table(customers())
}
