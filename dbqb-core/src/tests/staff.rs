//! Employees and teams referencing each other, with unusual column names.

use dbqb_api::prelude::{ColumnDescriptor, Dialect, ForeignKeyDef, TypeCode, Value};

use crate::memory::{MemoryDatabase, MemoryTable};

const INT8: u32 = 20;
const TEXT: u32 = 25;
const BOOL: u32 = 16;

pub fn employees() -> MemoryTable {
    MemoryTable::new("Employees")
        .column(ColumnDescriptor::new("id", TypeCode::Oid(INT8)).autofield())
        .column(ColumnDescriptor::new("First Name", TypeCode::Oid(TEXT)))
        .column(ColumnDescriptor::new("type", TypeCode::Oid(TEXT)))
        .column(ColumnDescriptor::new("2fa", TypeCode::Oid(BOOL)))
        .column(ColumnDescriptor::new("manager_id", TypeCode::Oid(INT8)).nullable())
        .column(ColumnDescriptor::new("team_id", TypeCode::Oid(INT8)).nullable())
        .primary_key(["id"])
        .foreign_key(ForeignKeyDef::new("manager_id", "Employees", "id"))
        .foreign_key(ForeignKeyDef::new("team_id", "teams", "id"))
        .row([
            Value::from(1_i64),
            Value::from("Ada"),
            Value::from("lead"),
            Value::from(true),
            Value::Null,
            Value::from(7_i64),
        ])
        .row([
            Value::from(2_i64),
            Value::from("Brian"),
            Value::from("dev"),
            Value::from(false),
            Value::from(1_i64),
            Value::from(7_i64),
        ])
}

pub fn teams() -> MemoryTable {
    MemoryTable::new("teams")
        .column(ColumnDescriptor::new("id", TypeCode::Oid(INT8)).autofield())
        .column(ColumnDescriptor::new("label", TypeCode::Oid(TEXT)))
        .column(ColumnDescriptor::new("lead_id", TypeCode::Oid(INT8)).nullable())
        .primary_key(["id"])
        .foreign_key(ForeignKeyDef::new("lead_id", "Employees", "id"))
        .row([Value::from(7_i64), Value::from("Core"), Value::from(1_i64)])
}

pub fn database() -> MemoryDatabase {
    MemoryDatabase::new(Dialect::Postgres)
        .with_table(employees())
        .with_table(teams())
}
