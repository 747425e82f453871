//! Prelude exposes all the types for `dbqb-api` crate.

pub use crate::connection::ConnectionDescriptor;
pub use crate::dbms::query::{BASE_ALIAS, JoinPlan, ReadPlan, ReadPlanBuilder, Row, quote_ident};
pub use crate::dbms::record::{Record, RecordValue};
pub use crate::dbms::table::{
    ColumnDescriptor, ForeignKeyDef, TableInfo, TableKind, TypeCode, UniqueConstraint,
};
pub use crate::dbms::types::*;
pub use crate::dbms::value::Value;
pub use crate::driver::{Connection, Dialect, Driver};
pub use crate::error::{DriverError, DriverResult};
