//! This module exposes the data types exchanged between the engine and the drivers.

pub mod query;
pub mod record;
pub mod table;
pub mod types;
pub mod value;
