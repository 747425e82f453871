//! Read side of the engine: full-table reads of linked models and their assembly into records.

mod executor;
mod response;

pub use self::executor::{QueryExecutor, TablePlan};
pub use self::response::ResponseAssembler;
