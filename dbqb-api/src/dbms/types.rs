//! This module exposes the scalar data types a driver can hand back from a read.

mod blob;
mod boolean;
mod date;
mod datetime;
mod decimal;
mod float64;
mod int32;
mod int64;
mod json;
mod text;
mod time;
mod uuid;

pub use self::blob::Blob;
pub use self::boolean::Boolean;
pub use self::date::Date;
pub use self::datetime::DateTime;
pub use self::decimal::Decimal;
pub use self::float64::Float64;
pub use self::int32::Int32;
pub use self::int64::Int64;
pub use self::json::Json;
pub use self::text::Text;
pub use self::time::Time;
pub use self::uuid::Uuid;
