use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer 32-bit data type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Int32(pub i32);

impl fmt::Display for Int32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for Int32 {
    fn from(value: i32) -> Self {
        Int32(value)
    }
}
