//! Scan configuration.
//!
//! Every key is optional; a missing key takes its default value:
//!
//! ```toml
//! include_views = true
//! include_partitions = true
//! tables = ["orders", "customers"]
//! identity_column = "id"
//! deadline_ms = 30000
//! unresolved_relation = "omit"
//! composite_primary_key = "first_column"
//! ```

use std::path::Path;
use std::time::Duration;

use dbqb_api::prelude::{TableInfo, TableKind};
use serde::Deserialize;

use crate::DbqbResult;

/// Default deadline of one scan, in milliseconds.
pub const DEFAULT_DEADLINE_MS: u64 = 30_000;

/// Default name of the conventional integer identity column.
pub const DEFAULT_IDENTITY_COLUMN: &str = "id";

/// What happens to a relation whose target table is not part of the schema graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedRelationPolicy {
    /// Drop the relation and record a note on the model.
    #[default]
    Omit,
    /// Fail the scan.
    Error,
}

/// What happens to a table whose primary key spans more than one column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositePrimaryKeyPolicy {
    /// Keep the first column as primary key and record a note on the model.
    #[default]
    FirstColumn,
    /// Fail the scan.
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub include_views: bool,
    pub include_partitions: bool,
    /// When set, only these tables are scanned.
    pub tables: Option<Vec<String>>,
    pub identity_column: String,
    pub deadline_ms: u64,
    pub unresolved_relation: UnresolvedRelationPolicy,
    pub composite_primary_key: CompositePrimaryKeyPolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include_views: true,
            include_partitions: true,
            tables: None,
            identity_column: DEFAULT_IDENTITY_COLUMN.to_string(),
            deadline_ms: DEFAULT_DEADLINE_MS,
            unresolved_relation: UnresolvedRelationPolicy::default(),
            composite_primary_key: CompositePrimaryKeyPolicy::default(),
        }
    }
}

impl ScanConfig {
    /// Parses a config from a TOML document.
    pub fn from_toml_str(s: &str) -> DbqbResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Reads and parses the TOML config file at `path`.
    pub fn load(path: impl AsRef<Path>) -> DbqbResult<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading scan config");
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Returns the deadline of one scan.
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    /// Returns whether `table` must be scanned.
    pub fn includes(&self, table: &TableInfo) -> bool {
        let kind_included = match table.kind {
            TableKind::Table => true,
            TableKind::Partition => self.include_partitions,
            TableKind::View => self.include_views,
        };
        kind_included
            && self
                .tables
                .as_ref()
                .is_none_or(|tables| tables.iter().any(|name| name == &table.name))
    }
}
