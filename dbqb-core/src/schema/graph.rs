//! The schema graph owns every [`ProjectionModel`] of one scan.

use std::collections::{BTreeMap, HashSet};

use dbqb_api::prelude::TableInfo;

use crate::schema::link::LinkReport;
use crate::schema::normalize::normalize_table;
use crate::schema::projection::ProjectionModel;

/// Models keyed by table name, plus a model-name index.
///
/// The graph is built in two phases: every model is inserted, then the whole graph is linked
/// once by [`crate::schema::link::RelationLinker`]. Inserting a model after linking resets the
/// graph to unlinked.
#[derive(Debug, Clone, Default)]
pub struct SchemaGraph {
    models: BTreeMap<String, ProjectionModel>,
    names: BTreeMap<String, String>,
    link_report: Option<LinkReport>,
}

impl SchemaGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `model`, replacing the model of the same table if any.
    pub fn insert(&mut self, model: ProjectionModel) -> Option<ProjectionModel> {
        self.link_report = None;
        let name = model.name.clone();
        let table = model.table.clone();
        let previous = self.models.insert(table.clone(), model);
        if let Some(previous) = &previous {
            if self.names.get(&previous.name) == Some(&previous.table) {
                self.names.remove(&previous.name);
            }
        }
        self.names.insert(name, table);
        previous
    }

    /// Returns the model backed by `table`.
    pub fn get(&self, table: &str) -> Option<&ProjectionModel> {
        self.models.get(table)
    }

    pub(crate) fn get_mut(&mut self, table: &str) -> Option<&mut ProjectionModel> {
        self.models.get_mut(table)
    }

    /// Returns the model named `name`.
    pub fn get_by_name(&self, name: &str) -> Option<&ProjectionModel> {
        self.names.get(name).and_then(|table| self.models.get(table))
    }

    /// Returns the table backing the model named `name`.
    pub fn table_of(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    /// Returns every model, sorted by model name.
    pub fn models(&self) -> impl Iterator<Item = &ProjectionModel> {
        self.names.values().filter_map(|table| self.models.get(table))
    }

    /// Returns every table name, sorted.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn is_linked(&self) -> bool {
        self.link_report.is_some()
    }

    /// Returns the report of the linking pass, once linked.
    pub fn link_report(&self) -> Option<LinkReport> {
        self.link_report
    }

    pub(crate) fn mark_linked(&mut self, report: LinkReport) {
        self.link_report = Some(report);
    }
}

/// Assigns a unique model name to every table.
///
/// Tables are taken in name order; when a normalized name is already taken, the smallest
/// numeric suffix starting at 1 that makes it unique is appended (`OrderItems1`).
pub fn assign_model_names(tables: &[TableInfo]) -> BTreeMap<String, String> {
    let mut sorted = tables.iter().map(|t| t.name.as_str()).collect::<Vec<_>>();
    sorted.sort_unstable();
    sorted.dedup();

    let mut used = HashSet::new();
    let mut names = BTreeMap::new();
    for table in sorted {
        let base = normalize_table(table);
        let mut name = base.clone();
        let mut suffix = 1usize;
        while used.contains(&name) {
            name = format!("{base}{suffix}");
            suffix += 1;
        }
        if name != base {
            tracing::debug!(table, model = %name, "model name taken, suffix added");
        }
        used.insert(name.clone());
        names.insert(table.to_string(), name);
    }
    names
}
