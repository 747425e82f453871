//! Projection models: the runtime description of one table, built from its
//! [`TableDescriptor`].

use std::collections::{BTreeMap, HashMap, HashSet};

use dbqb_api::prelude::TableKind;
use serde::Serialize;

use crate::config::{CompositePrimaryKeyPolicy, ScanConfig};
use crate::schema::inference::{FieldParams, ScalarKind, TypeInferencer};
use crate::schema::introspect::TableDescriptor;
use crate::schema::normalize::{NormalizedName, normalize_column, normalize_table};
use crate::{DbqbError, DbqbResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    OneToOne,
    ManyToOne,
}

/// The model a relation points to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationTarget {
    /// The relation points to the model that owns it.
    #[serde(rename = "self")]
    SelfRef,
    Model { table: String, model: String },
}

/// Linking state of a relation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Pending,
    /// Resolved to the model backed by `table` in the same graph.
    Resolved { table: String },
}

/// A scalar field of a model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    /// Source column.
    pub column: String,
    /// Source column, when it cannot be derived from `name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_column: Option<String>,
    pub kind: ScalarKind,
    pub nullable: bool,
    pub unique: bool,
    pub primary_key: bool,
    pub params: FieldParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    /// Position of the source column in driver order.
    #[serde(skip)]
    pub position: usize,
}

/// A foreign-key relation of a model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RelationSpec {
    pub name: String,
    pub kind: RelationKind,
    /// Source column.
    pub column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_column: Option<String>,
    pub target: RelationTarget,
    /// Referenced column of the target table.
    pub target_column: String,
    /// Referenced column, when it is not the target's primary key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_field: Option<String>,
    pub nullable: bool,
    pub primary_key: bool,
    /// Reverse accessor, set when the model references the same target more than once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    pub resolution: Resolution,
    #[serde(skip)]
    pub position: usize,
}

impl RelationSpec {
    /// Returns the table holding the target model, given the table of the owning model.
    pub fn target_table<'a>(&'a self, own_table: &'a str) -> &'a str {
        match &self.target {
            RelationTarget::SelfRef => own_table,
            RelationTarget::Model { table, .. } => table,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.resolution, Resolution::Resolved { .. })
    }
}

/// The conventional integer primary key, kept out of the explicit fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub name: String,
    pub column: String,
    pub kind: ScalarKind,
    #[serde(skip)]
    pub position: usize,
}

/// One entry of a model, in source column order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Member<'a> {
    Identity(&'a Identity),
    Field(&'a FieldSpec),
    Relation(&'a RelationSpec),
}

impl Member<'_> {
    fn position(&self) -> usize {
        match self {
            Member::Identity(identity) => identity.position,
            Member::Field(field) => field.position,
            Member::Relation(relation) => relation.position,
        }
    }
}

/// The structural model synthesized for one table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProjectionModel {
    pub name: String,
    pub table: String,
    pub kind: TableKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    pub fields: Vec<FieldSpec>,
    pub relations: Vec<RelationSpec>,
    /// Multi-column unique sets, by field name.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unique_together: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl ProjectionModel {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn relation(&self, name: &str) -> Option<&RelationSpec> {
        self.relations.iter().find(|relation| relation.name == name)
    }

    /// Returns the identity and every field and relation, in source column order.
    pub fn members(&self) -> Vec<Member<'_>> {
        let mut members = self
            .identity
            .iter()
            .map(Member::Identity)
            .chain(self.fields.iter().map(Member::Field))
            .chain(self.relations.iter().map(Member::Relation))
            .collect::<Vec<_>>();
        members.sort_by_key(Member::position);
        members
    }

    /// Returns the identity and the scalar fields: what a nested record of this model holds.
    pub fn scalar_members(&self) -> Vec<(&str, &str)> {
        self.members()
            .into_iter()
            .filter_map(|member| match member {
                Member::Identity(identity) => Some((identity.name.as_str(), identity.column.as_str())),
                Member::Field(field) => Some((field.name.as_str(), field.column.as_str())),
                Member::Relation(_) => None,
            })
            .collect()
    }

    /// Returns whether every relation has been resolved.
    pub fn is_resolved(&self) -> bool {
        self.relations.iter().all(RelationSpec::is_resolved)
    }
}

/// Builds [`ProjectionModel`]s for the tables of one scan.
pub struct ProjectionBuilder<'a> {
    config: &'a ScanConfig,
    /// Model name of every scanned table.
    model_names: &'a BTreeMap<String, String>,
    /// Primary key column of every scanned table.
    primary_keys: &'a BTreeMap<String, Option<String>>,
    inferencer: TypeInferencer,
}

impl<'a> ProjectionBuilder<'a> {
    pub fn new(
        config: &'a ScanConfig,
        model_names: &'a BTreeMap<String, String>,
        primary_keys: &'a BTreeMap<String, Option<String>>,
        inferencer: TypeInferencer,
    ) -> Self {
        Self {
            config,
            model_names,
            primary_keys,
            inferencer,
        }
    }

    fn model_name(&self, table: &str) -> String {
        self.model_names
            .get(table)
            .cloned()
            .unwrap_or_else(|| normalize_table(table))
    }

    /// Builds the model of `table`, with every relation pending.
    pub fn build(&self, table: &TableDescriptor) -> DbqbResult<ProjectionModel> {
        let model_name = self.model_name(&table.name);
        let mut model = ProjectionModel {
            name: model_name.clone(),
            table: table.name.clone(),
            kind: table.kind,
            comment: table.comment.clone(),
            identity: None,
            fields: Vec::new(),
            relations: Vec::new(),
            unique_together: Vec::new(),
            notes: Vec::new(),
        };

        let mut composite_note = None;
        if table.has_composite_primary_key() {
            if self.config.composite_primary_key == CompositePrimaryKeyPolicy::Error {
                return Err(DbqbError::CompositePrimaryKey {
                    table: table.name.clone(),
                    columns: table.primary_key_columns.clone(),
                });
            }
            let note = format!(
                "The composite primary key ({}) found, that is not supported. The first column is selected.",
                table.primary_key_columns.join(", ")
            );
            tracing::warn!(table = %table.name, columns = ?table.primary_key_columns, "composite primary key, keeping the first column");
            model.notes.push(note.clone());
            composite_note = Some(note);
        }

        let mut target_count: HashMap<&str, usize> = HashMap::new();
        for (_, target_table) in table.foreign_keys.values() {
            *target_count.entry(target_table.as_str()).or_default() += 1;
        }

        let mut used_names = HashSet::new();
        let mut column_to_name = HashMap::new();
        for (position, column) in table.columns.iter().enumerate() {
            let is_primary_key = table.primary_key.as_deref() == Some(column.name.as_str());
            let is_unique = table.unique_columns.contains(&column.name);
            let relation = table.foreign_keys.get(&column.name);

            let NormalizedName {
                name,
                mut notes,
                db_column,
            } = normalize_column(&column.name, &mut used_names, relation.is_some());
            column_to_name.insert(column.name.as_str(), name.clone());

            if is_primary_key {
                notes.extend(composite_note.iter().cloned());
            }

            if let Some((target_column, target_table)) = relation {
                let target = if target_table == &table.name {
                    RelationTarget::SelfRef
                } else {
                    RelationTarget::Model {
                        table: target_table.clone(),
                        model: self.model_name(target_table),
                    }
                };
                // a target without primary key never matches the referenced column
                let to_field = match self.primary_keys.get(target_table) {
                    Some(Some(target_pk)) if target_pk == target_column => None,
                    Some(_) => Some(target_column.clone()),
                    None => None,
                };
                let related_name = target_count
                    .get(target_table.as_str())
                    .is_some_and(|count| *count > 1)
                    .then(|| format!("{}_{}_set", model_name.to_lowercase(), name));

                model.relations.push(RelationSpec {
                    name,
                    kind: if is_primary_key || is_unique {
                        RelationKind::OneToOne
                    } else {
                        RelationKind::ManyToOne
                    },
                    column: column.name.clone(),
                    db_column,
                    target,
                    target_column: target_column.clone(),
                    to_field,
                    nullable: column.nullable,
                    primary_key: is_primary_key,
                    related_name,
                    notes,
                    resolution: Resolution::Pending,
                    position,
                });
                continue;
            }

            let inferred = self.inferencer.infer(&table.name, column);
            notes.extend(inferred.notes);

            if is_primary_key
                && name == self.config.identity_column
                && db_column.is_none()
                && notes.is_empty()
                && inferred.kind.is_integer()
            {
                model.identity = Some(Identity {
                    name,
                    column: column.name.clone(),
                    kind: inferred.kind,
                    position,
                });
                continue;
            }

            model.fields.push(FieldSpec {
                name,
                column: column.name.clone(),
                db_column,
                kind: inferred.kind,
                nullable: column.nullable,
                unique: is_unique && !is_primary_key,
                primary_key: is_primary_key,
                params: inferred.params,
                comment: column.comment.clone(),
                notes,
                position,
            });
        }

        model.unique_together = table
            .unique_together
            .iter()
            .map(|columns| {
                columns
                    .iter()
                    .map(|column| {
                        column_to_name
                            .get(column.as_str())
                            .cloned()
                            .unwrap_or_else(|| column.clone())
                    })
                    .collect()
            })
            .collect();

        tracing::debug!(
            table = %table.name,
            model = %model.name,
            fields = model.fields.len(),
            relations = model.relations.len(),
            identity = model.identity.is_some(),
            "projection built"
        );

        Ok(model)
    }
}
