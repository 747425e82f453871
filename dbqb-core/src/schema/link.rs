//! Second pass over a [`SchemaGraph`]: resolves every relation to a sibling model.

use serde::Serialize;

use crate::config::UnresolvedRelationPolicy;
use crate::schema::graph::SchemaGraph;
use crate::schema::projection::{RelationTarget, Resolution};
use crate::{DbqbError, DbqbResult};

/// Outcome of a linking pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    /// Relations resolved to a model of the graph.
    pub resolved: usize,
    /// Relations removed because their target is not part of the graph.
    pub omitted: usize,
}

/// Decision taken for one relation.
enum Outcome {
    Resolve(String),
    Omit,
}

/// Resolves relation targets against the graph's model-name index.
#[derive(Clone, Copy, Debug, Default)]
pub struct RelationLinker {
    policy: UnresolvedRelationPolicy,
}

impl RelationLinker {
    pub fn new(policy: UnresolvedRelationPolicy) -> Self {
        Self { policy }
    }

    /// Links every relation of `graph` and marks it linked.
    ///
    /// On an already linked graph this returns the report of the first pass and changes nothing.
    /// Under [`UnresolvedRelationPolicy::Error`] the graph is left untouched when a target is
    /// missing.
    pub fn link(&self, graph: &mut SchemaGraph) -> DbqbResult<LinkReport> {
        if let Some(report) = graph.link_report() {
            tracing::debug!("schema graph already linked");
            return Ok(report);
        }

        let mut decisions = Vec::new();
        for model in graph.models() {
            let outcomes = model
                .relations
                .iter()
                .map(|relation| {
                    let target_table = match &relation.target {
                        RelationTarget::SelfRef => Some(model.table.as_str()),
                        RelationTarget::Model { table, model } => {
                            graph.table_of(model).filter(|found| *found == table.as_str())
                        }
                    };
                    match target_table {
                        Some(table) => Ok(Outcome::Resolve(table.to_string())),
                        None if self.policy == UnresolvedRelationPolicy::Error => {
                            Err(DbqbError::UnresolvedRelation {
                                model: model.name.clone(),
                                relation: relation.name.clone(),
                                target: relation.target_table(&model.table).to_string(),
                            })
                        }
                        None => Ok(Outcome::Omit),
                    }
                })
                .collect::<DbqbResult<Vec<_>>>()?;
            decisions.push((model.table.clone(), outcomes));
        }

        let mut report = LinkReport::default();
        for (table, outcomes) in decisions {
            let Some(model) = graph.get_mut(&table) else {
                continue;
            };
            let relations = std::mem::take(&mut model.relations);
            for (mut relation, outcome) in relations.into_iter().zip(outcomes) {
                match outcome {
                    Outcome::Resolve(target) => {
                        relation.resolution = Resolution::Resolved { table: target };
                        model.relations.push(relation);
                        report.resolved += 1;
                    }
                    Outcome::Omit => {
                        let target = relation.target_table(&table).to_string();
                        tracing::warn!(
                            model = %model.name,
                            relation = %relation.name,
                            target = %target,
                            "relation target is not part of the schema, omitting relation"
                        );
                        model.notes.push(format!(
                            "Relation '{}' omitted: table '{}' is not part of the schema.",
                            relation.name, target
                        ));
                        report.omitted += 1;
                    }
                }
            }
        }

        tracing::debug!(
            resolved = report.resolved,
            omitted = report.omitted,
            "schema graph linked"
        );
        graph.mark_linked(report);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {

    use dbqb_api::prelude::TableKind;

    use super::*;
    use crate::schema::projection::{ProjectionModel, RelationKind, RelationSpec};

    fn relation(name: &str, column: &str, target: RelationTarget) -> RelationSpec {
        RelationSpec {
            name: name.to_string(),
            kind: RelationKind::ManyToOne,
            column: column.to_string(),
            db_column: None,
            target,
            target_column: "id".to_string(),
            to_field: None,
            nullable: true,
            primary_key: false,
            related_name: None,
            notes: Vec::new(),
            resolution: Resolution::Pending,
            position: 1,
        }
    }

    fn model(table: &str, name: &str, relations: Vec<RelationSpec>) -> ProjectionModel {
        ProjectionModel {
            name: name.to_string(),
            table: table.to_string(),
            kind: TableKind::Table,
            comment: None,
            identity: None,
            fields: Vec::new(),
            relations,
            unique_together: Vec::new(),
            notes: Vec::new(),
        }
    }

    fn to(table: &str, model: &str) -> RelationTarget {
        RelationTarget::Model {
            table: table.to_string(),
            model: model.to_string(),
        }
    }

    fn graph() -> SchemaGraph {
        let mut graph = SchemaGraph::new();
        graph.insert(model("customers", "Customers", Vec::new()));
        graph.insert(model(
            "orders",
            "Orders",
            vec![
                relation("customer", "customer_id", to("customers", "Customers")),
                relation("coupon", "coupon_id", to("coupons", "Coupons")),
                relation("parent", "parent_id", RelationTarget::SelfRef),
            ],
        ));
        graph
    }

    #[test]
    fn test_should_resolve_and_omit() {
        let mut graph = graph();
        let report = RelationLinker::default()
            .link(&mut graph)
            .expect("failed to link");

        assert_eq!(report, LinkReport { resolved: 2, omitted: 1 });
        assert!(graph.is_linked());

        let orders = graph.get("orders").expect("orders");
        assert!(orders.relation("coupon").is_none());
        assert_eq!(
            orders.relation("customer").map(|r| &r.resolution),
            Some(&Resolution::Resolved {
                table: "customers".to_string()
            })
        );
        assert_eq!(
            orders.relation("parent").map(|r| &r.resolution),
            Some(&Resolution::Resolved {
                table: "orders".to_string()
            })
        );
        assert!(orders.is_resolved());
        assert_eq!(orders.notes.len(), 1);
        assert!(orders.notes[0].contains("coupons"));
    }

    #[test]
    fn test_should_be_idempotent() {
        let mut graph = graph();
        let linker = RelationLinker::default();
        let first = linker.link(&mut graph).expect("failed to link");
        let snapshot = graph.get("orders").cloned();

        let second = linker.link(&mut graph).expect("failed to link");
        assert_eq!(first, second);
        assert_eq!(graph.get("orders").cloned(), snapshot);
    }

    #[test]
    fn test_should_not_resolve_against_name_of_another_table() {
        let mut graph = SchemaGraph::new();
        graph.insert(model("Customers", "Customers", Vec::new()));
        graph.insert(model(
            "orders",
            "Orders",
            vec![relation("customer", "customer_id", to("customers", "Customers"))],
        ));
        let report = RelationLinker::default()
            .link(&mut graph)
            .expect("failed to link");
        assert_eq!(report, LinkReport { resolved: 0, omitted: 1 });
    }

    #[test]
    fn test_should_fail_on_unresolved_relation_when_strict() {
        let mut graph = graph();
        let err = RelationLinker::new(UnresolvedRelationPolicy::Error)
            .link(&mut graph)
            .expect_err("should fail");

        assert!(matches!(
            err,
            DbqbError::UnresolvedRelation { ref model, ref relation, ref target }
                if model == "Orders" && relation == "coupon" && target == "coupons"
        ));
        assert!(!graph.is_linked());
        assert_eq!(graph.get("orders").map(|m| m.relations.len()), Some(3));
    }
}
