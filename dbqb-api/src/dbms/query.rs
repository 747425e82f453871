//! This module exposes the read plan the engine hands to a driver.
//!
//! A [`ReadPlan`] always describes a full-table read of one base table, optionally left-joining
//! one level of related tables. There is no filtering, ordering or pagination.

mod builder;

pub use self::builder::ReadPlanBuilder;
use crate::dbms::value::Value;

/// Alias given to the base table of every [`ReadPlan`].
pub const BASE_ALIAS: &str = "t0";

/// A row returned by a driver for a [`ReadPlan`].
///
/// Values are laid out as the base columns first, followed by each join's columns in join order.
pub type Row = Vec<Value>;

/// A left join of a related table, matched on `base.local_column = joined.foreign_column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinPlan {
    /// Alias of the joined table, unique within the plan.
    pub alias: String,
    /// Name of the joined table.
    pub table: String,
    /// Column of the base table holding the reference.
    pub local_column: String,
    /// Column of the joined table being referenced.
    pub foreign_column: String,
    /// Columns to select from the joined table.
    pub columns: Vec<String>,
}

/// A full-table read with one level of left joins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPlan {
    /// Name of the base table.
    pub table: String,
    /// Columns to select from the base table.
    pub columns: Vec<String>,
    /// Joins to perform, in order.
    pub joins: Vec<JoinPlan>,
}

impl ReadPlan {
    /// Creates a new [`ReadPlanBuilder`] for the given base table.
    pub fn builder(table: impl Into<String>) -> ReadPlanBuilder {
        ReadPlanBuilder::new(table)
    }

    /// Returns the number of values every [`Row`] of this plan must carry.
    pub fn width(&self) -> usize {
        self.columns.len() + self.joins.iter().map(|j| j.columns.len()).sum::<usize>()
    }

    /// Returns whether the plan selects no column at all; such a plan has no valid `SELECT`.
    pub fn is_empty(&self) -> bool {
        self.width() == 0
    }

    /// Returns the offset of the given join's first column inside a [`Row`].
    pub fn join_offset(&self, join_index: usize) -> usize {
        self.columns.len()
            + self
                .joins
                .iter()
                .take(join_index)
                .map(|j| j.columns.len())
                .sum::<usize>()
    }

    /// Renders the plan as a `SELECT` statement with quoted identifiers.
    pub fn to_sql(&self) -> String {
        let mut selected = self
            .columns
            .iter()
            .map(|column| format!("{}.{}", BASE_ALIAS, quote_ident(column)))
            .collect::<Vec<_>>();
        for join in &self.joins {
            selected.extend(
                join.columns
                    .iter()
                    .map(|column| format!("{}.{}", join.alias, quote_ident(column))),
            );
        }

        let mut sql = format!(
            "SELECT {} FROM {} AS {}",
            selected.join(", "),
            quote_ident(&self.table),
            BASE_ALIAS
        );
        for join in &self.joins {
            sql.push_str(&format!(
                " LEFT OUTER JOIN {table} AS {alias} ON {base}.{local} = {alias}.{foreign}",
                table = quote_ident(&join.table),
                alias = join.alias,
                base = BASE_ALIAS,
                local = quote_ident(&join.local_column),
                foreign = quote_ident(&join.foreign_column),
            ));
        }
        sql
    }
}

/// Quotes an identifier with double quotes, doubling embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {

    use super::*;

    fn orders_plan() -> ReadPlan {
        ReadPlan::builder("orders")
            .columns(["id", "total"])
            .join("customers", "customer_id", "id", ["id", "name"])
            .build()
    }

    #[test]
    fn test_should_compute_width_and_offsets() {
        let plan = orders_plan();
        assert_eq!(plan.width(), 4);
        assert_eq!(plan.join_offset(0), 2);
        assert_eq!(plan.join_offset(1), 4);
    }

    #[test]
    fn test_should_report_empty_plan() {
        assert!(ReadPlan::builder("empty").build().is_empty());
        assert!(!orders_plan().is_empty());
    }

    #[test]
    fn test_should_render_sql() {
        let plan = orders_plan();
        assert_eq!(
            plan.to_sql(),
            r#"SELECT t0."id", t0."total", j0."id", j0."name" FROM "orders" AS t0 LEFT OUTER JOIN "customers" AS j0 ON t0."customer_id" = j0."id""#
        );
    }

    #[test]
    fn test_should_quote_identifiers() {
        assert_eq!(quote_ident("weird\"name"), "\"weird\"\"name\"");
    }
}
