use crate::dbms::query::{JoinPlan, ReadPlan};

/// A builder for constructing [`ReadPlan`]s.
#[derive(Debug, Clone)]
pub struct ReadPlanBuilder {
    plan: ReadPlan,
}

impl ReadPlanBuilder {
    pub(super) fn new(table: impl Into<String>) -> Self {
        Self {
            plan: ReadPlan {
                table: table.into(),
                columns: Vec::new(),
                joins: Vec::new(),
            },
        }
    }

    /// Builds and returns the [`ReadPlan`].
    pub fn build(self) -> ReadPlan {
        self.plan
    }

    /// Adds a base column to select. Duplicates are ignored.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        let column = column.into();
        if !self.plan.columns.contains(&column) {
            self.plan.columns.push(column);
        }
        self
    }

    /// Adds multiple base columns to select.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            self = self.column(column);
        }
        self
    }

    /// Adds a left join; the alias is assigned from the join position (`j0`, `j1`, ...).
    pub fn join<I, S>(
        mut self,
        table: impl Into<String>,
        local_column: impl Into<String>,
        foreign_column: impl Into<String>,
        columns: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let alias = format!("j{}", self.plan.joins.len());
        self.plan.joins.push(JoinPlan {
            alias,
            table: table.into(),
            local_column: local_column.into(),
            foreign_column: foreign_column.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        });
        self
    }
}
