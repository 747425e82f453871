use dbqb_api::prelude::{Connection, ReadPlan, Record, RecordValue, Row, Value};

use crate::schema::graph::SchemaGraph;
use crate::schema::projection::{Member, ProjectionModel, Resolution};
use crate::{DbqbError, DbqbResult};

/// Where one output key takes its value from, inside a [`Row`].
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Scalar {
        key: String,
        index: usize,
    },
    /// A joined model. `probe` is the index of the referenced column: null means no row matched.
    Nested {
        key: String,
        probe: usize,
        members: Vec<(String, usize)>,
    },
}

/// A [`ReadPlan`] together with the layout mapping its rows to records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePlan {
    pub read: ReadPlan,
    layout: Vec<Slot>,
}

impl TablePlan {
    /// Turns a driver row into a record.
    fn record(&self, row: &Row) -> Record {
        let mut record = Record::new();
        for slot in &self.layout {
            match slot {
                Slot::Scalar { key, index } => {
                    record.insert(key.as_str(), cell(row, *index));
                }
                Slot::Nested {
                    key,
                    probe,
                    members,
                } => {
                    let value = if cell(row, *probe).is_null() {
                        RecordValue::Value(Value::Null)
                    } else {
                        let mut nested = Record::new();
                        for (member, index) in members {
                            nested.insert(member.as_str(), cell(row, *index));
                        }
                        RecordValue::Nested(nested)
                    };
                    record.insert(key.as_str(), value);
                }
            }
        }
        record
    }
}

fn cell(row: &Row, index: usize) -> Value {
    row.get(index).cloned().unwrap_or(Value::Null)
}

/// Reads linked models through a connection.
///
/// Every resolved relation is left-joined one level deep: the nested record holds the identity
/// and scalar fields of the target, never its own relations.
#[derive(Debug, Clone, Copy)]
pub struct QueryExecutor<'g> {
    graph: &'g SchemaGraph,
}

impl<'g> QueryExecutor<'g> {
    /// Creates an executor over `graph`, which must be linked.
    pub fn new(graph: &'g SchemaGraph) -> DbqbResult<Self> {
        if !graph.is_linked() {
            return Err(DbqbError::NotLinked);
        }
        Ok(Self { graph })
    }

    /// Plans the read of `model`.
    pub fn plan(&self, model: &ProjectionModel) -> TablePlan {
        let members = model.members();

        let base_columns = members
            .iter()
            .filter_map(|member| match member {
                Member::Identity(identity) => Some(identity.column.as_str()),
                Member::Field(field) => Some(field.column.as_str()),
                Member::Relation(_) => None,
            })
            .collect::<Vec<_>>();
        let mut builder = ReadPlan::builder(model.table.as_str()).columns(base_columns.iter().copied());

        let mut layout = Vec::with_capacity(members.len());
        for member in &members {
            match member {
                Member::Identity(identity) => layout.push(Slot::Scalar {
                    key: identity.name.clone(),
                    index: index_of(&base_columns, &identity.column),
                }),
                Member::Field(field) => layout.push(Slot::Scalar {
                    key: field.name.clone(),
                    index: index_of(&base_columns, &field.column),
                }),
                Member::Relation(relation) => {
                    let Resolution::Resolved { table } = &relation.resolution else {
                        continue;
                    };
                    let Some(target) = self.graph.get(table) else {
                        continue;
                    };

                    let scalars = target.scalar_members();
                    let mut columns = vec![relation.target_column.as_str()];
                    for (_, column) in &scalars {
                        if !columns.contains(column) {
                            columns.push(*column);
                        }
                    }
                    builder = builder.join(
                        target.table.as_str(),
                        relation.column.as_str(),
                        relation.target_column.as_str(),
                        columns.iter().copied(),
                    );

                    layout.push(Slot::Nested {
                        key: relation.name.clone(),
                        probe: 0,
                        members: scalars
                            .iter()
                            .map(|(name, column)| (name.to_string(), index_of(&columns, column)))
                            .collect(),
                    });
                }
            }
        }

        let read = builder.build();
        // join-relative indexes become row indexes
        let mut join_index = 0;
        for slot in &mut layout {
            if let Slot::Nested { probe, members, .. } = slot {
                let offset = read.join_offset(join_index);
                *probe = offset;
                for (_, index) in members.iter_mut() {
                    *index += offset;
                }
                join_index += 1;
            }
        }

        TablePlan { read, layout }
    }

    /// Reads every row of `model` and turns it into records.
    pub fn execute<C>(&self, connection: &mut C, model: &ProjectionModel) -> DbqbResult<Vec<Record>>
    where
        C: Connection + ?Sized,
    {
        let plan = self.plan(model);
        if plan.read.is_empty() {
            tracing::debug!(model = %model.name, "no column to select, table not read");
            return Ok(Vec::new());
        }
        tracing::debug!(model = %model.name, sql = %plan.read.to_sql(), "reading table");

        let rows = connection.read(&plan.read).map_err(|source| DbqbError::Read {
            table: model.table.clone(),
            source,
        })?;

        let expected = plan.read.width();
        let records = rows
            .iter()
            .map(|row| {
                if row.len() != expected {
                    return Err(DbqbError::MalformedRow {
                        table: model.table.clone(),
                        expected,
                        found: row.len(),
                    });
                }
                Ok(plan.record(row))
            })
            .collect::<DbqbResult<Vec<_>>>()?;

        tracing::debug!(model = %model.name, rows = records.len(), "table read");
        Ok(records)
    }
}

fn index_of(columns: &[&str], column: &str) -> usize {
    columns
        .iter()
        .position(|c| *c == column)
        .unwrap_or(columns.len())
}
