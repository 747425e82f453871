use dbqb_api::prelude::Record;

use crate::schema::projection::ProjectionModel;

/// Concatenates the records of every model into one flat output sequence.
///
/// Tables are appended in the order they are pushed; rows keep the order of the read.
#[derive(Debug, Default)]
pub struct ResponseAssembler {
    records: Vec<Record>,
    tables: usize,
}

impl ResponseAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_table(&mut self, model: &ProjectionModel, records: Vec<Record>) {
        tracing::trace!(model = %model.name, rows = records.len(), "appending table records");
        self.records.extend(records);
        self.tables += 1;
    }

    /// Number of tables pushed so far.
    pub fn tables(&self) -> usize {
        self.tables
    }

    pub fn finish(self) -> Vec<Record> {
        tracing::debug!(tables = self.tables, rows = self.records.len(), "response assembled");
        self.records
    }
}
