//! The `select` entry point.
//!
//! One call runs INIT -> SCANNING -> LINKING -> QUERYING -> ASSEMBLED over a single connection,
//! under the deadline of the [`ScanConfig`]. The connection is closed on every exit path.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

use dbqb_api::prelude::{Connection, Driver, Record};

use crate::config::ScanConfig;
use crate::query::{QueryExecutor, ResponseAssembler};
use crate::registry::DataSourceRegistry;
use crate::schema::graph::{SchemaGraph, assign_model_names};
use crate::schema::inference::TypeInferencer;
use crate::schema::introspect::SchemaIntrospector;
use crate::schema::link::RelationLinker;
use crate::schema::projection::ProjectionBuilder;
use crate::{DbqbError, DbqbResult};

/// Stage of one scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanState {
    Init,
    Scanning,
    Linking,
    Querying,
    Assembled,
}

fn enter(state: ScanState, data_source: &str) {
    tracing::debug!(data_source, state = ?state, "scan state changed");
}

/// Time budget of one scan.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn start(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    /// Returns the time left, or `None` once the deadline has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.budget
            .checked_sub(self.started.elapsed())
            .filter(|remaining| !remaining.is_zero())
    }

    /// Fails when the deadline has passed; otherwise forwards the time left to `connection`.
    pub fn check<C>(&self, stage: &'static str, connection: &mut C) -> DbqbResult<()>
    where
        C: Connection + ?Sized,
    {
        let Some(remaining) = self.remaining() else {
            tracing::warn!(stage, budget = ?self.budget, "deadline exceeded");
            return Err(DbqbError::DeadlineExceeded {
                stage,
                budget: self.budget,
            });
        };
        match connection.set_timeout(remaining) {
            Ok(()) => Ok(()),
            Err(err) if err.is_connectivity() => Err(DbqbError::Introspection {
                operation: "set_timeout",
                source: err,
            }),
            Err(err) => {
                tracing::debug!(stage, error = %err, "statement timeout not applied");
                Ok(())
            }
        }
    }
}

/// Owns a connection and closes it when dropped.
pub struct ConnectionGuard<C>
where
    C: Connection,
{
    connection: C,
}

impl<C> ConnectionGuard<C>
where
    C: Connection,
{
    pub fn new(connection: C) -> Self {
        Self { connection }
    }
}

impl<C> Deref for ConnectionGuard<C>
where
    C: Connection,
{
    type Target = C;

    fn deref(&self) -> &Self::Target {
        &self.connection
    }
}

impl<C> DerefMut for ConnectionGuard<C>
where
    C: Connection,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.connection
    }
}

impl<C> Drop for ConnectionGuard<C>
where
    C: Connection,
{
    fn drop(&mut self) {
        match self.connection.close() {
            Ok(()) => tracing::debug!("connection released"),
            Err(err) => tracing::warn!(error = %err, "failed to close connection"),
        }
    }
}

/// Scans and links the schema reachable through `connection`, under the config's deadline.
pub fn build_graph<C>(connection: &mut C, config: &ScanConfig) -> DbqbResult<SchemaGraph>
where
    C: Connection + ?Sized,
{
    let mut graph = scan_tables(connection, config, &Deadline::start(config.deadline()))?;
    link(&mut graph, config)?;
    Ok(graph)
}

/// Describes every selected table and builds its model; relations are left pending.
fn scan_tables<C>(
    connection: &mut C,
    config: &ScanConfig,
    deadline: &Deadline,
) -> DbqbResult<SchemaGraph>
where
    C: Connection + ?Sized,
{
    deadline.check("listing tables", connection)?;
    let tables = SchemaIntrospector::new(connection, config).table_list()?;

    let mut descriptors = Vec::with_capacity(tables.len());
    for table in &tables {
        deadline.check("describing table", connection)?;
        if let Some(descriptor) = SchemaIntrospector::new(connection, config).describe(table)? {
            descriptors.push(descriptor);
        }
    }

    let described = tables
        .into_iter()
        .filter(|table| descriptors.iter().any(|d| d.name == table.name))
        .collect::<Vec<_>>();
    let model_names = assign_model_names(&described);
    let primary_keys = descriptors
        .iter()
        .map(|d| (d.name.clone(), d.primary_key.clone()))
        .collect::<BTreeMap<_, _>>();
    let builder = ProjectionBuilder::new(
        config,
        &model_names,
        &primary_keys,
        TypeInferencer::new(connection.dialect()),
    );

    let mut graph = SchemaGraph::new();
    for descriptor in &descriptors {
        graph.insert(builder.build(descriptor)?);
    }

    Ok(graph)
}

fn link(graph: &mut SchemaGraph, config: &ScanConfig) -> DbqbResult<()> {
    let report = RelationLinker::new(config.unresolved_relation).link(graph)?;
    tracing::debug!(resolved = report.resolved, omitted = report.omitted, "relations linked");
    Ok(())
}

/// Resolves data sources, connects, scans and reads them.
pub struct Pipeline<R, D>
where
    R: DataSourceRegistry,
    D: Driver,
{
    registry: R,
    driver: D,
    config: ScanConfig,
}

impl<R, D> Pipeline<R, D>
where
    R: DataSourceRegistry,
    D: Driver,
{
    pub fn new(registry: R, driver: D, config: ScanConfig) -> Self {
        Self {
            registry,
            driver,
            config,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    fn open(&self, data_source: &str) -> DbqbResult<ConnectionGuard<D::Connection>> {
        let descriptor = self
            .registry
            .resolve(data_source)
            .ok_or_else(|| DbqbError::ConnectionNotFound(data_source.to_string()))?;
        tracing::debug!(data_source, descriptor = ?descriptor, "connecting");
        let connection = self
            .driver
            .connect(&descriptor)
            .map_err(|source| DbqbError::Connect {
                data_source: data_source.to_string(),
                source,
            })?;
        Ok(ConnectionGuard::new(connection))
    }

    /// Scans and links the schema of `data_source` without reading any row.
    pub fn scan(&self, data_source: &str) -> DbqbResult<SchemaGraph> {
        enter(ScanState::Init, data_source);
        let deadline = Deadline::start(self.config.deadline());
        let mut connection = self.open(data_source)?;

        enter(ScanState::Scanning, data_source);
        let mut graph = scan_tables(&mut *connection, &self.config, &deadline)?;
        enter(ScanState::Linking, data_source);
        link(&mut graph, &self.config)?;
        tracing::info!(data_source, models = graph.len(), "schema scanned");
        Ok(graph)
    }

    /// Returns every row of every table of `data_source` as records.
    ///
    /// Tables come in model name order, rows in the order the driver returns them.
    pub fn select(&self, data_source: &str) -> DbqbResult<Vec<Record>> {
        enter(ScanState::Init, data_source);
        let deadline = Deadline::start(self.config.deadline());
        let mut connection = self.open(data_source)?;

        enter(ScanState::Scanning, data_source);
        let mut graph = scan_tables(&mut *connection, &self.config, &deadline)?;
        enter(ScanState::Linking, data_source);
        link(&mut graph, &self.config)?;

        enter(ScanState::Querying, data_source);
        let executor = QueryExecutor::new(&graph)?;
        let mut assembler = ResponseAssembler::new();
        for model in graph.models() {
            deadline.check("reading table", &mut *connection)?;
            let records = executor.execute(&mut *connection, model)?;
            assembler.push_table(model, records);
        }

        enter(ScanState::Assembled, data_source);
        let records = assembler.finish();
        tracing::info!(data_source, models = graph.len(), rows = records.len(), "select completed");
        Ok(records)
    }
}
