//! Re-exports all the most commonly used items from this crate.

pub use dbqb_api::prelude::*;

pub use crate::config::{CompositePrimaryKeyPolicy, ScanConfig, UnresolvedRelationPolicy};
pub use crate::memory::{Capabilities, MemoryConnection, MemoryDatabase, MemoryDriver, MemoryTable};
pub use crate::pipeline::{ConnectionGuard, Deadline, Pipeline, ScanState, build_graph};
pub use crate::query::{QueryExecutor, ResponseAssembler, TablePlan};
pub use crate::registry::{DataSourceRegistry, MemoryRegistry};
pub use crate::schema::graph::{SchemaGraph, assign_model_names};
pub use crate::schema::inference::{FieldParams, Inferred, ScalarKind, TypeInferencer, infer};
pub use crate::schema::introspect::{SchemaIntrospector, TableDescriptor};
pub use crate::schema::link::{LinkReport, RelationLinker};
pub use crate::schema::normalize::{NormalizedName, normalize_column, normalize_table};
pub use crate::schema::projection::{
    FieldSpec, Identity, Member, ProjectionBuilder, ProjectionModel, RelationKind, RelationSpec,
    RelationTarget, Resolution,
};
pub use crate::{DbqbError, DbqbResult};
