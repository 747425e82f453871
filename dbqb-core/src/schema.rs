//! Schema side of the engine: turns catalog metadata into a linked [`graph::SchemaGraph`].

pub mod graph;
pub mod inference;
pub mod introspect;
pub mod link;
pub mod normalize;
pub mod projection;
