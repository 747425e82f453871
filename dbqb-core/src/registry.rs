//! Lookup of registered data sources.

use std::collections::HashMap;

use dbqb_api::prelude::ConnectionDescriptor;
use serde::Deserialize;

use crate::DbqbResult;

/// Resolves a data source name to the descriptor a driver connects with.
pub trait DataSourceRegistry {
    fn resolve(&self, name: &str) -> Option<ConnectionDescriptor>;
}

/// A registry held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    sources: HashMap<String, ConnectionDescriptor>,
}

#[derive(Deserialize)]
struct RegistryFile {
    #[serde(default)]
    data_source: Vec<ConnectionDescriptor>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `descriptor` under its name, replacing any previous one.
    pub fn register(&mut self, descriptor: ConnectionDescriptor) {
        self.sources.insert(descriptor.name.clone(), descriptor);
    }

    pub fn with(mut self, descriptor: ConnectionDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    /// Parses a registry from a TOML document listing `[[data_source]]` tables.
    pub fn from_toml_str(s: &str) -> DbqbResult<Self> {
        let file: RegistryFile = toml::from_str(s)?;
        Ok(file.data_source.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl FromIterator<ConnectionDescriptor> for MemoryRegistry {
    fn from_iter<T: IntoIterator<Item = ConnectionDescriptor>>(iter: T) -> Self {
        let mut registry = Self::new();
        for descriptor in iter {
            registry.register(descriptor);
        }
        registry
    }
}

impl DataSourceRegistry for MemoryRegistry {
    fn resolve(&self, name: &str) -> Option<ConnectionDescriptor> {
        self.sources.get(name).cloned()
    }
}
