//! Entity catalog seam.
//!
//! The catalog holds the static process/feed/cluster/datasource definitions.
//! It is populated outside this crate; the lineage builder only reads from it,
//! and only in history-preservation mode.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::errors::{LineageError, Result};
use crate::nodes::NodeType;

/// Kind of a catalog entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Cluster,
    Feed,
    Process,
    Datasource,
}

impl EntityType {
    /// Graph node type of this entity's definition node.
    pub fn node_type(&self) -> NodeType {
        match self {
            EntityType::Cluster => NodeType::ClusterEntity,
            EntityType::Feed => NodeType::FeedEntity,
            EntityType::Process => NodeType::ProcessEntity,
            EntityType::Datasource => NodeType::DatasourceEntity,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityType::Cluster => "cluster",
            EntityType::Feed => "feed",
            EntityType::Process => "process",
            EntityType::Datasource => "datasource",
        };
        f.write_str(s)
    }
}

/// The parts of an entity definition the lineage builder consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityDefinition {
    /// Classification tags, e.g. `"classification=secure"`.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Pipelines a process belongs to.
    #[serde(default)]
    pub pipelines: Vec<String>,
    /// Groups a feed belongs to.
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Workflow engine of a process (e.g. `oozie`, `pig`).
    #[serde(default)]
    pub engine_kind: Option<String>,
}

/// Read access to entity definitions.
///
/// `get` must succeed for every name the builder references; a missing
/// definition surfaces as [`LineageError::Catalog`].
pub trait EntityCatalog: Send + Sync {
    fn get(&self, entity_type: EntityType, name: &str) -> Result<EntityDefinition>;
}

impl<T: EntityCatalog + ?Sized> EntityCatalog for &T {
    fn get(&self, entity_type: EntityType, name: &str) -> Result<EntityDefinition> {
        (**self).get(entity_type, name)
    }
}

impl<T: EntityCatalog + ?Sized> EntityCatalog for std::sync::Arc<T> {
    fn get(&self, entity_type: EntityType, name: &str) -> Result<EntityDefinition> {
        (**self).get(entity_type, name)
    }
}

/// Thread-safe in-memory catalog.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    entries: RwLock<HashMap<(EntityType, String), EntityDefinition>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a definition.
    pub fn register(
        &self,
        entity_type: EntityType,
        name: impl Into<String>,
        definition: EntityDefinition,
    ) {
        self.entries
            .write()
            .insert((entity_type, name.into()), definition);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl EntityCatalog for InMemoryCatalog {
    fn get(&self, entity_type: EntityType, name: &str) -> Result<EntityDefinition> {
        self.entries
            .read()
            .get(&(entity_type, name.to_string()))
            .cloned()
            .ok_or_else(|| LineageError::Catalog(format!("{entity_type} '{name}' is not defined")))
    }
}
