//! Catalog seed file.
//!
//! A JSON document listing the static entities lineage events may reference:
//!
//! ```json
//! {
//!   "clusters": ["primary-cluster"],
//!   "users": ["falcon-user"],
//!   "datasources": ["mysql-db"],
//!   "processes": [{ "name": "sample-process", "tags": ["owner=ads"], "pipelines": ["ads"] }],
//!   "feeds": [{ "name": "clicks", "tags": ["owner=ads"], "groups": ["hourly"] }]
//! }
//! ```
//!
//! Applying a seed registers each process and feed definition in the catalog
//! and adds one entity node per named cluster, user, datasource, process,
//! feed, tag, pipeline and group. Nodes that already exist are left alone, so
//! applying the same seed twice is harmless.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use lineage_rs::catalog::{EntityDefinition, EntityType, InMemoryCatalog};
use lineage_rs::driver::GraphDriver;
use lineage_rs::graph::{create_node, find_node};
use lineage_rs::nodes::NodeType;
use lineage_rs::LineageError;

/// All errors that can occur while loading or applying a seed.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("IO error on '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid catalog seed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Lineage(#[from] LineageError),
}

/// A named process or feed definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedEntity {
    pub name: String,
    #[serde(flatten)]
    pub definition: EntityDefinition,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub clusters: Vec<String>,
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub datasources: Vec<String>,
    #[serde(default)]
    pub processes: Vec<SeedEntity>,
    #[serde(default)]
    pub feeds: Vec<SeedEntity>,
}

/// Counts of what applying a seed added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub definitions: usize,
    pub nodes_created: usize,
}

impl CatalogSeed {
    pub fn from_json(raw: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Read and parse a seed file.
    pub async fn load(path: &Path) -> Result<Self, SeedError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| SeedError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&raw)
    }

    /// Register definitions in `catalog` and entity nodes in `store`.
    pub fn apply<D: GraphDriver + ?Sized>(
        &self,
        store: &D,
        catalog: &InMemoryCatalog,
    ) -> Result<SeedSummary, SeedError> {
        let mut summary = SeedSummary::default();

        for (entity_type, entities) in [
            (EntityType::Process, &self.processes),
            (EntityType::Feed, &self.feeds),
        ] {
            for entity in entities {
                catalog.register(entity_type, entity.name.clone(), entity.definition.clone());
                summary.definitions += 1;
            }
        }
        for (entity_type, names) in [
            (EntityType::Cluster, &self.clusters),
            (EntityType::Datasource, &self.datasources),
        ] {
            for name in names {
                catalog.register(entity_type, name.clone(), EntityDefinition::default());
                summary.definitions += 1;
            }
        }

        for (name, node_type) in self.entity_nodes() {
            if ensure_node(store, name, node_type)? {
                summary.nodes_created += 1;
            }
        }

        info!(
            definitions = summary.definitions,
            nodes = summary.nodes_created,
            "catalog seed applied"
        );
        Ok(summary)
    }

    /// Every `(name, type)` entity node the seed implies, deduplicated.
    fn entity_nodes(&self) -> BTreeSet<(&str, NodeType)> {
        let mut nodes = BTreeSet::new();
        nodes.extend(named(&self.clusters, NodeType::ClusterEntity));
        nodes.extend(named(&self.users, NodeType::User));
        nodes.extend(named(&self.datasources, NodeType::DatasourceEntity));
        for (entities, node_type) in [
            (&self.processes, NodeType::ProcessEntity),
            (&self.feeds, NodeType::FeedEntity),
        ] {
            for entity in entities {
                nodes.insert((entity.name.as_str(), node_type));
                nodes.extend(named(&entity.definition.tags, NodeType::Tags));
                nodes.extend(named(&entity.definition.pipelines, NodeType::Pipelines));
                nodes.extend(named(&entity.definition.groups, NodeType::Groups));
            }
        }
        nodes
    }
}

fn named(names: &[String], node_type: NodeType) -> impl Iterator<Item = (&str, NodeType)> + '_ {
    names
        .iter()
        .filter(|n| !n.is_empty())
        .map(move |n| (n.as_str(), node_type))
}

/// Create the node unless it is already present. Returns whether it was created.
fn ensure_node<D: GraphDriver + ?Sized>(
    store: &D,
    name: &str,
    node_type: NodeType,
) -> Result<bool, SeedError> {
    if find_node(store, name, node_type)?.is_some() {
        debug!(name, %node_type, "entity node already present");
        return Ok(false);
    }
    create_node(store, name, node_type, Utc::now())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_rs::catalog::EntityCatalog;
    use lineage_rs::driver::InMemoryDriver;

    const SEED: &str = r#"{
        "clusters": ["primary-cluster"],
        "users": ["falcon-user"],
        "processes": [
            { "name": "sample-process", "tags": ["owner=ads"], "pipelines": ["ads"] }
        ],
        "feeds": [
            { "name": "clicks", "tags": ["owner=ads"], "groups": ["hourly"] }
        ]
    }"#;

    #[test]
    fn apply_registers_definitions_and_nodes() {
        let seed = CatalogSeed::from_json(SEED).unwrap();
        let store = InMemoryDriver::new();
        let catalog = InMemoryCatalog::new();

        let summary = seed.apply(&store, &catalog).unwrap();
        assert_eq!(summary.definitions, 3);
        // cluster, user, process, feed, one shared tag, pipeline, group
        assert_eq!(summary.nodes_created, 7);

        let process = catalog.get(EntityType::Process, "sample-process").unwrap();
        assert_eq!(process.pipelines, vec!["ads".to_string()]);
        assert!(store.find_node("owner=ads", NodeType::Tags).unwrap().is_some());
        assert!(store.find_node("hourly", NodeType::Groups).unwrap().is_some());
    }

    #[test]
    fn apply_twice_creates_nothing_new() {
        let seed = CatalogSeed::from_json(SEED).unwrap();
        let store = InMemoryDriver::new();
        let catalog = InMemoryCatalog::new();

        seed.apply(&store, &catalog).unwrap();
        let again = seed.apply(&store, &catalog).unwrap();
        assert_eq!(again.nodes_created, 0);
        assert_eq!(store.node_count(), 7);
    }

    #[test]
    fn malformed_seed_is_parse_error() {
        assert!(matches!(
            CatalogSeed::from_json(r#"{"clusters": "primary"}"#),
            Err(SeedError::Parse(_))
        ));
    }
}
