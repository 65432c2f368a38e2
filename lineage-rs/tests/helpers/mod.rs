#![allow(dead_code)]

use std::collections::BTreeSet;

use chrono::{DateTime, TimeZone, Utc};

use lineage_rs::builder::InstanceGraphBuilder;
use lineage_rs::catalog::{EntityDefinition, EntityType, InMemoryCatalog};
use lineage_rs::context::{EntityOperation, ExecutionContext};
use lineage_rs::driver::{GraphDriver, InMemoryDriver};
use lineage_rs::edges::{EdgeLabel, LineageEdge};
use lineage_rs::nodes::{GraphNode, NodeId, NodeType};
use lineage_rs::LineageConfig;

pub const PROCESS: &str = "sample-process";
pub const PRIMARY: &str = "primary-cluster";
pub const BACKUP: &str = "backup-cluster";
pub const USER: &str = "falcon-user";
pub const DATASOURCE: &str = "mysql-db";
pub const NOMINAL: &str = "2014-01-01T01:00Z";

/// In-memory store and catalog pre-populated with the entity nodes a
/// lineage event may reference.
pub struct Fixture {
    pub store: InMemoryDriver,
    pub catalog: InMemoryCatalog,
}

impl Fixture {
    pub fn new() -> Self {
        let fixture = Self {
            store: InMemoryDriver::new(),
            catalog: InMemoryCatalog::new(),
        };

        for (name, node_type) in [
            (PRIMARY, NodeType::ClusterEntity),
            (BACKUP, NodeType::ClusterEntity),
            (USER, NodeType::User),
            (DATASOURCE, NodeType::DatasourceEntity),
            ("classification=secure", NodeType::Tags),
            ("owner=ads-team", NodeType::Tags),
            ("ads-pipeline", NodeType::Pipelines),
            ("billing-pipeline", NodeType::Pipelines),
            ("hourly", NodeType::Groups),
            ("events", NodeType::Groups),
        ] {
            fixture.register_node(name, node_type);
        }

        fixture.register_entity(
            EntityType::Process,
            PROCESS,
            EntityDefinition {
                tags: vec!["classification=secure".into(), "owner=ads-team".into()],
                pipelines: vec!["ads-pipeline".into(), "billing-pipeline".into()],
                version: Some("1.0".into()),
                engine_kind: Some("oozie".into()),
                ..Default::default()
            },
        );
        for feed in ["clicks", "impressions", "imp-click-join"] {
            fixture.register_entity(
                EntityType::Feed,
                feed,
                EntityDefinition {
                    tags: vec!["classification=secure".into()],
                    groups: vec!["hourly".into(), "events".into()],
                    ..Default::default()
                },
            );
        }
        fixture
    }

    pub fn register_node(&self, name: &str, node_type: NodeType) -> NodeId {
        let node = GraphNode::new(name, node_type, ts(0, 0, 0));
        let id = node.uuid;
        self.store.insert_node(node).expect("register entity node");
        id
    }

    pub fn register_entity(&self, entity_type: EntityType, name: &str, definition: EntityDefinition) {
        self.register_node(name, entity_type.node_type());
        self.catalog.register(entity_type, name, definition);
    }

    pub fn builder(&self, preserve_history: bool) -> InstanceGraphBuilder<&InMemoryDriver, &InMemoryCatalog> {
        InstanceGraphBuilder::new(
            &self.store,
            &self.catalog,
            LineageConfig::with_preserve_history(preserve_history),
        )
    }

    pub fn entity(&self, name: &str, node_type: NodeType) -> NodeId {
        self.store
            .find_node(name, node_type)
            .unwrap()
            .expect("entity registered")
    }

    pub fn edges_from_labeled(&self, source: NodeId, label: EdgeLabel) -> Vec<LineageEdge> {
        self.store
            .edges_from(source)
            .into_iter()
            .filter(|e| e.label == label)
            .collect()
    }

    /// Names of the targets of `source`'s edges with `label`.
    pub fn targets(&self, source: NodeId, label: EdgeLabel) -> BTreeSet<String> {
        self.edges_from_labeled(source, label)
            .iter()
            .filter_map(|e| self.store.node(e.target_node_uuid))
            .map(|n| n.name)
            .collect()
    }
}

pub fn ts(hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2014, 1, 1, hour, min, sec).unwrap()
}

pub fn process_context() -> ExecutionContext {
    ExecutionContext::new(
        EntityOperation::Generate,
        EntityType::Process,
        PROCESS,
        PRIMARY,
        USER,
        NOMINAL,
        ts(1, 5, 0),
    )
}

pub fn feed_context(operation: EntityOperation, feed: &str, cluster: &str, at: DateTime<Utc>) -> ExecutionContext {
    ExecutionContext::new(operation, EntityType::Feed, feed, cluster, USER, NOMINAL, at)
}
