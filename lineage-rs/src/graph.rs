//! Graph primitives shared by every lineage operation.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::driver::GraphDriver;
use crate::edges::{EdgeLabel, LineageEdge};
use crate::errors::{LineageError, Result};
use crate::nodes::{GraphNode, NodeId, NodeType};

/// Insert a new node. Never deduplicates.
pub fn create_node<D: GraphDriver + ?Sized>(
    driver: &D,
    name: &str,
    node_type: NodeType,
    created_at: DateTime<Utc>,
) -> Result<NodeId> {
    let node = GraphNode::new(name, node_type, created_at);
    let id = node.uuid;
    driver.insert_node(node)?;
    Ok(id)
}

/// Insert a directed edge, stamped with `timestamp` when given.
pub fn create_edge<D: GraphDriver + ?Sized>(
    driver: &D,
    source: NodeId,
    target: NodeId,
    label: EdgeLabel,
    timestamp: Option<DateTime<Utc>>,
) -> Result<()> {
    driver.insert_edge(LineageEdge::new(source, target, label, timestamp))
}

/// Exact-match lookup; `Ok(None)` when absent.
pub fn find_node<D: GraphDriver + ?Sized>(
    driver: &D,
    name: &str,
    node_type: NodeType,
) -> Result<Option<NodeId>> {
    let found = driver.find_node(name, node_type)?;
    debug!(name, %node_type, exists = found.is_some(), "node lookup");
    Ok(found)
}

/// Link an instance node to a pre-registered entity node.
///
/// The entity must already be in the graph; absence is a
/// [`LineageError::Consistency`] and no edge is written.
pub fn link_instance_to_entity<D: GraphDriver + ?Sized>(
    driver: &D,
    instance: NodeId,
    entity_name: &str,
    entity_type: NodeType,
    label: EdgeLabel,
    timestamp: Option<DateTime<Utc>>,
) -> Result<()> {
    let Some(entity) = find_node(driver, entity_name, entity_type)? else {
        warn!(name = entity_name, %entity_type, "entity node must exist");
        return Err(LineageError::consistency(entity_name, entity_type));
    };
    create_edge(driver, instance, entity, label, timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::InMemoryDriver;

    #[test]
    fn create_node_always_inserts() {
        let driver = InMemoryDriver::new();
        let now = Utc::now();
        let a = create_node(&driver, "p/2014-01-01T01:00Z", NodeType::ProcessInstance, now).unwrap();
        let b = create_node(&driver, "p/2014-01-01T01:00Z", NodeType::ProcessInstance, now).unwrap();
        assert_ne!(a, b);
        assert_eq!(driver.node_count(), 2);
        assert_eq!(driver.node(a).unwrap().created_at, now);
    }

    #[test]
    fn link_attaches_timestamped_edge() {
        let driver = InMemoryDriver::new();
        let now = Utc::now();
        let cluster = create_node(&driver, "primary", NodeType::ClusterEntity, now).unwrap();
        let instance = create_node(&driver, "f", NodeType::FeedInstance, now).unwrap();

        link_instance_to_entity(
            &driver,
            instance,
            "primary",
            NodeType::ClusterEntity,
            EdgeLabel::Evicted,
            Some(now),
        )
        .unwrap();

        let edges = driver.edges_from(instance);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].target_node_uuid, cluster);
        assert_eq!(edges[0].timestamp, Some(now));
    }

    #[test]
    fn link_to_missing_entity_is_consistency_error() {
        let driver = InMemoryDriver::new();
        let instance = create_node(&driver, "p", NodeType::ProcessInstance, Utc::now()).unwrap();

        let err = link_instance_to_entity(
            &driver,
            instance,
            "missing-cluster",
            NodeType::ClusterEntity,
            EdgeLabel::RunsOn,
            None,
        )
        .unwrap_err();

        match err {
            LineageError::Consistency { name, node_type } => {
                assert_eq!(name, "missing-cluster");
                assert_eq!(node_type, NodeType::ClusterEntity);
            }
            e => panic!("expected Consistency error, got {:?}", e),
        }
        assert_eq!(driver.edge_count(), 0);
    }
}
