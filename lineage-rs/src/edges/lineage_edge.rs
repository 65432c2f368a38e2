//! LineageEdge: directed, labeled relationship between two nodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EdgeLabel;
use crate::nodes::NodeId;

/// A directed edge in the lineage graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineageEdge {
    /// Unique identifier for this edge.
    pub uuid: Uuid,
    /// UUID of the source node.
    pub source_node_uuid: NodeId,
    /// UUID of the target node.
    pub target_node_uuid: NodeId,
    pub label: EdgeLabel,
    /// Event time of the relationship, when the event carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl LineageEdge {
    pub fn new(
        source: NodeId,
        target: NodeId,
        label: EdgeLabel,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            source_node_uuid: source,
            target_node_uuid: target,
            label,
            timestamp,
        }
    }
}
