//! NodeType: the closed set of vertex types in the lineage graph.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::LineageError;

/// Type tag carried by every graph node.
///
/// The wire names are consumed by downstream audit and impact-analysis
/// tooling and must stay stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    ClusterEntity,
    FeedEntity,
    ProcessEntity,
    DatasourceEntity,
    User,
    ProcessInstance,
    FeedInstance,
    /// Classification tag declared on a process or feed.
    #[serde(rename = "classification")]
    Tags,
    /// Feed group.
    #[serde(rename = "group")]
    Groups,
    /// Process pipeline.
    #[serde(rename = "pipeline")]
    Pipelines,
}

impl NodeType {
    pub const ALL: [NodeType; 10] = [
        NodeType::ClusterEntity,
        NodeType::FeedEntity,
        NodeType::ProcessEntity,
        NodeType::DatasourceEntity,
        NodeType::User,
        NodeType::ProcessInstance,
        NodeType::FeedInstance,
        NodeType::Tags,
        NodeType::Groups,
        NodeType::Pipelines,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::ClusterEntity => "cluster-entity",
            NodeType::FeedEntity => "feed-entity",
            NodeType::ProcessEntity => "process-entity",
            NodeType::DatasourceEntity => "datasource-entity",
            NodeType::User => "user",
            NodeType::ProcessInstance => "process-instance",
            NodeType::FeedInstance => "feed-instance",
            NodeType::Tags => "classification",
            NodeType::Groups => "group",
            NodeType::Pipelines => "pipeline",
        }
    }

    /// Whether nodes of this type are created by event processing.
    pub fn is_instance(&self) -> bool {
        matches!(self, NodeType::ProcessInstance | NodeType::FeedInstance)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = LineageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| LineageError::Validation(format!("unknown node type '{s}'")))
    }
}
