//! Node types for the lineage graph.
//!
//! Two families share one record shape:
//! - static entities (process/feed/cluster/user/datasource definitions and
//!   their classification/pipeline/group markers), registered outside this crate
//! - dynamic instances ([`NodeType::ProcessInstance`], [`NodeType::FeedInstance`]),
//!   created while recording execution events

pub mod graph_node;
pub mod node_type;

pub use graph_node::{GraphNode, NodeId, PropertyValue};
pub use node_type::NodeType;
