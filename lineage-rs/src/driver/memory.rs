//! In-process graph store.
//!
//! All state sits behind one `parking_lot::RwLock`, so a batch applied through
//! [`GraphDriver::write_batch`] becomes visible to readers all at once or not
//! at all. Not persisted across restarts.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use tracing::debug;

use super::{GraphDriver, Mutation};
use crate::edges::{EdgeLabel, LineageEdge};
use crate::errors::{LineageError, Result};
use crate::nodes::{GraphNode, NodeId, NodeType, PropertyValue};

#[derive(Debug, Default)]
struct GraphState {
    nodes: HashMap<NodeId, GraphNode>,
    /// `(type, name)` → ids in insertion order.
    index: HashMap<(NodeType, String), Vec<NodeId>>,
    edges: Vec<LineageEdge>,
}

impl GraphState {
    fn check(&self, mutations: &[Mutation]) -> Result<()> {
        let mut staged: HashSet<NodeId> = HashSet::new();
        let known = |id: &NodeId, staged: &HashSet<NodeId>| {
            self.nodes.contains_key(id) || staged.contains(id)
        };

        for mutation in mutations {
            match mutation {
                Mutation::InsertNode(node) => {
                    if known(&node.uuid, &staged) {
                        return Err(LineageError::Storage(format!(
                            "node {} already exists",
                            node.uuid
                        )));
                    }
                    staged.insert(node.uuid);
                }
                Mutation::InsertEdge(edge) => {
                    for end in [&edge.source_node_uuid, &edge.target_node_uuid] {
                        if !known(end, &staged) {
                            return Err(unknown_node(end));
                        }
                    }
                }
                Mutation::SetProperty { node, .. } => {
                    if !known(node, &staged) {
                        return Err(unknown_node(node));
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply a mutation that has already passed [`GraphState::check`].
    fn apply(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::InsertNode(node) => {
                self.index
                    .entry((node.node_type, node.name.clone()))
                    .or_default()
                    .push(node.uuid);
                self.nodes.insert(node.uuid, node);
            }
            Mutation::InsertEdge(edge) => self.edges.push(edge),
            Mutation::SetProperty { node, key, value } => {
                if let Some(n) = self.nodes.get_mut(&node) {
                    n.properties.insert(key, value);
                }
            }
        }
    }

    fn write_one(&mut self, mutation: Mutation) -> Result<()> {
        self.check(std::slice::from_ref(&mutation))?;
        self.apply(mutation);
        Ok(())
    }
}

fn unknown_node(id: &NodeId) -> LineageError {
    LineageError::Storage(format!("node {id} does not exist"))
}

/// Thread-safe in-memory [`GraphDriver`].
#[derive(Debug, Default)]
pub struct InMemoryDriver {
    state: RwLock<GraphState>,
}

impl InMemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: NodeId) -> Option<GraphNode> {
        self.state.read().nodes.get(&id).cloned()
    }

    /// Every node with this exact `(name, type)`, oldest first.
    pub fn find_all(&self, name: &str, node_type: NodeType) -> Vec<GraphNode> {
        let state = self.state.read();
        state
            .index
            .get(&(node_type, name.to_string()))
            .into_iter()
            .flatten()
            .filter_map(|id| state.nodes.get(id).cloned())
            .collect()
    }

    pub fn nodes_of_type(&self, node_type: NodeType) -> Vec<GraphNode> {
        self.state
            .read()
            .nodes
            .values()
            .filter(|n| n.node_type == node_type)
            .cloned()
            .collect()
    }

    pub fn edges_from(&self, source: NodeId) -> Vec<LineageEdge> {
        self.state
            .read()
            .edges
            .iter()
            .filter(|e| e.source_node_uuid == source)
            .cloned()
            .collect()
    }

    pub fn edges_to(&self, target: NodeId) -> Vec<LineageEdge> {
        self.state
            .read()
            .edges
            .iter()
            .filter(|e| e.target_node_uuid == target)
            .cloned()
            .collect()
    }

    pub fn edges_with_label(&self, label: EdgeLabel) -> Vec<LineageEdge> {
        self.state
            .read()
            .edges
            .iter()
            .filter(|e| e.label == label)
            .cloned()
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.state.read().nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.state.read().edges.len()
    }
}

impl GraphDriver for InMemoryDriver {
    fn insert_node(&self, node: GraphNode) -> Result<()> {
        self.state.write().write_one(Mutation::InsertNode(node))
    }

    fn insert_edge(&self, edge: LineageEdge) -> Result<()> {
        self.state.write().write_one(Mutation::InsertEdge(edge))
    }

    fn set_node_property(&self, node: NodeId, key: &str, value: PropertyValue) -> Result<()> {
        self.state.write().write_one(Mutation::SetProperty {
            node,
            key: key.to_string(),
            value,
        })
    }

    fn find_node(&self, name: &str, node_type: NodeType) -> Result<Option<NodeId>> {
        Ok(self
            .state
            .read()
            .index
            .get(&(node_type, name.to_string()))
            .and_then(|ids| ids.first().copied()))
    }

    fn write_batch(&self, mutations: Vec<Mutation>) -> Result<()> {
        let mut state = self.state.write();
        state.check(&mutations)?;
        debug!(mutations = mutations.len(), "applying write batch");
        for mutation in mutations {
            state.apply(mutation);
        }
        Ok(())
    }
}
