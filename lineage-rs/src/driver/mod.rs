//! Graph store driver abstraction.
//!
//! Defines the [`GraphDriver`] trait every storage backend must satisfy, plus:
//! - [`memory::InMemoryDriver`]: single-lock in-process store
//! - [`batch::GraphBatch`]: staged write batch committed as one unit
//!
//! The store offers exactly what lineage construction needs: insert a node,
//! insert an edge, set a property, and exact-match lookup by `(name, type)`.
//! There is no update-in-place of names/types and no delete.

pub mod batch;
pub mod memory;

pub use batch::{BatchSummary, GraphBatch};
pub use memory::InMemoryDriver;

use std::sync::Arc;

use crate::edges::LineageEdge;
use crate::errors::Result;
use crate::nodes::{GraphNode, NodeId, NodeType, PropertyValue};

/// One staged write against a graph store.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    InsertNode(GraphNode),
    InsertEdge(LineageEdge),
    SetProperty {
        node: NodeId,
        key: String,
        value: PropertyValue,
    },
}

/// Trait representing a graph store backend.
///
/// Calls block the calling thread. Failures are reported as
/// [`crate::LineageError::Storage`] and are never retried here.
pub trait GraphDriver: Send + Sync {
    /// Insert a node unconditionally.
    fn insert_node(&self, node: GraphNode) -> Result<()>;

    /// Insert a directed edge unconditionally. Both endpoints must exist.
    fn insert_edge(&self, edge: LineageEdge) -> Result<()>;

    /// Set (or overwrite) one property on an existing node.
    fn set_node_property(&self, node: NodeId, key: &str, value: PropertyValue) -> Result<()>;

    /// Exact-match lookup. Absence is `Ok(None)`, not an error.
    ///
    /// When several nodes share `(name, node_type)` the earliest inserted wins.
    fn find_node(&self, name: &str, node_type: NodeType) -> Result<Option<NodeId>>;

    /// Apply a sequence of mutations.
    ///
    /// The default replays them one by one and stops at the first failure.
    /// Backends that can apply them atomically should override this.
    fn write_batch(&self, mutations: Vec<Mutation>) -> Result<()> {
        for mutation in mutations {
            match mutation {
                Mutation::InsertNode(node) => self.insert_node(node)?,
                Mutation::InsertEdge(edge) => self.insert_edge(edge)?,
                Mutation::SetProperty { node, key, value } => {
                    self.set_node_property(node, &key, value)?
                }
            }
        }
        Ok(())
    }

    /// Health check: verify the store is reachable.
    fn ping(&self) -> Result<()> {
        Ok(())
    }
}

impl<T: GraphDriver + ?Sized> GraphDriver for &T {
    fn insert_node(&self, node: GraphNode) -> Result<()> {
        (**self).insert_node(node)
    }

    fn insert_edge(&self, edge: LineageEdge) -> Result<()> {
        (**self).insert_edge(edge)
    }

    fn set_node_property(&self, node: NodeId, key: &str, value: PropertyValue) -> Result<()> {
        (**self).set_node_property(node, key, value)
    }

    fn find_node(&self, name: &str, node_type: NodeType) -> Result<Option<NodeId>> {
        (**self).find_node(name, node_type)
    }

    fn write_batch(&self, mutations: Vec<Mutation>) -> Result<()> {
        (**self).write_batch(mutations)
    }

    fn ping(&self) -> Result<()> {
        (**self).ping()
    }
}

impl<T: GraphDriver + ?Sized> GraphDriver for Arc<T> {
    fn insert_node(&self, node: GraphNode) -> Result<()> {
        (**self).insert_node(node)
    }

    fn insert_edge(&self, edge: LineageEdge) -> Result<()> {
        (**self).insert_edge(edge)
    }

    fn set_node_property(&self, node: NodeId, key: &str, value: PropertyValue) -> Result<()> {
        (**self).set_node_property(node, key, value)
    }

    fn find_node(&self, name: &str, node_type: NodeType) -> Result<Option<NodeId>> {
        (**self).find_node(name, node_type)
    }

    fn write_batch(&self, mutations: Vec<Mutation>) -> Result<()> {
        (**self).write_batch(mutations)
    }

    fn ping(&self) -> Result<()> {
        (**self).ping()
    }
}
