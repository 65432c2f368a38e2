//! Staged write batch over any [`GraphDriver`].
//!
//! Recording one execution event takes several node and edge writes. Running
//! them against a [`GraphBatch`] keeps them out of the store until
//! [`GraphBatch::commit`], so a failing event leaves no partial lineage behind
//! on stores whose `write_batch` is atomic. Dropping an uncommitted batch
//! discards it.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use super::{GraphDriver, Mutation};
use crate::edges::LineageEdge;
use crate::errors::Result;
use crate::nodes::{GraphNode, NodeId, NodeType, PropertyValue};

/// Counts of what a batch wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub nodes_created: usize,
    pub edges_created: usize,
    pub properties_set: usize,
}

impl BatchSummary {
    fn of(mutations: &[Mutation]) -> Self {
        let mut summary = Self::default();
        for mutation in mutations {
            match mutation {
                Mutation::InsertNode(_) => summary.nodes_created += 1,
                Mutation::InsertEdge(_) => summary.edges_created += 1,
                Mutation::SetProperty { .. } => summary.properties_set += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Default)]
struct Staged {
    mutations: Vec<Mutation>,
    /// First staged node per `(type, name)`.
    index: HashMap<(NodeType, String), NodeId>,
}

/// Write batch staging mutations for one event.
///
/// Lookups see committed nodes first, then nodes staged earlier in this batch.
pub struct GraphBatch<'a, D: GraphDriver + ?Sized> {
    inner: &'a D,
    staged: Mutex<Staged>,
}

impl<'a, D: GraphDriver + ?Sized> GraphBatch<'a, D> {
    pub fn new(inner: &'a D) -> Self {
        Self {
            inner,
            staged: Mutex::new(Staged::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.staged.lock().mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counts of the currently staged mutations.
    pub fn summary(&self) -> BatchSummary {
        BatchSummary::of(&self.staged.lock().mutations)
    }

    /// Forward all staged mutations to the underlying store.
    pub fn commit(self) -> Result<BatchSummary> {
        let staged = std::mem::take(&mut *self.staged.lock());
        let summary = BatchSummary::of(&staged.mutations);
        if !staged.mutations.is_empty() {
            self.inner.write_batch(staged.mutations)?;
        }
        debug!(?summary, "write batch committed");
        Ok(summary)
    }

    fn stage(&self, mutation: Mutation) {
        self.staged.lock().mutations.push(mutation);
    }
}

impl<D: GraphDriver + ?Sized> Drop for GraphBatch<'_, D> {
    fn drop(&mut self) {
        let pending = self.staged.get_mut().mutations.len();
        if pending > 0 {
            debug!(pending, "discarding uncommitted write batch");
        }
    }
}

impl<D: GraphDriver + ?Sized> GraphDriver for GraphBatch<'_, D> {
    fn insert_node(&self, node: GraphNode) -> Result<()> {
        let mut staged = self.staged.lock();
        staged
            .index
            .entry((node.node_type, node.name.clone()))
            .or_insert(node.uuid);
        staged.mutations.push(Mutation::InsertNode(node));
        Ok(())
    }

    fn insert_edge(&self, edge: LineageEdge) -> Result<()> {
        self.stage(Mutation::InsertEdge(edge));
        Ok(())
    }

    fn set_node_property(&self, node: NodeId, key: &str, value: PropertyValue) -> Result<()> {
        self.stage(Mutation::SetProperty {
            node,
            key: key.to_string(),
            value,
        });
        Ok(())
    }

    fn find_node(&self, name: &str, node_type: NodeType) -> Result<Option<NodeId>> {
        if let Some(id) = self.inner.find_node(name, node_type)? {
            return Ok(Some(id));
        }
        Ok(self
            .staged
            .lock()
            .index
            .get(&(node_type, name.to_string()))
            .copied())
    }

    fn write_batch(&self, mutations: Vec<Mutation>) -> Result<()> {
        for mutation in mutations {
            match mutation {
                Mutation::InsertNode(node) => self.insert_node(node)?,
                other => self.stage(other),
            }
        }
        Ok(())
    }

    fn ping(&self) -> Result<()> {
        self.inner.ping()
    }
}
