//! Edge types for the lineage graph.
//!
//! Every relationship is a [`LineageEdge`] carrying one [`EdgeLabel`] from a
//! closed set, e.g.:
//! - `instance-of`: instance → its process/feed entity
//! - `process-output` / `process-input`: data flow between feed and process instances
//! - `replicated` / `evicted` / `imported-from`: feed instance lifecycle events

pub mod label;
pub mod lineage_edge;

pub use label::EdgeLabel;
pub use lineage_edge::LineageEdge;
