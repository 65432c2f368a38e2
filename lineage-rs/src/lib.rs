//! # lineage-rs
//!
//! Records data-pipeline execution lineage as a property graph. Every completed
//! process run and every feed instance it produced, consumed, replicated,
//! evicted or imported becomes a node linked to the static entities
//! (process/feed definitions, clusters, users, datasources, tags, pipelines,
//! groups) it relates to.
//!
//! ## Architecture
//!
//! - **Identity**: deterministic keys for process and feed instances
//! - **Counters**: all-or-nothing parsing of `key:value` execution metrics
//! - **Graph primitives**: create node, create edge, exact-match lookup over a [`driver::GraphDriver`]
//! - **Builder**: interprets one execution event as a sequence of primitive calls
//! - **Pipeline**: dispatches an event and commits its writes as one batch

pub mod edges;
pub mod errors;
pub mod nodes;
pub mod types;

pub mod catalog;
pub mod context;
pub mod driver;

pub mod builder;
pub mod counters;
pub mod graph;
pub mod identity;

pub mod pipeline;
pub mod utils;

pub use builder::InstanceGraphBuilder;
pub use errors::{LineageError, Result};
pub use pipeline::{record_execution, LineageRecord};
pub use types::LineageConfig;
