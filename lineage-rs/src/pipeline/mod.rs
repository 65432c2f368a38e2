//! Event ingestion pipeline.
//!
//! Dispatches one scheduler event to the matching builder operations:
//! 1. **generate**: process instance, then its output feeds, then its input feeds
//! 2. **replicate**: replicated feed instance
//! 3. **delete**: evicted feed instances
//! 4. **import**: imported feed instance
//!
//! Every step writes into a [`GraphBatch`] that is committed only when the
//! whole event succeeded.

use serde::Serialize;
use tracing::{info, warn};

use crate::builder::InstanceGraphBuilder;
use crate::catalog::{EntityCatalog, EntityType};
use crate::context::{EntityOperation, ExecutionContext};
use crate::driver::{BatchSummary, GraphBatch, GraphDriver};
use crate::errors::{LineageError, Result};
use crate::nodes::NodeId;
use crate::types::LineageConfig;

/// What recording one event wrote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineageRecord {
    pub operation: EntityOperation,
    pub process_instance: Option<NodeId>,
    /// Feed instances created or reused by the event, in processing order.
    pub feed_instances: Vec<NodeId>,
    pub summary: BatchSummary,
}

/// Record one execution event against `driver`.
///
/// On error nothing is committed and the error is returned unchanged.
pub fn record_execution<D, C>(
    driver: &D,
    catalog: &C,
    config: LineageConfig,
    context: &ExecutionContext,
) -> Result<LineageRecord>
where
    D: GraphDriver + ?Sized,
    C: EntityCatalog + ?Sized,
{
    let batch = GraphBatch::new(driver);
    let (process_instance, feed_instances) = {
        let builder = InstanceGraphBuilder::new(&batch, catalog, config);
        apply(&builder, context).inspect_err(|e| {
            warn!(
                entity = %context.entity_name,
                operation = ?context.operation,
                error = %e,
                "event rejected, discarding staged lineage"
            );
        })?
    };

    let summary = batch.commit()?;
    info!(
        entity = %context.entity_name,
        operation = ?context.operation,
        nodes = summary.nodes_created,
        edges = summary.edges_created,
        "lineage recorded"
    );

    Ok(LineageRecord {
        operation: context.operation,
        process_instance,
        feed_instances,
        summary,
    })
}

fn apply<D: GraphDriver, C: EntityCatalog>(
    builder: &InstanceGraphBuilder<D, C>,
    context: &ExecutionContext,
) -> Result<(Option<NodeId>, Vec<NodeId>)> {
    match context.operation {
        EntityOperation::Generate => {
            if context.entity_type != EntityType::Process {
                return Err(LineageError::Validation(format!(
                    "generate events must come from a process, not a {}",
                    context.entity_type
                )));
            }
            let process_instance = builder.add_process_instance(context)?;
            let mut feeds = builder.add_output_feed_instances(context, process_instance)?;
            feeds.extend(builder.add_input_feed_instances(context, process_instance)?);
            Ok((Some(process_instance), feeds))
        }
        EntityOperation::Replicate => Ok((
            None,
            builder.add_replicated_instance(context)?.into_iter().collect(),
        )),
        EntityOperation::Delete => Ok((None, builder.add_evicted_instance(context)?)),
        EntityOperation::Import => Ok((
            None,
            builder.add_imported_instance(context)?.into_iter().collect(),
        )),
    }
}
