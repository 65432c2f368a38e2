//! Instance lineage builder.
//!
//! Turns one execution event into node and edge writes. Two creation policies
//! coexist and must not be unified:
//! - process instances and the feed instances of a process run's inputs and
//!   outputs are always created fresh, one node per event occurrence
//! - feed instances reached by replication, eviction, or import are looked up
//!   by their deterministic key first and only created when absent
//!
//! Redelivering a process-run event therefore adds duplicate nodes; there is
//! no safeguard against that here.

use tracing::{debug, info};

use crate::catalog::{EntityCatalog, EntityType};
use crate::context::{is_no_feeds, ExecutionContext, WorkflowProperty, VERSION_PROPERTY};
use crate::counters::parse_counters;
use crate::driver::GraphDriver;
use crate::edges::EdgeLabel;
use crate::errors::{LineageError, Result};
use crate::graph::{create_edge, create_node, find_node, link_instance_to_entity};
use crate::identity::{feed_instance_key, process_instance_key};
use crate::nodes::{NodeId, NodeType};
use crate::types::LineageConfig;

/// Records process and feed instances against a graph store.
///
/// The catalog is only read when history preservation is enabled.
pub struct InstanceGraphBuilder<D, C> {
    driver: D,
    catalog: C,
    config: LineageConfig,
}

impl<D: GraphDriver, C: EntityCatalog> InstanceGraphBuilder<D, C> {
    pub fn new(driver: D, catalog: C, config: LineageConfig) -> Self {
        Self {
            driver,
            catalog,
            config,
        }
    }

    pub fn preserve_history(&self) -> bool {
        self.config.preserve_history
    }

    /// Create the node for a completed process run.
    ///
    /// Links it to its process, cluster and user entities, attaches workflow
    /// metadata and counters, and (with history preservation) the process's
    /// classification tags and pipelines. Feed linking is left to
    /// [`Self::add_output_feed_instances`] and [`Self::add_input_feed_instances`].
    pub fn add_process_instance(&self, context: &ExecutionContext) -> Result<NodeId> {
        let name = process_instance_key(context)?;
        info!(process_instance = %name, "adding process instance");

        let instance = create_node(
            &self.driver,
            &name,
            NodeType::ProcessInstance,
            context.timestamp,
        )?;
        self.add_workflow_properties(instance, context)?;

        self.link(instance, &context.entity_name, NodeType::ProcessEntity, EdgeLabel::InstanceOf)?;
        self.link(instance, &context.cluster_name, NodeType::ClusterEntity, EdgeLabel::RunsOn)?;
        self.link(instance, &context.workflow_user, NodeType::User, EdgeLabel::OwnedBy)?;

        if self.preserve_history() {
            let process = self.catalog.get(EntityType::Process, &context.entity_name)?;
            self.add_enrichment(instance, &process.tags, NodeType::Tags, EdgeLabel::ClassifiedAs)?;
            self.add_enrichment(instance, &process.pipelines, NodeType::Pipelines, EdgeLabel::Pipeline)?;
        }

        self.add_counters(instance, context)?;
        Ok(instance)
    }

    /// Copy the allowlisted workflow metadata onto a process instance.
    ///
    /// Absent or empty values are skipped, never defaulted.
    pub fn add_workflow_properties(&self, instance: NodeId, context: &ExecutionContext) -> Result<()> {
        for key in WorkflowProperty::INSTANCE_PROPERTIES {
            if let Some(value) = context.workflow_value(key) {
                self.driver
                    .set_node_property(instance, key.as_str(), value.into())?;
            }
        }
        if let Some(version) = context.workflow_value(WorkflowProperty::UserWorkflowVersion) {
            self.driver
                .set_node_property(instance, VERSION_PROPERTY, version.into())?;
        }
        Ok(())
    }

    /// One fresh feed instance per output path, each linked
    /// `process-output` from the process instance.
    pub fn add_output_feed_instances(
        &self,
        context: &ExecutionContext,
        process_instance: NodeId,
    ) -> Result<Vec<NodeId>> {
        if !context.has_output_feeds() {
            debug!(process = %context.entity_name, "no output feeds to record");
            return Ok(Vec::new());
        }

        let mut created = Vec::new();
        for (feed_name, path) in context.output_feeds()? {
            let feed_instance = self.add_process_feed_instance(context, feed_name, path)?;
            create_edge(&self.driver, process_instance, feed_instance, EdgeLabel::ProcessOutput, None)?;
            created.push(feed_instance);
        }
        Ok(created)
    }

    /// One fresh feed instance per input path, each linked `process-input`
    /// to the process instance.
    pub fn add_input_feed_instances(
        &self,
        context: &ExecutionContext,
        process_instance: NodeId,
    ) -> Result<Vec<NodeId>> {
        if !context.has_input_feeds() {
            debug!(process = %context.entity_name, "no input feeds to record");
            return Ok(Vec::new());
        }

        let mut created = Vec::new();
        for (feed_name, paths) in context.input_feeds()? {
            for path in paths {
                let feed_instance = self.add_process_feed_instance(context, feed_name, path)?;
                create_edge(&self.driver, feed_instance, process_instance, EdgeLabel::ProcessInput, None)?;
                created.push(feed_instance);
            }
        }
        Ok(created)
    }

    /// Record a feed instance copied to the event's (target) cluster.
    ///
    /// The instance key uses the target cluster. A newly created instance is
    /// stored-in the source cluster. Counters land on the feed instance.
    pub fn add_replicated_instance(&self, context: &ExecutionContext) -> Result<Option<NodeId>> {
        if !context.has_output_feeds() {
            debug!("no replicated feed to record");
            return Ok(None);
        }

        let feed_name = single(&context.output_feed_names, "replicated feed name")?;
        let path = single(&context.output_feed_paths, "replicated feed path")?;
        let target_cluster = &context.cluster_name;
        info!(feed = feed_name, path, cluster = %target_cluster, "recording replicated instance");

        let key = feed_instance_key(feed_name, target_cluster, path, &context.nominal_time)?;
        let feed_instance =
            self.find_or_add_feed_instance(&key, context, feed_name, context.src_cluster_or_cluster())?;

        link_instance_to_entity(
            &self.driver,
            feed_instance,
            target_cluster,
            NodeType::ClusterEntity,
            EdgeLabel::Replicated,
            Some(context.timestamp),
        )?;

        self.add_counters(feed_instance, context)?;
        Ok(Some(feed_instance))
    }

    /// Record feed instances evicted from the event's cluster by retention.
    ///
    /// One feed name, possibly many paths; one `evicted` edge per path.
    pub fn add_evicted_instance(&self, context: &ExecutionContext) -> Result<Vec<NodeId>> {
        if !context.has_output_feeds() || is_no_feeds(&context.output_feed_paths) {
            info!("there were no evicted instances, nothing to record");
            return Ok(Vec::new());
        }

        let feed_name = single(&context.output_feed_names, "evicted feed name")?;
        let cluster = &context.cluster_name;
        info!(feed = feed_name, paths = %context.output_feed_paths, "recording evicted instances");

        let mut recorded = Vec::new();
        for path in context.output_feed_paths_list() {
            let key = feed_instance_key(feed_name, cluster, path, &context.nominal_time)?;
            let feed_instance = self.find_or_add_feed_instance(&key, context, feed_name, cluster)?;
            link_instance_to_entity(
                &self.driver,
                feed_instance,
                cluster,
                NodeType::ClusterEntity,
                EdgeLabel::Evicted,
                Some(context.timestamp),
            )?;
            recorded.push(feed_instance);
        }
        Ok(recorded)
    }

    /// Record a feed instance imported from a datasource into the source cluster.
    pub fn add_imported_instance(&self, context: &ExecutionContext) -> Result<Option<NodeId>> {
        if !context.has_output_feeds() {
            debug!("no imported feed to record");
            return Ok(None);
        }

        let feed_name = single(&context.output_feed_names, "imported feed name")?;
        let path = single(&context.output_feed_paths, "imported feed path")?;
        let datasource = context
            .datasource_name
            .as_deref()
            .filter(|d| !d.is_empty())
            .ok_or_else(|| LineageError::Format("import event carries no datasource".into()))?;
        let source_cluster = context.src_cluster_or_cluster();
        info!(
            feed = feed_name,
            path,
            cluster = source_cluster,
            datasource,
            "recording imported instance"
        );

        let key = feed_instance_key(feed_name, source_cluster, path, &context.nominal_time)?;
        let feed_instance = self.find_or_add_feed_instance(&key, context, feed_name, source_cluster)?;

        link_instance_to_entity(
            &self.driver,
            feed_instance,
            datasource,
            NodeType::DatasourceEntity,
            EdgeLabel::ImportedFrom,
            Some(context.timestamp),
        )?;
        link_instance_to_entity(
            &self.driver,
            feed_instance,
            source_cluster,
            NodeType::ClusterEntity,
            EdgeLabel::StoredIn,
            Some(context.timestamp),
        )?;
        Ok(Some(feed_instance))
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn link(&self, instance: NodeId, name: &str, entity_type: NodeType, label: EdgeLabel) -> Result<()> {
        link_instance_to_entity(&self.driver, instance, name, entity_type, label, None)
    }

    /// Feed instance on the always-create path of a process run.
    fn add_process_feed_instance(
        &self,
        context: &ExecutionContext,
        feed_name: &str,
        path: &str,
    ) -> Result<NodeId> {
        let cluster = &context.cluster_name;
        let key = feed_instance_key(feed_name, cluster, path, &context.nominal_time)?;
        self.add_feed_instance(&key, context, feed_name, cluster)
    }

    fn find_or_add_feed_instance(
        &self,
        key: &str,
        context: &ExecutionContext,
        feed_name: &str,
        cluster_name: &str,
    ) -> Result<NodeId> {
        match find_node(&self.driver, key, NodeType::FeedInstance)? {
            Some(existing) => {
                debug!(feed_instance = key, "reusing recorded feed instance");
                Ok(existing)
            }
            None => {
                info!(feed_instance = key, "feed instance not yet recorded, adding it");
                self.add_feed_instance(key, context, feed_name, cluster_name)
            }
        }
    }

    fn add_feed_instance(
        &self,
        key: &str,
        context: &ExecutionContext,
        feed_name: &str,
        cluster_name: &str,
    ) -> Result<NodeId> {
        info!(feed_instance = key, "adding feed instance");
        let instance = create_node(&self.driver, key, NodeType::FeedInstance, context.timestamp)?;

        self.link(instance, feed_name, NodeType::FeedEntity, EdgeLabel::InstanceOf)?;
        self.link(instance, cluster_name, NodeType::ClusterEntity, EdgeLabel::StoredIn)?;
        self.link(instance, &context.workflow_user, NodeType::User, EdgeLabel::OwnedBy)?;

        if self.preserve_history() {
            let feed = self.catalog.get(EntityType::Feed, feed_name)?;
            self.add_enrichment(instance, &feed.tags, NodeType::Tags, EdgeLabel::ClassifiedAs)?;
            self.add_enrichment(instance, &feed.groups, NodeType::Groups, EdgeLabel::GroupedAs)?;
        }
        Ok(instance)
    }

    fn add_enrichment(
        &self,
        instance: NodeId,
        names: &[String],
        node_type: NodeType,
        label: EdgeLabel,
    ) -> Result<()> {
        for name in names.iter().filter(|n| !n.is_empty()) {
            self.link(instance, name, node_type, label)?;
        }
        Ok(())
    }

    /// Parse the event's counters and set them on `instance`.
    ///
    /// Parsing completes before any property is written.
    fn add_counters(&self, instance: NodeId, context: &ExecutionContext) -> Result<()> {
        let Some(raw) = context.counters() else {
            return Ok(());
        };
        for (key, value) in parse_counters(raw)? {
            self.driver.set_node_property(instance, &key, value.into())?;
        }
        Ok(())
    }
}

/// Reject comma-joined lists where the event kind carries exactly one value.
fn single<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    if value.is_empty() || value.contains(',') {
        return Err(LineageError::Format(format!(
            "expected a single {what}, got '{value}'"
        )));
    }
    Ok(value)
}
