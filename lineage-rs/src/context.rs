//! Execution context delivered by the workflow scheduler for one completed run.
//!
//! Feed lists use the scheduler's wire separators:
//! - output feed names and output paths are comma-joined, one path per name
//!   (eviction events carry one name and many paths)
//! - input feed names are `#`-joined, and input paths are `#`-joined groups in
//!   the same order, each group a comma-joined list of paths for that feed
//!
//! The reserved values [`NONE`] and [`IGNORE`] in a feed-names field mean the
//! run has no feeds of that kind.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::EntityType;
use crate::errors::{LineageError, Result};
use crate::utils::{format_iso8601, format_minute_iso8601, parse_flexible_datetime};

pub const NONE: &str = "NONE";
pub const IGNORE: &str = "IGNORE";

const OUTPUT_SEPARATOR: char = ',';
const INPUT_FEED_SEPARATOR: char = '#';
const INPUT_PATH_SEPARATOR: char = ',';

/// True when a feed-names (or paths) field is one of the "no feeds" sentinels.
pub fn is_no_feeds(value: &str) -> bool {
    value == NONE || value == IGNORE
}

/// The lifecycle operation the scheduler reports for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityOperation {
    /// A process run completed (produces/consumes feeds).
    Generate,
    /// A feed instance was copied to another cluster.
    Replicate,
    /// Retention evicted feed instances.
    Delete,
    /// A feed instance was imported from a datasource.
    Import,
}

/// Workflow-metadata keys the scheduler may attach to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkflowProperty {
    UserWorkflowName,
    UserWorkflowEngine,
    WorkflowId,
    RunId,
    Status,
    WorkflowEngineUrl,
    #[serde(rename = "subflowId")]
    UserSubflowId,
    UserWorkflowVersion,
}

impl WorkflowProperty {
    /// Keys copied onto a process-instance node, in order. The version is
    /// stored separately under [`VERSION_PROPERTY`].
    pub const INSTANCE_PROPERTIES: [WorkflowProperty; 7] = [
        WorkflowProperty::UserWorkflowName,
        WorkflowProperty::UserWorkflowEngine,
        WorkflowProperty::WorkflowId,
        WorkflowProperty::RunId,
        WorkflowProperty::Status,
        WorkflowProperty::WorkflowEngineUrl,
        WorkflowProperty::UserSubflowId,
    ];

    /// Property name used on graph nodes.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowProperty::UserWorkflowName => "userWorkflowName",
            WorkflowProperty::UserWorkflowEngine => "userWorkflowEngine",
            WorkflowProperty::WorkflowId => "workflowId",
            WorkflowProperty::RunId => "runId",
            WorkflowProperty::Status => "status",
            WorkflowProperty::WorkflowEngineUrl => "workflowEngineUrl",
            WorkflowProperty::UserSubflowId => "subflowId",
            WorkflowProperty::UserWorkflowVersion => "userWorkflowVersion",
        }
    }
}

/// Node property holding the user workflow version.
pub const VERSION_PROPERTY: &str = "version";

fn no_feeds() -> String {
    NONE.to_string()
}

/// Everything the scheduler reports about one execution event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub entity_name: String,
    pub entity_type: EntityType,
    pub operation: EntityOperation,
    pub cluster_name: String,
    /// Source cluster for replication and import events.
    #[serde(default)]
    pub src_cluster_name: Option<String>,
    pub workflow_user: String,
    /// Nominal (logical) time as ISO-8601.
    pub nominal_time: String,
    /// Wall-clock time of the event.
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub counters: Option<String>,
    #[serde(default = "no_feeds")]
    pub input_feed_names: String,
    #[serde(default = "no_feeds")]
    pub input_feed_paths: String,
    #[serde(default = "no_feeds")]
    pub output_feed_names: String,
    #[serde(default = "no_feeds")]
    pub output_feed_paths: String,
    #[serde(default)]
    pub datasource_name: Option<String>,
    #[serde(default)]
    pub workflow: BTreeMap<WorkflowProperty, String>,
}

impl ExecutionContext {
    /// Create a context with no feeds, counters, or workflow metadata.
    pub fn new(
        operation: EntityOperation,
        entity_type: EntityType,
        entity_name: impl Into<String>,
        cluster_name: impl Into<String>,
        workflow_user: impl Into<String>,
        nominal_time: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            entity_name: entity_name.into(),
            entity_type,
            operation,
            cluster_name: cluster_name.into(),
            src_cluster_name: None,
            workflow_user: workflow_user.into(),
            nominal_time: nominal_time.into(),
            timestamp,
            counters: None,
            input_feed_names: no_feeds(),
            input_feed_paths: no_feeds(),
            output_feed_names: no_feeds(),
            output_feed_paths: no_feeds(),
            datasource_name: None,
            workflow: BTreeMap::new(),
        }
    }

    pub fn with_input_feeds(mut self, names: impl Into<String>, paths: impl Into<String>) -> Self {
        self.input_feed_names = names.into();
        self.input_feed_paths = paths.into();
        self
    }

    pub fn with_output_feeds(mut self, names: impl Into<String>, paths: impl Into<String>) -> Self {
        self.output_feed_names = names.into();
        self.output_feed_paths = paths.into();
        self
    }

    pub fn with_src_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.src_cluster_name = Some(cluster.into());
        self
    }

    pub fn with_datasource(mut self, datasource: impl Into<String>) -> Self {
        self.datasource_name = Some(datasource.into());
        self
    }

    pub fn with_counters(mut self, counters: impl Into<String>) -> Self {
        self.counters = Some(counters.into());
        self
    }

    pub fn with_workflow(mut self, key: WorkflowProperty, value: impl Into<String>) -> Self {
        self.workflow.insert(key, value.into());
        self
    }

    /// Value of a workflow-metadata key; empty strings read as absent.
    pub fn workflow_value(&self, key: WorkflowProperty) -> Option<&str> {
        self.workflow
            .get(&key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Nominal time parsed to UTC.
    pub fn nominal_time_utc(&self) -> Result<DateTime<Utc>> {
        parse_flexible_datetime(&self.nominal_time).ok_or_else(|| {
            LineageError::Format(format!("invalid nominal time '{}'", self.nominal_time))
        })
    }

    /// Nominal time at minute granularity (`yyyy-MM-ddTHH:mmZ`).
    pub fn nominal_time_iso8601(&self) -> Result<String> {
        self.nominal_time_utc().map(|t| format_minute_iso8601(&t))
    }

    pub fn timestamp_iso8601(&self) -> String {
        format_iso8601(&self.timestamp)
    }

    /// Source cluster, falling back to the event's cluster.
    pub fn src_cluster_or_cluster(&self) -> &str {
        self.src_cluster_name.as_deref().unwrap_or(&self.cluster_name)
    }

    /// Counters string, `None` when absent or blank.
    pub fn counters(&self) -> Option<&str> {
        self.counters.as_deref().filter(|c| !c.trim().is_empty())
    }

    pub fn has_output_feeds(&self) -> bool {
        !is_no_feeds(&self.output_feed_names)
    }

    pub fn has_input_feeds(&self) -> bool {
        !is_no_feeds(&self.input_feed_names)
    }

    pub fn output_feed_names_list(&self) -> Vec<&str> {
        self.output_feed_names.split(OUTPUT_SEPARATOR).collect()
    }

    pub fn output_feed_paths_list(&self) -> Vec<&str> {
        self.output_feed_paths.split(OUTPUT_SEPARATOR).collect()
    }

    pub fn input_feed_names_list(&self) -> Vec<&str> {
        self.input_feed_names.split(INPUT_FEED_SEPARATOR).collect()
    }

    pub fn input_feed_path_groups(&self) -> Vec<&str> {
        self.input_feed_paths.split(INPUT_FEED_SEPARATOR).collect()
    }

    /// Output feeds as `(feed name, path)` pairs.
    ///
    /// A single feed name owns every listed path; otherwise names and paths
    /// pair up by position. Any other mismatch fails without side effects.
    pub fn output_feeds(&self) -> Result<Vec<(&str, &str)>> {
        let names = self.output_feed_names_list();
        let paths = self.output_feed_paths_list();
        if let [name] = names[..] {
            return Ok(paths.into_iter().map(|path| (name, path)).collect());
        }
        if names.len() != paths.len() {
            return Err(LineageError::Format(format!(
                "{} output feed names but {} output paths",
                names.len(),
                paths.len()
            )));
        }
        Ok(names.into_iter().zip(paths).collect())
    }

    /// Input feeds as `(feed name, paths)` pairs.
    pub fn input_feeds(&self) -> Result<Vec<(&str, Vec<&str>)>> {
        let names = self.input_feed_names_list();
        let groups = self.input_feed_path_groups();
        if names.len() != groups.len() {
            return Err(LineageError::Format(format!(
                "{} input feed names but {} input path groups",
                names.len(),
                groups.len()
            )));
        }
        Ok(names
            .into_iter()
            .zip(groups)
            .map(|(name, group)| (name, group.split(INPUT_PATH_SEPARATOR).collect()))
            .collect())
    }
}
