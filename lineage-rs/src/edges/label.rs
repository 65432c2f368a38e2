//! EdgeLabel: the closed set of relationship labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::LineageError;

/// Label carried by every lineage edge.
///
/// Like [`crate::nodes::NodeType`], the wire names are a stability contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeLabel {
    /// Instance → the process or feed entity it materializes.
    InstanceOf,
    /// Process instance → cluster it ran on.
    RunsOn,
    /// Feed instance → cluster holding the data.
    StoredIn,
    /// Instance → triggering user.
    OwnedBy,
    /// Process instance → feed instance it produced.
    ProcessOutput,
    /// Feed instance → process instance that consumed it.
    ProcessInput,
    /// Feed instance → replication target cluster.
    Replicated,
    /// Feed instance → cluster it was evicted from.
    Evicted,
    /// Feed instance → datasource it was imported from.
    ImportedFrom,
    ClassifiedAs,
    Pipeline,
    GroupedAs,
}

impl EdgeLabel {
    pub const ALL: [EdgeLabel; 12] = [
        EdgeLabel::InstanceOf,
        EdgeLabel::RunsOn,
        EdgeLabel::StoredIn,
        EdgeLabel::OwnedBy,
        EdgeLabel::ProcessOutput,
        EdgeLabel::ProcessInput,
        EdgeLabel::Replicated,
        EdgeLabel::Evicted,
        EdgeLabel::ImportedFrom,
        EdgeLabel::ClassifiedAs,
        EdgeLabel::Pipeline,
        EdgeLabel::GroupedAs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeLabel::InstanceOf => "instance-of",
            EdgeLabel::RunsOn => "runs-on",
            EdgeLabel::StoredIn => "stored-in",
            EdgeLabel::OwnedBy => "owned-by",
            EdgeLabel::ProcessOutput => "process-output",
            EdgeLabel::ProcessInput => "process-input",
            EdgeLabel::Replicated => "replicated",
            EdgeLabel::Evicted => "evicted",
            EdgeLabel::ImportedFrom => "imported-from",
            EdgeLabel::ClassifiedAs => "classified-as",
            EdgeLabel::Pipeline => "pipeline",
            EdgeLabel::GroupedAs => "grouped-as",
        }
    }

    /// Labels that attach catalog-declared enrichment in history-preservation mode.
    pub fn is_enrichment(&self) -> bool {
        matches!(
            self,
            EdgeLabel::ClassifiedAs | EdgeLabel::Pipeline | EdgeLabel::GroupedAs
        )
    }
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeLabel {
    type Err = LineageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EdgeLabel::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| LineageError::Validation(format!("unknown edge label '{s}'")))
    }
}
