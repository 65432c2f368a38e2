//! Error types for lineage-rs.

use crate::nodes::NodeType;

/// Alias for Results returning [`LineageError`].
pub type Result<T> = std::result::Result<T, LineageError>;

/// Top-level error type for lineage-rs.
///
/// Every failure while recording one execution event surfaces as a single
/// value of this type. A failed event may already have written part of its
/// nodes and edges unless it ran inside a [`crate::driver::GraphBatch`].
#[derive(Debug, thiserror::Error)]
pub enum LineageError {
    /// A referenced entity node is missing from the graph.
    #[error("Consistency error: {node_type} node must exist for '{name}'")]
    Consistency { name: String, node_type: NodeType },

    /// Structurally malformed event input (counters, feed lists, timestamps).
    #[error("Format error: {0}")]
    Format(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LineageError {
    pub(crate) fn consistency(name: impl Into<String>, node_type: NodeType) -> Self {
        LineageError::Consistency {
            name: name.into(),
            node_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consistency_error_names_missing_entity() {
        let err = LineageError::consistency("primary-cluster", NodeType::ClusterEntity);
        assert_eq!(
            err.to_string(),
            "Consistency error: cluster-entity node must exist for 'primary-cluster'"
        );
    }

    #[test]
    fn serde_errors_convert() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: LineageError = parse.unwrap_err().into();
        assert!(matches!(err, LineageError::Serialization(_)));
    }
}
