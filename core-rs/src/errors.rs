//! Error types for the hierarchy engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HierarchyError {
    /// The graph backend could not execute a query (or timed out).
    /// Never retried here; the whole computation is aborted.
    #[error("Query failure: {0}")]
    QueryFailure(String),

    /// An attribute was read that the computation never asked the gateway for.
    #[error("Attribute '{attribute}' not loaded for node {node}")]
    AttributeNotLoaded { node: String, attribute: String },

    #[error("Malformed hierarchy: {0}")]
    MalformedHierarchy(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HierarchyError {
    pub fn not_loaded(node: &str, attribute: impl std::fmt::Display) -> Self {
        HierarchyError::AttributeNotLoaded {
            node: node.to_string(),
            attribute: attribute.to_string(),
        }
    }
}

impl From<oxigraph::sparql::EvaluationError> for HierarchyError {
    fn from(err: oxigraph::sparql::EvaluationError) -> Self {
        HierarchyError::QueryFailure(err.to_string())
    }
}

impl From<reqwest::Error> for HierarchyError {
    fn from(err: reqwest::Error) -> Self {
        HierarchyError::QueryFailure(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HierarchyError>;
