//! Error types for ontology loading and traversal

use omics_common::OmicsError;
use thiserror::Error;

/// Result type for ontology operations
pub type Result<T> = std::result::Result<T, OntologyError>;

#[derive(Debug, Error)]
pub enum OntologyError {
    /// No recognized hierarchy file, or a malformed one
    #[error("Format error: {0}")]
    Format(String),

    /// Term ids that are not in the current node list
    #[error("{} term id(s) not in the ontology node list: {}", .missing.len(), preview(.missing))]
    InconsistentNodeSet { missing: Vec<String> },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Resource(#[from] OmicsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl OntologyError {
    pub fn format(msg: impl Into<String>) -> Self {
        OntologyError::Format(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        OntologyError::Config(msg.into())
    }
}

fn preview(ids: &[String]) -> String {
    const SHOWN: usize = 5;
    if ids.len() <= SHOWN {
        ids.join(", ")
    } else {
        format!("{}, ... ({} more)", ids[..SHOWN].join(", "), ids.len() - SHOWN)
    }
}
