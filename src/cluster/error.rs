use thiserror::Error;

/// Errors produced while building or querying a cluster index
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusterError {
    /// A point has coordinates outside of the valid lat/lon ranges
    #[error("invalid point #{index} ({id}): latitude={latitude}, longitude={longitude}")]
    InvalidInput {
        index: usize,
        id: String,
        latitude: f64,
        longitude: f64,
    },

    /// Cluster id was not produced by this index
    #[error("unknown cluster id {0}")]
    UnknownCluster(usize),

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, ClusterError>;
