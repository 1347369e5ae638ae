use thiserror::Error;

/// An error when building hyperparameters for the clusterer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchicalParamsError {
    #[error("n_clusters cannot be 0")]
    NClusters,
}

/// An error when fitting the agglomerative clusterer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchicalError {
    /// When any of the hyperparameters are set the wrong value
    #[error("Invalid hyperparameter: {0}")]
    InvalidParams(#[from] HierarchicalParamsError),
    /// When there are fewer observations than requested clusters
    #[error("{rows} observations cannot form {clusters} non-empty clusters")]
    InsufficientData { rows: usize, clusters: usize },
    /// When an observation contains NaN or infinite coordinates
    #[error("non-finite value in observation {row}")]
    InvalidInput { row: usize },
}
