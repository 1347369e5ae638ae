use super::errors::HierarchicalParamsError;

/// The set of checked hyperparameters for the agglomerative clusterer.
///
/// The pipeline only ever needs Ward linkage over Euclidean distance with a
/// flat cut at a fixed cluster count, so the cut count is the single
/// hyperparameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HierarchicalValidParams {
    n_clusters: usize,
}

impl HierarchicalValidParams {
    /// Number of clusters the hierarchy is cut into
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }
}

/// Helper struct for building a set of [valid hyperparameters](HierarchicalValidParams)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HierarchicalParams(pub(crate) HierarchicalValidParams);

impl HierarchicalParams {
    pub fn new(n_clusters: usize) -> Self {
        Self(HierarchicalValidParams { n_clusters })
    }

    /// Checks the hyperparameters and returns the checked set if successful
    pub fn check(self) -> Result<HierarchicalValidParams, HierarchicalParamsError> {
        if self.0.n_clusters == 0 {
            Err(HierarchicalParamsError::NClusters)
        } else {
            Ok(self.0)
        }
    }
}
