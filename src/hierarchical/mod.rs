//! Agglomerative hierarchical clustering with Ward's linkage
//!
//! Produces the full merge tree (for dendrogram rendering) and a flat
//! partition obtained by cutting the tree at a fixed cluster count.

mod algorithm;
mod errors;
mod hyperparams;

pub use algorithm::{HierarchicalCluster, Hierarchy, MergeStep};
pub use errors::{HierarchicalError, HierarchicalParamsError};
pub use hyperparams::{HierarchicalParams, HierarchicalValidParams};
