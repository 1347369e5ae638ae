//! # geocluster
//!
//! `geocluster` partitions a regional subset of the UK postcode dataset into
//! a fixed number of spatial clusters. Coordinates are scaled to unit norm
//! and grouped by agglomerative hierarchical clustering with Ward's linkage;
//! the run emits the labeled records as a table together with a dendrogram
//! and two scatter charts.
//!
//! The clustering core ([`UnitScaler`], [`HierarchicalCluster`]) is a pure
//! computation over in-memory matrices. Data acquisition, the tabular sink
//! and chart rendering sit behind narrow collaborator traits in
//! [`dataset::source`] and [`pipeline`], so the core stays fully
//! unit-testable.

pub mod dataset;
pub mod error;
pub mod hierarchical;
pub mod logging;
pub mod normalize;
pub mod pipeline;

pub use error::{Error, Result};
pub use hierarchical::{HierarchicalCluster, Hierarchy, MergeStep};
pub use normalize::UnitScaler;
pub use pipeline::{ClusterPipeline, PipelineConfig, Stage, Workspace};
