//! Error types for the postcode clustering pipeline
//!

use thiserror::Error;

use crate::dataset::source::DataSourceError;
use crate::hierarchical::HierarchicalError;
use crate::normalize::NormalizationError;
use crate::pipeline::Stage;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure mode of a pipeline run. All of them are fatal; nothing in
/// the pipeline retries.
#[derive(Error, Debug)]
pub enum Error {
    #[error("data acquisition failed: {0}")]
    DataAcquisition(#[from] DataSourceError),
    #[error("region filter {0:?} matched no records")]
    EmptySubset(String),
    #[error(transparent)]
    Normalization(#[from] NormalizationError),
    #[error(transparent)]
    Hierarchical(#[from] HierarchicalError),
    #[error("stage {requested:?} invoked while pipeline is at {current:?}")]
    PipelineState { current: Stage, requested: Stage },
    #[error("failed to write {path}: {reason}")]
    OutputWrite { path: String, reason: String },
}
