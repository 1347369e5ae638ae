//! The end-to-end clustering pipeline
//!
//! Owns the run sequence: acquire subset, normalize, cluster, label, emit
//! outputs. Intermediate artifacts are threaded through explicit return
//! values rather than stored on the pipeline, so every stage stays
//! independently testable; the pipeline itself only tracks which [`Stage`]
//! has completed and rejects out-of-order invocations.

pub mod charts;
pub mod sink;
pub mod workspace;

use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::dataset::source::DataSource;
use crate::dataset::{PostcodeRecord, RegionalSubset};
use crate::error::{Error, Result};
use crate::hierarchical::{HierarchicalCluster, HierarchicalError, Hierarchy};
use crate::normalize::UnitScaler;

pub use charts::{PlottersRenderer, Renderer};
pub use sink::{CsvSink, TableSink};
pub use workspace::{DirState, Workspace};

/// Completed pipeline stages, in order. Transitions are one-way; invoking a
/// stage whose predecessor has not completed fails with
/// [`Error::PipelineState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Uninitialized,
    DataLoaded,
    SubsetReady,
    Normalized,
    Clustered,
    Labeled,
    OutputsEmitted,
}

/// The pipeline's fixed configuration: Edinburgh postcodes, a sample of 25,
/// four clusters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub region_prefix: String,
    pub sample_size: usize,
    pub n_clusters: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            region_prefix: "EH".to_string(),
            sample_size: 25,
            n_clusters: 4,
        }
    }
}

/// Orchestrates one batch run over a data source
pub struct ClusterPipeline<S> {
    source: S,
    config: PipelineConfig,
    stage: Stage,
}

impl<S: DataSource> ClusterPipeline<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, PipelineConfig::default())
    }

    pub fn with_config(source: S, config: PipelineConfig) -> Self {
        ClusterPipeline {
            source,
            config,
            stage: Stage::Uninitialized,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn expect(&self, from: Stage, requested: Stage) -> Result<()> {
        if self.stage == from {
            Ok(())
        } else {
            Err(Error::PipelineState {
                current: self.stage,
                requested,
            })
        }
    }

    /// Acquire the full dataset from the source collaborator
    pub fn load_data(&mut self) -> Result<Vec<PostcodeRecord>> {
        self.expect(Stage::Uninitialized, Stage::DataLoaded)?;
        let records = self.source.load()?;
        log::info!("raw data loaded: {} records", records.len());
        self.stage = Stage::DataLoaded;
        Ok(records)
    }

    /// Restrict the dataset to the regional working subset
    pub fn build_subset<R: Rng>(
        &mut self,
        records: Vec<PostcodeRecord>,
        rng: &mut R,
    ) -> Result<RegionalSubset> {
        self.expect(Stage::DataLoaded, Stage::SubsetReady)?;
        let total = records.len();
        let subset = RegionalSubset::build(
            records,
            &self.config.region_prefix,
            self.config.sample_size,
            rng,
        )?;
        log::info!(
            "data sliced & shuffled: kept {} of {} records for region {:?}",
            subset.len(),
            total,
            self.config.region_prefix
        );
        self.stage = Stage::SubsetReady;
        Ok(subset)
    }

    /// Project the subset to coordinates and scale every row to unit norm
    pub fn normalize(&mut self, subset: &RegionalSubset) -> Result<Array2<f64>> {
        self.expect(Stage::SubsetReady, Stage::Normalized)?;
        let scaled = UnitScaler::l2().transform(subset.raw_coordinates())?;
        log::info!("coordinates normalized: {} rows", scaled.nrows());
        self.stage = Stage::Normalized;
        Ok(scaled)
    }

    /// Compute the merge tree over the normalized coordinates
    pub fn cluster(&mut self, scaled: &Array2<f64>) -> Result<Hierarchy<f64>> {
        self.expect(Stage::Normalized, Stage::Clustered)?;
        let params = HierarchicalCluster::params(self.config.n_clusters)
            .check()
            .map_err(HierarchicalError::from)?;
        let hierarchy = params.fit(scaled)?;
        log::info!(
            "hierarchy computed: {} merges over {} observations",
            hierarchy.steps().len(),
            hierarchy.num_observations()
        );
        self.stage = Stage::Clustered;
        Ok(hierarchy)
    }

    /// Cut the hierarchy and write the labels back onto the subset
    pub fn label(
        &mut self,
        subset: &mut RegionalSubset,
        hierarchy: &Hierarchy<f64>,
    ) -> Result<Vec<usize>> {
        self.expect(Stage::Clustered, Stage::Labeled)?;
        let labels = hierarchy.cut();
        subset.assign_clusters(&labels);
        log::info!(
            "subset labeled with {} clusters",
            hierarchy.n_clusters()
        );
        self.stage = Stage::Labeled;
        Ok(labels)
    }

    /// Emit the table and the three diagnostic charts.
    ///
    /// A failing output aborts the run but leaves already-written outputs in
    /// place; completed pipeline stages are never rolled back.
    pub fn emit_outputs<K: TableSink, R: Renderer>(
        &mut self,
        subset: &RegionalSubset,
        scaled: &Array2<f64>,
        hierarchy: &Hierarchy<f64>,
        sink: &K,
        renderer: &R,
        workspace: &Workspace,
    ) -> Result<()> {
        self.expect(Stage::Labeled, Stage::OutputsEmitted)?;

        let table = workspace.dated("_postcode_analysis.csv");
        sink.write(subset.records(), &table)?;
        log::info!("outputs saved to: {}", table.display());

        let dendrogram = workspace.dated("_Dendrogram.png");
        renderer.dendrogram(hierarchy, &dendrogram)?;
        log::info!("dendrogram figure saved to: {}", dendrogram.display());

        let labels = subset.cluster_labels();

        let chart_a = workspace.dated("_Chart_A.png");
        renderer.scatter(scaled, &labels, &chart_a)?;
        log::info!("cluster figure saved to: {}", chart_a.display());

        let chart_b = workspace.dated("_Chart_B.png");
        renderer.scatter(&subset.raw_coordinates(), &labels, &chart_b)?;
        log::info!("geographic figure saved to: {}", chart_b.display());

        self.stage = Stage::OutputsEmitted;
        Ok(())
    }

    /// Drive the whole sequence with a run-scoped RNG for the subset shuffle
    pub fn run<K: TableSink, R: Renderer>(
        &mut self,
        sink: &K,
        renderer: &R,
        workspace: &Workspace,
    ) -> Result<()> {
        let records = self.load_data()?;
        let mut rng = SmallRng::from_entropy();
        let mut subset = self.build_subset(records, &mut rng)?;
        let scaled = self.normalize(&subset)?;
        let hierarchy = self.cluster(&scaled)?;
        self.label(&mut subset, &hierarchy)?;
        self.emit_outputs(&subset, &scaled, &hierarchy, sink, renderer, workspace)
    }
}

#[cfg(test)]
mod tests {
    use super::{ClusterPipeline, Stage};
    use crate::dataset::source::{DataSource, DataSourceError};
    use crate::dataset::PostcodeRecord;
    use crate::error::Error;

    struct MemorySource(Vec<PostcodeRecord>);

    impl DataSource for MemorySource {
        fn load(&self) -> Result<Vec<PostcodeRecord>, DataSourceError> {
            Ok(self.0.clone())
        }
    }

    fn records() -> Vec<PostcodeRecord> {
        (0..10)
            .map(|i| {
                PostcodeRecord::new(
                    format!("EH{} 1AA", i),
                    -3.0 - i as f64 * 0.01,
                    55.9 + i as f64 * 0.01,
                    "Scotland",
                )
            })
            .collect()
    }

    #[test]
    fn stages_advance_in_order() {
        let mut pipeline = ClusterPipeline::new(MemorySource(records()));
        assert_eq!(pipeline.stage(), Stage::Uninitialized);

        let loaded = pipeline.load_data().unwrap();
        assert_eq!(pipeline.stage(), Stage::DataLoaded);

        let mut rng = rand::thread_rng();
        let subset = pipeline.build_subset(loaded, &mut rng).unwrap();
        assert_eq!(pipeline.stage(), Stage::SubsetReady);

        let scaled = pipeline.normalize(&subset).unwrap();
        assert_eq!(pipeline.stage(), Stage::Normalized);

        let _hierarchy = pipeline.cluster(&scaled).unwrap();
        assert_eq!(pipeline.stage(), Stage::Clustered);
    }

    #[test]
    fn out_of_order_stage_is_rejected() {
        let mut pipeline = ClusterPipeline::new(MemorySource(records()));

        let subset_err = pipeline.build_subset(records(), &mut rand::thread_rng());
        assert!(matches!(
            subset_err,
            Err(Error::PipelineState {
                current: Stage::Uninitialized,
                requested: Stage::SubsetReady,
            })
        ));
    }

    #[test]
    fn clustering_before_normalization_is_rejected() {
        let mut pipeline = ClusterPipeline::new(MemorySource(records()));
        pipeline.load_data().unwrap();

        let scaled = ndarray::Array2::<f64>::zeros((5, 2));
        let res = pipeline.cluster(&scaled);
        assert!(matches!(
            res,
            Err(Error::PipelineState {
                current: Stage::DataLoaded,
                requested: Stage::Clustered,
            })
        ));
    }

    #[test]
    fn stages_cannot_be_replayed() {
        let mut pipeline = ClusterPipeline::new(MemorySource(records()));
        pipeline.load_data().unwrap();

        assert!(matches!(
            pipeline.load_data(),
            Err(Error::PipelineState { .. })
        ));
    }
}
