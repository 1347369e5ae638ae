//! Postcode records and the regional working subset

pub mod source;

use std::collections::HashMap;

use ndarray::Array2;
use rand::Rng;

use crate::error::{Error, Result};

/// One row of the nationwide postcode dataset. The cluster label stays empty
/// until the pipeline writes the flat partition back.
#[derive(Debug, Clone, PartialEq)]
pub struct PostcodeRecord {
    pub postcode: String,
    pub longitude: f64,
    pub latitude: f64,
    pub country: String,
    pub cluster: Option<usize>,
}

impl PostcodeRecord {
    pub fn new(
        postcode: impl Into<String>,
        longitude: f64,
        latitude: f64,
        country: impl Into<String>,
    ) -> Self {
        PostcodeRecord {
            postcode: postcode.into(),
            longitude,
            latitude,
            country: country.into(),
            cluster: None,
        }
    }
}

/// The regional working subset: records whose postcode matches a prefix,
/// with coordinate duplicates removed pairwise, shuffled, and truncated to
/// the sample size.
///
/// Row order is fixed once built. The i-th row of the projected coordinate
/// matrix and the i-th entry of the cluster assignment both refer to the
/// i-th record of this subset, so any reordering would corrupt the
/// cluster-to-record mapping.
#[derive(Debug, Clone)]
pub struct RegionalSubset {
    records: Vec<PostcodeRecord>,
}

impl RegionalSubset {
    /// Filter the full dataset down to the working subset.
    ///
    /// Records sharing an exact (longitude, latitude) pair are all removed,
    /// never collapsed to one. Fails with [`Error::EmptySubset`] when nothing
    /// survives filtering.
    pub fn build<R: Rng>(
        records: Vec<PostcodeRecord>,
        prefix: &str,
        sample_size: usize,
        rng: &mut R,
    ) -> Result<RegionalSubset> {
        let regional = records
            .into_iter()
            .filter(|r| r.postcode.starts_with(prefix))
            .collect::<Vec<_>>();

        // bit-exact coordinate key, duplicates dropped on both sides
        let mut seen: HashMap<(u64, u64), usize> = HashMap::new();
        for record in &regional {
            *seen
                .entry((record.longitude.to_bits(), record.latitude.to_bits()))
                .or_insert(0) += 1;
        }
        let mut unique = regional
            .into_iter()
            .filter(|r| seen[&(r.longitude.to_bits(), r.latitude.to_bits())] == 1)
            .collect::<Vec<_>>();

        if unique.is_empty() {
            return Err(Error::EmptySubset(prefix.to_string()));
        }

        use rand::seq::SliceRandom;
        unique.shuffle(rng);
        unique.truncate(sample_size);

        Ok(RegionalSubset { records: unique })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PostcodeRecord] {
        &self.records
    }

    /// Project the subset to its raw coordinate matrix of shape (n, 2) with
    /// columns [longitude, latitude], row i aligned with record i.
    pub fn raw_coordinates(&self) -> Array2<f64> {
        let mut coords = Array2::zeros((self.records.len(), 2));
        for (i, record) in self.records.iter().enumerate() {
            coords[[i, 0]] = record.longitude;
            coords[[i, 1]] = record.latitude;
        }
        coords
    }

    /// Write the flat cluster assignment back onto the records by row index.
    pub fn assign_clusters(&mut self, labels: &[usize]) {
        assert_eq!(
            labels.len(),
            self.records.len(),
            "cluster assignment must cover the subset exactly"
        );
        for (record, label) in self.records.iter_mut().zip(labels) {
            record.cluster = Some(*label);
        }
    }

    /// The assigned label per record, in row order
    pub fn cluster_labels(&self) -> Vec<usize> {
        self.records
            .iter()
            .map(|r| r.cluster.unwrap_or(0))
            .collect()
    }
}
