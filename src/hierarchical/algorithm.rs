use std::collections::HashMap;

use ndarray::{Array1, Array2, NdFloat};
use num_traits::FromPrimitive;

use super::errors::HierarchicalError;
use super::hyperparams::{HierarchicalParams, HierarchicalValidParams};

/// Agglomerative hierarchical clustering
///
/// Every observation starts out as its own singleton cluster. At each step
/// the two clusters whose merger yields the smallest increase in total
/// within-cluster variance (Ward's criterion, Euclidean distance) are
/// combined, until a single cluster remains. The full merge sequence is kept
/// for dendrogram rendering; a flat partition is obtained by cutting the
/// hierarchy at the configured cluster count.
///
/// ### Example
///
/// ```rust
/// use geocluster::HierarchicalCluster;
/// use ndarray::array;
///
/// let observations = array![[0., 1.], [0., 1.1], [5., 5.]];
/// let hierarchy = HierarchicalCluster::params(2)
///     .check()
///     .unwrap()
///     .fit(&observations)
///     .unwrap();
/// let labels = hierarchy.cut();
/// assert_eq!(labels[0], labels[1]);
/// assert_ne!(labels[0], labels[2]);
/// ```
pub struct HierarchicalCluster;

impl HierarchicalCluster {
    /// Configure the clusterer with the number of flat clusters to cut into
    pub fn params(n_clusters: usize) -> HierarchicalParams {
        HierarchicalParams::new(n_clusters)
    }
}

/// One merge of the agglomeration, in scipy/kodama linkage format: singleton
/// clusters carry ids `0..n`, the cluster formed by step `k` carries id
/// `n + k`.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeStep<F> {
    /// Smaller id of the merged pair
    pub cluster1: usize,
    /// Larger id of the merged pair
    pub cluster2: usize,
    /// Ward distance between the merged clusters
    pub dissimilarity: F,
    /// Size of the newly formed cluster
    pub size: usize,
}

/// The full merge tree over a set of observations, together with the cluster
/// count it will be cut into.
#[derive(Debug, Clone, PartialEq)]
pub struct Hierarchy<F> {
    steps: Vec<MergeStep<F>>,
    num_observations: usize,
    n_clusters: usize,
}

/// An active cluster during agglomeration
struct Node<F> {
    id: usize,
    size: usize,
    centroid: Array1<F>,
}

fn cast<F: NdFloat + FromPrimitive>(v: usize) -> F {
    F::from_usize(v).unwrap()
}

/// Ward distance `sqrt(2|A||B|/(|A|+|B|)) * ||centroid(A) - centroid(B)||`
fn ward_distance<F: NdFloat + FromPrimitive>(a: &Node<F>, b: &Node<F>) -> F {
    let factor = cast::<F>(2 * a.size * b.size) / cast::<F>(a.size + b.size);
    let diff = &a.centroid - &b.centroid;
    (factor * diff.dot(&diff)).sqrt()
}

impl HierarchicalValidParams {
    /// Agglomerate the observation matrix of shape (nobservations, nfeatures)
    /// down to a single cluster, recording every merge.
    ///
    /// Ties between candidate pairs of equal merge cost are broken towards
    /// the lexicographically smallest id pair, so the merge sequence is fully
    /// deterministic for identical input.
    pub fn fit<F: NdFloat + FromPrimitive>(
        &self,
        observations: &Array2<F>,
    ) -> Result<Hierarchy<F>, HierarchicalError> {
        let num_observations = observations.nrows();
        if num_observations < self.n_clusters() {
            return Err(HierarchicalError::InsufficientData {
                rows: num_observations,
                clusters: self.n_clusters(),
            });
        }

        for (row, obs) in observations.rows().into_iter().enumerate() {
            if obs.iter().any(|v| !v.is_finite()) {
                return Err(HierarchicalError::InvalidInput { row });
            }
        }

        // at the beginning every observation is in its own cluster
        let mut active = observations
            .rows()
            .into_iter()
            .enumerate()
            .map(|(id, row)| Node {
                id,
                size: 1,
                centroid: row.to_owned(),
            })
            .collect::<Vec<_>>();

        let mut steps = Vec::with_capacity(num_observations.saturating_sub(1));
        // counter for new clusters, which are formed as unions of previous ones
        let mut next_id = num_observations;

        while active.len() > 1 {
            let mut best: Option<(F, (usize, usize), (usize, usize))> = None;
            for i in 0..active.len() {
                for j in (i + 1)..active.len() {
                    let dist = ward_distance(&active[i], &active[j]);
                    let (lo, hi) = if active[i].id < active[j].id {
                        (active[i].id, active[j].id)
                    } else {
                        (active[j].id, active[i].id)
                    };

                    let replace = match &best {
                        None => true,
                        Some((bdist, bids, _)) => {
                            dist < *bdist || (dist == *bdist && (lo, hi) < *bids)
                        }
                    };
                    if replace {
                        best = Some((dist, (lo, hi), (i, j)));
                    }
                }
            }

            // the loop body above ran at least once
            let (dissimilarity, (cluster1, cluster2), (i, j)) = best.unwrap();

            // j > i, so removing j first leaves i untouched
            let b = active.swap_remove(j);
            let a = active.swap_remove(i);
            let size = a.size + b.size;
            let centroid = (&a.centroid * cast::<F>(a.size) + &b.centroid * cast::<F>(b.size))
                / cast::<F>(size);

            steps.push(MergeStep {
                cluster1,
                cluster2,
                dissimilarity,
                size,
            });
            active.push(Node {
                id: next_id,
                size,
                centroid,
            });
            next_id += 1;
        }

        Ok(Hierarchy {
            steps,
            num_observations,
            n_clusters: self.n_clusters(),
        })
    }
}

impl<F: NdFloat> Hierarchy<F> {
    /// The recorded merges, in execution order
    pub fn steps(&self) -> &[MergeStep<F>] {
        &self.steps
    }

    pub fn num_observations(&self) -> usize {
        self.num_observations
    }

    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Cut the hierarchy into the configured number of flat clusters and
    /// return one label per observation, in observation order.
    ///
    /// The merge sequence is replayed until the requested number of clusters
    /// survives. Labels are assigned by ordering the surviving clusters by
    /// their smallest member index, which keeps the numbering reproducible
    /// for identical input.
    pub fn cut(&self) -> Vec<usize> {
        let n = self.num_observations;
        let mut clusters = (0..n).map(|x| (x, vec![x])).collect::<HashMap<_, _>>();
        let mut ct = n;

        for step in &self.steps {
            if clusters.len() <= self.n_clusters {
                break;
            }

            // combine ids from both clusters
            let mut ids = Vec::with_capacity(2);
            let mut cl = clusters.remove(&step.cluster1).unwrap();
            ids.append(&mut cl);
            let mut cl = clusters.remove(&step.cluster2).unwrap();
            ids.append(&mut cl);

            clusters.insert(ct, ids);
            ct += 1;
        }

        let mut groups = clusters.into_iter().map(|(_, ids)| ids).collect::<Vec<_>>();
        groups.sort_by_key(|ids| ids.iter().min().copied().unwrap_or(usize::MAX));

        // reverse index: observation -> cluster label
        let mut labels = vec![0; n];
        for (label, ids) in groups.into_iter().enumerate() {
            for id in ids {
                labels[id] = label;
            }
        }

        labels
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{array, concatenate, Array, Array2, Axis};
    use ndarray_rand::{rand_distr::Normal, RandomExt};
    use rand_xoshiro::rand_core::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    use super::super::errors::HierarchicalError;
    use super::HierarchicalCluster;

    fn fit(observations: &Array2<f64>, k: usize) -> super::Hierarchy<f64> {
        HierarchicalCluster::params(k)
            .check()
            .unwrap()
            .fit(observations)
            .unwrap()
    }

    #[test]
    fn outlier_is_split_off() {
        let observations = array![[0., 0.], [1., 0.], [0., 1.], [1., 1.], [10., 10.]];
        let labels = fit(&observations, 2).cut();

        // the four corner points share a cluster, the outlier stands alone
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[0], labels[2]);
        assert_eq!(labels[0], labels[3]);
        assert_ne!(labels[0], labels[4]);
    }

    #[test]
    fn outlier_is_split_off_in_any_row_order() {
        let observations = array![[10., 10.], [1., 1.], [0., 1.], [1., 0.], [0., 0.]];
        let labels = fit(&observations, 2).cut();

        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[1], labels[3]);
        assert_eq!(labels[1], labels[4]);
        assert_ne!(labels[0], labels[1]);
    }

    #[test]
    fn merge_tree_has_full_shape() {
        let observations = array![[0., 0.], [1., 0.], [0., 1.], [1., 1.], [10., 10.]];
        let hierarchy = fit(&observations, 2);

        // n - 1 merges, the last one absorbing every observation
        assert_eq!(hierarchy.steps().len(), 4);
        assert_eq!(hierarchy.steps().last().unwrap().size, 5);
        for step in hierarchy.steps() {
            assert!(step.cluster1 < step.cluster2);
            assert!(step.dissimilarity >= 0.);
        }
    }

    #[test]
    fn dissimilarity_matches_ward_formula() {
        let observations = array![[0., 0.], [2., 0.]];
        let hierarchy = fit(&observations, 1);

        // two singletons: sqrt(2 * 1 * 1 / 2) * 2 = 2
        let step = &hierarchy.steps()[0];
        assert!((step.dissimilarity - 2.0).abs() < 1e-12);
    }

    #[test]
    fn cut_produces_k_nonempty_clusters() {
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let observations = Array::random_using((25, 2), Normal::new(0., 1.).unwrap(), &mut rng);

        let labels = fit(&observations, 4).cut();

        assert_eq!(labels.len(), 25);
        let mut counts = [0usize; 4];
        for label in labels {
            assert!(label < 4);
            counts[label] += 1;
        }
        assert!(counts.iter().all(|&c| c > 0));
    }

    #[test]
    fn fit_is_deterministic() {
        let mut rng = Xoshiro256Plus::seed_from_u64(7);
        let observations = Array::random_using((20, 2), Normal::new(0., 1.).unwrap(), &mut rng);

        let first = fit(&observations, 4);
        let second = fit(&observations, 4);

        assert_eq!(first.steps(), second.steps());
        assert_eq!(first.cut(), second.cut());
    }

    #[test]
    fn equal_cost_merges_are_ordered_by_id() {
        // two identical-cost pairs: (0,1) and (2,3)
        let observations = array![[0., 0.], [1., 0.], [10., 0.], [11., 0.]];
        let hierarchy = fit(&observations, 2);

        let first = &hierarchy.steps()[0];
        assert_eq!((first.cluster1, first.cluster2), (0, 1));
    }

    #[test]
    fn separates_gaussian_blobs() {
        let mut rng = Xoshiro256Plus::seed_from_u64(3);
        let npoints = 10;
        let observations = concatenate(
            Axis(0),
            &[
                Array::random_using((npoints, 2), Normal::new(-1., 0.1).unwrap(), &mut rng).view(),
                Array::random_using((npoints, 2), Normal::new(1., 0.1).unwrap(), &mut rng).view(),
            ],
        )
        .unwrap();

        let labels = fit(&observations, 2).cut();

        let first = labels[0];
        assert!(labels.iter().take(npoints).all(|l| *l == first));
        let second = labels[npoints];
        assert!(labels.iter().skip(npoints).all(|l| *l == second));
        assert_ne!(first, second);
    }

    #[test]
    fn too_few_observations_are_rejected() {
        let observations = array![[0., 0.], [1., 0.], [0., 1.]];
        let res = HierarchicalCluster::params(4)
            .check()
            .unwrap()
            .fit(&observations);
        assert_eq!(
            res.unwrap_err(),
            HierarchicalError::InsufficientData {
                rows: 3,
                clusters: 4
            }
        );
    }

    #[test]
    fn non_finite_observations_are_rejected() {
        let observations = array![[0., 0.], [f64::NAN, 5.], [0., 1.], [1., 1.]];
        let res = HierarchicalCluster::params(2)
            .check()
            .unwrap()
            .fit(&observations);
        assert_eq!(res.unwrap_err(), HierarchicalError::InvalidInput { row: 1 });
    }

    #[test]
    fn cut_at_observation_count_keeps_singletons() {
        let observations = array![[0., 0.], [1., 0.], [0., 1.]];
        let labels = fit(&observations, 3).cut();
        assert_eq!(labels, vec![0, 1, 2]);
    }
}
