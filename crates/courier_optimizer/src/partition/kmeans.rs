use fxhash::FxHashSet;
use geo::Point;
use linfa::{
    DatasetBase,
    traits::{Fit, Predict},
};
use linfa_clustering::KMeansError;
use ndarray::Array2;
use rand_xoshiro::{Xoshiro256Plus, rand_core::SeedableRng};
use tracing::debug;

use crate::define_index_newtype;

define_index_newtype!(ClusterIdx, Point);

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansResult {
    /// Cluster of each input point, in input order.
    pub labels: Vec<ClusterIdx>,
    pub centroids: Vec<Point>,
}

/// k-means with k-means++ seeding over `(lng, lat)`. A given seed always yields the same clusters.
#[derive(Debug, Clone)]
pub struct KMeans {
    clusters: usize,
    seed: u64,
    max_iterations: usize,
}

impl KMeans {
    pub fn new(clusters: usize, seed: u64) -> Self {
        KMeans {
            clusters,
            seed,
            max_iterations: 300,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// `k` is clamped to the number of distinct points, k-means++ cannot seed more.
    pub fn fit(&self, points: &[Point]) -> Result<KMeansResult, KMeansError> {
        let k = self.clusters.min(distinct_points(points));
        if k == 0 {
            return Ok(KMeansResult {
                labels: Vec::new(),
                centroids: Vec::new(),
            });
        }

        let observations = Array2::from_shape_fn((points.len(), 2), |(row, column)| {
            if column == 0 {
                points[row].x()
            } else {
                points[row].y()
            }
        });
        let dataset = DatasetBase::from(observations);

        let model = linfa_clustering::KMeans::params_with_rng(
            k,
            Xoshiro256Plus::seed_from_u64(self.seed),
        )
        .max_n_iterations(self.max_iterations as u64)
        .fit(&dataset)?;

        let labels: Vec<ClusterIdx> = model
            .predict(dataset.records())
            .iter()
            .map(|&cluster| ClusterIdx::new(cluster))
            .collect();
        let centroids: Vec<Point> = model
            .centroids()
            .rows()
            .into_iter()
            .map(|row| Point::new(row[0], row[1]))
            .collect();

        debug!(clusters = k, points = points.len(), "k-means fitted");

        Ok(KMeansResult { labels, centroids })
    }
}

fn distinct_points(points: &[Point]) -> usize {
    points
        .iter()
        .map(|point| (point.x().to_bits(), point.y().to_bits()))
        .collect::<FxHashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use geo::point;

    use super::*;

    fn two_blobs() -> Vec<Point> {
        vec![
            point!(x: 121.40, y: 31.20),
            point!(x: 121.41, y: 31.21),
            point!(x: 121.40, y: 31.21),
            point!(x: 121.90, y: 31.70),
            point!(x: 121.91, y: 31.71),
            point!(x: 121.90, y: 31.71),
        ]
    }

    #[test]
    fn test_separates_blobs() {
        let result = KMeans::new(2, 42).fit(&two_blobs()).unwrap();

        assert_eq!(result.centroids.len(), 2);
        assert_eq!(result.labels[0], result.labels[1]);
        assert_eq!(result.labels[0], result.labels[2]);
        assert_eq!(result.labels[3], result.labels[4]);
        assert_eq!(result.labels[3], result.labels[5]);
        assert_ne!(result.labels[0], result.labels[3]);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let points = two_blobs();

        assert_eq!(
            KMeans::new(3, 7).fit(&points).unwrap(),
            KMeans::new(3, 7).fit(&points).unwrap()
        );
    }

    #[test]
    fn test_clusters_clamped_to_points() {
        let points = vec![point!(x: 1.0, y: 1.0), point!(x: 2.0, y: 2.0)];
        let result = KMeans::new(8, 42).fit(&points).unwrap();

        assert_eq!(result.centroids.len(), 2);
        assert_ne!(result.labels[0], result.labels[1]);
    }

    #[test]
    fn test_no_points() {
        let result = KMeans::new(8, 42).fit(&[]).unwrap();

        assert!(result.labels.is_empty());
        assert!(result.centroids.is_empty());
    }

    #[test]
    fn test_duplicate_points() {
        let points = vec![point!(x: 1.0, y: 1.0); 4];
        let result = KMeans::new(3, 42).fit(&points).unwrap();

        assert_eq!(result.labels, vec![ClusterIdx::new(0); 4]);
        assert_eq!(result.centroids, vec![point!(x: 1.0, y: 1.0)]);
    }
}
