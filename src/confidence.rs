//! Per-label confidences from the votes of nearest neighbors.
//!
//! Each neighbor votes for the labels it carries, with a weight that
//! depends on its distance from the query (see `DistanceWeighting`) and on
//! its instance weight. Votes are smoothed with a Laplace-style correction
//! of `1/N` per label (N training examples) before normalization, so that
//! confidences are never exactly 0 when some neighbor weight exists.
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{BRkNNError, Result};
use crate::neighbors::NearestNeighbors;

/// Avoids a division by zero for neighbors at distance 0.
const INVERSE_EPSILON: f64 = 0.001;


/// How a neighbor's distance turns into the weight of its vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceWeighting {
    /// All neighbors count the same.
    None,
    /// `1/(d + 0.001)`.
    Inverse,
    /// `1 - d`, floored at 0.
    Similarity,
}

impl Default for DistanceWeighting {
    fn default() -> Self {
        DistanceWeighting::None
    }
}

impl DistanceWeighting {
    /// Weight for a neighbor at (normalized) distance `d`.
    pub fn weight(&self, d: f64) -> f64 {
        match self {
            DistanceWeighting::None => 1.,
            DistanceWeighting::Inverse => 1. / (d + INVERSE_EPSILON),
            // Distances past 1 would give negative votes.
            DistanceWeighting::Similarity => (1. - d).max(0.),
        }
    }
}


/// Confidences for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct Confidences {
    /// Estimated probability that each label is relevant, in [0,1].
    pub values: Array1<f64>,
    /// Weighted average number of labels carried by the neighbors,
    /// rounded, in [0, L].
    pub avg_predicted_labels: usize,
}

/// Computes label confidences given the nearest neighbors of a query.
///
/// # Arguments
/// * `neighbors` - Nearest neighbors of the query.
/// * `train_y` - Training label indicators, one row per example and one
///               column per label; entries are 0 or 1.
/// * `weights` - Instance weight of each training example.
/// * `n_features` - Number of features, used to bring distances onto a
///                  per-feature scale.
/// * `weighting` - Distance weighting scheme.
///
/// Fails if some neighbor is not a row of `train_y` or `weights`.
pub fn estimate_confidences(neighbors: &NearestNeighbors,
                            train_y: &ArrayView2<u8>,
                            weights: &ArrayView1<f64>,
                            n_features: usize,
                            weighting: DistanceWeighting) -> Result<Confidences> {
    let nlabels = train_y.ncols();
    let n = train_y.nrows().max(1) as f64;
    let n_features = n_features.max(1) as f64;

    // Laplace-style correction.
    let mut confidences = Array1::from_elem(nlabels, 1. / n);
    let mut total = nlabels as f64 / n;
    let mut neighbor_labels = 0.;

    for neigh in neighbors.iter() {
        let len = train_y.nrows().min(weights.len());
        if neigh.index >= len {
            return Err(BRkNNError::IndexOutOfBounds { index: neigh.index, len });
        }

        // Root mean square distance per feature.
        let d = (neigh.distance.powi(2) / n_features).sqrt();
        let weight = weighting.weight(d) * weights[neigh.index];

        for (conf, y) in confidences.iter_mut().zip(train_y.row(neigh.index)) {
            if *y == 1 {
                *conf += weight;
                neighbor_labels += weight;
            }
        }
        total += weight;
    }

    let avg = (neighbor_labels / total).round();
    let avg_predicted_labels = if avg.is_finite() && avg > 0. {
        (avg as usize).min(nlabels)
    } else {
        0
    };

    if total > 0. {
        confidences.mapv_inplace(|c| c / total);
    }

    Ok(Confidences {
        values: confidences,
        avg_predicted_labels,
    })
}
