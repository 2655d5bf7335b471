//! Rules turning label confidences into a label set.
//!
//! * `Threshold` (BRkNN): label j is predicted iff its confidence reaches
//!   its threshold. May predict no label at all.
//! * `ThresholdWithFallback` (BRkNN-a): as `Threshold`, but if no label is
//!   predicted, the most confident one is (ties broken at random).
//! * `Cardinality` (BRkNN-b): predicts the `a` most confident labels,
//!   where `a` is the (weighted, rounded) average number of labels of the
//!   neighbors; ties at the boundary are broken at random.
use ndarray::prelude::*;
use ordered_float::OrderedFloat;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::confidence::Confidences;
use crate::errors::{BRkNNError, Result};


/// Label decision policy, selected once per classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecisionPolicy {
    Threshold,
    ThresholdWithFallback,
    Cardinality,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        DecisionPolicy::Threshold
    }
}

impl DecisionPolicy {
    /// Decides the label set for one query.
    ///
    /// # Arguments
    /// * `confidences` - Confidences (and average label count) of the query.
    /// * `thresholds` - One threshold per label.
    /// * `rng` - Generator used for breaking ties.
    pub fn decide<R: Rng>(&self, confidences: &Confidences,
                          thresholds: &ArrayView1<f64>, rng: &mut R)
            -> Result<Array1<u8>> {
        match self {
            DecisionPolicy::Threshold =>
                Ok(threshold_labels(&confidences.values.view(), thresholds)),
            DecisionPolicy::ThresholdWithFallback =>
                Ok(fallback_labels(&confidences.values.view(), thresholds, rng)),
            DecisionPolicy::Cardinality =>
                cardinality_labels(&confidences.values.view(),
                                   confidences.avg_predicted_labels, rng),
        }
    }
}

/// Predicts label j iff `confidences[j] >= thresholds[j]`.
pub fn threshold_labels(confidences: &ArrayView1<f64>,
                        thresholds: &ArrayView1<f64>) -> Array1<u8> {
    assert_eq!(confidences.len(), thresholds.len());

    confidences.iter()
               .zip(thresholds)
               .map(|(c, t)| if c >= t { 1 } else { 0 })
               .collect()
}

/// As `threshold_labels()`, but always predicts at least one label.
pub fn fallback_labels<R: Rng>(confidences: &ArrayView1<f64>,
                               thresholds: &ArrayView1<f64>,
                               rng: &mut R) -> Array1<u8> {
    let mut labels = threshold_labels(confidences, thresholds);

    if labels.iter().all(|y| *y == 0) {
        if let Some(i) = random_index_of_max(confidences, rng) {
            labels[i] = 1;
        }
    }
    labels
}

/// Returns an index of the largest element, chosen uniformly at random
/// among ties. None if the vector is empty.
pub fn random_index_of_max<R: Rng>(values: &ArrayView1<f64>, rng: &mut R)
        -> Option<usize> {
    let mut max = f64::NEG_INFINITY;
    let mut indices = vec![];

    for (i, v) in values.iter().enumerate() {
        if *v > max {
            max = *v;
            indices.clear();
            indices.push(i);
        } else if *v == max {
            indices.push(i);
        }
    }

    match indices.len() {
        0 => None,
        1 => Some(indices[0]),
        n => Some(indices[rng.gen_range(0..n)]),
    }
}

/// Predicts exactly `a` labels, the most confident ones.
///
/// Labels whose confidence equals that of the `a`-th most confident label
/// compete for the remaining slots, which are assigned at random.
pub fn cardinality_labels<R: Rng>(confidences: &ArrayView1<f64>, a: usize,
                                  rng: &mut R) -> Result<Array1<u8>> {
    let nlabels = confidences.len();
    let a = a.min(nlabels);
    let mut labels = Array1::zeros(nlabels);

    if a == 0 {
        return Ok(labels);
    }

    // Stable: equal confidences keep their label order.
    let mut indices: Vec<usize> = (0..nlabels).collect();
    indices.sort_by_key(|i| OrderedFloat(confidences[*i]));

    let pivot = confidences[indices[nlabels - a]];
    let mut assigned = 0;
    let mut ties = vec![];

    for i in indices.iter().rev() {
        let c = confidences[*i];
        if c > pivot {
            labels[*i] = 1;
            assigned += 1;
        } else if c == pivot {
            ties.push(*i);
        } else {
            break;
        }
    }

    let mut remaining = a - assigned.min(a);
    if remaining > ties.len() {
        return Err(BRkNNError::NumericDegeneracy(
            format!("{} labels tied at confidence {}, but {} are needed",
                    ties.len(), pivot, remaining)));
    }

    while remaining > 0 {
        let next = ties[rng.gen_range(0..ties.len())];
        if labels[next] != 1 {
            labels[next] = 1;
            remaining -= 1;
        }
    }

    Ok(labels)
}
