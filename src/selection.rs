//! Selection of the number of neighbors by leave-one-out cross-validation.
//!
//! Each training example is held out in turn and predicted from the
//! remaining ones, for every candidate k in [1, max_k]; the k with the
//! smallest Hamming loss wins. The neighbors of a held-out example are
//! searched only once, for max_k, and then pruned down one k at a time.
use log::{debug, info};
use ndarray::prelude::*;
use rand::Rng;

use crate::confidence::{estimate_confidences, DistanceWeighting};
use crate::decision::DecisionPolicy;
use crate::errors::{BRkNNError, Result};
use crate::measures::hamming_loss;
use crate::neighbors::NeighborSearch;

/// How often (in examples) progress is logged.
const LOG_EVERY: usize = 50;


/// Outcome of a cross-validation run.
#[derive(Debug, Clone, PartialEq)]
pub struct KSelection {
    /// Best number of neighbors (the smallest, among equally good ones).
    pub k: usize,
    /// Average Hamming loss for each evaluated k; `losses[k-1]` refers to k.
    pub losses: Vec<f64>,
}

/// Chooses k in [1, max_k] minimizing the leave-one-out Hamming loss.
///
/// Candidates past the number of training examples N see the same
/// neighbors as k = N, so only k in [1, min(max_k, N)] are evaluated.
///
/// Any failure aborts the selection, and is returned wrapped in
/// `BRkNNError::CrossValidation`.
///
/// # Arguments
/// * `search` - Neighbor search over the training objects.
/// * `train_y` - Training label indicators.
/// * `weights` - Instance weights of the training examples.
/// * `max_k` - Largest candidate k.
/// * `weighting` - Distance weighting used for confidences.
/// * `policy` - Decision policy used for predictions.
/// * `thresholds` - Per-label thresholds for the policy.
/// * `rng` - Generator for the policy's tie breaking.
pub fn select_k<S, R>(search: &S, train_y: &ArrayView2<u8>,
                      weights: &ArrayView1<f64>, max_k: usize,
                      weighting: DistanceWeighting, policy: DecisionPolicy,
                      thresholds: &ArrayView1<f64>, rng: &mut R)
        -> Result<KSelection>
where S: NeighborSearch,
      R: Rng {
    let losses = cumulative_losses(search, train_y, weights, max_k, weighting,
                                   policy, thresholds, rng)
                    .map_err(|e| BRkNNError::CrossValidation(Box::new(e)))?;

    let n = train_y.nrows().max(1) as f64;
    let losses = losses.into_iter()
                       .map(|loss| loss / n)
                       .collect::<Vec<_>>();

    for (k, loss) in losses.iter().enumerate().rev() {
        debug!("hold-one-out Hamming loss of {} neighbors: {}", k + 1, loss);
    }

    // Strict comparison keeps the smallest k among ties.
    let mut best_k = 1;
    let mut best_loss = f64::NAN;
    for (k, loss) in losses.iter().enumerate() {
        if best_loss.is_nan() || *loss < best_loss {
            best_loss = *loss;
            best_k = k + 1;
        }
    }
    info!("selected k = {} (Hamming loss {})", best_k, best_loss);

    Ok(KSelection {
        k: best_k,
        losses,
    })
}

/// Sums, for each k, the Hamming loss over all held-out examples.
fn cumulative_losses<S, R>(search: &S, train_y: &ArrayView2<u8>,
                           weights: &ArrayView1<f64>, max_k: usize,
                           weighting: DistanceWeighting, policy: DecisionPolicy,
                           thresholds: &ArrayView1<f64>, rng: &mut R)
        -> Result<Vec<f64>>
where S: NeighborSearch,
      R: Rng {
    if max_k == 0 {
        return Err(BRkNNError::InvalidK(max_k));
    }
    let max_k = max_k.min(search.n_examples().max(1));

    let n = train_y.nrows();
    let n_features = search.n_features();
    let mut losses = vec![0.; max_k];

    for (i, y) in train_y.outer_iter().enumerate() {
        if i % LOG_EVERY == 0 {
            debug!("cross validating {}/{}", i, n);
        }

        let mut neighbors = search.k_nearest_held_out(i, max_k)?;

        for k in (1..=max_k).rev() {
            neighbors.prune(k);

            let confidences = estimate_confidences(&neighbors, train_y, weights,
                                                   n_features, weighting)?;
            let predicted = policy.decide(&confidences, thresholds, rng)?;

            losses[k-1] += hamming_loss(&predicted.view(), &y);
        }
    }

    Ok(losses)
}
