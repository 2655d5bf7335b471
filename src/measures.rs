//! Multi-label loss functions.
//!
//! Label sets are binary vectors, with 1 marking a relevant label.
//!
//! # References
//! [1] G. Tsoumakas, I. Katakis, I. Vlahavas. "Mining Multi-label Data."
//!     Data Mining and Knowledge Discovery Handbook, 2010.
use itertools::izip;
use ndarray::prelude::*;
use ordered_float::OrderedFloat;


/// Fraction of labels on which the prediction disagrees with the truth.
pub fn hamming_loss(predicted: &ArrayView1<u8>, actual: &ArrayView1<u8>) -> f64 {
    assert_eq!(predicted.len(), actual.len(),
               "predicted and actual label sets differ in length");
    if actual.is_empty() {
        return 0.;
    }

    let mismatches = predicted.iter()
                              .zip(actual)
                              .filter(|(p, y)| p != y)
                              .count();

    mismatches as f64 / actual.len() as f64
}

/// Hamming loss averaged over examples, one per row.
pub fn average_hamming_loss(predicted: &ArrayView2<u8>, actual: &ArrayView2<u8>) -> f64 {
    assert_eq!(predicted.dim(), actual.dim(),
               "predicted and actual label matrices differ in shape");
    if actual.nrows() == 0 {
        return 0.;
    }

    let total: f64 = izip!(predicted.outer_iter(), actual.outer_iter())
                        .map(|(p, y)| hamming_loss(&p, &y))
                        .sum();

    total / actual.nrows() as f64
}

/// Computes the one-error, as defined in [1]: 1 if the most confident
/// label is not relevant, 0 otherwise.
///
/// Among equally confident labels, the first one is taken.
pub fn one_error(confidences: &ArrayView1<f64>, actual: &ArrayView1<u8>) -> f64 {
    assert_eq!(confidences.len(), actual.len(),
               "confidences and actual label set differ in length");

    // max_by_key returns the last maximum; iterating in reverse makes it
    // the first one.
    let top = confidences.iter()
                         .enumerate()
                         .rev()
                         .max_by_key(|(_, c)| OrderedFloat(**c))
                         .map(|(i, _)| i);

    match top {
        Some(i) if actual[i] == 1 => 0.,
        Some(_) => 1.,
        None => 0.,
    }
}
