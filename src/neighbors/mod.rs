//! Nearest neighbor search over a fixed training set.
//!
//! The classifier only needs "the k closest training examples to x, and
//! their distances", which is captured by the `NeighborSearch` trait.
//! `LinearSearch` is a brute-force implementation working with any
//! distance function.
pub mod linear;

pub use self::linear::{LinearSearch, Neighbor, NearestNeighbors};

use ndarray::prelude::*;
use strsim::generic_levenshtein;

use crate::errors::Result;


pub trait NeighborSearch {
    /// Number of training examples.
    fn n_examples(&self) -> usize;
    /// Number of features of each example.
    fn n_features(&self) -> usize;
    /// Returns the (at most) `k` training examples closest to `x`,
    /// nearest first.
    fn k_nearest(&self, x: &ArrayView1<f64>, k: usize) -> Result<NearestNeighbors>;
    /// Returns the (at most) `k` training examples closest to the `i`-th
    /// training example, excluding the `i`-th example itself.
    fn k_nearest_held_out(&self, i: usize, k: usize) -> Result<NearestNeighbors>;
}

/// Returns the Euclidean distance between two vectors of f64 values.
pub fn euclidean_distance(v1: &ArrayView1<f64>, v2: &ArrayView1<f64>) -> f64 {
    v1.iter()
      .zip(v2.iter())
      .map(|(x,y)| (x - y).powi(2))
      .sum::<f64>()
      .sqrt()
}

/// Returns the Levenshtein distance between two vectors of f64 values.
pub fn levenshtein_distance(v1: &ArrayView1<f64>, v2: &ArrayView1<f64>) -> f64 {
    generic_levenshtein(v1, v2) as f64
}
