//! Brute-force k-NN search.
//!
//! Every query scans the whole training set, keeping the `k` closest
//! examples seen so far in a sorted buffer. Ties in distance are ordered
//! by training index, so that a list for `k` is always a prefix of the
//! list for any larger `k`; this is what makes `NearestNeighbors::prune()`
//! equivalent to a fresh query.
use ndarray::prelude::*;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;

use crate::errors::{BRkNNError, Result};
use crate::neighbors::NeighborSearch;
use crate::utils::MinMaxScaler;


/// A training example close to some query.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor {
    /// Row of the training example.
    pub index: usize,
    /// Raw distance from the query, as returned by the distance function.
    pub distance: f64,
}

impl Neighbor {
    /// Constructs a new Neighbor.
    pub fn new(index: usize, distance: f64) -> Neighbor {
        Neighbor {
            index,
            distance,
        }
    }
}

// Ordering for Neighbor: by distance, then by training index.
impl Ord for Neighbor {
    fn cmp(&self, other: &Neighbor) -> Ordering {
        let self_d = OrderedFloat::from(self.distance);
        let other_d = OrderedFloat::from(other.distance);

        self_d.cmp(&other_d)
              .then_with(|| self.index.cmp(&other.index))
    }
}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Neighbor) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Neighbor {
    fn eq(&self, other: &Neighbor) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Neighbor {}


/// The nearest neighbors of some query, sorted in increasing order
/// by their distance from it.
#[derive(Debug, Clone, Default)]
pub struct NearestNeighbors {
    neighbors: Vec<Neighbor>,
}

impl NearestNeighbors {
    fn with_capacity(max_k: usize) -> NearestNeighbors {
        NearestNeighbors {
            // Capacity: max_k + 1 for when we insert a new element and then
            // remove another one from the tail.
            neighbors: Vec::with_capacity(max_k + 1),
        }
    }

    /// Builds a list from neighbors in any order.
    pub fn from_neighbors(mut neighbors: Vec<Neighbor>) -> NearestNeighbors {
        neighbors.sort();
        NearestNeighbors { neighbors }
    }

    /// Offers a new candidate, keeping at most `max_k` neighbors.
    fn insert(&mut self, new: Neighbor, max_k: usize) {
        if self.neighbors.len() >= max_k {
            match self.neighbors.last() {
                Some(last) if *last < new => return,
                _ => {},
            }
        }
        let pos = self.neighbors.binary_search(&new).unwrap_or_else(|e| e);
        self.neighbors.insert(pos, new);

        if self.neighbors.len() > max_k {
            self.neighbors.pop();
        }
    }

    /// Drops all but the `k` nearest neighbors.
    pub fn prune(&mut self, k: usize) {
        self.neighbors.truncate(k);
    }

    /// Distances of the neighbors, in the same order as `iter()`.
    pub fn distances(&self) -> Vec<f64> {
        self.neighbors.iter()
                      .map(|neigh| neigh.distance)
                      .collect()
    }

    pub fn iter(&self) -> std::slice::Iter<Neighbor> {
        self.neighbors.iter()
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}


/// Exhaustive neighbor search with a custom distance.
#[derive(Debug)]
pub struct LinearSearch<D>
where D: Fn(&ArrayView1<f64>, &ArrayView1<f64>) -> f64 {
    // Training objects (scaled, if a scaler was fitted).
    train_x: Array2<f64>,
    // Fitted on train_x, and applied to every query.
    scaler: Option<MinMaxScaler>,
    distance: D,
}

impl<D> LinearSearch<D>
where D: Fn(&ArrayView1<f64>, &ArrayView1<f64>) -> f64 {
    /// Builds a search structure over the training objects.
    ///
    /// # Arguments
    /// * `train_x` - Training objects, one per row.
    /// * `distance` - Distance between two objects.
    /// * `scale` - Whether to min-max scale features into [0, 1], using
    ///             the ranges observed in `train_x`.
    pub fn new(mut train_x: Array2<f64>, distance: D, scale: bool)
            -> Result<LinearSearch<D>> {
        if train_x.ncols() == 0 {
            return Err(BRkNNError::Config("training objects have no features".into()));
        }

        let scaler = if scale {
            let scaler = MinMaxScaler::fit(&train_x.view());
            scaler.transform(&mut train_x);
            Some(scaler)
        } else {
            None
        };

        Ok(LinearSearch {
            train_x,
            scaler,
            distance,
        })
    }

    fn search(&self, x: &ArrayView1<f64>, k: usize, skip: Option<usize>)
            -> NearestNeighbors {
        // k may exceed the training set.
        let mut knn = NearestNeighbors::with_capacity(k.min(self.n_examples()));

        for (i, xi) in self.train_x.outer_iter().enumerate() {
            if Some(i) == skip {
                continue;
            }
            let d = (self.distance)(&xi, x);
            knn.insert(Neighbor::new(i, d), k);
        }
        knn
    }
}

impl<D> NeighborSearch for LinearSearch<D>
where D: Fn(&ArrayView1<f64>, &ArrayView1<f64>) -> f64 {
    fn n_examples(&self) -> usize {
        self.train_x.nrows()
    }

    fn n_features(&self) -> usize {
        self.train_x.ncols()
    }

    fn k_nearest(&self, x: &ArrayView1<f64>, k: usize) -> Result<NearestNeighbors> {
        if k == 0 {
            return Err(BRkNNError::InvalidK(k));
        }
        if x.len() != self.n_features() {
            return Err(BRkNNError::DimensionMismatch {
                expected: self.n_features(),
                found: x.len(),
            });
        }

        match self.scaler {
            Some(ref scaler) => {
                let x = scaler.transform_row(x);
                Ok(self.search(&x.view(), k, None))
            },
            None => Ok(self.search(x, k, None)),
        }
    }

    fn k_nearest_held_out(&self, i: usize, k: usize) -> Result<NearestNeighbors> {
        if k == 0 {
            return Err(BRkNNError::InvalidK(k));
        }
        if i >= self.n_examples() {
            return Err(BRkNNError::IndexOutOfBounds {
                index: i,
                len: self.n_examples(),
            });
        }

        // Training rows are already scaled.
        let x = self.train_x.row(i);
        Ok(self.search(&x, k, Some(i)))
    }
}
