//! Binary relevance k-NN multi-label classifier.
//!
//! The classifier is lazy: "training" only fixes the neighbor search over
//! the training objects and, optionally, selects k by leave-one-out
//! cross-validation. Predictions are made by:
//! 1) searching the k nearest neighbors of a query;
//! 2) turning their label votes into per-label confidences;
//! 3) applying the configured decision policy to the confidences.
//!
//! # Examples
//!
//! ```
//! use ndarray::array;
//! use brknn::{BRkNN, BRkNNConfig, DecisionPolicy};
//! use brknn::neighbors::euclidean_distance;
//!
//! let train_x = array![[0., 0.],
//!                      [0., 1.],
//!                      [5., 5.],
//!                      [5., 6.]];
//! let train_y = array![[1, 0],
//!                      [1, 0],
//!                      [0, 1],
//!                      [0, 1]];
//!
//! let mut config = BRkNNConfig::new(2);
//! config.k = 1;
//! config.policy = DecisionPolicy::ThresholdWithFallback;
//!
//! let mut brknn = BRkNN::from_data(config, train_x, train_y,
//!                                  euclidean_distance).unwrap();
//! let prediction = brknn.predict(&array![0., 0.].view()).unwrap();
//!
//! assert_eq!(prediction.labels, array![1, 0]);
//! assert!(prediction.confidences[0] > prediction.confidences[1]);
//! ```
use log::info;
use ndarray::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{BRkNNConfig, Thresholds};
use crate::confidence::{estimate_confidences, DistanceWeighting};
use crate::decision::DecisionPolicy;
use crate::errors::{BRkNNError, Result};
use crate::neighbors::{LinearSearch, NeighborSearch};
use crate::selection::{select_k, KSelection};


/// Predicted label set of a query, with the confidences it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// 1 for each predicted label, 0 otherwise.
    pub labels: Array1<u8>,
    pub confidences: Array1<f64>,
}

pub struct BRkNN<S: NeighborSearch> {
    search: S,
    // Label indicators of the training examples (n x L).
    train_y: Array2<u8>,
    // Instance weights of the training examples.
    weights: Array1<f64>,
    k: usize,
    cv_max_k: Option<usize>,
    weighting: DistanceWeighting,
    policy: DecisionPolicy,
    thresholds: Array1<f64>,
    // Shared by all decisions, so that a sequence of calls is
    // reproducible given the seed.
    rng: StdRng,
    // Average label count among the neighbors of the last query.
    avg_predicted_labels: usize,
}

impl<S: NeighborSearch> BRkNN<S> {
    /// Builds a classifier on top of a neighbor search.
    ///
    /// If `config.cv_max_k` is set, k is selected by cross-validation
    /// before returning.
    ///
    /// # Arguments
    /// * `config` - Classifier configuration.
    /// * `search` - Neighbor search over the training objects.
    /// * `train_y` - Label indicators (0 or 1) of the training examples,
    ///               one row per example, in the same order as `search`.
    /// * `weights` - Instance weights; all 1 if None.
    pub fn new(config: BRkNNConfig, search: S, train_y: Array2<u8>,
               weights: Option<Array1<f64>>) -> Result<BRkNN<S>> {
        config.validate()?;

        let n = search.n_examples();
        if train_y.ncols() != config.n_labels {
            return Err(BRkNNError::Config(
                format!("training labels have {} columns, expected {}",
                        train_y.ncols(), config.n_labels)));
        }
        if train_y.nrows() != n {
            return Err(BRkNNError::Config(
                format!("{} label rows for {} training examples",
                        train_y.nrows(), n)));
        }
        if train_y.iter().any(|y| *y > 1) {
            return Err(BRkNNError::Config("label indicators must be 0 or 1".into()));
        }

        let weights = match weights {
            Some(w) => {
                if w.len() != n {
                    return Err(BRkNNError::Config(
                        format!("{} weights for {} training examples", w.len(), n)));
                }
                if w.iter().any(|x| !x.is_finite() || *x < 0.) {
                    return Err(BRkNNError::Config(
                        "weights must be finite and non-negative".into()));
                }
                w
            },
            None => Array1::ones(n),
        };

        let thresholds = config.thresholds.resolve(config.n_labels)?;

        let mut brknn = BRkNN {
            search,
            train_y,
            weights,
            k: config.k,
            cv_max_k: config.cv_max_k,
            weighting: config.weighting,
            policy: config.policy,
            thresholds,
            rng: StdRng::seed_from_u64(config.seed),
            avg_predicted_labels: 0,
        };
        info!("BRkNN ({:?}) over {} examples and {} labels",
              brknn.policy, n, config.n_labels);

        if brknn.cv_max_k.is_some() {
            brknn.select_k()?;
        }

        Ok(brknn)
    }

    /// Selects k in [1, cv_max_k] by leave-one-out cross-validation,
    /// and uses it for subsequent predictions.
    pub fn select_k(&mut self) -> Result<usize> {
        let max_k = self.cv_max_k.ok_or_else(||
            BRkNNError::Config("cv_max_k is required for selecting k".into()))?;

        Ok(self.cross_validate(max_k)?.k)
    }

    /// Runs leave-one-out cross-validation for k in [1, max_k], sets k to
    /// the best value and returns the full report.
    ///
    /// On failure, k is left unchanged.
    pub fn cross_validate(&mut self, max_k: usize) -> Result<KSelection> {
        let selection = select_k(&self.search, &self.train_y.view(),
                                 &self.weights.view(), max_k, self.weighting,
                                 self.policy, &self.thresholds.view(),
                                 &mut self.rng)?;
        self.k = selection.k;

        Ok(selection)
    }

    /// Predicts the label set of `x`.
    pub fn predict(&mut self, x: &ArrayView1<f64>) -> Result<Prediction> {
        let mut neighbors = self.search.k_nearest(x, self.k)?;
        // Providers may return more than k neighbors.
        neighbors.prune(self.k);

        let confidences = estimate_confidences(&neighbors, &self.train_y.view(),
                                               &self.weights.view(),
                                               self.search.n_features(),
                                               self.weighting)?;
        self.avg_predicted_labels = confidences.avg_predicted_labels;

        let labels = self.policy.decide(&confidences, &self.thresholds.view(),
                                        &mut self.rng)?;

        Ok(Prediction {
            labels,
            confidences: confidences.values,
        })
    }

    /// Predicts each row of `xs`, in order.
    pub fn predict_batch(&mut self, xs: &ArrayView2<f64>) -> Result<Vec<Prediction>> {
        xs.outer_iter()
          .map(|x| self.predict(&x))
          .collect()
    }

    /// Current number of neighbors.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Changes the number of neighbors.
    pub fn set_k(&mut self, k: usize) -> Result<()> {
        if k == 0 {
            return Err(BRkNNError::InvalidK(k));
        }
        self.k = k;
        Ok(())
    }

    /// Replaces the thresholds used by the threshold-based policies.
    pub fn set_thresholds(&mut self, thresholds: &Thresholds) -> Result<()> {
        self.thresholds = thresholds.resolve(self.n_labels())?;
        Ok(())
    }

    pub fn thresholds(&self) -> ArrayView1<f64> {
        self.thresholds.view()
    }

    pub fn n_labels(&self) -> usize {
        self.train_y.ncols()
    }

    /// Rounded, weighted average number of labels among the neighbors
    /// of the last predicted query.
    pub fn avg_predicted_labels(&self) -> usize {
        self.avg_predicted_labels
    }
}

impl<D> BRkNN<LinearSearch<D>>
where D: Fn(&ArrayView1<f64>, &ArrayView1<f64>) -> f64 {
    /// Builds a classifier with a linear neighbor search.
    ///
    /// Features are min-max scaled if `config.scale` is set.
    pub fn from_data(config: BRkNNConfig, train_x: Array2<f64>,
                     train_y: Array2<u8>, distance: D)
            -> Result<BRkNN<LinearSearch<D>>> {
        let search = LinearSearch::new(train_x, distance, config.scale)?;
        BRkNN::new(config, search, train_y, None)
    }

    /// As `from_data()`, with instance weights.
    pub fn from_weighted_data(config: BRkNNConfig, train_x: Array2<f64>,
                              train_y: Array2<u8>, weights: Array1<f64>,
                              distance: D) -> Result<BRkNN<LinearSearch<D>>> {
        let search = LinearSearch::new(train_x, distance, config.scale)?;
        BRkNN::new(config, search, train_y, Some(weights))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::neighbors::euclidean_distance;
    use float_cmp::approx_eq;

    fn four_examples() -> (Array2<f64>, Array2<u8>) {
        let train_x = array![[0., 0.],
                             [0., 1.],
                             [5., 5.],
                             [5., 6.]];
        let train_y = array![[1, 0],
                             [1, 0],
                             [0, 1],
                             [0, 1]];
        (train_x, train_y)
    }

    #[test]
    fn nearest_neighbor_prediction() {
        let (train_x, train_y) = four_examples();
        let mut config = BRkNNConfig::new(2);
        config.k = 1;

        let mut brknn = BRkNN::from_data(config, train_x, train_y,
                                         euclidean_distance).unwrap();
        let prediction = brknn.predict(&array![0., 0.].view()).unwrap();

        // (1/4 + 1) / (2/4 + 1) and (1/4) / (2/4 + 1).
        assert!(approx_eq!(f64, prediction.confidences[0], 1.25 / 1.5,
                           epsilon = 1e-12));
        assert!(approx_eq!(f64, prediction.confidences[1], 0.25 / 1.5,
                           epsilon = 1e-12));
        assert_eq!(prediction.labels, array![1, 0]);
        assert_eq!(brknn.avg_predicted_labels(), 1);
    }

    #[test]
    fn threshold_may_predict_nothing() {
        let (train_x, train_y) = four_examples();
        let mut config = BRkNNConfig::new(2);
        config.k = 4;
        config.thresholds = Thresholds::Global(0.6);

        let mut brknn = BRkNN::from_data(config.clone(), train_x.clone(),
                                         train_y.clone(),
                                         euclidean_distance).unwrap();
        let prediction = brknn.predict(&array![2., 3.].view()).unwrap();
        assert_eq!(prediction.labels, array![0, 0]);

        config.policy = DecisionPolicy::ThresholdWithFallback;
        let mut brknn = BRkNN::from_data(config, train_x, train_y,
                                         euclidean_distance).unwrap();
        let prediction = brknn.predict(&array![2., 3.].view()).unwrap();
        assert_eq!(prediction.labels.sum(), 1);
    }

    #[test]
    fn cardinality_policy() {
        let train_x = array![[0.], [1.], [2.], [10.]];
        let train_y = array![[1, 1, 0],
                             [1, 1, 0],
                             [0, 1, 1],
                             [0, 0, 1]];
        let mut config = BRkNNConfig::new(3);
        config.k = 3;
        config.policy = DecisionPolicy::Cardinality;

        let mut brknn = BRkNN::from_data(config, train_x, train_y,
                                         euclidean_distance).unwrap();
        let prediction = brknn.predict(&array![0.5].view()).unwrap();

        // Neighbors carry 2 labels each.
        assert_eq!(brknn.avg_predicted_labels(), 2);
        assert_eq!(prediction.labels, array![1, 1, 0]);
    }

    #[test]
    fn weighted_examples() {
        let (train_x, train_y) = four_examples();
        let mut config = BRkNNConfig::new(2);
        config.k = 2;
        config.scale = false;

        // The two nearest neighbors disagree; weights decide.
        let query = array![2.5, 3.];
        let weights = array![1., 1., 3., 1.];
        let mut brknn = BRkNN::from_weighted_data(config, train_x, train_y,
                                                  weights,
                                                  euclidean_distance).unwrap();
        let prediction = brknn.predict(&query.view()).unwrap();

        assert_eq!(prediction.labels, array![0, 1]);
    }

    #[test]
    fn batch_prediction() {
        let (train_x, train_y) = four_examples();
        let mut config = BRkNNConfig::new(2);
        config.k = 1;

        let mut brknn = BRkNN::from_data(config, train_x, train_y,
                                         euclidean_distance).unwrap();
        let test_x = array![[0., 0.5],
                            [5., 5.5]];
        let predictions = brknn.predict_batch(&test_x.view()).unwrap();

        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].labels, array![1, 0]);
        assert_eq!(predictions[1].labels, array![0, 1]);
    }

    #[test]
    fn selects_k_when_building() {
        let train_x = array![[0.], [0.], [10.], [10.], [20.], [20.]];
        let train_y = array![[1, 0, 0],
                             [1, 0, 0],
                             [0, 1, 0],
                             [0, 1, 0],
                             [0, 0, 1],
                             [0, 0, 1]];
        let mut config = BRkNNConfig::new(3);
        config.k = 5;
        config.cv_max_k = Some(5);

        let mut brknn = BRkNN::from_data(config, train_x, train_y,
                                         euclidean_distance).unwrap();
        assert_eq!(brknn.k(), 1);
        assert_eq!(brknn.select_k().unwrap(), 1);

        let selection = brknn.cross_validate(3).unwrap();
        assert_eq!(selection.losses.len(), 3);
        assert_eq!(brknn.k(), 1);
    }

    #[test]
    fn huge_k() {
        let (train_x, train_y) = four_examples();
        let mut config = BRkNNConfig::new(2);
        config.k = usize::MAX / 64;
        config.thresholds = Thresholds::Global(0.4);

        let mut brknn = BRkNN::from_data(config.clone(), train_x.clone(),
                                         train_y.clone(),
                                         euclidean_distance).unwrap();
        // All four examples vote: (1/4 + 2) / (2/4 + 4) for both labels.
        let prediction = brknn.predict(&array![0., 0.].view()).unwrap();
        assert!(approx_eq!(f64, prediction.confidences[0], 2.25 / 4.5,
                           epsilon = 1e-12));
        assert_eq!(prediction.labels, array![1, 1]);

        config.cv_max_k = Some(usize::MAX / 64);
        let brknn = BRkNN::from_data(config, train_x, train_y,
                                     euclidean_distance).unwrap();
        assert_eq!(brknn.k(), 1);
    }

    #[test]
    fn select_k_requires_max_k() {
        let (train_x, train_y) = four_examples();
        let mut brknn = BRkNN::from_data(BRkNNConfig::new(2), train_x, train_y,
                                         euclidean_distance).unwrap();

        assert!(brknn.select_k().is_err());
        assert_eq!(brknn.k(), 10);
    }

    #[test]
    fn invalid_training_data() {
        let (train_x, train_y) = four_examples();

        // Wrong number of labels.
        assert!(BRkNN::from_data(BRkNNConfig::new(3), train_x.clone(),
                                 train_y.clone(), euclidean_distance).is_err());
        // Non-binary indicators.
        let mut bad_y = train_y.clone();
        bad_y[[0, 1]] = 2;
        assert!(BRkNN::from_data(BRkNNConfig::new(2), train_x.clone(), bad_y,
                                 euclidean_distance).is_err());
        // Too few label rows.
        let short_y = train_y.slice(s![..3, ..]).to_owned();
        assert!(BRkNN::from_data(BRkNNConfig::new(2), train_x.clone(), short_y,
                                 euclidean_distance).is_err());
        // Negative weights.
        assert!(BRkNN::from_weighted_data(BRkNNConfig::new(2), train_x, train_y,
                                          array![1., -1., 1., 1.],
                                          euclidean_distance).is_err());
    }

    #[test]
    fn reconfigure() {
        let (train_x, train_y) = four_examples();
        let mut brknn = BRkNN::from_data(BRkNNConfig::new(2), train_x, train_y,
                                         euclidean_distance).unwrap();

        assert!(brknn.set_k(0).is_err());
        brknn.set_k(2).unwrap();
        assert_eq!(brknn.k(), 2);

        brknn.set_thresholds(&Thresholds::PerLabel(vec![0.2, 0.9])).unwrap();
        assert_eq!(brknn.thresholds(), array![0.2, 0.9]);
        assert!(brknn.set_thresholds(&Thresholds::PerLabel(vec![0.2])).is_err());
        assert_eq!(brknn.thresholds(), array![0.2, 0.9]);

        // Wrong query length.
        assert!(brknn.predict(&array![0.].view()).is_err());
    }
}
