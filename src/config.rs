//! Classifier configuration.
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use crate::confidence::DistanceWeighting;
use crate::decision::DecisionPolicy;
use crate::errors::{BRkNNError, Result};

const DEFAULT_K: usize = 10;
const DEFAULT_THRESHOLD: f64 = 0.5;
const DEFAULT_SEED: u64 = 1;


/// Confidence thresholds used by the threshold-based policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Thresholds {
    /// Same threshold for every label.
    Global(f64),
    /// One threshold per label.
    PerLabel(Vec<f64>),
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds::Global(DEFAULT_THRESHOLD)
    }
}

impl Thresholds {
    /// Returns one threshold per label.
    pub fn resolve(&self, nlabels: usize) -> Result<Array1<f64>> {
        let thresholds = match self {
            Thresholds::Global(t) => Array1::from_elem(nlabels, *t),
            Thresholds::PerLabel(ts) => {
                if ts.len() != nlabels {
                    return Err(BRkNNError::Config(
                        format!("{} thresholds given for {} labels",
                                ts.len(), nlabels)));
                }
                Array1::from(ts.clone())
            },
        };

        if thresholds.iter().any(|t| !t.is_finite()) {
            return Err(BRkNNError::Config("thresholds must be finite".into()));
        }
        Ok(thresholds)
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BRkNNConfig {
    /// Number of labels (L).
    pub n_labels: usize,
    /// Number of neighbors. Overwritten by cross-validation, if enabled.
    pub k: usize,
    /// If set, k is chosen in [1, cv_max_k] by leave-one-out
    /// cross-validation when the classifier is built.
    pub cv_max_k: Option<usize>,
    pub weighting: DistanceWeighting,
    pub thresholds: Thresholds,
    pub policy: DecisionPolicy,
    /// Seed of the generator breaking ties between labels.
    pub seed: u64,
    /// Min-max scale features before computing distances.
    pub scale: bool,
}

impl Default for BRkNNConfig {
    fn default() -> Self {
        BRkNNConfig {
            n_labels: 0,
            k: DEFAULT_K,
            cv_max_k: None,
            weighting: DistanceWeighting::default(),
            thresholds: Thresholds::default(),
            policy: DecisionPolicy::default(),
            seed: DEFAULT_SEED,
            scale: true,
        }
    }
}

impl BRkNNConfig {
    /// Default configuration for `n_labels` labels.
    pub fn new(n_labels: usize) -> BRkNNConfig {
        BRkNNConfig {
            n_labels,
            ..Default::default()
        }
    }

    /// Checks the configuration, independently of any training data.
    pub fn validate(&self) -> Result<()> {
        if self.n_labels == 0 {
            return Err(BRkNNError::Config("at least one label is required".into()));
        }
        if self.k == 0 {
            return Err(BRkNNError::Config("k must be at least 1".into()));
        }
        if self.cv_max_k == Some(0) {
            return Err(BRkNNError::Config("cv_max_k must be at least 1".into()));
        }
        self.thresholds.resolve(self.n_labels)?;

        Ok(())
    }
}
