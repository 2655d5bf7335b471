//! brknn is a lazy multi-label classifier: it predicts which subset of a
//! fixed set of labels applies to an object, by looking at the labels of
//! the object's nearest neighbors in the training data [1].
//!
//! Each label is treated as a separate binary problem (binary relevance),
//! solved by a distance-weighted k-NN vote. Three decision policies turn
//! the votes into a label set:
//!
//! - **threshold** (BRkNN): predict every label whose confidence reaches
//!   its threshold;
//! - **threshold-with-fallback** (BRkNN-a): as above, but never predict the
//!   empty set;
//! - **cardinality** (BRkNN-b): predict as many labels as the neighbors
//!   carry on average, the most confident ones.
//!
//! The number of neighbors can be selected by leave-one-out
//! cross-validation, minimizing the Hamming loss (see `selection`).
//!
//! For usage, please refer to `BRkNN`.
//!
//! # References
//!
//! [1] 2008, "An Empirical Study of Lazy Multilabel Classification Algorithms". _E. Spyromitros, G. Tsoumakas, I. Vlahavas_.
pub mod brknn;
pub mod confidence;
pub mod config;
pub mod decision;
pub mod errors;
pub mod measures;
pub mod neighbors;
pub mod selection;
pub mod utils;

pub use crate::brknn::{BRkNN, Prediction};
pub use crate::config::{BRkNNConfig, Thresholds};
pub use crate::confidence::{Confidences, DistanceWeighting};
pub use crate::decision::DecisionPolicy;
pub use crate::errors::{BRkNNError, Result};
pub use crate::selection::KSelection;
