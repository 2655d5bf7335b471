//! Feature scaling.
use ndarray::prelude::*;
use std::f64;


/// Min-max scaling of features into [0,1].
///
/// Ranges are learned once on the training objects and then applied,
/// unchanged, to every query; queries outside the training range
/// are mapped outside [0,1].
#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    min: Array1<f64>,
    // max - min, for each column.
    range: Array1<f64>,
}

impl MinMaxScaler {
    /// Learns per-column minimum and maximum.
    pub fn fit(matrix: &ArrayView2<f64>) -> MinMaxScaler {
        let mut max = Array::ones(matrix.ncols()) * -f64::INFINITY;
        let mut min = Array::ones(matrix.ncols()) * f64::INFINITY;

        for row in matrix.outer_iter() {
            for i in 0..row.len() {
                if min[i] > row[i] {
                    min[i] = row[i];
                }
                if max[i] < row[i] {
                    max[i] = row[i];
                }
            }
        }

        // Empty matrices have no range at all.
        if matrix.nrows() == 0 {
            min.fill(0.);
            max.fill(0.);
        }

        let range = &max - &min;
        MinMaxScaler { min, range }
    }

    fn scale(&self, i: usize, x: f64) -> f64 {
        // Constant columns carry no information.
        if self.range[i] > 0. {
            (x - self.min[i]) / self.range[i]
        } else {
            0.
        }
    }

    /// Scales every row of `matrix` in place.
    pub fn transform(&self, matrix: &mut Array2<f64>) {
        for mut row in matrix.outer_iter_mut() {
            for i in 0..row.len() {
                row[i] = self.scale(i, row[i]);
            }
        }
    }

    /// Returns a scaled copy of `x`.
    pub fn transform_row(&self, x: &ArrayView1<f64>) -> Array1<f64> {
        x.iter()
         .enumerate()
         .map(|(i, xi)| self.scale(i, *xi))
         .collect::<Array1<f64>>()
    }
}
