//! Sample normalization for coordinate matrices
use ndarray::{Array2, Axis, NdFloat, Zip};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("cannot normalize an empty matrix")]
    EmptyInput,
    #[error("non-finite value in row {0}")]
    NonFiniteRow(usize),
    #[error("row {0} is a zero vector and cannot be scaled to unit length")]
    ZeroRow(usize),
}

/// Unit scaler: scales every sample in a matrix of shape (nsamples, nfeatures)
/// to unit Euclidean norm.
///
/// Distance-based clustering downstream only cares about the direction of each
/// coordinate vector, so all rows are projected onto the unit circle. Rows are
/// validated first: a non-finite or all-zero row is a hard error, never a
/// silent division by zero.
///
/// ### Example
///
/// ```rust
/// use geocluster::UnitScaler;
/// use ndarray::array;
///
/// let scaled = UnitScaler::l2().transform(array![[3.0f64, 4.0]]).unwrap();
/// assert!((scaled[[0, 0]] - 0.6).abs() < 1e-9);
/// ```
pub struct UnitScaler;

impl UnitScaler {
    /// Initializes a scaler that uses the l2 norm
    pub fn l2() -> Self {
        UnitScaler
    }

    /// Scales all rows to unit norm, preserving row order 1:1.
    pub fn transform<F: NdFloat>(&self, x: Array2<F>) -> Result<Array2<F>, NormalizationError> {
        if x.nrows() == 0 {
            return Err(NormalizationError::EmptyInput);
        }

        for (idx, row) in x.rows().into_iter().enumerate() {
            if row.iter().any(|v| !v.is_finite()) {
                return Err(NormalizationError::NonFiniteRow(idx));
            }
        }

        let norms = x.map_axis(Axis(1), |row| row.dot(&row).sqrt());
        if let Some(idx) = norms.iter().position(|n| *n == F::zero()) {
            return Err(NormalizationError::ZeroRow(idx));
        }

        let mut x = x;
        Zip::from(x.rows_mut())
            .and(&norms)
            .for_each(|mut row, &norm| {
                row.mapv_inplace(|el| el / norm);
            });

        Ok(x)
    }
}
