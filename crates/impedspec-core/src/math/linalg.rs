//! Dense linear algebra for the fit statistics
//!
//! ndarray is the storage type everywhere else in the crate; nalgebra does
//! the factorizations. Conversions stay private to this module.

use nalgebra::DMatrix;
use ndarray::Array2;

fn to_nalgebra(a: &Array2<f64>) -> DMatrix<f64> {
    let (m, n) = a.dim();
    DMatrix::from_fn(m, n, |i, j| a[[i, j]])
}

fn to_ndarray(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

/// Inverse of a symmetric matrix such as a Hessian
///
/// The input is symmetrized first. A positive-definite matrix is inverted
/// through its Cholesky factor; otherwise LU is tried, so a saddle point
/// still yields a (meaningless but finite) inverse. `None` if the matrix is
/// empty, not square or singular.
pub fn symmetric_inverse(a: &Array2<f64>) -> Option<Array2<f64>> {
    let (m, n) = a.dim();
    if m != n || m == 0 {
        return None;
    }
    let sym = to_nalgebra(a);
    let sym = (&sym + sym.transpose()) * 0.5;

    let inverse = match sym.clone().cholesky() {
        Some(chol) => chol.inverse(),
        None => sym.try_inverse()?,
    };
    if inverse.iter().all(|x| x.is_finite()) {
        Some(to_ndarray(&inverse))
    } else {
        None
    }
}
