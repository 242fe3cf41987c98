//! Matrices of phasors and their linear algebra
//!
//! The LU decomposition is Crout's method with partial pivoting and implicit
//! row scaling, carried out in phasor arithmetic throughout.

use std::ops::{Index, IndexMut};

use ndarray::Array2;
use num_complex::Complex64;

use super::core::Phasor;
use crate::constants::LU_TINY;
use crate::error::{ImpedanceError, Result};

/// A dense matrix of [`Phasor`] elements
#[derive(Debug, Clone, PartialEq)]
pub struct PhasorMatrix {
    data: Array2<Phasor>,
}

/// LU decomposition of a square [`PhasorMatrix`]
///
/// `lu` holds L below the diagonal (unit diagonal implied) and U on and above
/// it, both of the row-permuted matrix.
#[derive(Debug, Clone)]
pub struct PhasorLu {
    lu: Array2<Phasor>,
    index: Vec<usize>,
    swap_sign: f64,
}

fn not_square() -> ImpedanceError {
    ImpedanceError::InvalidArgument("Matrix is not square".to_string())
}

fn dimensions_disagree() -> ImpedanceError {
    ImpedanceError::InvalidArgument("Array dimensions do not agree".to_string())
}

impl PhasorMatrix {
    /// An `nrow` x `ncol` matrix of zeros
    pub fn zeros(nrow: usize, ncol: usize) -> Self {
        Self::from_elem(nrow, ncol, Phasor::zero())
    }

    pub fn from_elem(nrow: usize, ncol: usize, value: Phasor) -> Self {
        Self {
            data: Array2::from_elem((nrow, ncol), value),
        }
    }

    pub fn from_array(data: Array2<Phasor>) -> Self {
        Self { data }
    }

    /// Build from nested rows, which must all be the same length
    pub fn from_rows(rows: &[Vec<Phasor>]) -> Result<Self> {
        let nrow = rows.len();
        let ncol = rows.first().map_or(0, |r| r.len());
        if rows.iter().any(|r| r.len() != ncol) {
            return Err(dimensions_disagree());
        }
        Ok(Self {
            data: Array2::from_shape_fn((nrow, ncol), |(i, j)| rows[i][j]),
        })
    }

    pub fn identity(n: usize) -> Self {
        Self::scalar(n, Phasor::one())
    }

    /// `value` on the diagonal, zeros elsewhere
    pub fn scalar(n: usize, value: Phasor) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[[i, i]] = value;
        }
        m
    }

    pub fn diagonal(diag: &[Phasor]) -> Self {
        let n = diag.len();
        let mut m = Self::zeros(n, n);
        for (i, &d) in diag.iter().enumerate() {
            m.data[[i, i]] = d;
        }
        m
    }

    /// Single-column matrix
    pub fn column(values: &[Phasor]) -> Self {
        Self {
            data: Array2::from_shape_fn((values.len(), 1), |(i, _)| values[i]),
        }
    }

    /// Single-row matrix
    pub fn row(values: &[Phasor]) -> Self {
        Self {
            data: Array2::from_shape_fn((1, values.len()), |(_, j)| values[j]),
        }
    }

    pub fn from_complex(matrix: &Array2<Complex64>) -> Self {
        Self {
            data: matrix.mapv(Phasor::from),
        }
    }

    pub fn from_real(matrix: &Array2<f64>) -> Self {
        Self {
            data: matrix.mapv(Phasor::from_magnitude),
        }
    }

    pub fn to_complex(&self) -> Array2<Complex64> {
        self.data.mapv(|p| p.to_complex())
    }

    pub fn nrow(&self) -> usize {
        self.data.nrows()
    }

    pub fn ncol(&self) -> usize {
        self.data.ncols()
    }

    pub fn as_array(&self) -> &Array2<Phasor> {
        &self.data
    }

    pub fn is_square(&self) -> bool {
        self.nrow() == self.ncol()
    }

    /// Rows `rows` and columns `cols` of this matrix
    pub fn sub_matrix(&self, rows: &[usize], cols: &[usize]) -> Result<Self> {
        if rows.iter().any(|&i| i >= self.nrow()) || cols.iter().any(|&j| j >= self.ncol()) {
            return Err(ImpedanceError::InvalidArgument(
                "sub-matrix index out of range".to_string(),
            ));
        }
        Ok(Self {
            data: Array2::from_shape_fn((rows.len(), cols.len()), |(i, j)| {
                self.data[[rows[i], cols[j]]]
            }),
        })
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    pub fn plus(&self, other: &PhasorMatrix) -> Result<Self> {
        if self.data.dim() != other.data.dim() {
            return Err(dimensions_disagree());
        }
        Ok(Self {
            data: &self.data + &other.data,
        })
    }

    pub fn minus(&self, other: &PhasorMatrix) -> Result<Self> {
        if self.data.dim() != other.data.dim() {
            return Err(dimensions_disagree());
        }
        Ok(Self {
            data: &self.data - &other.data,
        })
    }

    /// Matrix product
    pub fn times(&self, other: &PhasorMatrix) -> Result<Self> {
        if self.ncol() != other.nrow() {
            return Err(ImpedanceError::InvalidArgument(
                "Nonconformable matrices".to_string(),
            ));
        }
        let inner = self.ncol();
        let data = Array2::from_shape_fn((self.nrow(), other.ncol()), |(i, j)| {
            let mut sum = Phasor::zero();
            for k in 0..inner {
                sum += self.data[[i, k]] * other.data[[k, j]];
            }
            sum
        });
        Ok(Self { data })
    }

    /// Multiply every element by a phasor
    pub fn scale(&self, factor: Phasor) -> Self {
        Self {
            data: self.data.mapv(|p| p * factor),
        }
    }

    /// Multiply every element by a real number
    pub fn scale_real(&self, factor: f64) -> Self {
        Self {
            data: self.data.mapv(|p| p * factor),
        }
    }

    /// self * other^-1
    pub fn over(&self, other: &PhasorMatrix) -> Result<Self> {
        if self.data.dim() != other.data.dim() {
            return Err(dimensions_disagree());
        }
        self.times(&other.inverse()?)
    }

    pub fn transpose(&self) -> Self {
        Self {
            data: self.data.t().to_owned(),
        }
    }

    pub fn conjugate(&self) -> Self {
        Self {
            data: self.data.mapv(|p| p.conjugate()),
        }
    }

    /// Conjugate transpose
    pub fn adjoin(&self) -> Self {
        self.transpose().conjugate()
    }

    /// Every element times -1
    pub fn opposite(&self) -> Self {
        Self {
            data: self.data.mapv(|p| p * Phasor::minus_one()),
        }
    }

    pub fn trace(&self) -> Phasor {
        let n = self.nrow().min(self.ncol());
        (0..n).fold(Phasor::zero(), |acc, i| acc + self.data[[i, i]])
    }

    // ========================================================================
    // Norms
    // ========================================================================

    pub fn frobenius_norm(&self) -> f64 {
        self.data.iter().fold(0.0, |norm, p| norm.hypot(p.abs()))
    }

    /// Maximum absolute column sum
    pub fn one_norm(&self) -> f64 {
        self.data
            .columns()
            .into_iter()
            .map(|c| c.iter().map(|p| p.abs()).sum::<f64>())
            .fold(0.0, f64::max)
    }

    /// Maximum absolute row sum
    pub fn infinity_norm(&self) -> f64 {
        self.data
            .rows()
            .into_iter()
            .map(|r| r.iter().map(|p| p.abs()).sum::<f64>())
            .fold(0.0, f64::max)
    }

    // ========================================================================
    // Decomposition and solvers
    // ========================================================================

    /// LU decomposition
    ///
    /// Fails on a non-square matrix or a row of zeros. A zero pivot is
    /// replaced by a tiny real value so that near-singular systems still
    /// return a (poorly conditioned) answer.
    pub fn lu_decomp(&self) -> Result<PhasorLu> {
        if !self.is_square() {
            return Err(not_square());
        }
        let n = self.nrow();
        let mut a = self.data.clone();
        let mut index = vec![0usize; n];
        let mut swap_sign = 1.0;

        // Implicit scaling of each row
        let mut vv = Vec::with_capacity(n);
        for row in a.rows() {
            let big = row.iter().map(|p| p.abs()).fold(0.0, f64::max);
            if big == 0.0 {
                return Err(ImpedanceError::SingularMatrix);
            }
            vv.push(1.0 / big);
        }

        for j in 0..n {
            for i in 0..j {
                let mut sum = a[[i, j]];
                for k in 0..i {
                    sum -= a[[i, k]] * a[[k, j]];
                }
                a[[i, j]] = sum;
            }

            let mut big = 0.0;
            let mut imax = j;
            for i in j..n {
                let mut sum = a[[i, j]];
                for k in 0..j {
                    sum -= a[[i, k]] * a[[k, j]];
                }
                a[[i, j]] = sum;
                let dum = vv[i] * sum.abs();
                if dum >= big {
                    big = dum;
                    imax = i;
                }
            }

            if j != imax {
                for k in 0..n {
                    a.swap([imax, k], [j, k]);
                }
                swap_sign = -swap_sign;
                vv[imax] = vv[j];
            }
            index[j] = imax;

            if a[[j, j]].is_zero() {
                a[[j, j]] = Phasor::from_magnitude(LU_TINY);
            }
            if j + 1 != n {
                let inv = a[[j, j]].inverse();
                for i in (j + 1)..n {
                    a[[i, j]] *= inv;
                }
            }
        }

        Ok(PhasorLu {
            lu: a,
            index,
            swap_sign,
        })
    }

    /// Solve `self . x = b`
    pub fn solve_linear_set(&self, b: &[Phasor]) -> Result<Vec<Phasor>> {
        self.lu_decomp()?.back_sub(b)
    }

    pub fn inverse(&self) -> Result<Self> {
        let lu = self.lu_decomp()?;
        let n = self.nrow();
        let mut inv = Self::zeros(n, n);
        let mut col = vec![Phasor::zero(); n];
        for j in 0..n {
            col.iter_mut().for_each(|c| *c = Phasor::zero());
            col[j] = Phasor::one();
            let x = lu.back_sub(&col)?;
            for (i, xi) in x.into_iter().enumerate() {
                inv.data[[i, j]] = xi;
            }
        }
        Ok(inv)
    }

    pub fn determinant(&self) -> Result<Phasor> {
        let lu = self.lu_decomp()?;
        Ok(lu.determinant())
    }

    /// ln(determinant), for matrices whose determinant over- or underflows
    pub fn log_determinant(&self) -> Result<Phasor> {
        let lu = self.lu_decomp()?;
        let n = self.nrow();
        let mut det = Phasor::from_magnitude(lu.swap_sign).ln();
        for j in 0..n {
            det += lu.lu[[j, j]].ln();
        }
        Ok(det)
    }
}

impl PhasorLu {
    /// Row permutation recorded during pivoting
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// +1 for an even number of row interchanges, -1 for odd
    pub fn swap_sign(&self) -> f64 {
        self.swap_sign
    }

    /// Combined L and U factors
    pub fn factors(&self) -> &Array2<Phasor> {
        &self.lu
    }

    pub fn determinant(&self) -> Phasor {
        let n = self.lu.nrows();
        (0..n).fold(Phasor::from_magnitude(self.swap_sign), |det, j| {
            det * self.lu[[j, j]]
        })
    }

    /// Forward and back substitution for one right-hand side
    pub fn back_sub(&self, b: &[Phasor]) -> Result<Vec<Phasor>> {
        let n = self.lu.nrows();
        if b.len() != n {
            return Err(ImpedanceError::InvalidArgument(
                "vector length is not equal to matrix dimension".to_string(),
            ));
        }
        let mut x = b.to_vec();

        for i in 0..n {
            let ip = self.index[i];
            let mut sum = x[ip];
            x[ip] = x[i];
            for j in 0..i {
                sum -= self.lu[[i, j]] * x[j];
            }
            x[i] = sum;
        }
        for i in (0..n).rev() {
            let mut sum = x[i];
            for j in (i + 1)..n {
                sum -= self.lu[[i, j]] * x[j];
            }
            x[i] = sum / self.lu[[i, i]];
        }
        Ok(x)
    }
}

impl Index<(usize, usize)> for PhasorMatrix {
    type Output = Phasor;

    fn index(&self, (i, j): (usize, usize)) -> &Phasor {
        &self.data[[i, j]]
    }
}

impl IndexMut<(usize, usize)> for PhasorMatrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Phasor {
        &mut self.data[[i, j]]
    }
}
