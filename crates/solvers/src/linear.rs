//! Dense linear systems `A·x = b` of small, fixed size.
//!
//! [`DenseSystem`] is a reusable workspace: callers overwrite its rows, solve,
//! and overwrite them again on the next call without reallocating. Solving
//! uses LU decomposition with partial pivoting, i.e. Gaussian elimination.
//!
//! A system whose smallest pivot is negligible relative to its largest pivot
//! is reported as [`Error::Singular`] rather than solved, since the resulting
//! solution would be dominated by rounding error.

use nalgebra::{Const, DimMin, SMatrix, SVector};
use thiserror::Error;

/// Default relative pivot tolerance used by [`DenseSystem::new`].
pub const DEFAULT_TOLERANCE: f64 = 1e-12;

/// Errors that can occur while solving a linear system.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("matrix is singular: pivot {pivot} vanished during elimination")]
    Singular { pivot: usize },

    #[error("linear system contains a non-finite value")]
    NonFinite,
}

/// Errors that can occur when configuring a [`DenseSystem`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("pivot tolerance must be finite and non-negative")]
    Tolerance,
}

/// A reusable `N×N` linear system workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseSystem<const N: usize> {
    matrix: SMatrix<f64, N, N>,
    rhs: SVector<f64, N>,
    tolerance: f64,
}

impl<const N: usize> Default for DenseSystem<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DenseSystem<N> {
    /// Creates a zeroed system with the default pivot tolerance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            matrix: SMatrix::zeros(),
            rhs: SVector::zeros(),
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Creates a zeroed system with a custom relative pivot tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Tolerance`] if the tolerance is negative or
    /// non-finite.
    pub fn with_tolerance(tolerance: f64) -> Result<Self, ConfigError> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ConfigError::Tolerance);
        }
        Ok(Self {
            tolerance,
            ..Self::new()
        })
    }

    /// Returns the relative pivot tolerance.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Zeroes every coefficient and right-hand side entry.
    pub fn clear(&mut self) {
        self.matrix.fill(0.0);
        self.rhs.fill(0.0);
    }

    /// Overwrites one row of the system.
    ///
    /// # Panics
    ///
    /// Panics if `row >= N`.
    pub fn set_row(&mut self, row: usize, coefficients: [f64; N], rhs: f64) {
        for (col, value) in coefficients.into_iter().enumerate() {
            self.matrix[(row, col)] = value;
        }
        self.rhs[row] = rhs;
    }

    /// Returns the coefficient at `(row, col)`.
    #[must_use]
    pub fn coefficient(&self, row: usize, col: usize) -> f64 {
        self.matrix[(row, col)]
    }

    /// Returns the right-hand side entry of `row`.
    #[must_use]
    pub fn rhs(&self, row: usize) -> f64 {
        self.rhs[row]
    }
}

impl<const N: usize> DenseSystem<N>
where
    Const<N>: DimMin<Const<N>, Output = Const<N>>,
{
    /// Solves the current system.
    ///
    /// The workspace is left intact, so the same system can be inspected or
    /// solved again.
    ///
    /// # Errors
    ///
    /// - [`Error::NonFinite`] if any coefficient, right-hand side entry, or
    ///   solution component is NaN or infinite.
    /// - [`Error::Singular`] if the matrix is exactly or numerically singular.
    pub fn solve(&self) -> Result<[f64; N], Error> {
        if !self.matrix.iter().chain(self.rhs.iter()).all(|v| v.is_finite()) {
            return Err(Error::NonFinite);
        }

        let lu = self.matrix.clone().lu();
        let u = lu.u();

        let mut largest = 0.0_f64;
        let mut smallest = (0, f64::INFINITY);
        for i in 0..N {
            let pivot = u[(i, i)].abs();
            largest = largest.max(pivot);
            if pivot < smallest.1 {
                smallest = (i, pivot);
            }
        }

        let (pivot, magnitude) = smallest;
        if N > 0 && (largest == 0.0 || magnitude <= self.tolerance * largest) {
            return Err(Error::Singular { pivot });
        }

        let x = lu.solve(&self.rhs).ok_or(Error::Singular { pivot })?;
        if !x.iter().all(|v| v.is_finite()) {
            return Err(Error::NonFinite);
        }

        Ok(std::array::from_fn(|i| x[i]))
    }
}

/// Solves a one-off system given as row-major coefficients.
///
/// # Errors
///
/// See [`DenseSystem::solve`].
pub fn solve<const N: usize>(a: [[f64; N]; N], b: [f64; N]) -> Result<[f64; N], Error>
where
    Const<N>: DimMin<Const<N>, Output = Const<N>>,
{
    let mut system = DenseSystem::<N>::new();
    for (row, (coefficients, rhs)) in a.into_iter().zip(b).enumerate() {
        system.set_row(row, coefficients, rhs);
    }
    system.solve()
}
