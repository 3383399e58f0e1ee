//! Flat row-major tensors and their conversion to and from `nalgebra` matrices.
//!
//! A second-order tensor in dimension $d$ is stored as a slice of length $d^2$, with component
//! $A_{ij}$ at index $d i + j$. A fourth-order tangent relating two second-order tensors is
//! stored as a [`Jacobian`] with $d^2$ rows and $d^2$ columns, so that
//! $$ \pd{B_{ij}}{A_{kl}} $$
//! is found at row $d i + j$ and column $d k + l$.
use crate::error::{KinematicsError, Result};
use nalgebra::allocator::Allocator;
use nalgebra::base::storage::Storage;
use nalgebra::{DMatrix, DefaultAllocator, Dim, Matrix, Matrix3, OMatrix, RealField, Scalar};
use num::integer::Roots;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}

/// Returns $d$ such that $d^2$ equals `len`.
pub fn infer_dimension(operation: &'static str, len: usize) -> Result<usize> {
    let dim = len.sqrt();
    if dim * dim == len {
        Ok(dim)
    } else {
        Err(KinematicsError::shape(
            operation,
            format!("a tensor of length {len} is not square"),
        ))
    }
}

/// Checks that the named tensor is a 3x3 tensor.
pub fn check_3d(operation: &'static str, name: &str, len: usize) -> Result<()> {
    if len == 9 {
        Ok(())
    } else {
        Err(KinematicsError::shape(
            operation,
            format!("{name} must have 9 components, but has {len}"),
        ))
    }
}

pub fn check_same_len(operation: &'static str, names: [&str; 2], lens: [usize; 2]) -> Result<()> {
    if lens[0] == lens[1] {
        Ok(())
    } else {
        Err(KinematicsError::shape(
            operation,
            format!(
                "{} and {} must have the same length, but have lengths {} and {}",
                names[0], names[1], lens[0], lens[1]
            ),
        ))
    }
}

/// Interprets a slice of length 9 as a row-major 3x3 matrix.
///
/// # Panics
///
/// Panics if the slice does not have length 9.
pub fn matrix3<T: Real>(tensor: &[T]) -> Matrix3<T> {
    Matrix3::from_row_slice(tensor)
}

/// Interprets a slice of length $d^2$ as a row-major $d \times d$ matrix.
///
/// # Panics
///
/// Panics if the slice does not have length $d^2$.
pub fn square_matrix<T: Real>(dim: usize, tensor: &[T]) -> DMatrix<T> {
    DMatrix::from_row_slice(dim, dim, tensor)
}

/// Flattens a matrix into a row-major vector.
pub fn to_row_major<T, R, C, S>(matrix: &Matrix<T, R, C, S>) -> Vec<T>
where
    T: Scalar + Copy,
    R: Dim,
    C: Dim,
    S: Storage<T, R, C>,
{
    let (nrows, ncols) = matrix.shape();
    (0..nrows)
        .flat_map(|i| (0..ncols).map(move |j| matrix[(i, j)]))
        .collect()
}

/// Inverts a square matrix, reporting a domain error if it is singular.
pub fn try_invert<T, D>(operation: &'static str, name: &str, matrix: OMatrix<T, D, D>) -> Result<OMatrix<T, D, D>>
where
    T: Real,
    D: Dim,
    DefaultAllocator: Allocator<T, D, D>,
{
    matrix
        .try_inverse()
        .ok_or_else(|| KinematicsError::domain(operation, format!("{name} is singular")))
}

/// Absolute tolerance below which a scalar is treated as zero.
pub const ZERO_TOLERANCE: f64 = 1e-9;

pub(crate) fn is_fuzzy_zero<T: Real>(value: T) -> bool {
    value.abs() <= T::from_f64(ZERO_TOLERANCE).unwrap_or(T::zero())
}

#[inline]
pub(crate) fn delta<T: Real>(i: usize, j: usize) -> T {
    if i == j {
        T::one()
    } else {
        T::zero()
    }
}

/// Reshapes a flat row-major buffer into a nested row view.
pub fn inflate<T: Clone>(flat: &[T], nrows: usize, ncols: usize) -> Result<Vec<Vec<T>>> {
    if flat.len() != nrows * ncols {
        return Err(KinematicsError::shape(
            "inflate",
            format!(
                "a buffer of length {} cannot be reshaped into {nrows} rows of {ncols} columns",
                flat.len()
            ),
        ));
    }
    if ncols == 0 {
        return Ok(vec![Vec::new(); nrows]);
    }
    Ok(flat.chunks(ncols).map(|row| row.to_vec()).collect())
}

/// Flattens a nested row view into a row-major buffer, returning the buffer and the number
/// of columns.
pub fn flatten<T: Clone>(rows: &[Vec<T>]) -> Result<(Vec<T>, usize)> {
    let ncols = rows.first().map(|row| row.len()).unwrap_or(0);
    if let Some(row) = rows.iter().find(|row| row.len() != ncols) {
        return Err(KinematicsError::shape(
            "flatten",
            format!("all rows must have {ncols} columns, found a row with {}", row.len()),
        ));
    }
    Ok((rows.concat(), ncols))
}

/// The derivative of an output tensor with respect to an input tensor.
///
/// Rows correspond to the flattened output components and columns to the flattened input
/// components. The data is stored in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Jacobian<T> {
    nrows: usize,
    ncols: usize,
    data: Vec<T>,
}

impl<T: Real> Jacobian<T> {
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            data: vec![T::zero(); nrows * ncols],
        }
    }

    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, n, delta)
    }

    pub fn from_fn(nrows: usize, ncols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let data = (0..nrows)
            .flat_map(|i| (0..ncols).map(move |j| (i, j)))
            .map(|(i, j)| f(i, j))
            .collect();
        Self { nrows, ncols, data }
    }

    /// Constructs the tangent between two second-order tensors in dimension `dim`.
    ///
    /// The closure receives the indices `(i, j, k, l)` and returns $\pd{B_{ij}}{A_{kl}}$.
    pub fn fourth_order(dim: usize, mut f: impl FnMut(usize, usize, usize, usize) -> T) -> Self {
        let n = dim * dim;
        Self::from_fn(n, n, |row, col| f(row / dim, row % dim, col / dim, col % dim))
    }

    pub fn from_row_major(nrows: usize, ncols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != nrows * ncols {
            return Err(KinematicsError::shape(
                "Jacobian::from_row_major",
                format!(
                    "expected {} entries for a {nrows}x{ncols} Jacobian, got {}",
                    nrows * ncols,
                    data.len()
                ),
            ));
        }
        Ok(Self { nrows, ncols, data })
    }

    pub fn from_nested(rows: &[Vec<T>]) -> Result<Self> {
        let (data, ncols) = flatten(rows)?;
        Ok(Self {
            nrows: rows.len(),
            ncols,
            data,
        })
    }

    pub fn from_dmatrix(matrix: &DMatrix<T>) -> Self {
        Self {
            nrows: matrix.nrows(),
            ncols: matrix.ncols(),
            data: to_row_major(matrix),
        }
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// The nested row view of the Jacobian.
    pub fn inflate(&self) -> Vec<Vec<T>> {
        if self.ncols == 0 {
            return vec![Vec::new(); self.nrows];
        }
        self.data.chunks(self.ncols).map(|row| row.to_vec()).collect()
    }

    pub fn to_dmatrix(&self) -> DMatrix<T> {
        DMatrix::from_row_slice(self.nrows, self.ncols, &self.data)
    }

    /// Adds the identity to a square Jacobian.
    pub(crate) fn add_identity(mut self) -> Self {
        debug_assert_eq!(self.nrows, self.ncols);
        for i in 0..self.nrows.min(self.ncols) {
            self[(i, i)] += T::one();
        }
        self
    }
}

impl<T> Index<(usize, usize)> for Jacobian<T> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &T {
        assert!(i < self.nrows && j < self.ncols, "index out of bounds");
        &self.data[self.ncols * i + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Jacobian<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        assert!(i < self.nrows && j < self.ncols, "index out of bounds");
        &mut self.data[self.ncols * i + j]
    }
}
