use crate::error::{check_len, Error, Result};
use crate::utils::ZeroOut;
use crate::vector::Vector;

use std::ops::{Index, IndexMut};

/// A dense `rows` x `cols` matrix.
///
/// Within a layer, row `j` holds every weight feeding node `j`, and column
/// `k` belongs to node `k` of the previous layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Mat {
    rows: usize,
    cols: usize,
    data: Vec<f64>, // row-major array
}

impl Mat {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Mat::with_diagonal(rows, cols, 0.0)
    }

    /// Creates a matrix with `diagonal` on the main diagonal and zeros
    /// elsewhere.
    pub fn with_diagonal(rows: usize, cols: usize, diagonal: f64) -> Self {
        let mut data = vec![0.0; rows * cols];
        for i in 0..rows.min(cols) {
            data[i * cols + i] = diagonal;
        }
        Mat { rows, cols, data }
    }

    pub fn identity(rows: usize, cols: usize) -> Self {
        Mat::with_diagonal(rows, cols, 1.0)
    }

    /// Builds a matrix from row-major `data`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        check_len("matrix element count", rows * cols, data.len())?;
        Ok(Mat { rows, cols, data })
    }

    /// Builds a matrix from a list of equally long rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map_or(0, |row| row.len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            check_len("matrix row length", cols, row.len())?;
            data.extend_from_slice(row);
        }
        Ok(Mat {
            rows: rows.len(),
            cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns row `r` as a slice.
    pub fn row(&self, r: usize) -> &[f64] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Standard matrix product `lhs * rhs`.
    pub fn product(lhs: &Mat, rhs: &Mat) -> Result<Mat> {
        check_len("lhs columns / rhs rows", lhs.cols, rhs.rows)?;
        let mut out = Mat::zeros(lhs.rows, rhs.cols);
        for r in 0..lhs.rows {
            for c in 0..rhs.cols {
                let mut sum = 0.0;
                for k in 0..lhs.cols {
                    sum += lhs[(r, k)] * rhs[(k, c)];
                }
                out[(r, c)] = sum;
            }
        }
        Ok(out)
    }

    /// Computes `self * v`, where `result[r] = sum_c self[r, c] * v[c]`.
    pub fn mul_vector(&self, v: &[f64]) -> Result<Vector> {
        let mut out = Vector::zeros(self.rows);
        self.mul_vector_into(v, &mut out)?;
        Ok(out)
    }

    /// Computes `self * v` into a pre-sized `out`.
    pub fn mul_vector_into(&self, v: &[f64], out: &mut [f64]) -> Result<()> {
        check_len("matrix columns / vector length", self.cols, v.len())?;
        check_len("matrix rows / output length", self.rows, out.len())?;
        for (r, y) in out.iter_mut().enumerate() {
            let mut sum = 0.0;
            for (w, x) in self.row(r).iter().zip(v) {
                sum += w * x;
            }
            *y = sum;
        }
        Ok(())
    }

    /// Computes `transpose(self) * v` into a pre-sized `out` without
    /// materializing the transpose. Rows are summed in ascending order, which
    /// matches `self.transpose().mul_vector(v)` exactly.
    pub fn transpose_mul_vector_into(
        &self,
        v: &[f64],
        out: &mut [f64],
    ) -> Result<()> {
        check_len("matrix rows / vector length", self.rows, v.len())?;
        check_len("matrix columns / output length", self.cols, out.len())?;
        for (c, y) in out.iter_mut().enumerate() {
            let mut sum = 0.0;
            for (r, x) in v.iter().enumerate() {
                sum += self[(r, c)] * x;
            }
            *y = sum;
        }
        Ok(())
    }

    /// Returns a new matrix with `m[c, r] = self[r, c]`.
    pub fn transpose(&self) -> Mat {
        let mut m = Mat::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                m[(c, r)] = self[(r, c)];
            }
        }
        m
    }

    /// Returns a `rows` x `cols` copy that keeps every overlapping entry and
    /// zero-fills new ones.
    pub fn resized(&self, rows: usize, cols: usize) -> Mat {
        let mut m = Mat::zeros(rows, cols);
        for r in 0..rows.min(self.rows) {
            for c in 0..cols.min(self.cols) {
                m[(r, c)] = self[(r, c)];
            }
        }
        m
    }

    /// Adds `other` into `self`, element by element.
    pub fn add_assign_checked(&mut self, other: &Mat) -> Result<()> {
        self.check_same_shape("matrix shapes", other)?;
        for (l, r) in self.data.iter_mut().zip(other.data.iter()) {
            *l += *r;
        }
        Ok(())
    }

    /// Sum of the element-wise products of `self` and `other`.
    pub fn frobenius_dot(&self, other: &Mat) -> Result<f64> {
        self.check_same_shape("matrix shapes", other)?;
        let mut sum = 0.0;
        for (a, b) in self.data.iter().zip(other.data.iter()) {
            sum += a * b;
        }
        Ok(sum)
    }

    pub(crate) fn check_same_shape(
        &self,
        context: &'static str,
        other: &Mat,
    ) -> Result<()> {
        if self.rows != other.rows {
            return Err(Error::ShapeMismatch {
                context,
                expected: self.rows,
                actual: other.rows,
            });
        }
        check_len(context, self.cols, other.cols)
    }
}

impl Index<(usize, usize)> for Mat {
    type Output = f64;

    fn index(&self, (r, c): (usize, usize)) -> &f64 {
        assert!(c < self.cols, "column {} out of bounds", c);
        &self.data[r * self.cols + c]
    }
}

impl IndexMut<(usize, usize)> for Mat {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut f64 {
        assert!(c < self.cols, "column {} out of bounds", c);
        &mut self.data[r * self.cols + c]
    }
}

impl ZeroOut for Mat {
    fn zero_out(&mut self) {
        self.data.zero_out();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Mat {
        Mat::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap()
    }

    #[test]
    fn diagonal_construction() {
        let m = Mat::with_diagonal(2, 3, 2.5);
        assert_eq!(m.as_slice(), &[2.5, 0.0, 0.0, 0.0, 2.5, 0.0]);
        let m = Mat::identity(3, 2);
        assert_eq!(m.as_slice(), &[1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        assert!(Mat::zeros(2, 2).as_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn ragged_rows_fail() {
        let result = Mat::from_rows(&[vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
        assert!(Mat::from_vec(2, 2, vec![1.0; 3]).is_err());
    }

    #[test]
    fn double_transpose_is_identity() {
        let m = sample();
        let t = m.transpose();
        assert_eq!(t.rows(), 3);
        assert_eq!(t.cols(), 2);
        assert_eq!(t[(2, 1)], 6.0);
        assert_eq!(t.transpose(), m);
    }

    #[test]
    fn matrix_product() {
        let lhs = sample();
        let rhs = Mat::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]])
            .unwrap();
        let p = Mat::product(&lhs, &rhs).unwrap();
        assert_eq!(p, Mat::from_rows(&[vec![4.0, 5.0], vec![10.0, 11.0]]).unwrap());
        assert_eq!(Mat::product(&lhs, &Mat::identity(3, 3)).unwrap(), lhs);
    }

    #[test]
    fn matrix_product_shape_mismatch() {
        let lhs = sample();
        let result = Mat::product(&lhs, &lhs);
        assert_eq!(
            result,
            Err(Error::ShapeMismatch {
                context: "lhs columns / rhs rows",
                expected: 3,
                actual: 2,
            })
        );
    }

    #[test]
    fn matrix_vector_product_uses_rows() {
        let m = sample();
        let v = m.mul_vector(&[1.0, 0.0, -1.0]).unwrap();
        assert_eq!(v.as_slice(), &[-2.0, -2.0]);
        assert!(m.mul_vector(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn transpose_vector_product_matches_explicit_transpose() {
        let m = sample();
        let v = [0.5, -1.5];
        let mut out = [0.0; 3];
        m.transpose_mul_vector_into(&v, &mut out).unwrap();
        assert_eq!(&out[..], m.transpose().mul_vector(&v).unwrap().as_slice());
        assert!(m.transpose_mul_vector_into(&[1.0; 3], &mut out).is_err());
    }

    #[test]
    fn resize_preserves_overlap() {
        let m = sample();
        let grown = m.resized(3, 4);
        assert_eq!(grown.row(0), &[1.0, 2.0, 3.0, 0.0]);
        assert_eq!(grown.row(1), &[4.0, 5.0, 6.0, 0.0]);
        assert_eq!(grown.row(2), &[0.0; 4]);
        let shrunk = m.resized(1, 2);
        assert_eq!(shrunk.as_slice(), &[1.0, 2.0]);
    }

    #[test]
    fn accumulate_and_dot() {
        let mut m = sample();
        m.add_assign_checked(&sample()).unwrap();
        assert_eq!(m.row(1), &[8.0, 10.0, 12.0]);
        assert_eq!(Mat::identity(2, 2).frobenius_dot(&Mat::identity(2, 2)), Ok(2.0));
        assert!(m.add_assign_checked(&Mat::zeros(3, 2)).is_err());
    }
}
