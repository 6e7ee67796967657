//! Fixed-length dense vectors.

use crate::error::{check_len, Result};
use crate::utils::ZeroOut;

use std::ops::{Deref, DerefMut, Neg};

/// An n-dimensional vector of `f64` components.
///
/// The length is fixed when the vector is created. Every binary operation
/// checks that both operands have the same length and fails with
/// `Error::ShapeMismatch` otherwise.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vector {
    data: Vec<f64>,
}

impl Vector {
    /// Creates a vector of `len` components, all set to `value`.
    pub fn filled(len: usize, value: f64) -> Self {
        Vector {
            data: vec![value; len],
        }
    }

    /// Creates a vector of `len` zeros.
    pub fn zeros(len: usize) -> Self {
        Vector::filled(len, 0.0)
    }

    /// Applies `f` to every component, producing a new vector.
    pub fn map<F>(&self, f: F) -> Vector
    where
        F: Fn(f64) -> f64,
    {
        Vector {
            data: self.data.iter().map(|&x| f(x)).collect(),
        }
    }

    /// Combines `self` and `other` component by component.
    pub fn zip_with<F>(&self, other: &Vector, f: F) -> Result<Vector>
    where
        F: Fn(f64, f64) -> f64,
    {
        check_len("vector lengths", self.len(), other.len())?;
        Ok(Vector {
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    pub fn checked_add(&self, other: &Vector) -> Result<Vector> {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn checked_sub(&self, other: &Vector) -> Result<Vector> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Component-wise (Hadamard) product.
    pub fn checked_mul(&self, other: &Vector) -> Result<Vector> {
        self.zip_with(other, |a, b| a * b)
    }

    /// Component-wise quotient.
    pub fn checked_div(&self, other: &Vector) -> Result<Vector> {
        self.zip_with(other, |a, b| a / b)
    }

    /// Inner product, summed in component order.
    pub fn dot(&self, other: &Vector) -> Result<f64> {
        check_len("vector lengths", self.len(), other.len())?;
        let mut sum = 0.0;
        for (a, b) in self.data.iter().zip(other.data.iter()) {
            sum += a * b;
        }
        Ok(sum)
    }

    /// Adds `other` into `self` in place.
    pub fn add_assign_checked(&mut self, other: &Vector) -> Result<()> {
        check_len("vector lengths", self.len(), other.len())?;
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += *b;
        }
        Ok(())
    }

    /// Copies `other` into `self` without reallocating.
    pub fn copy_from(&mut self, other: &[f64]) -> Result<()> {
        check_len("vector lengths", self.len(), other.len())?;
        self.data.copy_from_slice(other);
        Ok(())
    }

    /// Returns a copy of length `len`, keeping the overlapping prefix and
    /// zero-filling anything new.
    pub fn resized(&self, len: usize) -> Vector {
        let mut data = vec![0.0; len];
        let keep = len.min(self.len());
        data[..keep].copy_from_slice(&self.data[..keep]);
        Vector { data }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }
}

impl From<Vec<f64>> for Vector {
    fn from(data: Vec<f64>) -> Self {
        Vector { data }
    }
}

impl<'a> From<&'a [f64]> for Vector {
    fn from(data: &'a [f64]) -> Self {
        Vector {
            data: data.to_vec(),
        }
    }
}

// Length stays fixed: only slice access is exposed, never the `Vec`.
impl Deref for Vector {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.data
    }
}

impl DerefMut for Vector {
    fn deref_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }
}

impl<'a> Neg for &'a Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        self.map(|x| -x)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(mut self) -> Vector {
        for x in self.data.iter_mut() {
            *x = -*x;
        }
        self
    }
}

impl ZeroOut for Vector {
    fn zero_out(&mut self) {
        self.data.zero_out();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    use approx::assert_abs_diff_eq;

    #[test]
    fn filled_and_zeros() {
        assert_eq!(Vector::filled(3, 1.5).as_slice(), &[1.5, 1.5, 1.5]);
        assert_eq!(Vector::zeros(2).as_slice(), &[0.0, 0.0]);
        assert!(Vector::zeros(0).is_empty());
    }

    #[test]
    fn add_negation_is_zero() {
        let a = Vector::from(vec![0.25, -3.5, 1e6, 7.125]);
        let sum = a.checked_add(&-&a).unwrap();
        for x in sum.iter() {
            assert_abs_diff_eq!(*x, 0.0);
        }
    }

    #[test]
    fn element_wise_operators() {
        let a = Vector::from(vec![1.0, 2.0, 3.0]);
        let b = Vector::from(vec![4.0, 5.0, 6.0]);
        assert_eq!(a.checked_add(&b).unwrap().as_slice(), &[5.0, 7.0, 9.0]);
        assert_eq!(a.checked_sub(&b).unwrap().as_slice(), &[-3.0, -3.0, -3.0]);
        assert_eq!(a.checked_mul(&b).unwrap().as_slice(), &[4.0, 10.0, 18.0]);
        assert_eq!(b.checked_div(&a).unwrap().as_slice(), &[4.0, 2.5, 2.0]);
    }

    #[test]
    fn mismatched_lengths_fail() {
        let a = Vector::zeros(2);
        let b = Vector::zeros(3);
        let expected = Error::ShapeMismatch {
            context: "vector lengths",
            expected: 2,
            actual: 3,
        };
        assert_eq!(a.checked_add(&b), Err(expected.clone()));
        assert_eq!(a.checked_mul(&b), Err(expected.clone()));
        assert_eq!(a.dot(&b), Err(expected));
    }

    #[test]
    fn dot_product() {
        let a = Vector::from(vec![1.0, -2.0, 0.5]);
        let b = Vector::from(vec![4.0, 1.0, 2.0]);
        assert_eq!(a.dot(&b), Ok(3.0));
    }

    #[test]
    fn resized_keeps_prefix() {
        let a = Vector::from(vec![1.0, 2.0, 3.0]);
        assert_eq!(a.resized(5).as_slice(), &[1.0, 2.0, 3.0, 0.0, 0.0]);
        assert_eq!(a.resized(2).as_slice(), &[1.0, 2.0]);
    }

    #[test]
    fn add_assign_in_place() {
        let mut a = Vector::from(vec![1.0, 1.0]);
        a.add_assign_checked(&Vector::from(vec![0.5, -1.0])).unwrap();
        assert_eq!(a.as_slice(), &[1.5, 0.0]);
        assert!(a.add_assign_checked(&Vector::zeros(1)).is_err());
    }
}
