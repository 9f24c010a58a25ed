use crate::kernels;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Dense embedding vector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn from_slice(data: &[f32]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// Narrow an f64 accumulator into a vector.
    #[must_use]
    pub fn from_f64(data: &[f64]) -> Self {
        Self {
            data: data.iter().map(|x| *x as f32).collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn zeros(dim: usize) -> Self {
        Self {
            data: vec![0.0; dim],
        }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }

    /// L2 norm, accumulated in f64.
    #[inline]
    pub fn norm(&self) -> f64 {
        kernels::norm(&self.data)
    }

    #[inline]
    pub fn dot(&self, other: &Vector) -> f64 {
        kernels::dot(&self.data, &other.data)
    }

    /// Cosine similarity clamped into [-1, 1].
    ///
    /// Returns 0.0 when either vector has zero length or the dimensions differ;
    /// callers that must distinguish those cases check dimensions first.
    #[inline]
    pub fn cosine_similarity(&self, other: &Vector) -> f32 {
        if self.dim() != other.dim() {
            return 0.0;
        }

        let norm_a = self.norm();
        let norm_b = other.norm();
        if norm_a <= f64::EPSILON || norm_b <= f64::EPSILON {
            return 0.0;
        }

        (self.dot(other) / (norm_a * norm_b)).clamp(-1.0, 1.0) as f32
    }

    #[inline]
    pub fn l2_distance(&self, other: &Vector) -> f32 {
        if self.dim() != other.dim() {
            return f32::INFINITY;
        }
        kernels::l2_distance(&self.data, &other.data) as f32
    }

    /// Normalize the vector to unit length. Zero vectors are left untouched.
    #[inline]
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > f64::EPSILON {
            let inv_norm = 1.0 / norm;
            for x in &mut self.data {
                *x = (*x as f64 * inv_norm) as f32;
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut v = self.clone();
        v.normalize();
        v
    }

    /// Whether the norm is within `tolerance` of 1.
    #[inline]
    pub fn is_unit(&self, tolerance: f64) -> bool {
        (self.norm() - 1.0).abs() < tolerance
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}

impl Add for &Vector {
    type Output = Vector;

    fn add(self, other: &Vector) -> Vector {
        assert_eq!(self.dim(), other.dim());
        Vector::new(
            self.data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| a + b)
                .collect(),
        )
    }
}

impl Sub for &Vector {
    type Output = Vector;

    fn sub(self, other: &Vector) -> Vector {
        assert_eq!(self.dim(), other.dim());
        Vector::new(
            self.data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| a - b)
                .collect(),
        )
    }
}

impl Mul<f32> for &Vector {
    type Output = Vector;

    fn mul(self, scalar: f32) -> Vector {
        Vector::new(self.data.iter().map(|x| x * scalar).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let v1 = Vector::new(vec![1.0, 0.0]);
        let v2 = Vector::new(vec![1.0, 0.0]);
        assert!((v1.cosine_similarity(&v2) - 1.0).abs() < 1e-6);

        let v3 = Vector::new(vec![1.0, 0.0]);
        let v4 = Vector::new(vec![0.0, 1.0]);
        assert!((v3.cosine_similarity(&v4) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_and_mismatch() {
        let zero = Vector::zeros(2);
        let v = Vector::new(vec![1.0, 1.0]);
        assert_eq!(zero.cosine_similarity(&v), 0.0);
        assert_eq!(v.cosine_similarity(&Vector::new(vec![1.0])), 0.0);
    }

    #[test]
    fn test_l2_distance() {
        let v1 = Vector::new(vec![0.0, 0.0]);
        let v2 = Vector::new(vec![3.0, 4.0]);
        assert!((v1.l2_distance(&v2) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize() {
        let v = Vector::new(vec![3.0, 4.0]).normalized();
        assert!(v.is_unit(1e-6));
        assert!((v.as_slice()[0] - 0.6).abs() < 1e-6);

        let mut zero = Vector::zeros(3);
        zero.normalize();
        assert_eq!(zero.as_slice(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_arithmetic() {
        let a = Vector::new(vec![1.0, 2.0]);
        let b = Vector::new(vec![0.5, 0.5]);
        assert_eq!((&a + &b).as_slice(), &[1.5, 2.5]);
        assert_eq!((&a - &b).as_slice(), &[0.5, 1.5]);
        assert_eq!((&a * 2.0).as_slice(), &[2.0, 4.0]);
    }
}
