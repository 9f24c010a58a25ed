// Scalar vector kernels used by learning, composition and scoring.
// Inputs are f32 embeddings; every reduction accumulates in f64 so unit-norm
// checks hold at 1e-6 for typical embedding widths (384-1536).
// Loops process 4 lanes with two accumulators, which LLVM auto-vectorizes.

/// Dot product of two equal-length slices.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len());

    let mut sum0 = 0.0f64;
    let mut sum1 = 0.0f64;

    let chunks = a.chunks_exact(4);
    let remainder = chunks.remainder();
    let b_chunks = b.chunks_exact(4);

    for (x, y) in chunks.zip(b_chunks) {
        sum0 += x[0] as f64 * y[0] as f64 + x[1] as f64 * y[1] as f64;
        sum1 += x[2] as f64 * y[2] as f64 + x[3] as f64 * y[3] as f64;
    }

    let offset = a.len() - remainder.len();
    for (i, x) in remainder.iter().enumerate() {
        sum0 += *x as f64 * b[offset + i] as f64;
    }

    sum0 + sum1
}

#[inline]
pub fn norm_squared(v: &[f32]) -> f64 {
    dot(v, v)
}

/// Euclidean length of a vector.
#[inline]
pub fn norm(v: &[f32]) -> f64 {
    norm_squared(v).sqrt()
}

/// Euclidean distance between two equal-length slices.
#[inline]
pub fn l2_distance(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = *x as f64 - *y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// `acc += alpha * x`, accumulating in f64.
#[inline]
pub fn axpy(acc: &mut [f64], alpha: f64, x: &[f32]) {
    debug_assert_eq!(acc.len(), x.len());
    for (a, v) in acc.iter_mut().zip(x) {
        *a += alpha * *v as f64;
    }
}

/// Norm of an f64 accumulator.
#[inline]
pub fn norm_f64(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Mean of a set of equal-length rows, in f64.
///
/// Returns an empty vector for an empty input.
pub fn centroid<'a, I>(rows: I, dim: usize) -> Vec<f64>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let mut acc = vec![0.0f64; dim];
    let mut count = 0usize;
    for row in rows {
        axpy(&mut acc, 1.0, row);
        count += 1;
    }
    if count == 0 {
        return Vec::new();
    }
    let inv = 1.0 / count as f64;
    for a in &mut acc {
        *a *= inv;
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_handles_remainder() {
        let a = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [1.0f32, 1.0, 1.0, 1.0, 1.0, 2.0];
        assert!((dot(&a, &b) - 27.0).abs() < 1e-12);
    }

    #[test]
    fn test_norm() {
        assert!((norm(&[3.0, 4.0]) - 5.0).abs() < 1e-12);
        assert_eq!(norm(&[]), 0.0);
    }

    #[test]
    fn test_l2_distance() {
        assert!((l2_distance(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_axpy_and_centroid() {
        let mut acc = vec![0.0f64; 2];
        axpy(&mut acc, 2.0, &[1.0, -1.0]);
        assert_eq!(acc, vec![2.0, -2.0]);

        let rows: Vec<Vec<f32>> = vec![vec![1.0, 0.0], vec![3.0, 2.0]];
        let c = centroid(rows.iter().map(|r| r.as_slice()), 2);
        assert_eq!(c, vec![2.0, 1.0]);
        assert!(centroid(std::iter::empty::<&[f32]>(), 2).is_empty());
    }
}
