//! Alignment scoring
//!
//! Similarities are raw cosines clamped to [-1, 1]. Only the positive part of
//! each similarity counts toward the high-pole share, so a candidate that is
//! anti-correlated with one pole is read as fully on the other side.

/// Similarity the candidate would have if it matched the dial exactly:
/// the dial-weighted mix of the two pole similarities.
#[inline]
pub fn expected_similarity(dial_value: f32, low_similarity: f32, high_similarity: f32) -> f32 {
    low_similarity * (1.0 - dial_value) + high_similarity * dial_value
}

/// Share of the (positive) similarity mass that sits on the high pole, or
/// `None` when both similarities are ~0.
pub fn high_share(low_similarity: f32, high_similarity: f32, epsilon: f64) -> Option<f32> {
    let low = low_similarity.max(0.0) as f64;
    let high = high_similarity.max(0.0) as f64;
    let total = low + high;
    if total < epsilon || total == 0.0 {
        None
    } else {
        Some((high / total) as f32)
    }
}

/// `1 - |dial - high_share|`, in [0, 1]. 0.5 when neither pole is similar.
pub fn alignment(dial_value: f32, low_similarity: f32, high_similarity: f32, epsilon: f64) -> f32 {
    match high_share(low_similarity, high_similarity, epsilon) {
        Some(share) => (1.0 - (dial_value - share).abs()).clamp(0.0, 1.0),
        None => 0.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn test_perfect_and_inverted() {
        assert!((alignment(1.0, 0.0, 0.9, EPS) - 1.0).abs() < 1e-6);
        assert!(alignment(0.0, 0.0, 0.9, EPS).abs() < 1e-6);
        assert!((alignment(0.0, 0.7, 0.0, EPS) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_balanced_candidate_matches_neutral_dial() {
        assert!((alignment(0.5, 0.4, 0.4, EPS) - 1.0).abs() < 1e-6);
        assert!((alignment(1.0, 0.4, 0.4, EPS) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_zero_mass_falls_back_to_half() {
        assert_eq!(alignment(1.0, 0.0, 0.0, EPS), 0.5);
        assert_eq!(alignment(0.0, -0.3, -0.2, EPS), 0.5);
        assert_eq!(high_share(1e-8, 1e-8, EPS), None);
    }

    #[test]
    fn test_negative_similarity_counts_as_zero() {
        assert_eq!(high_share(-0.5, 0.3, EPS), Some(1.0));
        assert_eq!(high_share(0.3, -0.5, EPS), Some(0.0));
    }

    #[test]
    fn test_monotonic_in_dial_for_high_leaning_candidate() {
        let mut previous = -1.0;
        for step in 0..=10 {
            let dial = step as f32 / 10.0;
            let a = alignment(dial, -0.1, 0.8, EPS);
            assert!(a >= previous - 1e-6);
            previous = a;
        }
    }

    #[test]
    fn test_expected_similarity_interpolates() {
        assert_eq!(expected_similarity(0.0, 0.2, 0.8), 0.2);
        assert_eq!(expected_similarity(1.0, 0.2, 0.8), 0.8);
        assert!((expected_similarity(0.5, 0.2, 0.8) - 0.5).abs() < 1e-6);
    }
}
