/// Cosine similarity between two embeddings.
///
/// The dot product runs over the indices of `a`; components missing from `b`
/// count as zero. Returns `0.0` when either vector has zero magnitude, so a
/// dimension mismatch degrades the score instead of failing.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a
        .iter()
        .enumerate()
        .map(|(i, x)| x * b.get(i).copied().unwrap_or(0.0))
        .sum();

    let magnitude_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot / (magnitude_a * magnitude_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn identical_vectors_score_one() {
        let a = [0.3, -1.2, 4.0, 0.01];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn opposite_vectors_score_minus_one() {
        let score = cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]);
        assert!((score + 1.0).abs() < EPSILON);
    }

    #[test]
    fn zero_magnitude_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 1.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn score_stays_within_bounds() {
        let pairs: [(&[f32], &[f32]); 4] = [
            (&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]),
            (&[-3.0, 0.5, 9.0], &[2.0, -7.0, 1.0]),
            (&[1e-3, 1e3, 0.0], &[1e3, 1e-3, 5.0]),
            (&[0.1, 0.1, 0.1], &[-0.1, -0.1, -0.1]),
        ];

        for (a, b) in pairs {
            let score = cosine_similarity(a, b);
            assert!((-1.0 - EPSILON..=1.0 + EPSILON).contains(&score), "{score}");
        }
    }

    #[test]
    fn shorter_second_vector_counts_missing_as_zero() {
        // b is treated as [1.0, 0.0]; its magnitude only covers present components.
        let score = cosine_similarity(&[1.0, 1.0], &[1.0]);
        assert!((score - std::f32::consts::FRAC_1_SQRT_2).abs() < EPSILON);
    }

    #[test]
    fn longer_second_vector_ignores_extra_components_in_dot() {
        let score = cosine_similarity(&[1.0], &[1.0, 1.0]);
        assert!((score - std::f32::consts::FRAC_1_SQRT_2).abs() < EPSILON);
    }
}
