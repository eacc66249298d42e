/// Cosine similarity mapped into `[0, 1]` where `1.0` means identical and
/// `0.0` means diametrically opposed (spec §4.2: "score in [0,1] where 1
/// = identical"). Embeddings are expected unit-norm, but this does not
/// assume it — it divides by the actual norms, so a non-unit vector
/// (e.g. mid pattern-completion) still yields a meaningful score.
pub fn cosine_score(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let cos = (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0);
    (cos + 1.0) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_score_one() {
        let v = vec![0.6, 0.8, 0.0];
        assert!((cosine_score(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn opposite_vectors_score_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!(cosine_score(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_score_half() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!((cosine_score(&a, &b) - 0.5).abs() < 1e-6);
    }
}
