//! Presence-boosted BM25-flavored keyword score (spec §4.3 step 4): no
//! corpus-wide IDF or document-length normalization, since candidates are
//! scored ad hoc against their own reconstructed content rather than
//! against a fixed corpus index.

use std::collections::HashMap;

/// `sum(tf * (k1+1) / (tf+k1))` over query tokens, normalized by query
/// token count and clamped to `[0, 1]`.
pub fn bm25_score(query_tokens: &[String], doc_tokens: &[String], k1: f64) -> f64 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let mut doc_tf: HashMap<&str, usize> = HashMap::new();
    for tok in doc_tokens {
        *doc_tf.entry(tok.as_str()).or_insert(0) += 1;
    }

    let sum: f64 = query_tokens
        .iter()
        .map(|q| {
            let tf = *doc_tf.get(q.as_str()).unwrap_or(&0) as f64;
            if tf == 0.0 {
                0.0
            } else {
                tf * (k1 + 1.0) / (tf + k1)
            }
        })
        .sum();

    (sum / query_tokens.len() as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_overlap_scores_zero() {
        let q = vec!["database".to_string(), "optimization".to_string()];
        let d = vec!["unrelated".to_string(), "content".to_string()];
        assert_eq!(bm25_score(&q, &d, 1.5), 0.0);
    }

    #[test]
    fn full_overlap_is_clamped_to_one() {
        let q = vec!["database".to_string()];
        let d = vec!["database".to_string(); 50];
        assert!(bm25_score(&q, &d, 1.5) <= 1.0);
    }

    #[test]
    fn more_term_frequency_scores_higher_but_saturates() {
        let q = vec!["database".to_string()];
        let low = bm25_score(&q, &vec!["database".to_string()], 1.5);
        let high = bm25_score(&q, &vec!["database".to_string(); 5], 1.5);
        assert!(high > low);
    }

    #[test]
    fn empty_query_scores_zero() {
        assert_eq!(bm25_score(&[], &["database".to_string()], 1.5), 0.0);
    }
}
