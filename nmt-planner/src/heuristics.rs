//! Cosine-distance primitives and the attractor influence/transition-
//! probability formulas (spec §4.4).

use nmt_core::models::Attractor;

pub fn cosine(a: &[f32], b: &[f32]) -> f64 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)) as f64
}

/// `d = 1 - cos`, the distance term used throughout the A* cost/heuristic.
pub fn distance(a: &[f32], b: &[f32]) -> f64 {
    1.0 - cosine(a, b)
}

/// `a.strength * exp(-(1 - cos(v, a.embedding)) / R) * (a.priority / 10)`.
pub fn calculate_influence(attractor: &Attractor, v: &[f32], influence_radius: f64) -> f64 {
    let d = distance(v, &attractor.embedding);
    attractor.strength * (-d / influence_radius).exp() * (attractor.priority as f64 / 10.0)
}

/// Blends semantic similarity (weight `config.semantic_weight`) with the
/// normalized attractor-gradient improvement (weight `config.gradient_weight`),
/// then re-normalizes the candidate scores to sum to 1.
pub fn transition_probabilities(
    current: &[f32],
    candidates: &[(String, Vec<f32>)],
    attractors: &[Attractor],
    influence_radius: f64,
    semantic_weight: f64,
    gradient_weight: f64,
) -> Vec<(String, f64)> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let current_influences: Vec<f64> = attractors
        .iter()
        .map(|a| calculate_influence(a, current, influence_radius))
        .collect();

    let mut raw: Vec<(String, f64)> = candidates
        .iter()
        .map(|(id, embedding)| {
            let semantic = cosine(current, embedding);
            let gradient_sum: f64 = attractors
                .iter()
                .zip(current_influences.iter())
                .map(|(a, infl_cur)| calculate_influence(a, embedding, influence_radius) - infl_cur)
                .sum();
            let gradient = gradient_sum.tanh();
            let score = semantic_weight * semantic + gradient_weight * gradient;
            (id.clone(), score.max(0.0))
        })
        .collect();

    let total: f64 = raw.iter().map(|(_, s)| s).sum();
    if total <= 0.0 {
        let uniform = 1.0 / raw.len() as f64;
        for (_, s) in &mut raw {
            *s = uniform;
        }
    } else {
        for (_, s) in &mut raw {
            *s /= total;
        }
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn attractor(embedding: Vec<f32>, strength: f64, priority: u8) -> Attractor {
        let now = Utc::now();
        Attractor {
            id: "a".to_string(),
            name: "goal".to_string(),
            description: "".to_string(),
            embedding,
            strength,
            probability: 0.5,
            priority,
            deadline: None,
            prerequisites: vec![],
            created_at: now,
            updated_at: now,
            activations: 0,
        }
    }

    #[test]
    fn identical_vectors_have_cosine_one() {
        assert!((cosine(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn influence_is_maximal_at_the_attractor_itself() {
        let a = attractor(vec![1.0, 0.0], 1.0, 10);
        let at_goal = calculate_influence(&a, &[1.0, 0.0], 0.5);
        let away = calculate_influence(&a, &[0.0, 1.0], 0.5);
        assert!(at_goal > away);
        assert!((at_goal - 1.0).abs() < 1e-6);
    }

    #[test]
    fn transition_probabilities_sum_to_one() {
        let a = attractor(vec![1.0, 0.0], 1.0, 10);
        let candidates = vec![
            ("n1".to_string(), vec![0.9, 0.1]),
            ("n2".to_string(), vec![0.0, 1.0]),
        ];
        let probs = transition_probabilities(&[0.5, 0.5], &candidates, &[a], 0.5, 0.4, 0.6);
        let total: f64 = probs.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }
}
