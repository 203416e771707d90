pub fn normalize_scores(raw: &[f32]) -> Vec<f32> {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &score in raw {
        if score > 0.0 {
            min = min.min(score);
            max = max.max(score);
        }
    }

    if !max.is_finite() {
        return vec![0.0; raw.len()];
    }
    if max == min {
        return vec![1.0; raw.len()];
    }

    let span = max - min;
    raw.iter()
        .map(|&score| ((score - min) / span).clamp(0.0, 1.0))
        .collect()
}
