//! Deviation metrics used by threshold predicates.
//!
//! Every threshold comparison in the monitor goes through [`within`], which is
//! inclusive: a deviation exactly equal to the threshold holds.

/// Inclusive threshold comparison.
pub fn within(deviation: f64, threshold: f64) -> bool {
    deviation <= threshold
}

/// Euclidean norm of a vector. A scalar is a one-element vector.
pub fn euclidean_norm(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Euclidean norm of `actual - expected`, or `None` when the lengths differ.
pub fn deviation_norm(actual: &[f64], expected: &[f64]) -> Option<f64> {
    if actual.len() != expected.len() {
        return None;
    }
    let sum: f64 = actual
        .iter()
        .zip(expected)
        .map(|(a, e)| (a - e) * (a - e))
        .sum();
    Some(sum.sqrt())
}

/// Largest component-wise absolute deviation, or `None` when the lengths differ.
pub fn max_abs_deviation(actual: &[f64], expected: &[f64]) -> Option<f64> {
    if actual.len() != expected.len() {
        return None;
    }
    Some(
        actual
            .iter()
            .zip(expected)
            .map(|(a, e)| (a - e).abs())
            .fold(0.0, f64::max),
    )
}

/// Discrete gradient with unit spacing: central differences in the interior,
/// one-sided differences at both ends. Fewer than two samples yield zeros.
pub fn gradient(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let mut out = Vec::with_capacity(n);
    out.push(values[1] - values[0]);
    for idx in 1..n - 1 {
        out.push((values[idx + 1] - values[idx - 1]) / 2.0);
    }
    out.push(values[n - 1] - values[n - 2]);
    out
}
