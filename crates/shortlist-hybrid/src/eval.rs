//! Offline retrieval metrics.

use std::collections::HashSet;

/// Share of `relevant` names found among the first `k` of `retrieved`.
///
/// Duplicate names in `retrieved` count once. An empty relevant set scores 0.
pub fn recall_at_k<R, S>(retrieved: &[R], relevant: &[S], k: usize) -> f64
where
    R: AsRef<str>,
    S: AsRef<str>,
{
    let relevant: HashSet<&str> = relevant.iter().map(|s| s.as_ref()).collect();
    if relevant.is_empty() {
        return 0.0;
    }
    let found: HashSet<&str> =
        retrieved.iter().take(k).map(|r| r.as_ref()).filter(|name| relevant.contains(name)).collect();
    found.len() as f64 / relevant.len() as f64
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
