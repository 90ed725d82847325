use fraudml_core::FEATURE_NAMES;

/// The `k` most important features, descending. Equal importances keep
/// schema order.
pub fn rank_features(importances: &[f64], k: usize) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = FEATURE_NAMES
        .iter()
        .zip(importances)
        .map(|(name, &imp)| ((*name).to_string(), imp))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(k);
    ranked
}
