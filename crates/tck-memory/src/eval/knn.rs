use std::cmp::Ordering;

#[must_use]
pub fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Score of a neighbour; 1.0 for an exact match, decreasing with distance.
#[must_use]
pub fn similarity(squared_distance: f32) -> f32 {
    1.0 / (1.0 + squared_distance)
}

/// The `k` closest candidates, ties broken by key.
#[must_use]
pub fn nearest<K: Ord>(mut candidates: Vec<(K, f32)>, k: usize) -> Vec<K> {
    candidates.sort_by(|(ka, da), (kb, db)| {
        da.partial_cmp(db)
            .unwrap_or(Ordering::Equal)
            .then_with(|| ka.cmp(kb))
    });
    candidates.truncate(k);

    candidates.into_iter().map(|(key, _)| key).collect()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_keeps_k_closest_in_order() {
        let candidates = vec![("c", 4.0), ("a", 1.0), ("b", 1.0), ("d", 0.5)];

        assert_eq!(nearest(candidates.clone(), 2), vec!["d", "a"]);
        assert_eq!(nearest(candidates, 10).len(), 4);
    }

    #[test]
    fn similarity_is_one_at_zero_distance() {
        assert_eq!(similarity(squared_distance(&[1.0, 2.0], &[1.0, 2.0])), 1.0);
        assert!(similarity(2.0) < similarity(1.0));
    }
}
