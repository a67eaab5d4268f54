// ── Order-independent comparison helpers ──

use std::collections::BTreeSet;

/// `true` when both slices hold the same elements, ignoring order and
/// duplicates.
pub fn same_set<T: Ord>(a: &[T], b: &[T]) -> bool {
    a.iter().collect::<BTreeSet<_>>() == b.iter().collect::<BTreeSet<_>>()
}

/// Sorted, de-duplicated copy of `items`.
pub fn sorted_unique<T: Ord + Clone>(items: &[T]) -> Vec<T> {
    items
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
