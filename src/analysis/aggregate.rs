//! Aggregation helpers for analysis scripts
//!
//! All helpers ignore absent entries (`None`) rather than failing on
//! them, and degrade to empty/zero/`None` results on empty input - they
//! never raise.

use std::hash::Hash;

use indexmap::IndexMap;

/// Numeric sum of the present entries; `0` for an empty sequence.
pub fn sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().sum()
}

/// Number of present entries.
pub fn count<T, I>(values: I) -> usize
where
    I: IntoIterator<Item = Option<T>>,
{
    values.into_iter().flatten().count()
}

/// Arithmetic mean of the present entries; `None` when none are present.
pub fn avg<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut total = 0.0;
    let mut present = 0usize;
    for value in values.into_iter().flatten() {
        total += value;
        present += 1;
    }
    (present > 0).then(|| total / present as f64)
}

/// Smallest present entry; `None` when none are present.
pub fn min<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().reduce(f64::min)
}

/// Largest present entry; `None` when none are present.
pub fn max<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().reduce(f64::max)
}

/// Present entries in order, absent ones dropped.
pub fn collect<T, I>(values: I) -> Vec<T>
where
    I: IntoIterator<Item = Option<T>>,
{
    values.into_iter().flatten().collect()
}

/// Present entries transformed in order, absent ones dropped.
pub fn collect_with<T, U, I, F>(values: I, transform: F) -> Vec<U>
where
    I: IntoIterator<Item = Option<T>>,
    F: FnMut(T) -> U,
{
    values.into_iter().flatten().map(transform).collect()
}

/// Group elements by a derived key.
///
/// Keys appear in first-occurrence order; each group keeps the input
/// order of its elements.
pub fn group_by<T, K, I, F>(items: I, mut key: F) -> IndexMap<K, Vec<T>>
where
    K: Hash + Eq,
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> K,
{
    let mut groups: IndexMap<K, Vec<T>> = IndexMap::new();
    for item in items {
        groups.entry(key(&item)).or_default().push(item);
    }
    groups
}
