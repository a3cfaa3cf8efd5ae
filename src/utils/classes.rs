use std::{collections::HashSet, hash::Hash};

/// Invert a map by swapping keys and values
pub fn invert_map<K, V, MK, MV>(original: MK) -> MV
where
    K: Ord + Hash + Eq,
    V: Ord + Hash + Eq + Clone,
    MK: IntoIterator<Item = (K, V)>,
    MV: FromIterator<(V, K)>,
{
    original
        .into_iter()
        .map(|(key, value)| (value, key))
        .collect()
}

/// Drop repeated class codes, keeping the first occurrence of each
pub fn dedup_ordered<'a, I>(codes: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut seen = HashSet::new();

    codes
        .into_iter()
        .filter(|code| seen.insert(code.as_str()))
        .cloned()
        .collect()
}
