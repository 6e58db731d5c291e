//! Ordered threshold tables.
//!
//! A `ThresholdTable` maps strictly increasing keys to values and answers
//! "which band does this value fall into". Mob states use the floor lookup
//! (largest key at or below the value); need and temperature bands use the
//! ceiling lookup (smallest key at or above the value). Lookups always walk
//! the sorted sequence, never a hash map's enumeration order.

use std::cmp::Ordering;

/// Ordered mapping from threshold key to value
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable<K, V> {
    entries: Vec<(K, V)>,
}

impl<K, V> ThresholdTable<K, V>
where
    K: PartialOrd + Copy + std::fmt::Debug,
{
    /// Build a table from entries given in ascending key order.
    ///
    /// Rejects empty tables, keys that do not compare (NaN), and keys
    /// that are not strictly increasing.
    pub fn new(entries: Vec<(K, V)>) -> Result<Self, String> {
        if entries.is_empty() {
            return Err("threshold table is empty".into());
        }

        for (i, (key, _)) in entries.iter().enumerate() {
            if key.partial_cmp(key) != Some(Ordering::Equal) {
                return Err(format!("threshold key {:?} is not comparable", key));
            }
            if i > 0 {
                let prev = entries[i - 1].0;
                if prev.partial_cmp(key) != Some(Ordering::Less) {
                    return Err(format!(
                        "threshold keys must be strictly increasing ({:?} is followed by {:?})",
                        prev, key
                    ));
                }
            }
        }

        Ok(Self { entries })
    }

    /// Entry with the largest key that is `<= value`
    pub fn floor(&self, value: K) -> Option<(K, &V)> {
        let mut result = None;
        for (key, v) in &self.entries {
            if *key <= value {
                result = Some((*key, v));
            } else {
                break;
            }
        }
        result
    }

    /// Entry with the smallest key that is `>= value`
    pub fn ceiling(&self, value: K) -> Option<(K, &V)> {
        self.entries
            .iter()
            .find(|(key, _)| *key >= value)
            .map(|(key, v)| (*key, v))
    }

    /// Smallest key strictly greater than `value`
    pub fn next_key_above(&self, value: K) -> Option<K> {
        self.entries.iter().map(|(k, _)| *k).find(|k| *k > value)
    }

    /// Key of the first entry whose value matches
    pub fn key_of(&self, predicate: impl Fn(&V) -> bool) -> Option<K> {
        self.entries.iter().find(|(_, v)| predicate(v)).map(|(k, _)| *k)
    }

    pub fn first(&self) -> (K, &V) {
        let (k, v) = &self.entries[0];
        (*k, v)
    }

    pub fn last(&self) -> (K, &V) {
        let (k, v) = &self.entries[self.entries.len() - 1];
        (*k, v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
