//! Per-key press counts.

use crate::collector::types::KeyId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Press count per key.
///
/// Keys are only inserted when first pressed, so every stored count is at
/// least one. Ordering by key keeps iteration and serialization stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<KeyId, u64>", into = "BTreeMap<KeyId, u64>")]
pub struct Histogram(BTreeMap<KeyId, u64>);

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one press of `key`.
    pub fn record(&mut self, key: KeyId) {
        *self.0.entry(key).or_insert(0) += 1;
    }

    pub fn get(&self, key: &KeyId) -> Option<u64> {
        self.0.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&KeyId, u64)> {
        self.0.iter().map(|(key, count)| (key, *count))
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Lowest and highest count, or `None` when empty.
    pub fn extent(&self) -> Option<(u64, u64)> {
        let lowest = self.0.values().min()?;
        let highest = self.0.values().max()?;
        Some((*lowest, *highest))
    }

    /// Keys ordered by descending count, ties broken by key.
    pub fn ranked(&self) -> Vec<(KeyId, u64)> {
        let mut ranked: Vec<(KeyId, u64)> =
            self.0.iter().map(|(key, count)| (key.clone(), *count)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }
}

impl FromIterator<(KeyId, u64)> for Histogram {
    /// Build from explicit counts. Zero counts are dropped and repeated keys
    /// are summed.
    fn from_iter<I: IntoIterator<Item = (KeyId, u64)>>(iter: I) -> Self {
        let mut map = BTreeMap::new();
        for (key, count) in iter.into_iter().filter(|(_, count)| *count > 0) {
            *map.entry(key).or_insert(0) += count;
        }
        Self(map)
    }
}

/// Decoded logs go through the same zero-dropping path as `collect`.
impl From<BTreeMap<KeyId, u64>> for Histogram {
    fn from(counts: BTreeMap<KeyId, u64>) -> Self {
        counts.into_iter().collect()
    }
}

impl From<Histogram> for BTreeMap<KeyId, u64> {
    fn from(histogram: Histogram) -> Self {
        histogram.0
    }
}

impl<'a> FromIterator<(&'a str, u64)> for Histogram {
    fn from_iter<I: IntoIterator<Item = (&'a str, u64)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(key, count)| (KeyId::from(key), count))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_inserts_on_first_use() {
        let mut histogram = Histogram::new();
        assert!(histogram.is_empty());

        histogram.record(KeyId::from("a"));
        histogram.record(KeyId::from("a"));
        histogram.record(KeyId::from("b"));

        assert_eq!(histogram.get(&KeyId::from("a")), Some(2));
        assert_eq!(histogram.get(&KeyId::from("b")), Some(1));
        assert_eq!(histogram.get(&KeyId::from("c")), None);
        assert_eq!(histogram.total(), 3);
    }

    #[test]
    fn test_extent() {
        let histogram: Histogram = [("a", 3), ("b", 7), ("c", 5)].into_iter().collect();
        assert_eq!(histogram.extent(), Some((3, 7)));
        assert_eq!(Histogram::new().extent(), None);
    }

    #[test]
    fn test_ranked_breaks_ties_by_key() {
        let histogram: Histogram = [("b", 2), ("a", 2), ("esc", 5), ("z", 1)]
            .into_iter()
            .collect();
        let keys: Vec<String> = histogram
            .ranked()
            .into_iter()
            .map(|(key, _)| key.to_string())
            .collect();
        assert_eq!(keys, vec!["esc", "a", "b", "z"]);
    }

    #[test]
    fn test_zero_counts_dropped() {
        let histogram: Histogram = [("a", 0), ("b", 1)].into_iter().collect();
        assert_eq!(histogram.len(), 1);
    }

    #[test]
    fn test_decoded_zero_counts_dropped() {
        let histogram: Histogram = serde_json::from_str(r#"{"a": 0, "b": 2}"#).unwrap();
        assert_eq!(histogram.len(), 1);
        assert_eq!(histogram.get(&KeyId::from("a")), None);
        assert_eq!(serde_json::to_string(&histogram).unwrap(), r#"{"b":2}"#);
    }
}
