//! Checkpoint state

use crate::adapters::ResultMapping;
use crate::domain::{CodeId, Item};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cleaned text accumulated so far, keyed by identifier
///
/// Serialises as a flat JSON object. Entries are only ever added or
/// overwritten during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checkpoint {
    entries: BTreeMap<CodeId, String>,
}

impl Checkpoint {
    /// Create an empty checkpoint
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a result mapping, overwriting by identifier
    ///
    /// Returns the number of identifiers that were not present before.
    pub fn merge(&mut self, mapping: ResultMapping) -> usize {
        let mut added = 0;
        for (id, text) in mapping {
            if self.entries.insert(id, text).is_none() {
                added += 1;
            }
        }
        added
    }

    pub fn contains(&self, id: &CodeId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &CodeId) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Items not yet covered by the checkpoint, in their original order
    pub fn remaining(&self, items: &[Item]) -> Vec<Item> {
        items
            .iter()
            .filter(|item| !self.contains(&item.id))
            .cloned()
            .collect()
    }

    /// Number of `items` already covered by the checkpoint
    pub fn covered(&self, items: &[Item]) -> usize {
        items.iter().filter(|item| self.contains(&item.id)).count()
    }
}

impl FromIterator<(CodeId, String)> for Checkpoint {
    fn from_iter<T: IntoIterator<Item = (CodeId, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> CodeId {
        CodeId::new(s).unwrap()
    }

    #[test]
    fn test_merge_counts_new_entries_and_overwrites() {
        let mut checkpoint = Checkpoint::new();
        let first: ResultMapping = [(id("A0428"), "Ambulance".to_string())].into_iter().collect();
        assert_eq!(checkpoint.merge(first), 1);

        let second: ResultMapping = [
            (id("A0428"), "Ambulance service".to_string()),
            (id("J3490"), "Unclassified drugs".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(checkpoint.merge(second), 1);

        assert_eq!(checkpoint.len(), 2);
        assert_eq!(checkpoint.get(&id("A0428")), Some("Ambulance service"));
    }

    #[test]
    fn test_remaining_preserves_order() {
        let items: Vec<Item> = ["A0428", "G0008", "J3490"]
            .iter()
            .map(|s| Item::new(id(s), "x"))
            .collect();
        let checkpoint: Checkpoint = [(id("G0008"), "Flu shot".to_string())].into_iter().collect();

        let remaining: Vec<String> = checkpoint
            .remaining(&items)
            .into_iter()
            .map(|i| i.id.into_inner())
            .collect();
        assert_eq!(remaining, vec!["A0428", "J3490"]);
        assert_eq!(checkpoint.covered(&items), 1);
    }

    #[test]
    fn test_serialises_as_flat_object() {
        let checkpoint: Checkpoint = [(id("J3490"), "Drugs".to_string()), (id("A0428"), "Ambulance".to_string())]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&checkpoint).unwrap();
        assert_eq!(json, r#"{"A0428":"Ambulance","J3490":"Drugs"}"#);

        let back: Checkpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, checkpoint);
    }
}
