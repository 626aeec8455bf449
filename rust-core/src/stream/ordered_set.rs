use serde::{Serialize, Serializer};
use std::collections::HashSet;

/// Insertion-ordered set of strings with constant-time membership checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedSet {
    items: Vec<String>,
    index: HashSet<String>,
}

impl OrderedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `item` unless already present. Returns whether it was added.
    pub fn insert(&mut self, item: &str) -> bool {
        if self.index.contains(item) {
            return false;
        }
        self.index.insert(item.to_string());
        self.items.push(item.to_string());
        true
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Serialize for OrderedSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_order_and_dedup() {
        let mut set = OrderedSet::new();
        assert!(set.insert("b"));
        assert!(set.insert("a"));
        assert!(!set.insert("b"));
        assert!(set.insert("c"));

        assert_eq!(set.as_slice(), ["b", "a", "c"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_serializes_as_list() {
        let mut set = OrderedSet::new();
        set.insert("s3://x/1");
        set.insert("s3://x/2");
        assert_eq!(
            serde_json::to_string(&set).unwrap(),
            r#"["s3://x/1","s3://x/2"]"#
        );
    }
}
