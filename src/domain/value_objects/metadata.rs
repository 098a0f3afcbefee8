use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A scalar metadata value. The vector store only accepts strings and
/// integers; anything else is dropped at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Str(String),
    Int(i64),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Str(s) => Some(s),
            MetadataValue::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            MetadataValue::Str(_) => None,
            MetadataValue::Int(n) => Some(*n),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::Str(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::Str(s)
    }
}

impl From<i64> for MetadataValue {
    fn from(n: i64) -> Self {
        MetadataValue::Int(n)
    }
}

impl From<usize> for MetadataValue {
    fn from(n: usize) -> Self {
        MetadataValue::Int(n as i64)
    }
}

/// String/int key-value map attached to documents, chunks, and stored
/// records. Absent values are simply not present: there is no null
/// representation, which is what the storage layer requires. Serializes
/// as the flat map itself, the shape the store expects on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataMap {
    entries: BTreeMap<String, MetadataValue>,
}

impl MetadataMap {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Inserts only when a value is present. Callers with optional fields
    /// route through this so that `None` never reaches the store.
    pub fn insert_opt(&mut self, key: impl Into<String>, value: Option<impl Into<MetadataValue>>) {
        if let Some(v) = value {
            self.entries.insert(key.into(), v.into());
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataValue)> {
        self.entries.iter()
    }

    /// Rebuilds a map from a loosely typed JSON object, keeping only the
    /// scalar string/int values the store round-trips.
    pub fn from_json_object(value: &serde_json::Value) -> Self {
        let mut map = Self::new();
        if let Some(object) = value.as_object() {
            for (key, v) in object {
                if let Some(s) = v.as_str() {
                    map.insert(key.clone(), s);
                } else if let Some(n) = v.as_i64() {
                    map.insert(key.clone(), n);
                }
            }
        }
        map
    }
}

impl FromIterator<(String, MetadataValue)> for MetadataMap {
    fn from_iter<T: IntoIterator<Item = (String, MetadataValue)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_opt_drops_none() {
        let mut metadata = MetadataMap::new();
        metadata.insert_opt("title", Some("A page"));
        metadata.insert_opt("description", None::<String>);

        assert!(metadata.contains_key("title"));
        assert!(!metadata.contains_key("description"));
        assert_eq!(metadata.len(), 1);
    }

    #[test]
    fn test_serializes_as_flat_scalars() {
        let mut metadata = MetadataMap::new();
        metadata.insert("title", "A page");
        metadata.insert("ordinal", 3i64);

        let json = serde_json::to_value(&metadata).unwrap();
        assert!(json.is_object());
        assert_eq!(json.as_object().unwrap().len(), 2);
        assert_eq!(json["title"], "A page");
        assert_eq!(json["ordinal"], 3);
        assert!(!json.to_string().contains("null"));
    }

    #[test]
    fn test_round_trips_through_json_object() {
        let mut metadata = MetadataMap::new();
        metadata.insert("title", "A page");
        metadata.insert("ordinal", 3i64);

        let json = serde_json::to_value(&metadata).unwrap();
        let restored = MetadataMap::from_json_object(&json);
        assert_eq!(restored, metadata);
    }

    #[test]
    fn test_from_json_object_keeps_scalars_only() {
        let value = serde_json::json!({
            "title": "A page",
            "ordinal": 3,
            "nested": {"x": 1},
            "score": 0.5,
        });

        let metadata = MetadataMap::from_json_object(&value);
        assert_eq!(
            metadata.get("title").and_then(|v| v.as_str()),
            Some("A page")
        );
        assert_eq!(metadata.get("ordinal").and_then(|v| v.as_int()), Some(3));
        assert!(!metadata.contains_key("nested"));
        assert!(!metadata.contains_key("score"));
    }

}
