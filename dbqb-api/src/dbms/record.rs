use serde::ser::SerializeMap as _;
use serde::{Serialize, Serializer};

use crate::dbms::value::Value;

/// A value held by a [`Record`] entry: either a scalar or a nested record produced by a join.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    Value(Value),
    Nested(Record),
}

impl RecordValue {
    /// Returns the scalar value, if this entry is not nested.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            RecordValue::Value(value) => Some(value),
            RecordValue::Nested(_) => None,
        }
    }

    /// Returns the nested record, if any.
    pub fn as_nested(&self) -> Option<&Record> {
        match self {
            RecordValue::Nested(record) => Some(record),
            RecordValue::Value(_) => None,
        }
    }
}

impl From<Value> for RecordValue {
    fn from(value: Value) -> Self {
        RecordValue::Value(value)
    }
}

impl From<Record> for RecordValue {
    fn from(record: Record) -> Self {
        RecordValue::Nested(record)
    }
}

impl Serialize for RecordValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            RecordValue::Value(value) => value.serialize(serializer),
            RecordValue::Nested(record) => record.serialize(serializer),
        }
    }
}

/// A generic row: an ordered mapping from field name to [`RecordValue`].
///
/// Insertion order is kept, so the serialized object lists keys in projection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, RecordValue)>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, replacing the value of an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RecordValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Returns the entry for `key`.
    pub fn get(&self, key: &str) -> Option<&RecordValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    /// Returns the scalar value for `key`, if present and not nested.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.get(key).and_then(RecordValue::as_value)
    }

    /// Returns the nested record for `key`, if present and nested.
    pub fn nested(&self, key: &str) -> Option<&Record> {
        self.get(key).and_then(RecordValue::as_nested)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates over the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RecordValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_should_keep_insertion_order() {
        let mut record = Record::new();
        record.insert("name", Value::from("Alice"));
        record.insert("id", Value::from(1));
        record.insert("age", Value::Null);

        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["name", "id", "age"]);
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_should_replace_existing_key() {
        let mut record = Record::new();
        record.insert("id", Value::from(1));
        record.insert("name", Value::from("Alice"));
        record.insert("id", Value::from(2));

        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(record.value("id"), Some(&Value::from(2)));
    }

    #[test]
    fn test_should_serialize_nested_record() {
        let mut customer = Record::new();
        customer.insert("id", Value::from(7));
        customer.insert("name", Value::from("Bob"));

        let mut order = Record::new();
        order.insert("id", Value::from(1));
        order.insert("customer", customer);

        let json = serde_json::to_string(&order).expect("failed to serialize");
        assert_eq!(json, r#"{"id":1,"customer":{"id":7,"name":"Bob"}}"#);
        assert_eq!(
            order.nested("customer").and_then(|c| c.value("name")),
            Some(&Value::from("Bob"))
        );
        assert!(order.value("customer").is_none());
    }
}
