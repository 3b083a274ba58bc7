//! The attribute bag carried by every resource
//!
//! [`Attributes`] is a string-keyed map of JSON values. All accessors are
//! total: asking for a missing key, or for a key holding a value of another
//! kind, returns `None` instead of failing. Mutations through
//! [`Attributes::safe_set`] and [`Attributes::safe_delete`] never fail either;
//! they report or ignore paths they cannot reach.
//!
//! Cloning an `Attributes` produces a fully independent bag, which is what
//! fan-out stages rely on when branching one resource into several variants.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, map};

use crate::path::{self, PathSegment};

/// String-keyed bag of heterogeneous attribute values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(Map<String, Value>);

impl Attributes {
    /// Create an empty bag
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Number of top-level keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the bag has no keys
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether a top-level key is present, even if it holds `null`
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Raw value under a top-level key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Raw value under a dotted path such as `route[0].cidr_block`
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        path::lookup_in(&self.0, &path::parse_path(path))
    }

    /// String value, `None` when absent or not a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// String value that is present and non-empty
    pub fn get_non_empty_str(&self, key: &str) -> Option<&str> {
        self.get_str(key).filter(|s| !s.is_empty())
    }

    /// Boolean value, `None` when absent or not a boolean
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// Numeric value as a float
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    /// Numeric value as an integer, truncating fractional parts toward zero
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        let value = self.0.get(key)?;
        value.as_i64().or_else(|| value.as_f64().map(|f| f.trunc() as i64))
    }

    /// List value, `None` when absent or not a list
    pub fn get_slice(&self, key: &str) -> Option<&Vec<Value>> {
        self.0.get(key).and_then(Value::as_array)
    }

    /// String members of a list value; empty when absent
    pub fn get_strings(&self, key: &str) -> Vec<String> {
        self.get_slice(key)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Map value, `None` when absent or not a map
    pub fn get_map(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }

    /// Set a top-level key, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Remove a top-level key, returning its value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Set a value along `path`, creating missing intermediate maps.
    ///
    /// Returns `false` and leaves the bag untouched when the path crosses a
    /// scalar or an out-of-range list index.
    pub fn safe_set<S: AsRef<str>>(&mut self, path: &[S], value: impl Into<Value>) -> bool {
        let segments: Vec<PathSegment> = path.iter().map(|s| s.as_ref().into()).collect();
        path::assign(&mut self.0, &segments, value.into())
    }

    /// Delete the value along `path`; absent paths are ignored.
    pub fn safe_delete<S: AsRef<str>>(&mut self, path: &[S]) {
        let segments: Vec<PathSegment> = path.iter().map(|s| s.as_ref().into()).collect();
        let _ = path::detach(&mut self.0, &segments);
    }

    /// Delete `key` when it holds the zero value of its kind.
    ///
    /// Zero values are `null`, `""`, `false`, `0`, `[]` and `{}`.
    pub fn delete_if_default(&mut self, key: &str) {
        if self.0.get(key).is_some_and(is_zero_value) {
            self.0.remove(key);
        }
    }

    /// Recursively drop `null` entries and empty lists or maps held in maps.
    ///
    /// List elements are sanitized but never removed, so positions stay
    /// stable. Scalars, including `""`, `false` and `0`, are kept.
    pub fn sanitize_defaults(&mut self) {
        sanitize_map(&mut self.0);
    }

    /// Iterate over top-level entries in key order
    pub fn iter(&self) -> map::Iter<'_> {
        self.0.iter()
    }

    /// Top-level keys in order
    pub fn keys(&self) -> map::Keys<'_> {
        self.0.keys()
    }

    /// Borrow the underlying map
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume the bag into a JSON object value
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

fn is_zero_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn sanitize_map(map: &mut Map<String, Value>) {
    map.retain(|_, value| {
        sanitize_value(value);
        match value {
            Value::Null => false,
            Value::Array(items) => !items.is_empty(),
            Value::Object(inner) => !inner.is_empty(),
            _ => true,
        }
    });
}

fn sanitize_value(value: &mut Value) {
    match value {
        Value::Object(map) => sanitize_map(map),
        Value::Array(items) => items.iter_mut().for_each(sanitize_value),
        _ => {}
    }
}

impl From<Map<String, Value>> for Attributes {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Non-object values convert to an empty bag.
impl From<Value> for Attributes {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::new(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a Value);
    type IntoIter = map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
