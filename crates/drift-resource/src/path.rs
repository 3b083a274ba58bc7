//! Attribute path parsing and traversal
//!
//! Attribute bags are nested JSON values. Paths address them with
//! dot-separated keys and bracketed list indices:
//!
//! - `tags.Name`
//! - `route[0].cidr_block`
//! - `x-amazon-apigateway-integration.responses`
//!
//! Every traversal is total: a missing key, an out-of-range index or a
//! scalar in the middle of a path yields `None` / `false`, never a panic.
//!
//! ```
//! use drift_resource::path::{parse_path, lookup, PathSegment};
//! use serde_json::json;
//!
//! let path = parse_path("route[0].cidr_block");
//! assert_eq!(path[1], PathSegment::Index(0));
//!
//! let value = json!({"route": [{"cidr_block": "10.0.0.0/16"}]});
//! assert_eq!(lookup(&value, &path), Some(&json!("10.0.0.0/16")));
//! ```

use serde_json::{Map, Value};

/// One step of an attribute path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A key in a map
    Key(String),
    /// A position in a list
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

/// Split `path` into segments.
///
/// Each dot-separated part is a key followed by any number of `[n]`
/// suffixes, so `matrix[1][0]` yields a key and two indices. Empty parts
/// and non-numeric indices are skipped. Text trailing a `]` that does not
/// open another index is ignored.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();

    for part in path.split('.') {
        let (key, mut suffix) = part.split_at(part.find('[').unwrap_or(part.len()));
        if !key.is_empty() {
            segments.push(PathSegment::from(key));
        }

        while let Some(rest) = suffix.strip_prefix('[') {
            let (index, tail) = rest.split_once(']').unwrap_or((rest, ""));
            if let Ok(index) = index.parse() {
                segments.push(PathSegment::Index(index));
            }
            suffix = tail;
        }
    }

    segments
}

/// Borrow the value at `segments`, or `None` when any step is missing.
pub fn lookup<'a>(value: &'a Value, segments: &[PathSegment]) -> Option<&'a Value> {
    let Some((first, rest)) = segments.split_first() else {
        return Some(value);
    };

    let next = match first {
        PathSegment::Key(key) => value.get(key)?,
        PathSegment::Index(idx) => value.get(*idx)?,
    };

    lookup(next, rest)
}

/// Borrow the value at `segments` starting from a map root.
pub fn lookup_in<'a>(root: &'a Map<String, Value>, segments: &[PathSegment]) -> Option<&'a Value> {
    let (first, rest) = segments.split_first()?;
    match first {
        PathSegment::Key(key) => lookup(root.get(key)?, rest),
        PathSegment::Index(_) => None,
    }
}

/// Assign `new_value` at `segments` starting from a map root.
///
/// Missing intermediate keys are created as empty maps. Returns `false`
/// without touching anything when an intermediate step is a scalar, a list
/// index is out of range, or the path is empty.
pub fn assign(root: &mut Map<String, Value>, segments: &[PathSegment], new_value: Value) -> bool {
    let Some((PathSegment::Key(key), rest)) = segments.split_first() else {
        return false;
    };

    if rest.is_empty() {
        root.insert(key.clone(), new_value);
        return true;
    }

    if !root.contains_key(key) {
        if !can_create(rest) {
            return false;
        }
        root.insert(key.clone(), Value::Object(Map::new()));
    }

    match root.get_mut(key) {
        Some(next) => assign_value(next, rest, new_value),
        None => false,
    }
}

fn assign_value(value: &mut Value, segments: &[PathSegment], new_value: Value) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        *value = new_value;
        return true;
    };

    match (first, value) {
        (PathSegment::Key(_), Value::Object(map)) => assign(map, segments, new_value),
        (PathSegment::Index(idx), Value::Array(items)) => match items.get_mut(*idx) {
            Some(item) => assign_value(item, rest, new_value),
            None => false,
        },
        _ => false,
    }
}

// Intermediate maps can only be synthesized along key steps.
fn can_create(segments: &[PathSegment]) -> bool {
    segments.iter().all(|s| matches!(s, PathSegment::Key(_)))
}

/// Remove and return the value at `segments` starting from a map root.
pub fn detach(root: &mut Map<String, Value>, segments: &[PathSegment]) -> Option<Value> {
    let Some((PathSegment::Key(key), rest)) = segments.split_first() else {
        return None;
    };

    if rest.is_empty() {
        return root.remove(key);
    }

    detach_value(root.get_mut(key)?, rest)
}

fn detach_value(value: &mut Value, segments: &[PathSegment]) -> Option<Value> {
    let (first, rest) = segments.split_first()?;

    match (first, value) {
        (PathSegment::Key(_), Value::Object(map)) => detach(map, segments),
        (PathSegment::Index(idx), Value::Array(items)) => {
            if rest.is_empty() {
                (*idx < items.len()).then(|| items.remove(*idx))
            } else {
                detach_value(items.get_mut(*idx)?, rest)
            }
        }
        _ => None,
    }
}
