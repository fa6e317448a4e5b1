//! Values flowing through templates: literals in block headers and the
//! caller-supplied render context.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A dynamically typed template value.
///
/// Deserializes from any self-describing format: `null`, booleans, numbers,
/// strings, arrays and string-keyed objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// An empty string, the value of every unresolvable name.
    pub fn empty() -> Self {
        Value::Str(String::new())
    }

    /// An empty mapping.
    pub fn empty_map() -> Self {
        Value::Map(BTreeMap::new())
    }

    /// Human-readable type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Truthiness: empty containers, zero, `false` and `None` are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
        }
    }

    /// Look up a key in a mapping. `None` for absent keys and non-maps.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Look up a path segment: a key for maps, an index for lists.
    pub fn segment(&self, segment: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(segment),
            Value::List(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// The sequence a loop walks over, or `None` when the value is a scalar.
    ///
    /// Lists yield their elements, maps their keys and strings their characters.
    pub fn iterate(&self) -> Option<Vec<Value>> {
        match self {
            Value::None => Some(Vec::new()),
            Value::List(items) => Some(items.clone()),
            Value::Map(map) => Some(map.keys().cloned().map(Value::Str).collect()),
            Value::Str(s) => Some(s.chars().map(|c| Value::Str(c.to_string())).collect()),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) => None,
        }
    }

    /// Natural ordering between two values.
    ///
    /// `None` for pairs that have no natural order (e.g. string vs int, maps).
    pub fn ordering(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b) {
                    match x.ordering(y)? {
                        Ordering::Equal => continue,
                        ord => return Some(ord),
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            (a, b) => a.as_number()?.partial_cmp(&b.as_number()?),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Debug-ish form used inside lists and maps: strings are quoted.
    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s:?}"),
            Value::None => f.write_str("null"),
            other => write!(f, "{other}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{n:.1}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt_nested(f)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: ")?;
                    value.fmt_nested(f)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (a, b) => match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // =========================================================================
    // Display
    // =========================================================================

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::None.to_string(), "");
        assert_eq!(Value::from("hi").to_string(), "hi");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::from(3.0).to_string(), "3.0");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
    }

    #[test]
    fn test_display_containers() {
        let list = Value::from(vec![Value::from("a"), Value::from(1), Value::None]);
        assert_eq!(list.to_string(), "[\"a\", 1, null]");

        let map: Value = [("k", "v")].into_iter().collect();
        assert_eq!(map.to_string(), "{\"k\": \"v\"}");
    }

    // =========================================================================
    // Truthiness
    // =========================================================================

    #[test]
    fn test_truthiness() {
        assert!(!Value::None.is_truthy());
        assert!(!Value::empty().is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from(0.0).is_truthy());
        assert!(!Value::from(Vec::<Value>::new()).is_truthy());
        assert!(!Value::empty_map().is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(Value::from(-1).is_truthy());
        assert!(Value::from(vec![0]).is_truthy());
    }

    // =========================================================================
    // Equality and ordering
    // =========================================================================

    #[test]
    fn test_numeric_equality_across_types() {
        assert_eq!(Value::from(1), Value::from(1.0));
        assert_ne!(Value::from(1), Value::from("1"));
        assert_ne!(Value::None, Value::empty());
    }

    fn ord(a: impl Into<Value>, b: impl Into<Value>) -> Option<Ordering> {
        a.into().ordering(&b.into())
    }

    #[test]
    fn test_ordering() {
        assert_eq!(ord(10, 5), Some(Ordering::Greater));
        assert_eq!(ord(2.5, 3), Some(Ordering::Less));
        assert_eq!(ord(4, 4.0), Some(Ordering::Equal));
        assert_eq!(ord("abc", "abd"), Some(Ordering::Less));
        assert_eq!(ord(vec![1, 2], vec![1, 3]), Some(Ordering::Less));
        assert_eq!(ord(vec![1], vec![1, 0]), Some(Ordering::Less));
        assert_eq!(ord(false, true), Some(Ordering::Less));
    }

    #[test]
    fn test_unordered_pairs() {
        assert_eq!(ord("a", 1), None);
        assert_eq!(ord(Value::empty_map(), Value::empty_map()), None);
        assert_eq!(ord(Value::None, Value::None), None);
        assert_eq!(ord(vec![Value::from("a")], vec![Value::from(1)]), None);
    }

    // =========================================================================
    // Lookup and iteration
    // =========================================================================

    #[test]
    fn test_segment_lookup() {
        let list = Value::from(vec!["a", "b"]);
        assert_eq!(list.segment("1"), Some(&Value::from("b")));
        assert_eq!(list.segment("7"), None);
        assert_eq!(list.segment("x"), None);
        assert_eq!(Value::from(3).segment("x"), None);
    }

    #[test]
    fn test_iterate() {
        assert_eq!(
            Value::from("ab").iterate(),
            Some(vec![Value::from("a"), Value::from("b")])
        );
        let map: Value = [("b", 1), ("a", 2)].into_iter().collect();
        assert_eq!(
            map.iterate(),
            Some(vec![Value::from("a"), Value::from("b")])
        );
        assert_eq!(Value::None.iterate(), Some(Vec::new()));
        assert_eq!(Value::from(5).iterate(), None);
    }

    // =========================================================================
    // Serde
    // =========================================================================

    #[test]
    fn test_deserialize_json() {
        let value: Value =
            serde_json::from_str(r#"{"n": 1, "f": 1.5, "s": "x", "l": [true, null]}"#).unwrap();
        let expected: Value = [
            ("n", Value::Int(1)),
            ("f", Value::Float(1.5)),
            ("s", Value::from("x")),
            ("l", Value::List(vec![Value::Bool(true), Value::None])),
        ]
        .into_iter()
        .collect();
        assert_eq!(value, expected);
    }
}
