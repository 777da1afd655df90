//! Dynamic configuration value with source location tracking.

use crate::Location;
use indexmap::IndexMap;
use std::fmt;

/// Mapping entries, keyed by string.
///
/// Iteration follows insertion order so output is deterministic, but
/// equality ignores order.
pub type Mapping = IndexMap<String, Value>;

/// A configuration value with source location information.
///
/// The kind is a closed sum type ([`ValueKind`]); consumers match on it
/// exhaustively instead of probing the value at runtime.
///
/// ## Example
///
/// ```rust
/// use bundle_dyn::{Location, Value};
///
/// let name = Value::from("nightly").with_locations(vec![Location::new("bundle.yml", 4, 9)]);
/// assert_eq!(name.as_str(), Some("nightly"));
/// assert_eq!(name.location().map(|l| l.line), Some(4));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Value {
    /// The underlying value
    pub kind: ValueKind,

    /// Every location this value was declared at.
    ///
    /// A value produced by merging several documents keeps the locations
    /// of all contributing declarations, in contribution order.
    pub locations: Vec<Location>,
}

/// The kind of a value together with its payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ValueKind {
    /// Absent value. Distinct from an explicit null.
    #[default]
    Invalid,

    /// Explicit null
    Nil,

    Bool(bool),

    Number(Number),

    String(String),

    /// Ordered list of values
    Sequence(Vec<Value>),

    /// String-keyed values
    Mapping(Mapping),
}

/// Numeric scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

/// Payload-free kind tag, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Invalid,
    Nil,
    Bool,
    Number,
    String,
    Sequence,
    Mapping,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Invalid => "invalid",
            Kind::Nil => "nil",
            Kind::Bool => "bool",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Sequence => "sequence",
            Kind::Mapping => "mapping",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

impl Value {
    /// Create a value of the given kind without locations.
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            locations: Vec::new(),
        }
    }

    /// The absent value.
    pub fn invalid() -> Self {
        Self::new(ValueKind::Invalid)
    }

    /// An explicit null.
    pub fn nil() -> Self {
        Self::new(ValueKind::Nil)
    }

    /// A sequence of values.
    pub fn sequence(items: Vec<Value>) -> Self {
        Self::new(ValueKind::Sequence(items))
    }

    /// A mapping of values.
    pub fn mapping(entries: Mapping) -> Self {
        Self::new(ValueKind::Mapping(entries))
    }

    /// Replace the locations of this value.
    pub fn with_locations(mut self, locations: Vec<Location>) -> Self {
        self.locations = locations;
        self
    }

    /// Append locations, skipping ones this value already carries.
    pub fn add_locations<'a>(mut self, locations: impl IntoIterator<Item = &'a Location>) -> Self {
        for loc in locations {
            if !self.locations.contains(loc) {
                self.locations.push(loc.clone());
            }
        }
        self
    }

    /// The first (primary) location, if any.
    pub fn location(&self) -> Option<&Location> {
        self.locations.first()
    }

    /// The kind tag of this value.
    pub fn kind(&self) -> Kind {
        match &self.kind {
            ValueKind::Invalid => Kind::Invalid,
            ValueKind::Nil => Kind::Nil,
            ValueKind::Bool(_) => Kind::Bool,
            ValueKind::Number(_) => Kind::Number,
            ValueKind::String(_) => Kind::String,
            ValueKind::Sequence(_) => Kind::Sequence,
            ValueKind::Mapping(_) => Kind::Mapping,
        }
    }

    /// Check if this value is present (anything but `Invalid`).
    pub fn is_valid(&self) -> bool {
        !matches!(self.kind, ValueKind::Invalid)
    }

    /// Check if this value is an explicit null.
    pub fn is_nil(&self) -> bool {
        matches!(self.kind, ValueKind::Nil)
    }

    /// Check if this is a scalar (not a sequence or mapping).
    pub fn is_scalar(&self) -> bool {
        !matches!(self.kind, ValueKind::Sequence(_) | ValueKind::Mapping(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            ValueKind::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Get as an integer. Floats are not truncated.
    pub fn as_int(&self) -> Option<i64> {
        match self.kind {
            ValueKind::Number(Number::Int(i)) => Some(i),
            _ => None,
        }
    }

    /// Get as a float. Integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self.kind {
            ValueKind::Number(Number::Float(x)) => Some(x),
            ValueKind::Number(Number::Int(i)) => Some(i as f64),
            _ => None,
        }
    }

    /// Get sequence items if this is a sequence.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match &self.kind {
            ValueKind::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Get mapping entries if this is a mapping.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match &self.kind {
            ValueKind::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Consume self and return the items and locations if this is a sequence.
    pub fn into_sequence(self) -> Option<(Vec<Value>, Vec<Location>)> {
        match self.kind {
            ValueKind::Sequence(items) => Some((items, self.locations)),
            _ => None,
        }
    }

    /// Consume self and return the entries and locations if this is a mapping.
    pub fn into_mapping(self) -> Option<(Mapping, Vec<Location>)> {
        match self.kind {
            ValueKind::Mapping(entries) => Some((entries, self.locations)),
            _ => None,
        }
    }

    /// Get a mapping value by key.
    ///
    /// Returns None if this is not a mapping or the key is absent. A key
    /// holding an explicit null returns `Some` of a nil value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// Get a sequence item by index.
    pub fn index(&self, index: usize) -> Option<&Value> {
        self.as_sequence().and_then(|items| items.get(index))
    }

    /// Number of children (sequence length or mapping entry count).
    pub fn len(&self) -> usize {
        match &self.kind {
            ValueKind::Sequence(items) => items.len(),
            ValueKind::Mapping(entries) => entries.len(),
            _ => 0,
        }
    }

    /// Check if this node has no children.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::new(ValueKind::Bool(b))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::new(ValueKind::Number(Number::Int(i)))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::new(ValueKind::Number(Number::Float(x)))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::new(ValueKind::String(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::new(ValueKind::String(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::sequence(items)
    }
}

impl From<Mapping> for Value {
    fn from(entries: Mapping) -> Self {
        Value::mapping(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_is_distinct_from_nil() {
        assert!(!Value::invalid().is_valid());
        assert!(Value::nil().is_valid());
        assert_ne!(Value::invalid(), Value::nil());
        assert_eq!(Value::default().kind(), Kind::Invalid);
    }

    #[test]
    fn test_kind_checked_accessors() {
        let value = Value::from("test");
        assert_eq!(value.as_str(), Some("test"));
        assert_eq!(value.as_bool(), None);
        assert_eq!(value.as_sequence(), None);
        assert!(value.is_scalar());

        let number = Value::from(3i64);
        assert_eq!(number.as_int(), Some(3));
        assert_eq!(number.as_float(), Some(3.0));
        assert_eq!(Value::from(2.5).as_int(), None);
    }

    #[test]
    fn test_mapping_get_distinguishes_nil() {
        let mut entries = Mapping::new();
        entries.insert("present".to_string(), Value::nil());
        let value = Value::mapping(entries);

        assert!(value.get("present").is_some_and(Value::is_nil));
        assert!(value.get("absent").is_none());
        assert_eq!(value.len(), 1);
    }

    #[test]
    fn test_mapping_equality_ignores_order() {
        let mut a = Mapping::new();
        a.insert("x".to_string(), Value::from(1i64));
        a.insert("y".to_string(), Value::from(2i64));
        let mut b = Mapping::new();
        b.insert("y".to_string(), Value::from(2i64));
        b.insert("x".to_string(), Value::from(1i64));

        assert_eq!(Value::mapping(a), Value::mapping(b));
    }

    #[test]
    fn test_add_locations_deduplicates() {
        let a = Location::new("a.yml", 1, 1);
        let b = Location::new("b.yml", 2, 3);
        let value = Value::from(true)
            .with_locations(vec![a.clone()])
            .add_locations(&[a.clone(), b.clone()]);

        assert_eq!(value.locations, vec![a, b]);
    }
}
