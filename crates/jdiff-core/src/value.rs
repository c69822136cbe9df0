use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

use crate::{path, IngestError, Number};

/// A mapping key.
///
/// JSON documents only produce string keys; YAML documents may carry integer
/// keys, which are kept as such so that mappings keyed by different kinds can
/// be told apart by the diff engine.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// An integer key.
    Int(i64),
    /// A string key.
    Str(String),
}

impl Key {
    /// Returns the semantic type label of the key (`"int"` or `"string"`).
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Str(_) => "string",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// A dynamically-typed tree value, the input domain of the diff engine.
///
/// Composite variants are reference-counted with interior mutability so that
/// values can share subtrees (and even form cycles, which the engine detects
/// rather than following forever). Cloning a `Value` is cheap.
///
/// ```
/// use jdiff_core::Value;
///
/// let v = Value::from_json_str("{\"a\": [1, 2]}")?;
/// assert_eq!(v.type_name(), "map");
/// assert_eq!(v.to_string(), "map[a:[1 2]]");
/// # Ok::<(), jdiff_core::IngestError>(())
/// ```
#[derive(Clone, Debug)]
pub enum Value {
    /// The null value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number, integer or floating point.
    Number(Number),
    /// A string.
    String(String),
    /// An ordered sequence of values.
    Sequence(Rc<RefCell<Vec<Value>>>),
    /// A key-to-value mapping.
    Mapping(Rc<RefCell<BTreeMap<Key, Value>>>),
}

impl Value {
    /// Wraps a vector of values into a sequence.
    #[must_use]
    pub fn sequence(items: Vec<Value>) -> Self {
        Self::Sequence(Rc::new(RefCell::new(items)))
    }

    /// Wraps a map into a mapping value.
    #[must_use]
    pub fn mapping(entries: BTreeMap<Key, Value>) -> Self {
        Self::Mapping(Rc::new(RefCell::new(entries)))
    }

    /// Parses a JSON document.
    ///
    /// ```
    /// # use jdiff_core::Value;
    /// let v = Value::from_json_str("[1, 2.5, null]")?;
    /// assert_eq!(v.type_name(), "list");
    /// # Ok::<(), jdiff_core::IngestError>(())
    /// ```
    pub fn from_json_str(input: &str) -> Result<Self, IngestError> {
        let value: JsonValue = serde_json::from_str(input)?;
        Ok(Self::from_json_value(value))
    }

    /// Converts a parsed serde value.
    #[must_use]
    pub fn from_json_value(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(v) => Self::Bool(v),
            JsonValue::Number(num) => Self::Number(convert_json_number(&num)),
            JsonValue::String(s) => Self::String(s),
            JsonValue::Array(values) => {
                Self::sequence(values.into_iter().map(Self::from_json_value).collect())
            }
            JsonValue::Object(map) => {
                let entries = map
                    .into_iter()
                    .map(|(k, v)| (Key::Str(k), Self::from_json_value(v)))
                    .collect();
                Self::mapping(entries)
            }
        }
    }

    /// Parses a YAML document.
    ///
    /// YAML mappings may be keyed by integers; other key types are rejected.
    pub fn from_yaml_str(input: &str) -> Result<Self, IngestError> {
        let value: YamlValue = serde_yaml::from_str(input)?;
        Self::from_yaml_value(value)
    }

    fn from_yaml_value(value: YamlValue) -> Result<Self, IngestError> {
        match value {
            YamlValue::Null => Ok(Self::Null),
            YamlValue::Bool(v) => Ok(Self::Bool(v)),
            YamlValue::Number(num) => {
                if let Some(i) = num.as_i64() {
                    Ok(Self::Number(Number::Int(i)))
                } else {
                    Ok(Self::Number(Number::Float(num.as_f64().unwrap_or_default())))
                }
            }
            YamlValue::String(s) => Ok(Self::String(s)),
            YamlValue::Sequence(seq) => {
                let mut items = Vec::with_capacity(seq.len());
                for value in seq {
                    items.push(Self::from_yaml_value(value)?);
                }
                Ok(Self::sequence(items))
            }
            YamlValue::Mapping(map) => {
                let mut entries = BTreeMap::new();
                for (key, value) in map {
                    let key = match key {
                        YamlValue::String(s) => Key::Str(s),
                        YamlValue::Number(n) => match n.as_i64() {
                            Some(i) => Key::Int(i),
                            None => {
                                return Err(IngestError::YamlKey { found: n.to_string() });
                            }
                        },
                        other => {
                            return Err(IngestError::YamlKey { found: format!("{other:?}") });
                        }
                    };
                    entries.insert(key, Self::from_yaml_value(value)?);
                }
                Ok(Self::mapping(entries))
            }
            YamlValue::Tagged(tagged) => {
                Err(IngestError::YamlTag { tag: tagged.tag.to_string() })
            }
        }
    }

    /// Projects the value back into a serde JSON value.
    ///
    /// Integer mapping keys become their decimal string renderings; a
    /// non-finite float (not constructible from a document) becomes `null`.
    /// The value must not be cyclic.
    #[must_use]
    pub fn to_json_value(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(v) => JsonValue::Bool(*v),
            Self::Number(Number::Int(v)) => JsonValue::Number((*v).into()),
            Self::Number(Number::Float(v)) => {
                serde_json::Number::from_f64(*v).map_or(JsonValue::Null, JsonValue::Number)
            }
            Self::String(s) => JsonValue::String(s.clone()),
            Self::Sequence(items) => {
                JsonValue::Array(items.borrow().iter().map(Self::to_json_value).collect())
            }
            Self::Mapping(entries) => {
                let mut object = serde_json::Map::new();
                for (key, value) in entries.borrow().iter() {
                    object.insert(key.to_string(), value.to_json_value());
                }
                JsonValue::Object(object)
            }
        }
    }

    /// Renders the value as compact JSON.
    #[must_use]
    pub fn json_string(&self) -> String {
        self.to_json_value().to_string()
    }

    /// Returns the semantic type label of the value.
    ///
    /// One of `"nil"`, `"bool"`, `"int"`, `"float"`, `"string"`, `"list"`,
    /// `"map"`.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "nil",
            Self::Bool(_) => "bool",
            Self::Number(n) => n.type_name(),
            Self::String(_) => "string",
            Self::Sequence(_) => "list",
            Self::Mapping(_) => "map",
        }
    }

    /// Whether the value is a sequence or mapping.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Sequence(_) | Self::Mapping(_))
    }

    /// Whether the value is a directly comparable leaf.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        !self.is_composite()
    }

    /// Stable identity of a non-empty composite, used for cycle detection.
    ///
    /// Empty composites are excluded: shared empty singletons cannot form a
    /// problematic cycle.
    pub(crate) fn composite_id(&self) -> Option<usize> {
        match self {
            Self::Sequence(items) if !items.borrow().is_empty() => {
                Some(Rc::as_ptr(items) as usize)
            }
            Self::Mapping(entries) if !entries.borrow().is_empty() => {
                Some(Rc::as_ptr(entries) as usize)
            }
            _ => None,
        }
    }
}

fn convert_json_number(num: &serde_json::Number) -> Number {
    if let Some(i) = num.as_i64() {
        Number::Int(i)
    } else {
        // u64 beyond i64::MAX, or a float; both are representable as f64.
        Number::Float(num.as_f64().unwrap_or(0.0))
    }
}

impl PartialEq for Value {
    /// Structural equality. Integer and float numbers never compare equal.
    /// Both operands must be acyclic.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Sequence(a), Self::Sequence(b)) => *a.borrow() == *b.borrow(),
            (Self::Mapping(a), Self::Mapping(b)) => *a.borrow() == *b.borrow(),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// The native echo form: scalars bare, sequences as `[1 2 3]`, mappings
    /// as `map[key:value …]` with entries ordered by their rendered key.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::Sequence(items) => {
                f.write_str("[")?;
                for (idx, item) in items.borrow().iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Mapping(entries) => {
                let entries = entries.borrow();
                let mut keys: Vec<&Key> = entries.keys().collect();
                keys.sort_by_key(|k| path::escape_key(k));
                f.write_str("map[")?;
                for (idx, key) in keys.into_iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{key}:{}", entries[key])?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        Self::from_json_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_numbers_keep_their_kind() {
        let v = Value::from_json_str("[8, 9.0]").unwrap();
        let Value::Sequence(items) = &v else { panic!("expected sequence") };
        let items = items.borrow();
        assert_eq!(items[0].type_name(), "int");
        assert_eq!(items[1].type_name(), "float");
        assert_ne!(items[0], items[1]);
    }

    #[test]
    fn yaml_integer_keys_are_kept() {
        let v = Value::from_yaml_str("23: ha\n44: bar\n").unwrap();
        let Value::Mapping(entries) = &v else { panic!("expected mapping") };
        let entries = entries.borrow();
        assert_eq!(entries[&Key::Int(23)], Value::String("ha".to_owned()));
    }

    #[test]
    fn yaml_composite_keys_are_rejected() {
        let err = Value::from_yaml_str("? [1, 2]\n: 3\n").unwrap_err();
        assert!(matches!(err, IngestError::YamlKey { .. }));
    }

    #[test]
    fn native_echo_sorts_mapping_keys() {
        let v = Value::from_json_str("{\"b\": [1, 2], \"a\": 42}").unwrap();
        assert_eq!(v.to_string(), "map[a:42 b:[1 2]]");
    }

    #[test]
    fn json_string_round_trips() {
        let v = Value::from_json_str("{\"a\":[1,2],\"b\":\"x\"}").unwrap();
        assert_eq!(v.json_string(), "{\"a\":[1,2],\"b\":\"x\"}");
    }

    #[test]
    fn structural_equality_is_deep() {
        let a = Value::from_json_str("{\"a\": [1, {\"b\": null}]}").unwrap();
        let b = Value::from_json_str("{\"a\": [1, {\"b\": null}]}").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_composites_have_no_identity() {
        let v = Value::sequence(vec![]);
        assert!(v.composite_id().is_none());
        let v = Value::sequence(vec![Value::Null]);
        assert!(v.composite_id().is_some());
    }
}
