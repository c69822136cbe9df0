//! The compact addressing language for positions inside a [`Value`].
//!
//! A path is a sequence of key and index accessors: `.users[3].name`,
//! `."key with spaces"`, `[0][1]`. The empty path addresses the whole value.

use std::fmt;
use std::str::FromStr;

use crate::{Key, NavigateError, PathParseError, Value};

/// One accessor within a [`Path`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathPart {
    /// Mapping key lookup.
    Key(String),
    /// Sequence index lookup.
    Index(usize),
}

impl PathPart {
    /// Creates a key part.
    #[must_use]
    pub fn key<S>(value: S) -> Self
    where
        S: Into<String>,
    {
        Self::Key(value.into())
    }

    /// Creates an index part.
    #[must_use]
    pub fn index(value: usize) -> Self {
        Self::Index(value)
    }
}

impl fmt::Display for PathPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, ".{}", escape_str(key)),
            Self::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// A parsed path: a finite sequence of accessors.
///
/// ```
/// use jdiff_core::path::{Path, PathPart};
///
/// let path = Path::parse(".foo.bar[42].\"hello world!\"")?;
/// assert_eq!(path.parts().len(), 4);
/// assert_eq!(path.parts()[2], PathPart::Index(42));
/// assert_eq!(path.to_string(), ".foo.bar[42].\"hello world!\"");
/// # Ok::<(), jdiff_core::PathParseError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path(Vec<PathPart>);

impl Path {
    /// Creates the empty path, which addresses the whole value.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a path string, consuming the entire input.
    pub fn parse(input: &str) -> Result<Self, PathParseError> {
        let bytes = input.as_bytes();
        let mut parts = Vec::new();
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'.' => {
                    let (key, next) = parse_key(input, i + 1)?;
                    parts.push(PathPart::Key(key));
                    i = next;
                }
                b'[' => {
                    let (index, next) = parse_index(input, i + 1)?;
                    parts.push(PathPart::Index(index));
                    i = next;
                }
                _ => {
                    return Err(PathParseError { offset: i, reason: "expected '.' or '['" });
                }
            }
        }

        Ok(Self(parts))
    }

    /// Returns the accessors in order.
    #[must_use]
    pub fn parts(&self) -> &[PathPart] {
        &self.0
    }

    /// Returns the number of accessors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Indicates whether the path is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Walks a value along the path, returning the addressed value.
    ///
    /// ```
    /// # use jdiff_core::{path::Path, Value};
    /// let v = Value::from_json_str("{\"foo\": [1, 2, 3]}")?;
    /// let got = Path::parse(".foo[1]")?.execute_on(&v)?;
    /// assert_eq!(got, Value::from_json_str("2")?);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn execute_on(&self, value: &Value) -> Result<Value, NavigateError> {
        let mut current = value.clone();
        for part in &self.0 {
            current = match part {
                PathPart::Index(index) => match &current {
                    Value::Null => return Err(NavigateError::Nil),
                    Value::Sequence(items) => {
                        let items = items.borrow();
                        items.get(*index).cloned().ok_or(NavigateError::OutOfBounds {
                            index: *index,
                            len: items.len(),
                        })?
                    }
                    other => {
                        return Err(NavigateError::NotSequence { found: other.type_name() });
                    }
                },
                PathPart::Key(key) => match &current {
                    Value::Null => return Err(NavigateError::Nil),
                    Value::Mapping(entries) => lookup_key(&entries.borrow(), key)?,
                    other => {
                        return Err(NavigateError::NotMapping { found: other.type_name() });
                    }
                },
            };
        }
        Ok(current)
    }
}

fn lookup_key(
    entries: &std::collections::BTreeMap<Key, Value>,
    key: &str,
) -> Result<Value, NavigateError> {
    if let Some(v) = entries.get(&Key::Str(key.to_owned())) {
        return Ok(v.clone());
    }
    if let Ok(n) = key.parse::<i64>() {
        if let Some(v) = entries.get(&Key::Int(n)) {
            return Ok(v.clone());
        }
        return Err(NavigateError::InvalidAccess { key: key.to_owned() });
    }
    // A non-numeric key can never address an integer-keyed mapping.
    if entries.keys().all(|k| matches!(k, Key::Int(_))) && !entries.is_empty() {
        return Err(NavigateError::KeyType { key: key.to_owned() });
    }
    Err(NavigateError::InvalidAccess { key: key.to_owned() })
}

fn parse_key(input: &str, start: usize) -> Result<(String, usize), PathParseError> {
    let bytes = input.as_bytes();
    if start < bytes.len() && bytes[start] == b'"' {
        return parse_quoted_key(input, start);
    }

    let mut end = start;
    while end < bytes.len() && !matches!(bytes[end], b'[' | b']' | b'.' | b'"' | b':') {
        end += 1;
    }
    if end == start {
        return Err(PathParseError { offset: start, reason: "expected a key" });
    }
    Ok((input[start..end].to_owned(), end))
}

fn parse_quoted_key(input: &str, start: usize) -> Result<(String, usize), PathParseError> {
    let bytes = input.as_bytes();
    let mut key = String::new();
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => return Ok((key, i + 1)),
            b'\\' => {
                let Some(&escaped) = bytes.get(i + 1) else {
                    return Err(PathParseError { offset: i, reason: "unterminated escape" });
                };
                match escaped {
                    b'"' | b'\\' => key.push(escaped as char),
                    _ => {
                        return Err(PathParseError { offset: i, reason: "unknown escape" });
                    }
                }
                i += 2;
            }
            _ => {
                // Copy the whole UTF-8 scalar starting here.
                let ch_len = utf8_len(bytes[i]);
                key.push_str(&input[i..i + ch_len]);
                i += ch_len;
            }
        }
    }
    Err(PathParseError { offset: start, reason: "unterminated quoted key" })
}

fn parse_index(input: &str, start: usize) -> Result<(usize, usize), PathParseError> {
    let bytes = input.as_bytes();
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == start {
        return Err(PathParseError { offset: start, reason: "expected an index" });
    }
    if end >= bytes.len() || bytes[end] != b']' {
        return Err(PathParseError { offset: end, reason: "expected ']'" });
    }
    let index = input[start..end]
        .parse::<usize>()
        .map_err(|_| PathParseError { offset: start, reason: "index too large" })?;
    Ok((index, end + 1))
}

fn utf8_len(first: u8) -> usize {
    match first {
        b if b < 0x80 => 1,
        b if b < 0xE0 => 2,
        b if b < 0xF0 => 3,
        _ => 4,
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.0 {
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Vec<PathPart>> for Path {
    fn from(parts: Vec<PathPart>) -> Self {
        Self(parts)
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathPart;
    type IntoIter = std::slice::Iter<'a, PathPart>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Renders a mapping key for use inside a path, quoting when necessary.
///
/// ```
/// use jdiff_core::{path::escape_key, Key};
///
/// assert_eq!(escape_key(&Key::from("foo")), "foo");
/// assert_eq!(escape_key(&Key::from("[foo]")), "\"[foo]\"");
/// assert_eq!(escape_key(&Key::from(42)), "42");
/// ```
#[must_use]
pub fn escape_key(key: &Key) -> String {
    match key {
        Key::Int(v) => v.to_string(),
        Key::Str(s) => escape_str(s),
    }
}

fn escape_str(s: &str) -> String {
    if !s.is_empty() && !s.contains(['[', ']', '.', '"', ':']) {
        return s.to_owned();
    }
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for ch in s.chars() {
        if matches!(ch, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

/// Erases the digits between `[` and `]` in a path string, leaving quoted
/// key content untouched, so that `.a[].b` can match any index.
///
/// ```
/// use jdiff_core::path::strip_indices;
///
/// assert_eq!(strip_indices(".foo[341].bar"), ".foo[].bar");
/// assert_eq!(strip_indices(".\"f[00]\"[22]"), ".\"f[00]\"[]");
/// ```
#[must_use]
pub fn strip_indices(path: &str) -> String {
    let bytes = path.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());

    let mut i = 0;
    let mut bracket = false;
    let mut quoted = false;
    while i < bytes.len() {
        if quoted && bytes[i] == b'"' && bytes[i - 1] != b'\\' {
            quoted = false;
        } else if bytes[i] == b'"' {
            quoted = true;
        }
        if quoted {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        if bracket && bytes[i] == b']' {
            bracket = false;
        }
        if !bracket {
            out.push(bytes[i]);
        }
        if bytes[i] == b'[' {
            bracket = true;
        }
        i += 1;
    }

    String::from_utf8(out).unwrap_or_default()
}

/// Tests whether `path` ends with `suffix`, ignoring indices in brackets.
///
/// ```
/// use jdiff_core::path::has_suffix;
///
/// assert!(has_suffix(".foo.bar[24]", ".bar[]"));
/// assert!(!has_suffix(".foo.bar[24].fizz", ".bar[]"));
/// ```
#[must_use]
pub fn has_suffix(path: &str, suffix: &str) -> bool {
    strip_indices(path).ends_with(suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_accessors() {
        let path = Path::parse(".foo.bar[42].\"hello world!\"").unwrap();
        assert_eq!(
            path.parts(),
            &[
                PathPart::key("foo"),
                PathPart::key("bar"),
                PathPart::Index(42),
                PathPart::key("hello world!"),
            ]
        );
    }

    #[test]
    fn render_round_trips() {
        for input in [
            "",
            ".foo",
            ".foo.bar[42]",
            "[0][1].x",
            ".\"hello world!\"",
            ".\"a.b\"[3]",
            ".\"quo\\\"te\"",
        ] {
            let path = Path::parse(input).unwrap();
            assert_eq!(path.to_string(), input, "render(parse({input:?}))");
            assert_eq!(Path::parse(&path.to_string()).unwrap(), path);
        }
    }

    #[test]
    fn rejects_malformed_paths() {
        for (input, offset) in [
            ("foo", 0),
            (".", 1),
            (".foo[", 5),
            (".foo[12", 7),
            (".foo[a]", 5),
            (".\"unterminated", 1),
            (".foo]", 4),
            (".foo:bar", 4),
        ] {
            let err = Path::parse(input).unwrap_err();
            assert_eq!(err.offset, offset, "offset for {input:?}");
        }
    }

    #[test]
    fn executes_on_nested_values() {
        let v = Value::from_json_str("{\"foo\": [1, 2, 3], \"bar\": {\"x\": null}}").unwrap();
        let got = Path::parse(".foo[1]").unwrap().execute_on(&v).unwrap();
        assert_eq!(got, Value::from_json_str("2").unwrap());
        let got = Path::parse(".bar.x").unwrap().execute_on(&v).unwrap();
        assert_eq!(got, Value::Null);
        let got = Path::parse("").unwrap().execute_on(&v).unwrap();
        assert_eq!(got, v);
    }

    #[test]
    fn executes_on_integer_keyed_mapping() {
        let v = Value::from_yaml_str("foo:\n  - 23: ha\n    44: bar\n").unwrap();
        let got = Path::parse(".foo[0].23").unwrap().execute_on(&v).unwrap();
        assert_eq!(got, Value::String("ha".to_owned()));
    }

    #[test]
    fn navigation_errors_carry_their_kind() {
        let v = Value::from_json_str("{\"foo\": [1], \"nil\": null}").unwrap();
        let err = Path::parse(".foo.x").unwrap().execute_on(&v).unwrap_err();
        assert!(matches!(err, NavigateError::NotMapping { .. }));
        let err = Path::parse("[0]").unwrap().execute_on(&v).unwrap_err();
        assert!(matches!(err, NavigateError::NotSequence { .. }));
        let err = Path::parse(".foo[3]").unwrap().execute_on(&v).unwrap_err();
        assert!(matches!(err, NavigateError::OutOfBounds { index: 3, len: 1 }));
        let err = Path::parse(".nil.x").unwrap().execute_on(&v).unwrap_err();
        assert!(matches!(err, NavigateError::Nil));
        let err = Path::parse(".missing").unwrap().execute_on(&v).unwrap_err();
        assert!(matches!(err, NavigateError::InvalidAccess { .. }));

        let ints = Value::from_yaml_str("1: a\n2: b\n").unwrap();
        let err = Path::parse(".foo").unwrap().execute_on(&ints).unwrap_err();
        assert!(matches!(err, NavigateError::KeyType { .. }));
    }

    #[test]
    fn strip_indices_table() {
        for (input, expected) in [
            (".foo.bar", ".foo.bar"),
            ("", ""),
            (".foo[].bar", ".foo[].bar"),
            ("[].bar", "[].bar"),
            (".foo[]", ".foo[]"),
            (".foo[341].bar", ".foo[].bar"),
            ("[1].bar", "[].bar"),
            (".foo[22]", ".foo[]"),
            (".\"f[oo]\"[22]", ".\"f[oo]\"[]"),
            (".\"f[00]\"[22]", ".\"f[00]\"[]"),
            (".\"f[0\\\"]\"[22]", ".\"f[0\\\"]\"[]"),
        ] {
            assert_eq!(strip_indices(input), expected, "strip_indices({input:?})");
        }
    }

    #[test]
    fn strip_indices_is_idempotent() {
        for input in [".foo[341].bar", ".\"f[0\\\"]\"[22]", "[1][2][3]"] {
            let once = strip_indices(input);
            assert_eq!(strip_indices(&once), once);
        }
    }

    #[test]
    fn escape_key_table() {
        for (input, expected) in [
            ("", "\"\""),
            ("foo", "foo"),
            ("42", "42"),
            ("\"foo", "\"\\\"foo\""),
            ("[foo]", "\"[foo]\""),
            ("a:b", "\"a:b\""),
        ] {
            assert_eq!(escape_key(&Key::from(input)), expected, "escape_key({input:?})");
        }
        assert_eq!(escape_key(&Key::from(42)), "42");
    }

    #[test]
    fn has_suffix_table() {
        for (path, suffix, expected) in [
            (".foo.bar", ".bar", true),
            (".foo.bar", ".foo", false),
            (".foo[].bar", ".bar", true),
            (".foo.bar[]", ".bar[]", true),
            (".foo.bar[24]", ".bar[]", true),
            (".foo.bar[24].fizz", ".bar[]", false),
            (".foo.bar[24].fizz", ".bar[].fizz", true),
        ] {
            assert_eq!(has_suffix(path, suffix), expected, "has_suffix({path:?}, {suffix:?})");
        }
    }
}
