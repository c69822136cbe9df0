use std::fmt;

/// A numeric scalar, keeping the integer/floating distinction intact.
///
/// The two variants are treated as distinct semantic types: diffing `8`
/// against `9.0` reports the types as differing, not the content.
///
/// ```
/// use jdiff_core::Number;
///
/// assert_ne!(Number::Int(8), Number::Float(8.0));
/// assert_eq!(Number::Int(8).as_f64(), 8.0);
/// ```
#[derive(Clone, Copy, Debug)]
pub enum Number {
    /// A whole number that fits in an `i64`.
    Int(i64),
    /// An IEEE-754 double precision number.
    Float(f64),
}

impl Number {
    /// Returns the semantic type label (`"int"` or `"float"`).
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
        }
    }

    /// Returns the value widened to an `f64`.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_and_float_are_distinct_kinds() {
        assert_ne!(Number::Int(9), Number::Float(9.0));
        assert_ne!(Number::Int(9).type_name(), Number::Float(9.0).type_name());
    }

    #[test]
    fn display_is_minimal() {
        assert_eq!(Number::Int(42).to_string(), "42");
        assert_eq!(Number::Float(9.0).to_string(), "9");
        assert_eq!(Number::Float(9.5).to_string(), "9.5");
    }
}
