use super::{deleted_string, inserted_string, replaced_lines, unchanged_line, unchanged_string};
use crate::{DiffKind, OutputStyle, Value};

/// Comparison of two directly comparable primitives.
#[derive(Clone, Debug, PartialEq)]
pub struct Scalar {
    lhs: Value,
    rhs: Value,
}

impl Scalar {
    pub(crate) fn new(lhs: Value, rhs: Value) -> Self {
        Self { lhs, rhs }
    }

    /// The left-hand side value.
    #[must_use]
    pub fn lhs(&self) -> &Value {
        &self.lhs
    }

    /// The right-hand side value.
    #[must_use]
    pub fn rhs(&self) -> &Value {
        &self.rhs
    }

    pub(crate) fn kind(&self) -> DiffKind {
        if self.lhs.type_name() != self.rhs.type_name() {
            DiffKind::TypesDiffer
        } else if self.lhs == self.rhs {
            DiffKind::Identical
        } else {
            DiffKind::ContentDiffer
        }
    }

    pub(crate) fn strings(&self) -> Vec<String> {
        if self.kind() == DiffKind::Identical {
            vec![unchanged_string(&self.lhs)]
        } else {
            vec![deleted_string(&self.lhs), inserted_string(&self.rhs)]
        }
    }

    pub(crate) fn string_indent(&self, key: &str, prefix: &str, style: &OutputStyle) -> String {
        if self.kind() == DiffKind::Identical {
            unchanged_line(key, prefix, style, &self.lhs)
        } else {
            replaced_lines(key, prefix, style, &self.lhs, &self.rhs)
        }
    }
}

/// Comparison of two sides of incompatible kinds.
#[derive(Clone, Debug, PartialEq)]
pub struct Types {
    lhs: Value,
    rhs: Value,
}

impl Types {
    pub(crate) fn new(lhs: Value, rhs: Value) -> Self {
        Self { lhs, rhs }
    }

    /// The left-hand side value.
    #[must_use]
    pub fn lhs(&self) -> &Value {
        &self.lhs
    }

    /// The right-hand side value.
    #[must_use]
    pub fn rhs(&self) -> &Value {
        &self.rhs
    }

    pub(crate) fn strings(&self) -> Vec<String> {
        vec![deleted_string(&self.lhs), inserted_string(&self.rhs)]
    }

    pub(crate) fn string_indent(&self, key: &str, prefix: &str, style: &OutputStyle) -> String {
        replaced_lines(key, prefix, style, &self.lhs, &self.rhs)
    }
}
