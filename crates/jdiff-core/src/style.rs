use colored::Colorize;

use crate::Value;

/// Rendering configuration shared by the indented and report outputs.
///
/// `json` switches container delimiters to `{…}` / `[…]` and implies
/// rendering individual values as JSON; it is mutually exclusive with
/// `show_types` upstream (the caller validates, not this type).
///
/// ```
/// use jdiff_core::OutputStyle;
///
/// let style = OutputStyle::default().with_show_types(true);
/// assert_eq!(style.indent, "\t");
/// assert!(style.show_types);
/// ```
#[derive(Clone, Debug)]
pub struct OutputStyle {
    /// String used for each nesting level.
    pub indent: String,
    /// Render a semantic type label next to each value.
    pub show_types: bool,
    /// Wrap differing values in red/green styling.
    pub colorized: bool,
    /// Render containers with JSON delimiters and `,\n` child separators.
    pub json: bool,
    /// Render individual values as their JSON serialisation.
    pub json_values: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            indent: "\t".to_owned(),
            show_types: false,
            colorized: false,
            json: false,
            json_values: false,
        }
    }
}

impl OutputStyle {
    /// Sets the per-level indent string.
    #[must_use]
    pub fn with_indent<S>(mut self, indent: S) -> Self
    where
        S: Into<String>,
    {
        self.indent = indent.into();
        self
    }

    /// Enables or disables type labels.
    #[must_use]
    pub fn with_show_types(mut self, show_types: bool) -> Self {
        self.show_types = show_types;
        self
    }

    /// Enables or disables red/green styling.
    #[must_use]
    pub fn with_colorized(mut self, colorized: bool) -> Self {
        self.colorized = colorized;
        self
    }

    /// Enables or disables JSON-shaped container output.
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Enables or disables JSON value rendering.
    #[must_use]
    pub fn with_json_values(mut self, json_values: bool) -> Self {
        self.json_values = json_values;
        self
    }

    /// Projection used by the flat report: container shapes conflict with
    /// the one-line-per-leaf format, so `json` is dropped while JSON value
    /// rendering is retained.
    #[must_use]
    pub fn for_report(&self) -> Self {
        let mut style = self.clone();
        style.json_values = style.json || style.json_values;
        style.json = false;
        style
    }

    pub(crate) fn value_string(&self, v: &Value) -> String {
        let raw = if self.json || self.json_values { v.json_string() } else { v.to_string() };
        if self.show_types {
            format!("{} {raw}", v.type_name())
        } else {
            raw
        }
    }

    pub(crate) fn red(&self, v: &Value) -> String {
        let s = self.value_string(v);
        if self.colorized {
            s.red().to_string()
        } else {
            s
        }
    }

    pub(crate) fn green(&self, v: &Value) -> String {
        let s = self.value_string(v);
        if self.colorized {
            s.green().to_string()
        } else {
            s
        }
    }

    pub(crate) fn plain(&self, v: &Value) -> String {
        self.value_string(v)
    }

    pub(crate) fn type_prefix(&self, v: &Value) -> String {
        if self.show_types {
            format!("{} ", v.type_name())
        } else {
            String::new()
        }
    }

    pub(crate) fn separator(&self) -> &'static str {
        if self.json {
            ",\n"
        } else {
            "\n"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_types_prefixes_the_label() {
        let style = OutputStyle::default().with_show_types(true);
        let v = Value::from_json_str("42").unwrap();
        assert_eq!(style.plain(&v), "int 42");
    }

    #[test]
    fn json_implies_json_values() {
        let style = OutputStyle::default().with_json(true);
        let v = Value::from_json_str("\"x\"").unwrap();
        assert_eq!(style.plain(&v), "\"x\"");
        assert_eq!(style.separator(), ",\n");
    }

    #[test]
    fn report_projection_drops_json_shape() {
        let style = OutputStyle::default().with_json(true).for_report();
        assert!(!style.json);
        assert!(style.json_values);
        assert_eq!(style.separator(), "\n");
    }
}
