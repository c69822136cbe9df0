//! Structural diff engine for dynamically-typed tree values.
//!
//! The crate compares two [`Value`] trees (the kind produced by parsing JSON
//! or YAML documents) and yields a diff tree mirroring the shape of the
//! inputs. The tree can be rendered as indented text or as a flat
//! path-report, transformed with a walker, built synthetically, or produced
//! from two streams of documents compared element by element.
//!
//! # Examples
//!
//! ```
//! use jdiff_core::{diff, report, DiffKind, OutputStyle, Value};
//!
//! let lhs = Value::from_json_str("{\"a\": 42, \"b\": [1, 2]}")?;
//! let rhs = Value::from_json_str("{\"a\": 21, \"b\": [1, 2]}")?;
//! let d = diff(&lhs, &rhs)?;
//! assert_eq!(d.kind(), DiffKind::ContentDiffer);
//!
//! let lines = report(&d, &OutputStyle::default());
//! assert_eq!(lines, ["- .a: 42\n+ .a: 21"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod diff;
mod error;
mod number;
mod options;
pub mod path;
mod style;
mod value;

pub use diff::{
    diff, diff_streams, diff_with, report, validate_stream, walk, Builder, DiffKind, DiffNode,
    JsonStream, OnceStream, Stream,
};
pub use error::{
    BuildError, DiffError, IngestError, NavigateError, OptionsError, PathParseError, SideError,
    StreamError,
};
pub use number::Number;
pub use options::{DiffOptions, SequenceStrategy};
pub use style::OutputStyle;
pub use value::{Key, Value};
