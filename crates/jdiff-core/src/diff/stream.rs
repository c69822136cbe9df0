use std::io::Read;

use super::visited::Visited;
use super::{diff_value, DiffNode, Fault};
use crate::{DiffError, DiffKind, DiffOptions, IngestError, OutputStyle, StreamError, Value};

/// A pull-based source of values, finite on end-of-input.
///
/// `Ok(None)` signals the end of the stream and is returned again on every
/// subsequent pull.
pub trait Stream {
    /// Pulls the next value from the stream.
    fn next_value(&mut self) -> Result<Option<Value>, StreamError>;
}

/// Adapts a reader of concatenated or newline-delimited JSON documents.
///
/// ```
/// use jdiff_core::{JsonStream, Stream};
///
/// let mut stream = JsonStream::new("1 2\n{\"a\": 3}".as_bytes());
/// assert!(stream.next_value()?.is_some());
/// assert!(stream.next_value()?.is_some());
/// assert!(stream.next_value()?.is_some());
/// assert!(stream.next_value()?.is_none());
/// # Ok::<(), jdiff_core::StreamError>(())
/// ```
pub struct JsonStream<R: Read> {
    inner: serde_json::StreamDeserializer<'static, serde_json::de::IoRead<R>, serde_json::Value>,
}

impl<R: Read> JsonStream<R> {
    /// Wraps a reader producing a sequence of JSON documents.
    pub fn new(reader: R) -> Self {
        Self { inner: serde_json::Deserializer::from_reader(reader).into_iter() }
    }
}

impl<R: Read> Stream for JsonStream<R> {
    fn next_value(&mut self) -> Result<Option<Value>, StreamError> {
        match self.inner.next() {
            None => Ok(None),
            Some(Ok(value)) => Ok(Some(Value::from_json_value(value))),
            Some(Err(err)) => Err(StreamError::Json(err)),
        }
    }
}

/// Yields one buffered value indefinitely, for validating every element of a
/// co-stream against a single template.
///
/// A buffered ingestion failure is surfaced on the first pull; afterwards
/// the adapter reports end-of-input.
pub struct OnceStream {
    value: Option<Value>,
    pending: Option<StreamError>,
}

impl OnceStream {
    /// Buffers a template value.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self { value: Some(value), pending: None }
    }

    /// Buffers the outcome of ingesting a template document.
    #[must_use]
    pub fn from_result(result: Result<Value, IngestError>) -> Self {
        match result {
            Ok(value) => Self::new(value),
            Err(err) => Self { value: None, pending: Some(err.into()) },
        }
    }
}

impl Stream for OnceStream {
    fn next_value(&mut self) -> Result<Option<Value>, StreamError> {
        if let Some(err) = self.pending.take() {
            return Err(err);
        }
        Ok(self.value.clone())
    }
}

/// Comparison of two streams, one child per paired position.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamDiff {
    children: Vec<DiffNode>,
    indices: Vec<usize>,
    lhs: Vec<Value>,
    rhs: Vec<Value>,
}

impl StreamDiff {
    /// The paired children, in emission order.
    #[must_use]
    pub fn children(&self) -> &[DiffNode] {
        &self.children
    }

    /// The emission position of each child.
    #[must_use]
    pub fn original_indices(&self) -> &[usize] {
        &self.indices
    }

    /// The values pulled from the left-hand stream, as a sequence.
    #[must_use]
    pub fn lhs_value(&self) -> Value {
        Value::sequence(self.lhs.clone())
    }

    /// The values pulled from the right-hand stream, as a sequence.
    #[must_use]
    pub fn rhs_value(&self) -> Value {
        Value::sequence(self.rhs.clone())
    }

    pub(crate) fn kind(&self) -> DiffKind {
        if self.children.iter().any(|d| d.kind() != DiffKind::Identical) {
            DiffKind::ContentDiffer
        } else {
            DiffKind::Identical
        }
    }

    pub(crate) fn child_mut(&mut self, index: usize) -> &mut DiffNode {
        &mut self.children[index]
    }

    pub(crate) fn strings(&self) -> Vec<String> {
        match self.kind() {
            DiffKind::Identical => self.lhs.iter().map(super::unchanged_string).collect(),
            _ => {
                let mut out = vec!["[".to_owned()];
                for child in &self.children {
                    out.extend(child.strings());
                }
                out.push("]".to_owned());
                out
            }
        }
    }

    pub(crate) fn string_indent(&self, key: &str, prefix: &str, style: &OutputStyle) -> String {
        match self.kind() {
            DiffKind::Identical => {
                let lines: Vec<String> = self
                    .lhs
                    .iter()
                    .map(|v| super::unchanged_line(key, prefix, style, v))
                    .collect();
                lines.join(style.separator())
            }
            _ => {
                let open = if style.json {
                    format!(" {prefix}{key}[")
                } else if style.show_types {
                    format!(" {prefix}{key}stream [")
                } else {
                    format!(" {prefix}{key}[")
                };
                let child_prefix = format!("{prefix}{}", style.indent);
                let children: Vec<String> = self
                    .children
                    .iter()
                    .map(|child| child.string_indent("", &child_prefix, style))
                    .filter(|s| !s.is_empty())
                    .collect();
                format!("{open}\n{}\n {prefix}]", children.join(style.separator()))
            }
        }
    }
}

/// A stream value present in the left-hand side only.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamMissing {
    value: Value,
}

impl StreamMissing {
    /// The missing value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// A stream value present in the right-hand side only.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamExcess {
    value: Value,
}

impl StreamExcess {
    /// The excess value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Compares two streams of values element by element.
///
/// Values are paired by successive pulls on both sides until both signal
/// end-of-input; a side ending early turns the remaining values of the other
/// side into missings or excesses. Any error other than end-of-input is
/// fatal: the partial tree is returned inside the error.
///
/// ```
/// use jdiff_core::{diff_streams, DiffKind, DiffOptions, JsonStream};
///
/// let mut lhs = JsonStream::new("1 2 3".as_bytes());
/// let mut rhs = JsonStream::new("1 2 3 4".as_bytes());
/// let d = diff_streams(&mut lhs, &mut rhs, &DiffOptions::default())?;
/// assert_eq!(d.kind(), DiffKind::ContentDiffer);
/// # Ok::<(), jdiff_core::DiffError>(())
/// ```
pub fn diff_streams(
    lhs: &mut dyn Stream,
    rhs: &mut dyn Stream,
    options: &DiffOptions,
) -> Result<DiffNode, DiffError> {
    let mut visited = Visited::default();
    let mut state = StreamState::default();

    loop {
        match (lhs.next_value(), rhs.next_value()) {
            (Ok(None), Ok(None)) => break,
            (Err(err), _) | (Ok(_), Err(err)) => {
                tracing::debug!("stream diff aborted: {err}");
                return Err(Fault::Stream(err).attach(state.into_node()));
            }
            (Ok(Some(lv)), Ok(Some(rv))) => {
                if let Some(fault) = state.pair(&lv, &rv, &mut visited, options) {
                    return Err(fault.attach(state.into_node()));
                }
            }
            (Ok(Some(lv)), Ok(None)) => state.missing(lv),
            (Ok(None), Ok(Some(rv))) => state.excess(rv),
        }
    }

    Ok(state.into_node())
}

/// Checks every value of `stream` against a single template.
///
/// The loop is driven by `stream`: it terminates when `stream` reports
/// end-of-input, no matter how many values `template` can still produce.
pub fn validate_stream(
    template: &mut dyn Stream,
    stream: &mut dyn Stream,
    options: &DiffOptions,
) -> Result<DiffNode, DiffError> {
    let mut visited = Visited::default();
    let mut state = StreamState::default();

    loop {
        let rv = match stream.next_value() {
            Ok(None) => break,
            Ok(Some(value)) => value,
            Err(err) => return Err(Fault::Stream(err).attach(state.into_node())),
        };
        match template.next_value() {
            Ok(None) => state.excess(rv),
            Ok(Some(lv)) => {
                if let Some(fault) = state.pair(&lv, &rv, &mut visited, options) {
                    return Err(fault.attach(state.into_node()));
                }
            }
            Err(err) => return Err(Fault::Stream(err).attach(state.into_node())),
        }
    }

    Ok(state.into_node())
}

#[derive(Default)]
struct StreamState {
    children: Vec<DiffNode>,
    indices: Vec<usize>,
    lhs: Vec<Value>,
    rhs: Vec<Value>,
}

impl StreamState {
    fn pair(
        &mut self,
        lv: &Value,
        rv: &Value,
        visited: &mut Visited,
        options: &DiffOptions,
    ) -> Option<Fault> {
        self.indices.push(self.children.len());
        self.lhs.push(lv.clone());
        self.rhs.push(rv.clone());
        let (child, fault) = diff_value(lv, rv, visited, options);
        self.children.push(child);
        fault
    }

    fn missing(&mut self, lv: Value) {
        self.indices.push(self.children.len());
        self.lhs.push(lv.clone());
        self.children.push(DiffNode::StreamMissing(StreamMissing { value: lv }));
    }

    fn excess(&mut self, rv: Value) {
        self.indices.push(self.children.len());
        self.rhs.push(rv.clone());
        self.children.push(DiffNode::StreamExcess(StreamExcess { value: rv }));
    }

    fn into_node(self) -> DiffNode {
        DiffNode::Stream(StreamDiff {
            children: self.children,
            indices: self.indices,
            lhs: self.lhs,
            rhs: self.rhs,
        })
    }
}
