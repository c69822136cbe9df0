use crate::Value;

/// Marker returned when a composite is revisited during the same descent.
#[derive(Debug)]
pub(crate) struct CycleDetected;

/// Tracks the identities of composite values seen on each side of the
/// current descent. Not safe for concurrent use; one instance per diff
/// invocation.
#[derive(Debug, Default)]
pub(crate) struct Visited {
    lhs: Vec<usize>,
    rhs: Vec<usize>,
}

impl Visited {
    /// Records the identities of both values if they are non-empty
    /// composites. Empty containers are intentionally excluded: shared empty
    /// singletons cannot form a problematic cycle.
    ///
    /// `pop` should be called whether or not an error occurred.
    pub(crate) fn push(&mut self, lhs: &Value, rhs: &Value) -> Result<(), CycleDetected> {
        if let Some(id) = lhs.composite_id() {
            if self.lhs.contains(&id) {
                return Err(CycleDetected);
            }
            self.lhs.push(id);
        }
        if let Some(id) = rhs.composite_id() {
            if self.rhs.contains(&id) {
                return Err(CycleDetected);
            }
            self.rhs.push(id);
        }
        Ok(())
    }

    /// Undoes the most recent `push` for each side whose top entry matches.
    pub(crate) fn pop(&mut self, lhs: &Value, rhs: &Value) {
        if let Some(id) = lhs.composite_id() {
            if self.lhs.last() == Some(&id) {
                self.lhs.pop();
            }
        }
        if let Some(id) = rhs.composite_id() {
            if self.rhs.last() == Some(&id) {
                self.rhs.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revisiting_a_composite_is_detected() {
        let seq = Value::from_json_str("[1]").unwrap();
        let other = Value::from_json_str("[2]").unwrap();
        let mut visited = Visited::default();
        visited.push(&seq, &other).expect("first push succeeds");
        assert!(visited.push(&seq, &other).is_err());
    }

    #[test]
    fn pop_restores_the_stack() {
        let seq = Value::from_json_str("[1]").unwrap();
        let other = Value::from_json_str("[2]").unwrap();
        let mut visited = Visited::default();
        visited.push(&seq, &other).expect("push succeeds");
        visited.pop(&seq, &other);
        assert!(visited.push(&seq, &other).is_ok());
    }

    #[test]
    fn empty_composites_are_not_tracked() {
        let empty = Value::sequence(vec![]);
        let mut visited = Visited::default();
        visited.push(&empty, &empty).expect("push succeeds");
        assert!(visited.push(&empty, &empty).is_ok());
    }

    #[test]
    fn distinct_composites_with_equal_content_are_unrelated() {
        let a = Value::from_json_str("[1]").unwrap();
        let b = Value::from_json_str("[1]").unwrap();
        let mut visited = Visited::default();
        visited.push(&a, &a).expect("push succeeds");
        assert!(visited.push(&b, &b).is_ok());
    }
}
