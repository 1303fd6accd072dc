use crate::{Scalar, TransformError, Value, ValueKind, WidgetId};

/// Ordered snapshot of a binding's input values, taken right before its
/// transform runs. Positions follow the binding's declared input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Inputs {
    entries: Vec<(WidgetId, Value)>,
}

impl Inputs {
    pub(crate) fn new(entries: Vec<(WidgetId, Value)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Value> {
        self.entries.get(position).map(|(_, v)| v)
    }

    pub fn by_id(&self, id: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(w, _)| w.as_str() == id)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WidgetId, &Value)> {
        self.entries.iter().map(|(w, v)| (w, v))
    }

    pub fn value(&self, position: usize) -> Result<&Value, TransformError> {
        self.get(position)
            .ok_or(TransformError::MissingInput(position))
    }

    pub fn scalar(&self, position: usize) -> Result<&Scalar, TransformError> {
        match self.value(position)? {
            Value::Scalar(s) => Ok(s),
            other => Err(unexpected(position, ValueKind::Scalar, other)),
        }
    }

    pub fn list(&self, position: usize) -> Result<&[Scalar], TransformError> {
        match self.value(position)? {
            Value::List(items) => Ok(items),
            other => Err(unexpected(position, ValueKind::List, other)),
        }
    }

    pub fn pair(&self, position: usize) -> Result<(f64, f64), TransformError> {
        match self.value(position)? {
            Value::Pair(low, high) => Ok((*low, *high)),
            other => Err(unexpected(position, ValueKind::Pair, other)),
        }
    }
}

fn unexpected(position: usize, expected: ValueKind, found: &Value) -> TransformError {
    TransformError::UnexpectedKind {
        position,
        expected,
        found: found.kind(),
    }
}
