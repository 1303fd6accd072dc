use polars::prelude::PolarsError;
use thiserror::Error;

use crate::{OutputId, ValueKind, WidgetId};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WidgetError {
    #[error("unknown widget '{0}'")]
    UnknownWidget(WidgetId),
    #[error("widget '{0}' is already declared")]
    DuplicateWidget(WidgetId),
    #[error("widget '{widget}' expects a {expected} value, got a {found}")]
    TypeMismatch {
        widget: WidgetId,
        expected: ValueKind,
        found: ValueKind,
    },
    #[error("invalid value for widget '{widget}': {reason}")]
    InvalidValue { widget: WidgetId, reason: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingError {
    #[error("output '{0}' is already bound")]
    DuplicateOutput(OutputId),
    #[error("binding for output '{output}' references unknown widget '{widget}'")]
    UnknownWidget { output: OutputId, widget: WidgetId },
    #[error("binding for output '{0}' has no inputs")]
    NoInputs(OutputId),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SinkError {
    #[error("no artifact computed yet for output '{0}'")]
    NoArtifactYet(OutputId),
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("input #{0} is missing from the snapshot")]
    MissingInput(usize),
    #[error("input #{position} should be a {expected}, got a {found}")]
    UnexpectedKind {
        position: usize,
        expected: ValueKind,
        found: ValueKind,
    },
    #[error("input widget '{0}' is not registered")]
    UnknownInput(WidgetId),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("transform panicked: {0}")]
    Panicked(String),
    #[error("{0}")]
    Failed(String),
}

impl TransformError {
    pub fn msg(message: impl std::fmt::Display) -> Self {
        TransformError::Failed(message.to_string())
    }
}

#[derive(Debug, Error)]
#[error("transform for output '{output}' failed: {cause}")]
pub struct TransformFailure {
    pub output: OutputId,
    #[source]
    pub cause: TransformError,
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("column '{0}' not found")]
    MissingColumn(String),
    #[error("unsupported table format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid numeric value in column '{column}' at row {row}: {value}")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },
    #[error("column '{0}' has no values")]
    Empty(String),
    #[error("invalid figure spec: {0}")]
    InvalidSpec(String),
    #[error(transparent)]
    Polars(#[from] PolarsError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
