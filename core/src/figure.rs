use polars::prelude::{AnyValue, DataFrame};
use serde::Serialize;
use serde_json::{Map, Number, Value as JsonValue};

use crate::DataError;
use crate::data::{column, require_columns};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FigureSpec {
    Treemap {
        path: Vec<String>,
        values: String,
        color: Option<String>,
    },
    ScatterMatrix {
        dimensions: Vec<String>,
        color: Option<String>,
    },
}

impl FigureSpec {
    /// Columns the figure reads, in encoding order and without repeats.
    pub fn columns(&self) -> Vec<&str> {
        let (encoded, color): (Vec<&str>, Option<&str>) = match self {
            FigureSpec::Treemap {
                path,
                values,
                color,
            } => (
                path.iter()
                    .map(String::as_str)
                    .chain(std::iter::once(values.as_str()))
                    .collect(),
                color.as_deref(),
            ),
            FigureSpec::ScatterMatrix { dimensions, color } => (
                dimensions.iter().map(String::as_str).collect(),
                color.as_deref(),
            ),
        };

        let mut cols: Vec<&str> = Vec::with_capacity(encoded.len() + 1);
        for name in encoded.into_iter().chain(color) {
            if !cols.contains(&name) {
                cols.push(name);
            }
        }
        cols
    }

    fn check(&self) -> Result<(), DataError> {
        match self {
            FigureSpec::Treemap { path, .. } if path.is_empty() => Err(DataError::InvalidSpec(
                "treemap needs at least one path column".into(),
            )),
            FigureSpec::ScatterMatrix { dimensions, .. } if dimensions.is_empty() => Err(
                DataError::InvalidSpec("scatter matrix needs at least one dimension".into()),
            ),
            _ => Ok(()),
        }
    }
}

/// Renderable chart description handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub spec: FigureSpec,
    pub title: Option<String>,
    pub rows: usize,
    pub data: Vec<Map<String, JsonValue>>,
}

impl Figure {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn to_json(&self) -> Result<String, DataError> {
        Ok(serde_json::to_string(self)?)
    }
}

pub fn render(df: &DataFrame, spec: &FigureSpec) -> Result<Figure, DataError> {
    spec.check()?;
    let names = spec.columns();
    require_columns(df, &names)?;

    let columns = names
        .iter()
        .map(|name| column(df, name))
        .collect::<Result<Vec<_>, _>>()?;

    let rows = df.height();
    let mut data = Vec::with_capacity(rows);
    for idx in 0..rows {
        let mut record = Map::with_capacity(names.len());
        for (name, values) in names.iter().zip(&columns) {
            record.insert((*name).to_string(), to_json(values.get(idx)?));
        }
        data.push(record);
    }

    Ok(Figure {
        spec: spec.clone(),
        title: None,
        rows,
        data,
    })
}

fn to_json(value: AnyValue) -> JsonValue {
    match value {
        AnyValue::Null => JsonValue::Null,
        AnyValue::Boolean(v) => JsonValue::Bool(v),
        AnyValue::Int64(v) => JsonValue::from(v),
        AnyValue::Int32(v) => JsonValue::from(v),
        AnyValue::UInt64(v) => JsonValue::from(v),
        AnyValue::UInt32(v) => JsonValue::from(v),
        AnyValue::Float64(v) => Number::from_f64(v)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        AnyValue::Float32(v) => Number::from_f64(v.into())
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        AnyValue::String(s) => JsonValue::String(s.to_string()),
        AnyValue::StringOwned(s) => JsonValue::String(s.to_string()),
        other => JsonValue::String(other.to_string()),
    }
}
