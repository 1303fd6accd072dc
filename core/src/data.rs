use polars::prelude::*;
use std::path::Path;

use crate::{DataError, Scalar};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Parquet,
}

impl TableFormat {
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(TableFormat::Csv),
            "parquet" | "parq" => Some(TableFormat::Parquet),
            _ => None,
        }
    }
}

pub fn load_table(
    path: impl AsRef<Path>,
    format: Option<TableFormat>,
) -> Result<DataFrame, DataError> {
    let path = path.as_ref();
    let format = format
        .or_else(|| TableFormat::detect(path))
        .ok_or_else(|| DataError::UnsupportedFormat(path.display().to_string()))?;

    let pl_path = PlPathRef::from_local_path(path).into_owned();
    let df = match format {
        TableFormat::Csv => LazyCsvReader::new(pl_path)
            .with_has_header(true)
            .finish()?
            .collect()?,
        TableFormat::Parquet => {
            LazyFrame::scan_parquet(pl_path, ScanArgsParquet::default())?.collect()?
        }
    };
    tracing::debug!(path = %path.display(), rows = df.height(), "table loaded");
    Ok(df)
}

pub fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<(), DataError> {
    for name in columns {
        column(df, name)?;
    }
    Ok(())
}

/// Rows where `column == value`.
pub fn filter_eq(df: &DataFrame, column: &str, value: &Scalar) -> Result<DataFrame, DataError> {
    require_columns(df, &[column])?;
    let filtered = df
        .clone()
        .lazy()
        .filter(col(column).eq(scalar_lit(value)))
        .collect()?;
    Ok(filtered)
}

/// Rows where `column != value`.
pub fn exclude_eq(df: &DataFrame, column: &str, value: &Scalar) -> Result<DataFrame, DataError> {
    require_columns(df, &[column])?;
    let filtered = df
        .clone()
        .lazy()
        .filter(col(column).neq(scalar_lit(value)))
        .collect()?;
    Ok(filtered)
}

/// Rows where `low <= column <= high`.
pub fn threshold(
    df: &DataFrame,
    column: &str,
    low: f64,
    high: f64,
) -> Result<DataFrame, DataError> {
    require_columns(df, &[column])?;
    let filtered = df
        .clone()
        .lazy()
        .filter(col(column).gt_eq(lit(low)).and(col(column).lt_eq(lit(high))))
        .collect()?;
    Ok(filtered)
}

/// Distinct non-null values of `name`, in first-seen order.
pub fn unique_values(df: &DataFrame, name: &str) -> Result<Vec<Scalar>, DataError> {
    let unique = column(df, name)?.as_materialized_series().unique_stable()?;
    let mut values = Vec::with_capacity(unique.len());
    for idx in 0..unique.len() {
        if let Some(value) = to_scalar(unique.get(idx)?) {
            values.push(value);
        }
    }
    Ok(values)
}

/// Minimum and maximum of a numeric column, ignoring nulls. Text that
/// parses as a number is accepted.
pub fn bounds(df: &DataFrame, name: &str) -> Result<(f64, f64), DataError> {
    let series = column(df, name)?.as_materialized_series();
    let numbers = series.cast(&DataType::Float64)?;

    let unparsed = &series.is_not_null() & &numbers.is_null();
    if let Some(row) = unparsed.into_iter().position(|bad| bad == Some(true)) {
        return Err(DataError::InvalidNumber {
            column: name.to_string(),
            row,
            value: series.str_value(row)?.into_owned(),
        });
    }

    match (numbers.min::<f64>()?, numbers.max::<f64>()?) {
        (Some(min), Some(max)) => Ok((min, max)),
        _ => Err(DataError::Empty(name.to_string())),
    }
}

pub(crate) fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, DataError> {
    df.column(name)
        .map_err(|_| DataError::MissingColumn(name.to_string()))
}

fn scalar_lit(value: &Scalar) -> Expr {
    match value {
        Scalar::Int(v) => lit(*v),
        Scalar::Float(v) => lit(*v),
        Scalar::Text(v) => lit(v.clone()),
        Scalar::Bool(v) => lit(*v),
    }
}

pub(crate) fn to_scalar(value: AnyValue) -> Option<Scalar> {
    match value {
        AnyValue::Null => None,
        AnyValue::Boolean(v) => Some(Scalar::Bool(v)),
        AnyValue::Int64(v) => Some(Scalar::Int(v)),
        AnyValue::Int32(v) => Some(Scalar::Int(v.into())),
        AnyValue::UInt32(v) => Some(Scalar::Int(v.into())),
        AnyValue::UInt64(v) => Some(
            i64::try_from(v)
                .map(Scalar::Int)
                .unwrap_or(Scalar::Float(v as f64)),
        ),
        AnyValue::Float64(v) => Some(Scalar::Float(v)),
        AnyValue::Float32(v) => Some(Scalar::Float(v.into())),
        AnyValue::String(s) => Some(Scalar::Text(s.to_string())),
        AnyValue::StringOwned(s) => Some(Scalar::Text(s.to_string())),
        other => Some(Scalar::Text(other.to_string())),
    }
}
