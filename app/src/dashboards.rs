use anyhow::{Context, Result, bail};
use dashflow::data::{bounds, exclude_eq, filter_eq, require_columns, threshold, unique_values};
use dashflow::{Control, DashboardBuilder, Figure, FigureSpec, Inputs, Scalar, Value, render};
use polars::prelude::DataFrame;

use crate::config::DashboardKind;

pub const GAP_YEAR: &str = "gap-year";
pub const GAP_THRESHOLD: &str = "gap-threshold";
pub const GRAPH_GAP: &str = "graph-gap";

pub const IRIS_DIMENSIONS: &str = "dropdown";
pub const SPLOM: &str = "splom";

const GAP_COLUMNS: [&str; 5] = ["country", "continent", "year", "pop", "gdpPercap"];
const OUTLIER_COUNTRY: &str = "Kuwait";
const IRIS_DIMS: [&str; 4] = ["sepal_length", "sepal_width", "petal_length", "petal_width"];

pub fn build(kind: DashboardKind, df: &DataFrame) -> Result<DashboardBuilder<Figure>> {
    match kind {
        DashboardKind::Gapminder => gapminder(df),
        DashboardKind::Iris => iris(df),
    }
}

pub fn gapminder(df: &DataFrame) -> Result<DashboardBuilder<Figure>> {
    require_columns(df, &GAP_COLUMNS).context("gapminder table")?;
    let df = exclude_eq(df, "country", &Scalar::from(OUTLIER_COUNTRY))?;

    let years = unique_values(&df, "year")?;
    let Some(first_year) = years.first().cloned() else {
        bail!("gapminder table has no years");
    };
    let (min_gdp, max_gdp) = bounds(&df, "gdpPercap")?;

    let mut builder = DashboardBuilder::new();
    builder
        .widget(GAP_YEAR, Control::Dropdown { options: years }, first_year)?
        .widget(
            GAP_THRESHOLD,
            Control::RangeSlider {
                min: min_gdp,
                max: max_gdp,
            },
            Value::pair(min_gdp, max_gdp),
        )?;

    let spec = FigureSpec::Treemap {
        path: vec!["continent".into(), "country".into()],
        values: "pop".into(),
        color: Some("gdpPercap".into()),
    };
    builder.bind(
        GRAPH_GAP,
        [GAP_THRESHOLD, GAP_YEAR],
        move |inputs: &Inputs| {
            let (low, high) = inputs.pair(0)?;
            let year = inputs.scalar(1)?;
            let rows = filter_eq(&df, "year", year)?;
            let rows = threshold(&rows, "gdpPercap", low, high)?;
            let title = format!("Population sizes, GDP highlight ({year})");
            Ok(render(&rows, &spec)?.with_title(title))
        },
    )?;
    Ok(builder)
}

pub fn iris(df: &DataFrame) -> Result<DashboardBuilder<Figure>> {
    require_columns(df, &IRIS_DIMS).context("iris table")?;
    require_columns(df, &["species"]).context("iris table")?;
    let df = df.clone();

    let mut builder = DashboardBuilder::new();
    builder.widget(
        IRIS_DIMENSIONS,
        Control::multi_dropdown(IRIS_DIMS),
        Value::list(IRIS_DIMS[..2].iter().copied()),
    )?;
    builder.bind(SPLOM, [IRIS_DIMENSIONS], move |inputs: &Inputs| {
        let dimensions = inputs.list(0)?.iter().map(Scalar::to_string).collect();
        let spec = FigureSpec::ScatterMatrix {
            dimensions,
            color: Some("species".into()),
        };
        Ok(render(&df, &spec)?)
    })?;
    Ok(builder)
}
