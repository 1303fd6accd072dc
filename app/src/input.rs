use clap::ValueEnum;
use dashflow::data::TableFormat;
use dashflow::{Control, Scalar, Value};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    Csv,
    Parquet,
}

impl From<InputFormat> for TableFormat {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Csv => TableFormat::Csv,
            InputFormat::Parquet => TableFormat::Parquet,
        }
    }
}

/// A `widget=value` pair from the command line, value still unparsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub widget: String,
    pub raw: String,
}

pub fn parse_assignment(raw: &str) -> Result<Assignment, String> {
    let (widget, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected widget=value, got '{raw}'"))?;
    let widget = widget.trim();
    if widget.is_empty() {
        return Err(format!("missing widget name in '{raw}'"));
    }
    Ok(Assignment {
        widget: widget.to_string(),
        raw: value.trim().to_string(),
    })
}

/// Reads user text as a value of the control's kind. Domain checks are left
/// to the registry.
pub fn parse_value(control: &Control, raw: &str) -> Result<Value, String> {
    let raw = raw.trim();
    match control {
        Control::Dropdown { options } => Ok(Value::Scalar(match_option(options, raw))),
        Control::MultiDropdown { options } => Ok(Value::List(
            raw.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| match_option(options, item))
                .collect(),
        )),
        Control::Slider { .. } => parse_number(raw).map(Value::Scalar),
        Control::RangeSlider { .. } => {
            let (low, high) = raw
                .split_once("..")
                .or_else(|| raw.split_once(','))
                .ok_or_else(|| format!("expected low,high or low..high, got '{raw}'"))?;
            Ok(Value::pair(parse_f64(low)?, parse_f64(high)?))
        }
        Control::Text => Ok(Value::Scalar(Scalar::Text(raw.to_string()))),
    }
}

fn match_option(options: &[Scalar], raw: &str) -> Scalar {
    options
        .iter()
        .find(|option| option.to_string() == raw)
        .cloned()
        .unwrap_or_else(|| parse_scalar(raw))
}

fn parse_scalar(raw: &str) -> Scalar {
    if let Ok(v) = raw.parse::<i64>() {
        return Scalar::Int(v);
    }
    if let Ok(v) = raw.parse::<f64>() {
        return Scalar::Float(v);
    }
    match raw {
        "true" => Scalar::Bool(true),
        "false" => Scalar::Bool(false),
        _ => Scalar::Text(raw.to_string()),
    }
}

fn parse_number(raw: &str) -> Result<Scalar, String> {
    match parse_scalar(raw) {
        number @ (Scalar::Int(_) | Scalar::Float(_)) => Ok(number),
        _ => Err(format!("invalid number: {raw}")),
    }
}

fn parse_f64(raw: &str) -> Result<f64, String> {
    let raw = raw.trim();
    raw.parse::<f64>()
        .map_err(|_| format!("invalid number: {raw}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments() {
        assert_eq!(
            parse_assignment("gap-year = 2007").unwrap(),
            Assignment {
                widget: "gap-year".into(),
                raw: "2007".into(),
            }
        );
        assert!(parse_assignment("gap-year").is_err());
        assert!(parse_assignment("=2007").is_err());
    }

    #[test]
    fn dropdown_matches_offered_option_text() {
        let years = Control::dropdown([1952_i64, 2007]);
        assert_eq!(parse_value(&years, "2007").unwrap(), Value::from(2007_i64));

        let labels = Control::dropdown(["1952", "2007"]);
        assert_eq!(parse_value(&labels, "2007").unwrap(), Value::from("2007"));

        assert_eq!(parse_value(&years, "1999").unwrap(), Value::from(1999_i64));
    }

    #[test]
    fn lists_and_pairs() {
        let dims = Control::multi_dropdown(["sepal_length", "petal_width"]);
        assert_eq!(
            parse_value(&dims, "sepal_length, petal_width").unwrap(),
            Value::list(["sepal_length", "petal_width"])
        );
        assert_eq!(parse_value(&dims, "").unwrap(), Value::List(Vec::new()));

        let range = Control::RangeSlider {
            min: -10.0,
            max: 10.0,
        };
        assert_eq!(parse_value(&range, "10,-5").unwrap(), Value::pair(10.0, -5.0));
        assert_eq!(parse_value(&range, "-1..2.5").unwrap(), Value::pair(-1.0, 2.5));
        assert!(parse_value(&range, "3").is_err());
    }

    #[test]
    fn sliders_need_numbers() {
        let slider = Control::Slider { min: 0.0, max: 1.0 };
        assert_eq!(parse_value(&slider, "0.5").unwrap(), Value::from(0.5));
        assert!(parse_value(&slider, "half").is_err());
        assert_eq!(parse_value(&Control::Text, " Asia ").unwrap(), Value::from("Asia"));
    }
}
