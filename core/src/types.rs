use std::borrow::Borrow;
use std::fmt;

use serde::Serialize;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&$name> for $name {
            fn from(value: &$name) -> Self {
                value.clone()
            }
        }
    };
}

string_id!(WidgetId);
string_id!(OutputId);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl Scalar {
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Scalar::Int(v) => Some(v as f64),
            Scalar::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Text(v) => f.write_str(v),
            Scalar::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Scalar,
    List,
    Pair,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Scalar => "scalar",
            ValueKind::List => "list",
            ValueKind::Pair => "pair",
        };
        f.write_str(name)
    }
}

/// Current value of a widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(Scalar),
    List(Vec<Scalar>),
    Pair(f64, f64),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Scalar(_) => ValueKind::Scalar,
            Value::List(_) => ValueKind::List,
            Value::Pair(..) => ValueKind::Pair,
        }
    }

    pub fn pair(low: f64, high: f64) -> Self {
        Value::Pair(low, high)
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Scalar>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => write!(f, "{s}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Pair(low, high) => write!(f, "[{low}, {high}]"),
        }
    }
}

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        Value::Scalar(value)
    }
}

macro_rules! scalar_value_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Scalar(value.into())
                }
            }
        )*
    };
}

scalar_value_from!(i64, f64, &str, String, bool);

/// Declared kind and domain of an input control.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Dropdown { options: Vec<Scalar> },
    MultiDropdown { options: Vec<Scalar> },
    Slider { min: f64, max: f64 },
    RangeSlider { min: f64, max: f64 },
    Text,
}

/// Why a value was refused by a control.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    Kind { expected: ValueKind, found: ValueKind },
    Domain(String),
}

impl Control {
    pub fn dropdown<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Scalar>,
    {
        Control::Dropdown {
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    pub fn multi_dropdown<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Scalar>,
    {
        Control::MultiDropdown {
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Control::Dropdown { .. } | Control::Slider { .. } | Control::Text => ValueKind::Scalar,
            Control::MultiDropdown { .. } => ValueKind::List,
            Control::RangeSlider { .. } => ValueKind::Pair,
        }
    }

    pub fn options(&self) -> Option<&[Scalar]> {
        match self {
            Control::Dropdown { options } | Control::MultiDropdown { options } => Some(options),
            _ => None,
        }
    }

    pub fn validate(&self, value: &Value) -> Result<(), Rejection> {
        let expected = self.kind();
        let found = value.kind();
        if expected != found {
            return Err(Rejection::Kind { expected, found });
        }

        match (self, value) {
            (Control::Dropdown { options }, Value::Scalar(s)) => {
                if options.contains(s) {
                    Ok(())
                } else {
                    Err(Rejection::Domain(format!("'{s}' is not an offered option")))
                }
            }
            (Control::MultiDropdown { options }, Value::List(items)) => {
                match items.iter().find(|item| !options.contains(item)) {
                    Some(item) => Err(Rejection::Domain(format!(
                        "'{item}' is not an offered option"
                    ))),
                    None => Ok(()),
                }
            }
            (Control::Slider { min, max }, Value::Scalar(s)) => {
                let v = s.as_f64().ok_or_else(|| {
                    Rejection::Domain(format!("slider expects a number, got '{s}'"))
                })?;
                check_within(v, *min, *max)
            }
            (Control::RangeSlider { min, max }, Value::Pair(low, high)) => {
                if low > high {
                    return Err(Rejection::Domain(format!(
                        "low > high (low={low}, high={high})"
                    )));
                }
                check_within(*low, *min, *max)?;
                check_within(*high, *min, *max)
            }
            (Control::Text, Value::Scalar(Scalar::Text(_))) => Ok(()),
            (Control::Text, Value::Scalar(s)) => Err(Rejection::Domain(format!(
                "text input expects text, got '{s}'"
            ))),
            _ => Err(Rejection::Kind { expected, found }),
        }
    }
}

fn check_within(v: f64, min: f64, max: f64) -> Result<(), Rejection> {
    if v.is_nan() || v < min || v > max {
        return Err(Rejection::Domain(format!(
            "{v} is outside [{min}, {max}]"
        )));
    }
    Ok(())
}

/// A named input control and its current value.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub id: WidgetId,
    pub control: Control,
    pub value: Value,
}

/// Notification that a widget's value has been committed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub widget: WidgetId,
    pub value: Value,
}

impl ChangeEvent {
    pub fn new(widget: impl Into<WidgetId>, value: impl Into<Value>) -> Self {
        Self {
            widget: widget.into(),
            value: value.into(),
        }
    }
}
