//! Value shapes shared by widgets, the codec and the local engine
//!
//! Session state stores widget values as JSON; these helpers convert between
//! that representation and the typed values widgets report.

use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;

/// ISO date format used on the wire and in session state
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time format used on the wire and in session state
pub const TIME_FORMAT: &str = "%H:%M";

/// Display form of an option value, as sent in a widget's `options` list
pub fn option_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Position of `value` within declared option labels
pub fn option_index(options: &[String], value: &Value) -> Option<usize> {
    let label = option_label(value);
    options.iter().position(|o| *o == label)
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

// ============================================================================
// RANGE VALUE
// ============================================================================

/// Scalar or (low, high) value of a slider
#[derive(Debug, Clone, PartialEq)]
pub enum RangeValue<T> {
    Single(T),
    Range(T, T),
}

impl<T> RangeValue<T> {
    /// 1 for a scalar, 2 for a range
    pub fn arity(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Range(_, _) => 2,
        }
    }

    pub fn as_slice_vec(&self) -> Vec<&T> {
        match self {
            Self::Single(v) => vec![v],
            Self::Range(lo, hi) => vec![lo, hi],
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> RangeValue<U> {
        match self {
            Self::Single(v) => RangeValue::Single(f(v)),
            Self::Range(lo, hi) => RangeValue::Range(f(lo), f(hi)),
        }
    }
}

impl RangeValue<f64> {
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(Self::Single),
            Value::Array(items) => match items.as_slice() {
                [v] => v.as_f64().map(Self::Single),
                [lo, hi] => Some(Self::Range(lo.as_f64()?, hi.as_f64()?)),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [v] => Some(Self::Single(*v)),
            [lo, hi] => Some(Self::Range(*lo, *hi)),
            _ => None,
        }
    }
}

impl RangeValue<Value> {
    /// A two-element array is a range, anything else a scalar option
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Array(items) if items.len() == 2 => {
                Self::Range(items[0].clone(), items[1].clone())
            }
            other => Self::Single(other.clone()),
        }
    }
}

impl<T: Into<Value> + Clone> RangeValue<T> {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Single(v) => v.clone().into(),
            Self::Range(lo, hi) => Value::Array(vec![lo.clone().into(), hi.clone().into()]),
        }
    }
}

// ============================================================================
// DATE VALUE
// ============================================================================

/// Value of a date input: one date, or a (possibly partial) range
#[derive(Debug, Clone, PartialEq)]
pub enum DateValue {
    Single(NaiveDate),
    Range(Vec<NaiveDate>),
}

impl DateValue {
    pub fn dates(&self) -> Vec<NaiveDate> {
        match self {
            Self::Single(d) => vec![*d],
            Self::Range(ds) => ds.clone(),
        }
    }

    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => parse_date(s).map(Self::Single),
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_str().and_then(parse_date))
                .collect::<Option<Vec<_>>>()
                .map(Self::Range),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Single(d) => Value::String(format_date(*d)),
            Self::Range(ds) => Value::Array(
                ds.iter()
                    .map(|d| Value::String(format_date(*d)))
                    .collect(),
            ),
        }
    }
}

impl From<NaiveDate> for DateValue {
    fn from(date: NaiveDate) -> Self {
        Self::Single(date)
    }
}
