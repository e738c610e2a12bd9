//! Atomic values, conversion between types, and arithmetic.

pub mod numeric;
pub mod temporal;

use crate::error::XQueryError;
use crate::types::XdmType;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

pub use numeric::NumericValue;

#[derive(Debug, Clone, PartialEq)]
pub enum AtomicValue {
    UntypedAtomic(String),
    String(String),
    Boolean(bool),
    Integer(i64),
    Decimal(Decimal),
    Float(f32),
    Double(f64),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    /// Signed number of months.
    YearMonthDuration(i32),
    DayTimeDuration(TimeDelta),
}

impl AtomicValue {
    pub fn type_of(&self) -> XdmType {
        match self {
            AtomicValue::UntypedAtomic(_) => XdmType::UntypedAtomic,
            AtomicValue::String(_) => XdmType::String,
            AtomicValue::Boolean(_) => XdmType::Boolean,
            AtomicValue::Integer(_) => XdmType::Integer,
            AtomicValue::Decimal(_) => XdmType::Decimal,
            AtomicValue::Float(_) => XdmType::Float,
            AtomicValue::Double(_) => XdmType::Double,
            AtomicValue::Date(_) => XdmType::Date,
            AtomicValue::Time(_) => XdmType::Time,
            AtomicValue::DateTime(_) => XdmType::DateTime,
            AtomicValue::YearMonthDuration(_) => XdmType::YearMonthDuration,
            AtomicValue::DayTimeDuration(_) => XdmType::DayTimeDuration,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            AtomicValue::Integer(_)
                | AtomicValue::Decimal(_)
                | AtomicValue::Float(_)
                | AtomicValue::Double(_)
        )
    }

    /// Whether the value supports `+ - * div` directly.
    pub fn is_computable(&self) -> bool {
        !matches!(
            self,
            AtomicValue::UntypedAtomic(_) | AtomicValue::String(_) | AtomicValue::Boolean(_)
        )
    }

    /// Casts the value to `target`.
    ///
    /// Fails with `FORG0001` when the value has no representation in
    /// `target`, and with `XPTY0004` when no cast between the two types
    /// exists at all.
    pub fn convert_to(&self, target: XdmType) -> Result<AtomicValue, XQueryError> {
        let from = self.type_of();
        if from == target {
            return Ok(self.clone());
        }
        let fail = || XQueryError::invalid_cast(from, target, self.to_string());

        match (self, target) {
            (_, XdmType::String) => Ok(AtomicValue::String(self.to_string())),
            (_, XdmType::UntypedAtomic) => Ok(AtomicValue::UntypedAtomic(self.to_string())),
            (
                _,
                XdmType::Item
                | XdmType::Node
                | XdmType::AnyAtomic
                | XdmType::Number
                | XdmType::Duration,
            ) => Err(XQueryError::type_error(format!(
                "cannot cast to abstract type {target}"
            ))),
            (AtomicValue::String(s) | AtomicValue::UntypedAtomic(s), _) => {
                parse_lexical(s.trim(), target).ok_or_else(fail)
            }
            (AtomicValue::Boolean(b), t) if t.is_numeric() => {
                NumericValue::Integer(*b as i64).convert(t).map(AtomicValue::from)
            }
            (v, XdmType::Boolean) if v.is_numeric() => {
                let n = NumericValue::from_atomic(v).ok_or_else(fail)?;
                Ok(AtomicValue::Boolean(!n.is_zero() && !n.is_nan()))
            }
            (v, t) if v.is_numeric() && t.is_numeric() => {
                let n = NumericValue::from_atomic(v).ok_or_else(fail)?;
                n.convert(t).map(AtomicValue::from)
            }
            (AtomicValue::Date(d), XdmType::DateTime) => {
                Ok(AtomicValue::DateTime(d.and_time(NaiveTime::MIN)))
            }
            (AtomicValue::DateTime(dt), XdmType::Date) => Ok(AtomicValue::Date(dt.date())),
            (AtomicValue::DateTime(dt), XdmType::Time) => Ok(AtomicValue::Time(dt.time())),
            _ => Err(XQueryError::type_error(format!(
                "cannot cast {from} to {target}"
            ))),
        }
    }

    pub fn plus(&self, rhs: &AtomicValue) -> Result<AtomicValue, XQueryError> {
        match (NumericValue::from_atomic(self), NumericValue::from_atomic(rhs)) {
            (Some(a), Some(b)) => a.plus(b).map(AtomicValue::from),
            _ => temporal::plus(self, rhs),
        }
    }

    pub fn minus(&self, rhs: &AtomicValue) -> Result<AtomicValue, XQueryError> {
        match (NumericValue::from_atomic(self), NumericValue::from_atomic(rhs)) {
            (Some(a), Some(b)) => a.minus(b).map(AtomicValue::from),
            _ => temporal::minus(self, rhs),
        }
    }

    pub fn mult(&self, rhs: &AtomicValue) -> Result<AtomicValue, XQueryError> {
        match (NumericValue::from_atomic(self), NumericValue::from_atomic(rhs)) {
            (Some(a), Some(b)) => a.mult(b).map(AtomicValue::from),
            _ => temporal::mult(self, rhs),
        }
    }

    pub fn div(&self, rhs: &AtomicValue) -> Result<AtomicValue, XQueryError> {
        match (NumericValue::from_atomic(self), NumericValue::from_atomic(rhs)) {
            (Some(a), Some(b)) => a.div(b).map(AtomicValue::from),
            _ => temporal::div(self, rhs),
        }
    }
}

fn parse_lexical(s: &str, target: XdmType) -> Option<AtomicValue> {
    let value = match target {
        XdmType::Boolean => match s {
            "true" | "1" => AtomicValue::Boolean(true),
            "false" | "0" => AtomicValue::Boolean(false),
            _ => return None,
        },
        XdmType::Integer => AtomicValue::Integer(s.parse().ok()?),
        XdmType::Decimal => {
            if s.is_empty()
                || !s
                    .chars()
                    .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-'))
            {
                return None;
            }
            AtomicValue::Decimal(Decimal::from_str(s).ok()?)
        }
        XdmType::Float => AtomicValue::Float(parse_float(s)? as f32),
        XdmType::Double => AtomicValue::Double(parse_float(s)?),
        XdmType::Date => AtomicValue::Date(temporal::parse_date(s)?),
        XdmType::Time => AtomicValue::Time(temporal::parse_time(s)?),
        XdmType::DateTime => AtomicValue::DateTime(temporal::parse_date_time(s)?),
        XdmType::YearMonthDuration => {
            AtomicValue::YearMonthDuration(temporal::parse_year_month_duration(s)?)
        }
        XdmType::DayTimeDuration => {
            AtomicValue::DayTimeDuration(temporal::parse_day_time_duration(s)?)
        }
        _ => return None,
    };
    Some(value)
}

/// XML Schema float lexical space: Rust's parser plus `INF`/`-INF`/`NaN`,
/// without Rust's own spellings of infinity and NaN.
fn parse_float(s: &str) -> Option<f64> {
    match s {
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => None,
        _ => s.parse().ok(),
    }
}

fn format_float(f: f64, out: &mut fmt::Formatter<'_>) -> fmt::Result {
    if f.is_nan() {
        out.write_str("NaN")
    } else if f.is_infinite() {
        out.write_str(if f > 0.0 { "INF" } else { "-INF" })
    } else if f == 0.0 && f.is_sign_negative() {
        out.write_str("-0")
    } else {
        write!(out, "{f}")
    }
}

impl fmt::Display for AtomicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtomicValue::UntypedAtomic(s) | AtomicValue::String(s) => f.write_str(s),
            AtomicValue::Boolean(b) => write!(f, "{b}"),
            AtomicValue::Integer(i) => write!(f, "{i}"),
            AtomicValue::Decimal(d) => write!(f, "{}", d.normalize()),
            AtomicValue::Float(x) => format_float(*x as f64, f),
            AtomicValue::Double(x) => format_float(*x, f),
            AtomicValue::Date(d) => f.write_str(&temporal::format_date(d)),
            AtomicValue::Time(t) => f.write_str(&temporal::format_time(t)),
            AtomicValue::DateTime(dt) => f.write_str(&temporal::format_date_time(dt)),
            AtomicValue::YearMonthDuration(m) => {
                f.write_str(&temporal::format_year_month_duration(*m))
            }
            AtomicValue::DayTimeDuration(d) => {
                f.write_str(&temporal::format_day_time_duration(d))
            }
        }
    }
}

impl From<i64> for AtomicValue {
    fn from(i: i64) -> Self {
        AtomicValue::Integer(i)
    }
}

impl From<f64> for AtomicValue {
    fn from(d: f64) -> Self {
        AtomicValue::Double(d)
    }
}

impl From<bool> for AtomicValue {
    fn from(b: bool) -> Self {
        AtomicValue::Boolean(b)
    }
}

impl From<Decimal> for AtomicValue {
    fn from(d: Decimal) -> Self {
        AtomicValue::Decimal(d)
    }
}

impl From<&str> for AtomicValue {
    fn from(s: &str) -> Self {
        AtomicValue::String(s.to_string())
    }
}
