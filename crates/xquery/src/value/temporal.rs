//! Lexical forms and arithmetic of dates, times and durations.
//!
//! Values carry no timezone. A year-month duration is a signed month count;
//! a day-time duration is a [`TimeDelta`].

use super::AtomicValue;
use super::numeric::NumericValue;
use crate::error::{ArithmeticFault, XQueryError};
use chrono::{Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use regex::Regex;
use rust_decimal::Decimal;
use std::fmt::Write;
use std::sync::LazyLock;

static YEAR_MONTH_DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-)?P(?:(\d+)Y)?(?:(\d+)M)?$")
        .expect("BUG: invalid YEAR_MONTH_DURATION_RE regex literal")
});

static DAY_TIME_DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-)?P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)(?:\.(\d+))?S)?)?$")
        .expect("BUG: invalid DAY_TIME_DURATION_RE regex literal")
});

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

pub(crate) fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, TIME_FORMAT).ok()
}

pub(crate) fn parse_date_time(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATE_TIME_FORMAT).ok()
}

pub(crate) fn format_date(d: &NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

pub(crate) fn format_time(t: &NaiveTime) -> String {
    t.format(TIME_FORMAT).to_string()
}

pub(crate) fn format_date_time(dt: &NaiveDateTime) -> String {
    dt.format(DATE_TIME_FORMAT).to_string()
}

/// Parses `PnYnM` into a month count.
pub(crate) fn parse_year_month_duration(s: &str) -> Option<i32> {
    let caps = YEAR_MONTH_DURATION_RE.captures(s)?;
    if caps.get(2).is_none() && caps.get(3).is_none() {
        return None;
    }
    let component = |i: usize| -> Option<i32> {
        caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok())
    };
    let months = component(2)?.checked_mul(12)?.checked_add(component(3)?)?;
    Some(if caps.get(1).is_some() { -months } else { months })
}

/// Parses `PnDTnHnMn.nS`.
pub(crate) fn parse_day_time_duration(s: &str) -> Option<TimeDelta> {
    let caps = DAY_TIME_DURATION_RE.captures(s)?;
    if (2..=5).all(|i| caps.get(i).is_none()) || s.ends_with('T') {
        return None;
    }
    let component = |i: usize| -> Option<i64> {
        caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok())
    };
    let seconds = component(2)?
        .checked_mul(86_400)?
        .checked_add(component(3)?.checked_mul(3_600)?)?
        .checked_add(component(4)?.checked_mul(60)?)?
        .checked_add(component(5)?)?;
    let nanos = match caps.get(6) {
        Some(frac) => {
            let digits: String = frac
                .as_str()
                .chars()
                .chain(std::iter::repeat('0'))
                .take(9)
                .collect();
            digits.parse::<u32>().ok()?
        }
        None => 0,
    };
    let delta = TimeDelta::new(seconds, nanos)?;
    Some(if caps.get(1).is_some() { -delta } else { delta })
}

pub(crate) fn format_year_month_duration(months: i32) -> String {
    if months == 0 {
        return "P0M".to_string();
    }
    let mut out = String::new();
    if months < 0 {
        out.push('-');
    }
    out.push('P');
    let abs = months.unsigned_abs();
    let (years, rest) = (abs / 12, abs % 12);
    if years > 0 {
        let _ = write!(out, "{years}Y");
    }
    if rest > 0 {
        let _ = write!(out, "{rest}M");
    }
    out
}

pub(crate) fn format_day_time_duration(delta: &TimeDelta) -> String {
    if delta.is_zero() {
        return "PT0S".to_string();
    }
    let mut out = String::new();
    if *delta < TimeDelta::zero() {
        out.push('-');
    }
    out.push('P');
    let abs = delta.abs();
    let total = abs.num_seconds();
    let nanos = abs.subsec_nanos();
    let (days, hours, minutes, seconds) = (
        total / 86_400,
        total % 86_400 / 3_600,
        total % 3_600 / 60,
        total % 60,
    );
    if days > 0 {
        let _ = write!(out, "{days}D");
    }
    if hours > 0 || minutes > 0 || seconds > 0 || nanos > 0 {
        out.push('T');
        if hours > 0 {
            let _ = write!(out, "{hours}H");
        }
        if minutes > 0 {
            let _ = write!(out, "{minutes}M");
        }
        if nanos > 0 {
            let frac = format!("{nanos:09}");
            let _ = write!(out, "{seconds}.{}S", frac.trim_end_matches('0'));
        } else if seconds > 0 {
            let _ = write!(out, "{seconds}S");
        }
    }
    out
}

fn undefined(op: &str, l: &AtomicValue, r: &AtomicValue) -> XQueryError {
    XQueryError::type_error(format!(
        "operator {op} is not defined for {} and {}",
        l.type_of(),
        r.type_of()
    ))
}

fn add_months(dt: NaiveDateTime, months: i32) -> Result<NaiveDateTime, XQueryError> {
    let shifted = if months >= 0 {
        dt.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        dt.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.ok_or_else(|| XQueryError::overflow("date arithmetic"))
}

fn add_delta(dt: NaiveDateTime, delta: TimeDelta) -> Result<NaiveDateTime, XQueryError> {
    dt.checked_add_signed(delta)
        .ok_or_else(|| XQueryError::overflow("date arithmetic"))
}

fn negate_months(months: i32) -> Result<i32, XQueryError> {
    months
        .checked_neg()
        .ok_or_else(|| XQueryError::overflow("duration negation"))
}

fn midnight(d: NaiveDate) -> NaiveDateTime {
    d.and_time(NaiveTime::MIN)
}

/// Factor of a duration multiplication or division; NaN is rejected.
fn factor(n: &AtomicValue) -> Result<f64, XQueryError> {
    let f = NumericValue::from_atomic(n).map_or(f64::NAN, NumericValue::to_f64);
    if f.is_nan() {
        return Err(XQueryError::arithmetic(
            ArithmeticFault::InvalidOperand,
            "duration factor is NaN",
        ));
    }
    Ok(f)
}

fn scale_months(months: i32, f: f64) -> Result<i32, XQueryError> {
    let scaled = (months as f64 * f + 0.5).floor();
    if !(i32::MIN as f64..=i32::MAX as f64).contains(&scaled) {
        return Err(XQueryError::overflow("xs:yearMonthDuration arithmetic"));
    }
    Ok(scaled as i32)
}

fn scale_delta(delta: &TimeDelta, f: f64) -> Result<TimeDelta, XQueryError> {
    let micros = delta
        .num_microseconds()
        .ok_or_else(|| XQueryError::overflow("xs:dayTimeDuration arithmetic"))?;
    let scaled = (micros as f64 * f).round();
    if !scaled.is_finite() || scaled.abs() >= i64::MAX as f64 {
        return Err(XQueryError::overflow("xs:dayTimeDuration arithmetic"));
    }
    Ok(TimeDelta::microseconds(scaled as i64))
}

fn ratio(a: i64, b: i64) -> Result<AtomicValue, XQueryError> {
    if b == 0 {
        return Err(XQueryError::division_by_zero());
    }
    Decimal::from(a)
        .checked_div(Decimal::from(b))
        .map(AtomicValue::Decimal)
        .ok_or_else(|| XQueryError::overflow("duration division"))
}

pub(super) fn plus(l: &AtomicValue, r: &AtomicValue) -> Result<AtomicValue, XQueryError> {
    use AtomicValue::*;
    match (l, r) {
        (Date(d), YearMonthDuration(m)) | (YearMonthDuration(m), Date(d)) => {
            add_months(midnight(*d), *m).map(|dt| Date(dt.date()))
        }
        (Date(d), DayTimeDuration(t)) | (DayTimeDuration(t), Date(d)) => {
            add_delta(midnight(*d), *t).map(|dt| Date(dt.date()))
        }
        (Time(time), DayTimeDuration(t)) | (DayTimeDuration(t), Time(time)) => {
            Ok(Time(time.overflowing_add_signed(*t).0))
        }
        (DateTime(dt), YearMonthDuration(m)) | (YearMonthDuration(m), DateTime(dt)) => {
            add_months(*dt, *m).map(DateTime)
        }
        (DateTime(dt), DayTimeDuration(t)) | (DayTimeDuration(t), DateTime(dt)) => {
            add_delta(*dt, *t).map(DateTime)
        }
        (YearMonthDuration(a), YearMonthDuration(b)) => a
            .checked_add(*b)
            .map(YearMonthDuration)
            .ok_or_else(|| XQueryError::overflow("xs:yearMonthDuration addition")),
        (DayTimeDuration(a), DayTimeDuration(b)) => a
            .checked_add(b)
            .map(DayTimeDuration)
            .ok_or_else(|| XQueryError::overflow("xs:dayTimeDuration addition")),
        _ => Err(undefined("+", l, r)),
    }
}

pub(super) fn minus(l: &AtomicValue, r: &AtomicValue) -> Result<AtomicValue, XQueryError> {
    use AtomicValue::*;
    match (l, r) {
        (Date(a), Date(b)) => Ok(DayTimeDuration(a.signed_duration_since(*b))),
        (Date(d), YearMonthDuration(m)) => {
            add_months(midnight(*d), negate_months(*m)?).map(|dt| Date(dt.date()))
        }
        (Date(d), DayTimeDuration(t)) => add_delta(midnight(*d), -*t).map(|dt| Date(dt.date())),
        (Time(a), Time(b)) => Ok(DayTimeDuration(a.signed_duration_since(*b))),
        (Time(time), DayTimeDuration(t)) => Ok(Time(time.overflowing_sub_signed(*t).0)),
        (DateTime(a), DateTime(b)) => Ok(DayTimeDuration(a.signed_duration_since(*b))),
        (DateTime(dt), YearMonthDuration(m)) => add_months(*dt, negate_months(*m)?).map(DateTime),
        (DateTime(dt), DayTimeDuration(t)) => add_delta(*dt, -*t).map(DateTime),
        (YearMonthDuration(a), YearMonthDuration(b)) => a
            .checked_sub(*b)
            .map(YearMonthDuration)
            .ok_or_else(|| XQueryError::overflow("xs:yearMonthDuration subtraction")),
        (DayTimeDuration(a), DayTimeDuration(b)) => a
            .checked_sub(b)
            .map(DayTimeDuration)
            .ok_or_else(|| XQueryError::overflow("xs:dayTimeDuration subtraction")),
        _ => Err(undefined("-", l, r)),
    }
}

pub(super) fn mult(l: &AtomicValue, r: &AtomicValue) -> Result<AtomicValue, XQueryError> {
    use AtomicValue::*;
    match (l, r) {
        (YearMonthDuration(m), n) | (n, YearMonthDuration(m)) if n.is_numeric() => {
            scale_months(*m, factor(n)?).map(YearMonthDuration)
        }
        (DayTimeDuration(t), n) | (n, DayTimeDuration(t)) if n.is_numeric() => {
            scale_delta(t, factor(n)?).map(DayTimeDuration)
        }
        _ => Err(undefined("*", l, r)),
    }
}

pub(super) fn div(l: &AtomicValue, r: &AtomicValue) -> Result<AtomicValue, XQueryError> {
    use AtomicValue::*;
    match (l, r) {
        (YearMonthDuration(m), n) if n.is_numeric() => {
            let f = factor(n)?;
            if f == 0.0 {
                return Err(XQueryError::division_by_zero());
            }
            scale_months(*m, 1.0 / f).map(YearMonthDuration)
        }
        (DayTimeDuration(t), n) if n.is_numeric() => {
            let f = factor(n)?;
            if f == 0.0 {
                return Err(XQueryError::division_by_zero());
            }
            scale_delta(t, 1.0 / f).map(DayTimeDuration)
        }
        (YearMonthDuration(a), YearMonthDuration(b)) => ratio(*a as i64, *b as i64),
        (DayTimeDuration(a), DayTimeDuration(b)) => {
            let overflow = || XQueryError::overflow("xs:dayTimeDuration division");
            ratio(
                a.num_microseconds().ok_or_else(overflow)?,
                b.num_microseconds().ok_or_else(overflow)?,
            )
        }
        _ => Err(undefined("div", l, r)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_year_month_duration() {
        assert_eq!(parse_year_month_duration("P1Y2M"), Some(14));
        assert_eq!(parse_year_month_duration("-P3M"), Some(-3));
        assert_eq!(parse_year_month_duration("P0Y"), Some(0));
        assert_eq!(parse_year_month_duration("P"), None);
        assert_eq!(parse_year_month_duration("P1D"), None);
    }

    #[test]
    fn test_parse_day_time_duration() {
        assert_eq!(
            parse_day_time_duration("P1DT2H"),
            Some(TimeDelta::hours(26))
        );
        assert_eq!(
            parse_day_time_duration("PT1.5S"),
            Some(TimeDelta::milliseconds(1_500))
        );
        assert_eq!(
            parse_day_time_duration("-PT30M"),
            Some(TimeDelta::minutes(-30))
        );
        assert_eq!(parse_day_time_duration("P1DT"), None);
        assert_eq!(parse_day_time_duration("P"), None);
        assert_eq!(parse_day_time_duration("P1Y"), None);
    }

    #[test]
    fn test_format_durations() {
        assert_eq!(format_year_month_duration(14), "P1Y2M");
        assert_eq!(format_year_month_duration(-12), "-P1Y");
        assert_eq!(format_year_month_duration(0), "P0M");
        assert_eq!(format_day_time_duration(&TimeDelta::hours(26)), "P1DT2H");
        assert_eq!(format_day_time_duration(&TimeDelta::milliseconds(-1_500)), "-PT1.5S");
        assert_eq!(format_day_time_duration(&TimeDelta::zero()), "PT0S");
    }

    #[test]
    fn test_date_plus_months_clamps_day() {
        let jan31 = AtomicValue::Date(parse_date("2023-01-31").unwrap());
        let r = plus(&jan31, &AtomicValue::YearMonthDuration(1)).unwrap();
        assert_eq!(r, AtomicValue::Date(parse_date("2023-02-28").unwrap()));
    }

    #[test]
    fn test_duration_plus_date_time_is_commutative() {
        let dt = AtomicValue::DateTime(parse_date_time("2024-03-01T10:00:00").unwrap());
        let d = AtomicValue::DayTimeDuration(TimeDelta::hours(15));
        let expected = AtomicValue::DateTime(parse_date_time("2024-03-02T01:00:00").unwrap());
        assert_eq!(plus(&dt, &d).unwrap(), expected);
        assert_eq!(plus(&d, &dt).unwrap(), expected);
    }

    #[test]
    fn test_date_minus_date() {
        let a = AtomicValue::Date(parse_date("2024-03-01").unwrap());
        let b = AtomicValue::Date(parse_date("2024-02-01").unwrap());
        assert_eq!(
            minus(&a, &b).unwrap(),
            AtomicValue::DayTimeDuration(TimeDelta::days(29))
        );
    }

    #[test]
    fn test_time_wraps_around_midnight() {
        let t = AtomicValue::Time(parse_time("23:30:00").unwrap());
        let r = plus(&t, &AtomicValue::DayTimeDuration(TimeDelta::hours(1))).unwrap();
        assert_eq!(r, AtomicValue::Time(parse_time("00:30:00").unwrap()));
    }

    #[test]
    fn test_duration_scaling() {
        let ym = AtomicValue::YearMonthDuration(5);
        assert_eq!(
            mult(&AtomicValue::Double(1.5), &ym).unwrap(),
            AtomicValue::YearMonthDuration(8)
        );
        let dt = AtomicValue::DayTimeDuration(TimeDelta::hours(3));
        assert_eq!(
            div(&dt, &AtomicValue::Integer(2)).unwrap(),
            AtomicValue::DayTimeDuration(TimeDelta::minutes(90))
        );
        assert_eq!(
            div(&dt, &AtomicValue::DayTimeDuration(TimeDelta::hours(2))).unwrap(),
            AtomicValue::Decimal(Decimal::new(15, 1))
        );
    }

    #[test]
    fn test_undefined_combinations() {
        let d = AtomicValue::Date(parse_date("2024-01-01").unwrap());
        assert_eq!(plus(&d, &d).unwrap_err().code(), "XPTY0004");
        assert_eq!(
            mult(&AtomicValue::YearMonthDuration(1), &AtomicValue::Double(f64::NAN))
                .unwrap_err()
                .code(),
            "FOCA0005"
        );
    }
}
