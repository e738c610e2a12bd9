//! Numeric values and their arithmetic.
//!
//! Operands of different numeric types are unified to the wider type before
//! every operation: integer < decimal < float < double.

use super::AtomicValue;
use crate::error::{ArithmeticFault, XQueryError};
use crate::types::XdmType;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericValue {
    Integer(i64),
    Decimal(Decimal),
    Float(f32),
    Double(f64),
}

/// Two operands promoted to a common numeric type.
enum Unified {
    Integer(i64, i64),
    Decimal(Decimal, Decimal),
    Float(f32, f32),
    Double(f64, f64),
}

// Bounds of the f64 values that truncate into an i64.
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

impl NumericValue {
    pub fn from_atomic(value: &AtomicValue) -> Option<NumericValue> {
        match value {
            AtomicValue::Integer(i) => Some(NumericValue::Integer(*i)),
            AtomicValue::Decimal(d) => Some(NumericValue::Decimal(*d)),
            AtomicValue::Float(f) => Some(NumericValue::Float(*f)),
            AtomicValue::Double(d) => Some(NumericValue::Double(*d)),
            _ => None,
        }
    }

    pub fn type_of(self) -> XdmType {
        match self {
            NumericValue::Integer(_) => XdmType::Integer,
            NumericValue::Decimal(_) => XdmType::Decimal,
            NumericValue::Float(_) => XdmType::Float,
            NumericValue::Double(_) => XdmType::Double,
        }
    }

    /// Lossy for decimals.
    pub fn to_f64(self) -> f64 {
        match self {
            NumericValue::Integer(i) => i as f64,
            NumericValue::Decimal(d) => d.to_f64().unwrap_or(f64::NAN),
            NumericValue::Float(f) => f as f64,
            NumericValue::Double(d) => d,
        }
    }

    fn to_f32(self) -> f32 {
        match self {
            NumericValue::Integer(i) => i as f32,
            NumericValue::Decimal(d) => d.to_f32().unwrap_or(f32::NAN),
            NumericValue::Float(f) => f,
            NumericValue::Double(d) => d as f32,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            NumericValue::Integer(i) => i == 0,
            NumericValue::Decimal(d) => d.is_zero(),
            NumericValue::Float(f) => f == 0.0,
            NumericValue::Double(d) => d == 0.0,
        }
    }

    pub fn is_nan(self) -> bool {
        match self {
            NumericValue::Float(f) => f.is_nan(),
            NumericValue::Double(d) => d.is_nan(),
            _ => false,
        }
    }

    /// Casts to another numeric type.
    pub fn convert(self, target: XdmType) -> Result<NumericValue, XQueryError> {
        let fail = || {
            XQueryError::invalid_cast(self.type_of(), target, AtomicValue::from(self).to_string())
        };
        let converted = match (self, target) {
            (v, t) if v.type_of() == t => v,
            (NumericValue::Integer(i), XdmType::Decimal) => NumericValue::Decimal(Decimal::from(i)),
            (NumericValue::Decimal(d), XdmType::Integer) => {
                NumericValue::Integer(d.trunc().to_i64().ok_or_else(fail)?)
            }
            (NumericValue::Float(_) | NumericValue::Double(_), XdmType::Integer) => {
                NumericValue::Integer(truncate_to_i64(self.to_f64()).ok_or_else(fail)?)
            }
            (NumericValue::Float(_) | NumericValue::Double(_), XdmType::Decimal) => {
                NumericValue::Decimal(Decimal::from_f64(self.to_f64()).ok_or_else(fail)?)
            }
            (_, XdmType::Float) => NumericValue::Float(self.to_f32()),
            (_, XdmType::Double) => NumericValue::Double(self.to_f64()),
            _ => {
                return Err(XQueryError::type_error(format!(
                    "cannot convert {} to {target}",
                    self.type_of()
                )));
            }
        };
        Ok(converted)
    }

    fn unify(self, other: NumericValue) -> Unified {
        match (self, other) {
            (NumericValue::Double(x), y) => Unified::Double(x, y.to_f64()),
            (y, NumericValue::Double(x)) => Unified::Double(y.to_f64(), x),
            (NumericValue::Float(x), y) => Unified::Float(x, y.to_f32()),
            (y, NumericValue::Float(x)) => Unified::Float(y.to_f32(), x),
            (NumericValue::Decimal(x), NumericValue::Decimal(y)) => Unified::Decimal(x, y),
            (NumericValue::Decimal(x), NumericValue::Integer(y)) => {
                Unified::Decimal(x, Decimal::from(y))
            }
            (NumericValue::Integer(x), NumericValue::Decimal(y)) => {
                Unified::Decimal(Decimal::from(x), y)
            }
            (NumericValue::Integer(x), NumericValue::Integer(y)) => Unified::Integer(x, y),
        }
    }

    pub fn plus(self, rhs: NumericValue) -> Result<NumericValue, XQueryError> {
        match self.unify(rhs) {
            Unified::Integer(a, b) => {
                checked(a.checked_add(b), "xs:integer addition").map(NumericValue::Integer)
            }
            Unified::Decimal(a, b) => {
                checked(a.checked_add(b), "xs:decimal addition").map(NumericValue::Decimal)
            }
            Unified::Float(a, b) => Ok(NumericValue::Float(a + b)),
            Unified::Double(a, b) => Ok(NumericValue::Double(a + b)),
        }
    }

    pub fn minus(self, rhs: NumericValue) -> Result<NumericValue, XQueryError> {
        match self.unify(rhs) {
            Unified::Integer(a, b) => {
                checked(a.checked_sub(b), "xs:integer subtraction").map(NumericValue::Integer)
            }
            Unified::Decimal(a, b) => {
                checked(a.checked_sub(b), "xs:decimal subtraction").map(NumericValue::Decimal)
            }
            Unified::Float(a, b) => Ok(NumericValue::Float(a - b)),
            Unified::Double(a, b) => Ok(NumericValue::Double(a - b)),
        }
    }

    pub fn mult(self, rhs: NumericValue) -> Result<NumericValue, XQueryError> {
        match self.unify(rhs) {
            Unified::Integer(a, b) => {
                checked(a.checked_mul(b), "xs:integer multiplication").map(NumericValue::Integer)
            }
            Unified::Decimal(a, b) => {
                checked(a.checked_mul(b), "xs:decimal multiplication").map(NumericValue::Decimal)
            }
            Unified::Float(a, b) => Ok(NumericValue::Float(a * b)),
            Unified::Double(a, b) => Ok(NumericValue::Double(a * b)),
        }
    }

    /// `div`. Two integers divide into a decimal.
    pub fn div(self, rhs: NumericValue) -> Result<NumericValue, XQueryError> {
        match self.unify(rhs) {
            Unified::Integer(a, b) => {
                if b == 0 {
                    return Err(XQueryError::division_by_zero());
                }
                checked(Decimal::from(a).checked_div(Decimal::from(b)), "xs:decimal division")
                    .map(NumericValue::Decimal)
            }
            Unified::Decimal(a, b) => {
                if b.is_zero() {
                    return Err(XQueryError::division_by_zero());
                }
                checked(a.checked_div(b), "xs:decimal division").map(NumericValue::Decimal)
            }
            Unified::Float(a, b) => Ok(NumericValue::Float(a / b)),
            Unified::Double(a, b) => Ok(NumericValue::Double(a / b)),
        }
    }

    /// `idiv`: division truncated toward zero, always an integer.
    pub fn idiv(self, rhs: NumericValue) -> Result<NumericValue, XQueryError> {
        let quotient = match self.unify(rhs) {
            Unified::Integer(a, b) => {
                if b == 0 {
                    return Err(XQueryError::division_by_zero());
                }
                checked(a.checked_div(b), "xs:integer division")?
            }
            Unified::Decimal(a, b) => {
                if b.is_zero() {
                    return Err(XQueryError::division_by_zero());
                }
                let q = checked(a.checked_div(b), "xs:decimal division")?;
                checked(q.trunc().to_i64(), "integer division")?
            }
            Unified::Float(a, b) => float_idiv(a as f64, b as f64)?,
            Unified::Double(a, b) => float_idiv(a, b)?,
        };
        Ok(NumericValue::Integer(quotient))
    }

    /// `mod`: remainder carrying the sign of the dividend.
    pub fn modulo(self, rhs: NumericValue) -> Result<NumericValue, XQueryError> {
        match self.unify(rhs) {
            Unified::Integer(a, b) => {
                if b == 0 {
                    return Err(XQueryError::division_by_zero());
                }
                Ok(NumericValue::Integer(a.wrapping_rem(b)))
            }
            Unified::Decimal(a, b) => {
                if b.is_zero() {
                    return Err(XQueryError::division_by_zero());
                }
                checked(a.checked_rem(b), "xs:decimal modulus").map(NumericValue::Decimal)
            }
            Unified::Float(a, b) => Ok(NumericValue::Float(a % b)),
            Unified::Double(a, b) => Ok(NumericValue::Double(a % b)),
        }
    }
}

impl From<NumericValue> for AtomicValue {
    fn from(value: NumericValue) -> Self {
        match value {
            NumericValue::Integer(i) => AtomicValue::Integer(i),
            NumericValue::Decimal(d) => AtomicValue::Decimal(d),
            NumericValue::Float(f) => AtomicValue::Float(f),
            NumericValue::Double(d) => AtomicValue::Double(d),
        }
    }
}

fn checked<T>(value: Option<T>, operation: &str) -> Result<T, XQueryError> {
    value.ok_or_else(|| XQueryError::overflow(operation))
}

fn float_idiv(a: f64, b: f64) -> Result<i64, XQueryError> {
    if b == 0.0 {
        return Err(XQueryError::division_by_zero());
    }
    if a.is_nan() || b.is_nan() || a.is_infinite() {
        return Err(XQueryError::arithmetic(
            ArithmeticFault::Overflow,
            "idiv operand is NaN or infinite",
        ));
    }
    truncate_to_i64(a / b).ok_or_else(|| XQueryError::overflow("integer division"))
}

fn truncate_to_i64(value: f64) -> Option<i64> {
    let t = value.trunc();
    (t >= I64_LOWER && t < I64_UPPER).then_some(t as i64)
}
