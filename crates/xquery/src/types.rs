//! Static type lattice used for operator resolution and predicate dispatch.

use std::fmt;

/// Static type of an expression or runtime type of a value.
///
/// `Item`, `AnyAtomic`, `Number` and `Duration` are abstract: no value has
/// them as its runtime type, but expressions may when nothing more precise
/// is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XdmType {
    Item,
    Node,
    AnyAtomic,
    UntypedAtomic,
    String,
    Boolean,
    Number,
    Decimal,
    Integer,
    Float,
    Double,
    Date,
    Time,
    DateTime,
    Duration,
    YearMonthDuration,
    DayTimeDuration,
}

impl XdmType {
    /// Direct supertype; `None` only for `Item`.
    pub fn parent(self) -> Option<XdmType> {
        use XdmType::*;
        Some(match self {
            Item => return None,
            Node | AnyAtomic => Item,
            UntypedAtomic | String | Boolean | Number | Date | Time | DateTime | Duration => {
                AnyAtomic
            }
            Decimal | Float | Double => Number,
            Integer => Decimal,
            YearMonthDuration | DayTimeDuration => Duration,
        })
    }

    /// Reflexive subtype test.
    pub fn subtype_of(self, other: XdmType) -> bool {
        let mut current = Some(self);
        while let Some(t) = current {
            if t == other {
                return true;
            }
            current = t.parent();
        }
        false
    }

    pub fn is_atomic(self) -> bool {
        self.subtype_of(XdmType::AnyAtomic)
    }

    pub fn is_numeric(self) -> bool {
        self.subtype_of(XdmType::Number)
    }

    /// Position in the numeric promotion order. The generic `Number` ranks
    /// above every concrete numeric type since it may stand for any of them.
    fn numeric_rank(self) -> Option<u8> {
        match self {
            XdmType::Integer => Some(1),
            XdmType::Decimal => Some(2),
            XdmType::Float => Some(3),
            XdmType::Double => Some(4),
            XdmType::Number => Some(5),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        use XdmType::*;
        match self {
            Item => "item()",
            Node => "node()",
            AnyAtomic => "xs:anyAtomicType",
            UntypedAtomic => "xs:untypedAtomic",
            String => "xs:string",
            Boolean => "xs:boolean",
            Number => "numeric",
            Decimal => "xs:decimal",
            Integer => "xs:integer",
            Float => "xs:float",
            Double => "xs:double",
            Date => "xs:date",
            Time => "xs:time",
            DateTime => "xs:dateTime",
            Duration => "xs:duration",
            YearMonthDuration => "xs:yearMonthDuration",
            DayTimeDuration => "xs:dayTimeDuration",
        }
    }
}

impl fmt::Display for XdmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The wider of two numeric types, or `None` if either is not numeric.
///
/// Shared by the static and the runtime promotion of arithmetic operands.
pub fn wider_numeric(a: XdmType, b: XdmType) -> Option<XdmType> {
    let (ra, rb) = (a.numeric_rank()?, b.numeric_rank()?);
    Some(if ra >= rb { a } else { b })
}

/// Coarse classification of what an expression yields, as consumed by the
/// predicate evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnClass {
    NodeSet,
    Boolean,
    String,
    Numeric,
    OtherAtomic,
}

impl ReturnClass {
    pub fn of(t: XdmType) -> ReturnClass {
        match t {
            XdmType::Node => ReturnClass::NodeSet,
            XdmType::Boolean => ReturnClass::Boolean,
            XdmType::String | XdmType::UntypedAtomic => ReturnClass::String,
            t if t.is_numeric() => ReturnClass::Numeric,
            _ => ReturnClass::OtherAtomic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtype_chain() {
        assert!(XdmType::Integer.subtype_of(XdmType::Decimal));
        assert!(XdmType::Integer.subtype_of(XdmType::Number));
        assert!(XdmType::Integer.subtype_of(XdmType::Item));
        assert!(!XdmType::Decimal.subtype_of(XdmType::Integer));
        assert!(!XdmType::Float.subtype_of(XdmType::Decimal));
        assert!(XdmType::DayTimeDuration.subtype_of(XdmType::Duration));
        assert!(!XdmType::Node.is_atomic());
        assert!(XdmType::UntypedAtomic.is_atomic());
        assert!(!XdmType::UntypedAtomic.is_numeric());
    }

    #[test]
    fn test_wider_numeric() {
        use XdmType::*;
        assert_eq!(wider_numeric(Integer, Decimal), Some(Decimal));
        assert_eq!(wider_numeric(Float, Decimal), Some(Float));
        assert_eq!(wider_numeric(Double, Float), Some(Double));
        assert_eq!(wider_numeric(Integer, Integer), Some(Integer));
        assert_eq!(wider_numeric(Integer, Number), Some(Number));
        assert_eq!(wider_numeric(Integer, String), None);
    }

    #[test]
    fn test_return_class() {
        assert_eq!(ReturnClass::of(XdmType::Node), ReturnClass::NodeSet);
        assert_eq!(ReturnClass::of(XdmType::Integer), ReturnClass::Numeric);
        assert_eq!(ReturnClass::of(XdmType::Number), ReturnClass::Numeric);
        assert_eq!(ReturnClass::of(XdmType::UntypedAtomic), ReturnClass::String);
        assert_eq!(ReturnClass::of(XdmType::Date), ReturnClass::OtherAtomic);
        assert_eq!(ReturnClass::of(XdmType::Item), ReturnClass::OtherAtomic);
    }
}
