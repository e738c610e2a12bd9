//! Static result types of the arithmetic operators.
//!
//! Keys use [`XdmType::Number`] for every numeric operand type; callers
//! generalize before looking up.

use crate::expr::ArithmeticOp;
use crate::types::XdmType;
use std::collections::HashMap;
use std::sync::LazyLock;

use ArithmeticOp::{Div, IDiv, Minus, Mod, Mult, Plus};
use XdmType::{
    Date, DateTime, DayTimeDuration as Dtd, Decimal, Integer, Number as Num, Time,
    YearMonthDuration as Ymd,
};

const ENTRIES: &[(ArithmeticOp, XdmType, XdmType, XdmType)] = &[
    (Plus, Num, Num, Num),
    (Plus, Date, Ymd, Date),
    (Plus, Ymd, Date, Date),
    (Plus, Date, Dtd, Date),
    (Plus, Dtd, Date, Date),
    (Plus, Time, Dtd, Time),
    (Plus, Dtd, Time, Time),
    (Plus, DateTime, Ymd, DateTime),
    (Plus, Ymd, DateTime, DateTime),
    (Plus, DateTime, Dtd, DateTime),
    (Plus, Dtd, DateTime, DateTime),
    (Plus, Ymd, Ymd, Ymd),
    (Plus, Dtd, Dtd, Dtd),
    (Minus, Num, Num, Num),
    (Minus, Date, Date, Dtd),
    (Minus, Date, Ymd, Date),
    (Minus, Date, Dtd, Date),
    (Minus, Time, Time, Dtd),
    (Minus, Time, Dtd, Time),
    (Minus, DateTime, DateTime, Dtd),
    (Minus, DateTime, Ymd, DateTime),
    (Minus, DateTime, Dtd, DateTime),
    (Minus, Ymd, Ymd, Ymd),
    (Minus, Dtd, Dtd, Dtd),
    (Mult, Num, Num, Num),
    (Mult, Ymd, Num, Ymd),
    (Mult, Num, Ymd, Ymd),
    (Mult, Dtd, Num, Dtd),
    (Mult, Num, Dtd, Dtd),
    (IDiv, Num, Num, Integer),
    (Div, Num, Num, Num),
    (Div, Ymd, Num, Ymd),
    (Div, Dtd, Num, Dtd),
    (Div, Ymd, Ymd, Decimal),
    (Div, Dtd, Dtd, Decimal),
    (Mod, Num, Num, Num),
];

static OP_TABLE: LazyLock<HashMap<(ArithmeticOp, XdmType, XdmType), XdmType>> =
    LazyLock::new(|| {
        ENTRIES
            .iter()
            .map(|&(op, a, b, result)| ((op, a, b), result))
            .collect()
    });

/// Result type of `a op b`, `None` when the combination is undefined.
pub fn lookup(op: ArithmeticOp, a: XdmType, b: XdmType) -> Option<XdmType> {
    OP_TABLE.get(&(op, a, b)).copied()
}
