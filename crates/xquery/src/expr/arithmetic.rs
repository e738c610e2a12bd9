use super::{EvalContext, Expression, UntypedValueCheck, atomize_if_necessary};
use crate::error::{SourceLocation, XQueryError};
use crate::op_table;
use crate::sequence::{Item, Sequence};
use crate::types::{XdmType, wider_numeric};
use crate::value::{AtomicValue, NumericValue};
use std::fmt;
use xstore_dom::{DocumentSet, NodeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Plus,
    Minus,
    Mult,
    Div,
    IDiv,
    Mod,
}

impl ArithmeticOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithmeticOp::Plus => "+",
            ArithmeticOp::Minus => "-",
            ArithmeticOp::Mult => "*",
            ArithmeticOp::Div => "div",
            ArithmeticOp::IDiv => "idiv",
            ArithmeticOp::Mod => "mod",
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Outcome of compile-time operand promotion.
///
/// `left` and `right` name the type an operand must be checked against at
/// runtime, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticPromotion {
    pub left: Option<XdmType>,
    pub right: Option<XdmType>,
    pub result: XdmType,
}

/// Promotes operand types of `left op right` before evaluation.
///
/// Two numeric operands meet at the wider type. The narrower side gets a
/// check against it unless the wider type is the generic `Number`. Any other
/// pairing is resolved through the operator table, falling back to
/// `xs:anyAtomicType`.
pub fn promote_static(op: ArithmeticOp, left: XdmType, right: XdmType) -> StaticPromotion {
    if let Some(wider) = wider_numeric(left, right) {
        let check = |t: XdmType| (wider != XdmType::Number && t != wider).then_some(wider);
        let result = match op {
            ArithmeticOp::Div if left == XdmType::Integer && right == XdmType::Integer => {
                XdmType::Decimal
            }
            ArithmeticOp::IDiv => XdmType::Integer,
            _ => wider,
        };
        return StaticPromotion {
            left: check(left),
            right: check(right),
            result,
        };
    }

    let general = |t: XdmType| if t.is_numeric() { XdmType::Number } else { t };
    StaticPromotion {
        left: None,
        right: None,
        result: op_table::lookup(op, general(left), general(right)).unwrap_or(XdmType::AnyAtomic),
    }
}

/// Promotes operand values right before an operation is applied.
///
/// A value that does not support arithmetic is cast to `xs:double`; if that
/// cast fails the operation is a type error. Two numeric values are then
/// brought to the wider of their types.
pub fn promote_runtime(
    left: AtomicValue,
    right: AtomicValue,
) -> Result<(AtomicValue, AtomicValue), XQueryError> {
    let left = computable(left)?;
    let right = computable(right)?;
    match wider_numeric(left.type_of(), right.type_of()) {
        Some(wider) => Ok((left.convert_to(wider)?, right.convert_to(wider)?)),
        None => Ok((left, right)),
    }
}

fn computable(value: AtomicValue) -> Result<AtomicValue, XQueryError> {
    if value.is_computable() {
        return Ok(value);
    }
    value.convert_to(XdmType::Double).map_err(|_| {
        XQueryError::type_error(format!(
            "value '{value}' of type {} cannot be used in arithmetic",
            value.type_of()
        ))
    })
}

fn numeric(value: &AtomicValue, op: ArithmeticOp) -> Result<NumericValue, XQueryError> {
    NumericValue::from_atomic(value).ok_or_else(|| {
        XQueryError::type_error(format!("operator '{op}' is not defined for {}", value.type_of()))
    })
}

/// `left op right` over single atomic values.
#[derive(Debug)]
pub struct ArithmeticExpr {
    op: ArithmeticOp,
    left: Box<dyn Expression>,
    right: Box<dyn Expression>,
    result_type: XdmType,
    location: Option<SourceLocation>,
}

impl ArithmeticExpr {
    pub fn new(op: ArithmeticOp, left: Box<dyn Expression>, right: Box<dyn Expression>) -> Self {
        let left = atomize_if_necessary(left);
        let right = atomize_if_necessary(right);
        let promotion = promote_static(op, left.static_type(), right.static_type());

        let checked = |expr: Box<dyn Expression>, required: Option<XdmType>| match required {
            Some(t) => Box::new(UntypedValueCheck::new(t, expr)) as Box<dyn Expression>,
            None => expr,
        };
        Self {
            op,
            left: checked(left, promotion.left),
            right: checked(right, promotion.right),
            result_type: promotion.result,
            location: None,
        }
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn op(&self) -> ArithmeticOp {
        self.op
    }

    fn operand(&self, seq: Sequence) -> Result<Option<AtomicValue>, XQueryError> {
        match seq.zero_or_one()? {
            None => Ok(None),
            Some(Item::Atomic(value)) => Ok(Some(value.clone())),
            Some(Item::Node(_)) => Err(XQueryError::type_error(format!(
                "operand of '{}' was not atomized",
                self.op
            ))),
        }
    }

    fn eval_operands(
        &self,
        ctx: &EvalContext<'_>,
        docs: &DocumentSet,
        context: &NodeSet,
    ) -> Result<Sequence, XQueryError> {
        let left = self.operand(self.left.eval(ctx, docs, context)?)?;
        let right = self.operand(self.right.eval(ctx, docs, context)?)?;
        match (left, right) {
            (Some(l), Some(r)) => self.apply(l, r).map(Sequence::from),
            _ => Ok(Sequence::empty()),
        }
    }

    /// Applies the operator to two values, promoting them first.
    pub fn apply(&self, left: AtomicValue, right: AtomicValue) -> Result<AtomicValue, XQueryError> {
        let (left, right) = promote_runtime(left, right)?;
        log::trace!("{} {} {}", left, self.op, right);
        match self.op {
            ArithmeticOp::Plus => left.plus(&right),
            ArithmeticOp::Minus => left.minus(&right),
            ArithmeticOp::Mult => left.mult(&right),
            ArithmeticOp::Div => left.div(&right),
            ArithmeticOp::IDiv => numeric(&left, self.op)?
                .idiv(numeric(&right, self.op)?)
                .map(AtomicValue::from),
            ArithmeticOp::Mod => numeric(&left, self.op)?
                .modulo(numeric(&right, self.op)?)
                .map(AtomicValue::from),
        }
    }
}

impl Expression for ArithmeticExpr {
    fn static_type(&self) -> XdmType {
        self.result_type
    }

    fn eval(
        &self,
        ctx: &EvalContext<'_>,
        docs: &DocumentSet,
        context: &NodeSet,
    ) -> Result<Sequence, XQueryError> {
        self.eval_operands(ctx, docs, context)
            .map_err(|e| e.at(self.location))
    }

    fn location(&self) -> Option<SourceLocation> {
        self.location
    }
}

impl fmt::Display for ArithmeticExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvaluatorConfig;
    use crate::expr::{ContextNodes, Literal};
    use chrono::{NaiveDate, TimeDelta};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use xstore_dom::{DocumentId, DocumentRegistry, LevelTable, NodeRef};

    fn eval(expr: &ArithmeticExpr) -> Result<Sequence, XQueryError> {
        let store = DocumentRegistry::new();
        let config = EvaluatorConfig::default();
        let ctx = EvalContext::new(&store, &config);
        expr.eval(&ctx, &DocumentSet::new(), &NodeSet::new())
    }

    fn lit(value: impl Into<AtomicValue>) -> Box<dyn Expression> {
        Box::new(Literal::new(value))
    }

    #[test]
    fn test_promote_static_numeric() {
        let p = promote_static(ArithmeticOp::Plus, XdmType::Integer, XdmType::Double);
        assert_eq!(p.left, Some(XdmType::Double));
        assert_eq!(p.right, None);
        assert_eq!(p.result, XdmType::Double);

        let p = promote_static(ArithmeticOp::Div, XdmType::Integer, XdmType::Integer);
        assert_eq!((p.left, p.right, p.result), (None, None, XdmType::Decimal));

        let p = promote_static(ArithmeticOp::IDiv, XdmType::Double, XdmType::Float);
        assert_eq!(p.right, Some(XdmType::Double));
        assert_eq!(p.result, XdmType::Integer);

        let p = promote_static(ArithmeticOp::Plus, XdmType::Number, XdmType::Integer);
        assert_eq!((p.left, p.right, p.result), (None, None, XdmType::Number));
    }

    #[test]
    fn test_promote_static_table() {
        let p = promote_static(ArithmeticOp::Mult, XdmType::Integer, XdmType::YearMonthDuration);
        assert_eq!(p.result, XdmType::YearMonthDuration);

        let p = promote_static(ArithmeticOp::Plus, XdmType::DayTimeDuration, XdmType::DateTime);
        assert_eq!(p.result, XdmType::DateTime);

        let p = promote_static(ArithmeticOp::Plus, XdmType::AnyAtomic, XdmType::Integer);
        assert_eq!(p.result, XdmType::AnyAtomic);
    }

    #[test]
    fn test_promote_runtime() {
        let (l, r) = promote_runtime(AtomicValue::Integer(1), AtomicValue::Double(2.5)).unwrap();
        assert_eq!((l, r), (AtomicValue::Double(1.0), AtomicValue::Double(2.5)));

        let untyped = AtomicValue::UntypedAtomic("3".into());
        let (l, r) = promote_runtime(untyped, AtomicValue::Integer(1)).unwrap();
        assert_eq!((l, r), (AtomicValue::Double(3.0), AtomicValue::Double(1.0)));

        let months = AtomicValue::YearMonthDuration(2);
        let (l, r) = promote_runtime(AtomicValue::Integer(3), months.clone()).unwrap();
        assert_eq!((l, r), (AtomicValue::Integer(3), months));

        let err = promote_runtime(AtomicValue::from("abc"), AtomicValue::Integer(2)).unwrap_err();
        assert_eq!(err.code(), "XPTY0004");
    }

    #[test]
    fn test_integer_division() {
        let div = ArithmeticExpr::new(ArithmeticOp::Div, lit(7i64), lit(2i64));
        assert_eq!(div.static_type(), XdmType::Decimal);
        assert_eq!(
            eval(&div).unwrap(),
            Sequence::from(AtomicValue::Decimal(Decimal::from_str("3.5").unwrap()))
        );

        let idiv = ArithmeticExpr::new(ArithmeticOp::IDiv, lit(7i64), lit(2i64));
        assert_eq!(idiv.static_type(), XdmType::Integer);
        assert_eq!(eval(&idiv).unwrap(), Sequence::from(AtomicValue::Integer(3)));

        let modulo = ArithmeticExpr::new(ArithmeticOp::Mod, lit(-7i64), lit(2i64));
        assert_eq!(eval(&modulo).unwrap(), Sequence::from(AtomicValue::Integer(-1)));
    }

    #[test]
    fn test_duration_plus_date_time() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();
        let expr = ArithmeticExpr::new(
            ArithmeticOp::Plus,
            lit(AtomicValue::DayTimeDuration(TimeDelta::hours(2))),
            lit(AtomicValue::DateTime(start)),
        );
        assert_eq!(expr.static_type(), XdmType::DateTime);

        let expected = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(1, 0, 0)
            .unwrap();
        assert_eq!(eval(&expr).unwrap(), Sequence::from(AtomicValue::DateTime(expected)));
    }

    #[test]
    fn test_empty_operand_yields_empty() {
        let ops = [
            ArithmeticOp::Plus,
            ArithmeticOp::Minus,
            ArithmeticOp::Mult,
            ArithmeticOp::Div,
            ArithmeticOp::IDiv,
            ArithmeticOp::Mod,
        ];
        for op in ops {
            let left_empty = ArithmeticExpr::new(op, Box::new(ContextNodes), lit(1i64));
            assert!(eval(&left_empty).unwrap().is_empty(), "() {op} 1");

            let right_empty = ArithmeticExpr::new(op, lit(1i64), Box::new(ContextNodes));
            assert!(eval(&right_empty).unwrap().is_empty(), "1 {op} ()");
        }

        let expr = ArithmeticExpr::new(ArithmeticOp::IDiv, lit("abc"), Box::new(ContextNodes));
        assert!(eval(&expr).unwrap().is_empty());
    }

    #[test]
    fn test_string_idiv_is_type_error() {
        let loc = SourceLocation::new(3, 14);
        let expr =
            ArithmeticExpr::new(ArithmeticOp::IDiv, lit("abc"), lit(2i64)).with_location(loc);
        let err = eval(&expr).unwrap_err();
        assert_eq!(err.code(), "XPTY0004");
        assert_eq!(err.location(), Some(loc));
    }

    #[test]
    fn test_division_by_zero() {
        let expr = ArithmeticExpr::new(ArithmeticOp::IDiv, lit(1i64), lit(0i64));
        assert_eq!(eval(&expr).unwrap_err().code(), "FOAR0001");

        let expr = ArithmeticExpr::new(ArithmeticOp::Div, lit(1.0f64), lit(0i64));
        assert_eq!(eval(&expr).unwrap(), Sequence::from(AtomicValue::Double(f64::INFINITY)));
    }

    #[test]
    fn test_node_operands() {
        let doc = DocumentId::new(1);
        let mut store = DocumentRegistry::new();
        store.insert_document(doc, LevelTable::from_orders(&[1, 3]).unwrap());
        store.set_value(doc, 2, "40");
        store.set_value(doc, 3, "x");
        let config = EvaluatorConfig::default();
        let ctx = EvalContext::new(&store, &config);
        let docs = DocumentSet::singleton(doc);

        let expr = ArithmeticExpr::new(ArithmeticOp::Plus, Box::new(ContextNodes), lit(2i64));
        assert_eq!(expr.to_string(), ". + 2");

        let one = NodeSet::singleton(NodeRef::new(doc, 2));
        assert_eq!(
            expr.eval(&ctx, &docs, &one).unwrap(),
            Sequence::from(AtomicValue::Double(42.0))
        );

        let two: NodeSet = [NodeRef::new(doc, 2), NodeRef::new(doc, 3)].into_iter().collect();
        assert!(matches!(
            expr.eval(&ctx, &docs, &two).unwrap_err(),
            XQueryError::Cardinality { actual: 2, .. }
        ));

        let loc = SourceLocation::new(4, 2);
        let located = ArithmeticExpr::new(ArithmeticOp::Plus, Box::new(ContextNodes), lit(1i64))
            .with_location(loc);
        let err = located.eval(&ctx, &docs, &two).unwrap_err();
        assert_eq!(err.code(), "XPTY0004");
        assert_eq!(err.location(), Some(loc));
    }
}
