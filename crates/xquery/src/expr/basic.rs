use super::{EvalContext, Expression};
use crate::error::{SourceLocation, XQueryError};
use crate::sequence::{Item, Sequence};
use crate::types::XdmType;
use crate::value::AtomicValue;
use std::fmt;
use xstore_dom::{DocumentSet, NodeSet};

/// A constant atomic value.
#[derive(Debug, Clone)]
pub struct Literal {
    value: AtomicValue,
}

impl Literal {
    pub fn new(value: impl Into<AtomicValue>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &AtomicValue {
        &self.value
    }
}

impl Expression for Literal {
    fn static_type(&self) -> XdmType {
        self.value.type_of()
    }

    fn eval(
        &self,
        _: &EvalContext<'_>,
        _: &DocumentSet,
        _: &NodeSet,
    ) -> Result<Sequence, XQueryError> {
        Ok(Sequence::from(self.value.clone()))
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            AtomicValue::String(s) => write!(f, "\"{}\"", s.replace('"', "\"\"")),
            AtomicValue::Integer(_) | AtomicValue::Decimal(_) | AtomicValue::Double(_) => {
                write!(f, "{}", self.value)
            }
            AtomicValue::Boolean(b) => write!(f, "{b}()"),
            other => write!(f, "{}(\"{other}\")", other.type_of()),
        }
    }
}

/// The context nodes themselves (`.`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextNodes;

impl Expression for ContextNodes {
    fn static_type(&self) -> XdmType {
        XdmType::Node
    }

    fn eval(
        &self,
        _: &EvalContext<'_>,
        _: &DocumentSet,
        context: &NodeSet,
    ) -> Result<Sequence, XQueryError> {
        Ok(Sequence::from(context.clone()))
    }
}

impl fmt::Display for ContextNodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(".")
    }
}

/// Replaces every node of the operand's result by its string value as
/// `xs:untypedAtomic`.
#[derive(Debug)]
pub struct Atomize {
    inner: Box<dyn Expression>,
}

impl Atomize {
    pub fn new(inner: Box<dyn Expression>) -> Self {
        Self { inner }
    }
}

impl Expression for Atomize {
    fn static_type(&self) -> XdmType {
        XdmType::AnyAtomic
    }

    fn eval(
        &self,
        ctx: &EvalContext<'_>,
        docs: &DocumentSet,
        context: &NodeSet,
    ) -> Result<Sequence, XQueryError> {
        self.inner
            .eval(ctx, docs, context)?
            .into_iter()
            .map(|item| -> Result<Item, XQueryError> {
                match item {
                    Item::Node(node) => Ok(Item::Atomic(AtomicValue::UntypedAtomic(
                        ctx.store.string_value(&node)?,
                    ))),
                    atomic => Ok(atomic),
                }
            })
            .collect()
    }

    fn location(&self) -> Option<SourceLocation> {
        self.inner.location()
    }
}

// Atomization is implicit in query syntax.
impl fmt::Display for Atomize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

/// Casts `xs:untypedAtomic` results of the operand to a required type and
/// passes every other value through.
#[derive(Debug)]
pub struct UntypedValueCheck {
    required: XdmType,
    inner: Box<dyn Expression>,
}

impl UntypedValueCheck {
    pub fn new(required: XdmType, inner: Box<dyn Expression>) -> Self {
        Self { required, inner }
    }

    pub fn required(&self) -> XdmType {
        self.required
    }
}

impl Expression for UntypedValueCheck {
    fn static_type(&self) -> XdmType {
        self.required
    }

    fn eval(
        &self,
        ctx: &EvalContext<'_>,
        docs: &DocumentSet,
        context: &NodeSet,
    ) -> Result<Sequence, XQueryError> {
        self.inner
            .eval(ctx, docs, context)?
            .into_iter()
            .map(|item| -> Result<Item, XQueryError> {
                match item {
                    Item::Atomic(value @ AtomicValue::UntypedAtomic(_)) => value
                        .convert_to(self.required)
                        .map(Item::Atomic)
                        .map_err(|e| e.at(self.location())),
                    other => Ok(other),
                }
            })
            .collect()
    }

    fn location(&self) -> Option<SourceLocation> {
        self.inner.location()
    }
}

impl fmt::Display for UntypedValueCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}
