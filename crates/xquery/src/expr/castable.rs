use super::{EvalContext, Expression, atomize_if_necessary};
use crate::error::{SourceLocation, XQueryError};
use crate::sequence::{Item, Sequence};
use crate::types::XdmType;
use crate::value::AtomicValue;
use std::fmt;
use xstore_dom::{DocumentSet, NodeSet};

/// `expr castable as target` and `expr castable as target?`.
#[derive(Debug)]
pub struct CastableExpr {
    expr: Box<dyn Expression>,
    target: XdmType,
    allow_empty: bool,
    location: Option<SourceLocation>,
}

impl CastableExpr {
    pub fn new(expr: Box<dyn Expression>, target: XdmType, allow_empty: bool) -> Self {
        Self {
            expr: atomize_if_necessary(expr),
            target,
            allow_empty,
            location: None,
        }
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

impl Expression for CastableExpr {
    fn static_type(&self) -> XdmType {
        XdmType::Boolean
    }

    fn eval(
        &self,
        ctx: &EvalContext<'_>,
        docs: &DocumentSet,
        context: &NodeSet,
    ) -> Result<Sequence, XQueryError> {
        let seq = self
            .expr
            .eval(ctx, docs, context)
            .map_err(|e| e.at(self.location))?;
        let castable = match seq.first() {
            None => self.allow_empty,
            Some(Item::Atomic(value)) => match value.convert_to(self.target) {
                Ok(_) => true,
                Err(e) => {
                    log::trace!("{value} is not castable as {}: {e}", self.target);
                    false
                }
            },
            Some(Item::Node(_)) => false,
        };
        Ok(Sequence::from(AtomicValue::Boolean(castable)))
    }

    fn location(&self) -> Option<SourceLocation> {
        self.location
    }
}

impl fmt::Display for CastableExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} castable as {}", self.expr, self.target)?;
        if self.allow_empty {
            f.write_str("?")?;
        }
        Ok(())
    }
}
