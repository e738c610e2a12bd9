//! Expression nodes and their evaluation context.
//!
//! Parsing and compilation happen elsewhere; this module defines what a
//! compiled expression must expose and implements the nodes the evaluator
//! core needs.

mod arithmetic;
mod basic;
mod castable;
mod predicate;
mod select;

pub use arithmetic::{
    ArithmeticExpr, ArithmeticOp, StaticPromotion, promote_runtime, promote_static,
};
pub use basic::{Atomize, ContextNodes, Literal, UntypedValueCheck};
pub use castable::CastableExpr;
pub use predicate::{FilterExpr, Predicate};
pub use select::{ChildSelect, DescendantSelect};

use crate::config::EvaluatorConfig;
use crate::error::{SourceLocation, XQueryError};
use crate::sequence::Sequence;
use crate::types::{ReturnClass, XdmType};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use xstore_dom::{DocumentSet, DocumentStore, NodeSet};

/// A compiled expression.
///
/// `Display` renders the expression in query syntax.
pub trait Expression: fmt::Debug + fmt::Display + Send + Sync {
    /// Most specific type known before evaluation.
    fn static_type(&self) -> XdmType;

    /// Classification consumed by [`Predicate`].
    fn return_class(&self) -> ReturnClass {
        ReturnClass::of(self.static_type())
    }

    /// Evaluates against `context`, restricted to the documents in `docs`.
    fn eval(
        &self,
        ctx: &EvalContext<'_>,
        docs: &DocumentSet,
        context: &NodeSet,
    ) -> Result<Sequence, XQueryError>;

    fn location(&self) -> Option<SourceLocation> {
        None
    }
}

/// Wraps `expr` in [`Atomize`] unless it already yields atomic values.
pub fn atomize_if_necessary(expr: Box<dyn Expression>) -> Box<dyn Expression> {
    if expr.static_type().is_atomic() {
        expr
    } else {
        Box::new(Atomize::new(expr))
    }
}

/// Everything an expression may consult while evaluating.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub store: &'a dyn DocumentStore,
    pub config: &'a EvaluatorConfig,
    interrupt: Option<&'a AtomicBool>,
    in_predicate: bool,
}

impl<'a> EvalContext<'a> {
    pub fn new(store: &'a dyn DocumentStore, config: &'a EvaluatorConfig) -> Self {
        Self {
            store,
            config,
            interrupt: None,
            in_predicate: false,
        }
    }

    /// Evaluation fails with [`XQueryError::Cancelled`] once `flag` is set.
    /// The flag is polled between per-node evaluations of a predicate.
    pub fn with_interrupt(mut self, flag: &'a AtomicBool) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// Whether selection steps must record context backlinks.
    pub fn in_predicate(&self) -> bool {
        self.in_predicate
    }

    pub fn with_predicate_mode(mut self, on: bool) -> Self {
        self.in_predicate = on;
        self
    }

    pub fn check_interrupt(&self) -> Result<(), XQueryError> {
        if let Some(flag) = self.interrupt
            && flag.load(Ordering::Relaxed)
        {
            return Err(XQueryError::Cancelled);
        }
        Ok(())
    }
}
