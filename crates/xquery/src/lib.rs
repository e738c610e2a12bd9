//! Evaluation core of the xstore query engine.
//!
//! Implements the two pieces of query evaluation that depend on static
//! typing: predicate filtering of node sets, whose algorithm is chosen by
//! what the predicate body yields, and the arithmetic operators, whose
//! operand promotion is resolved once at construction and again on the
//! runtime values.
//!
//! # Key Types
//!
//! - [`Expression`]: a compiled expression, as produced by a query compiler
//! - [`Predicate`]: filters a context [`NodeSet`](xstore_dom::NodeSet)
//! - [`ArithmeticExpr`]: `+ - * div idiv mod` with type promotion
//! - [`AtomicValue`] and [`Sequence`]: the values expressions produce
//! - [`EvalContext`]: document store, configuration and cancellation flag
//!
//! # Example
//!
//! ```ignore
//! use xstore_xquery::{EvalContext, EvaluatorConfig, Literal, Predicate};
//!
//! let ctx = EvalContext::new(&registry, &EvaluatorConfig::default());
//! let second = Predicate::new(Box::new(Literal::new(2i64)));
//! let selected = second.evaluate(&ctx, &docs, &context)?;
//! ```

pub mod config;
pub mod error;
pub mod expr;
pub mod op_table;
pub mod sequence;
pub mod types;
pub mod value;

pub use config::EvaluatorConfig;
pub use error::{ArithmeticFault, SourceLocation, XQueryError};
pub use expr::{
    ArithmeticExpr, ArithmeticOp, Atomize, CastableExpr, ChildSelect, ContextNodes,
    DescendantSelect, EvalContext, Expression, FilterExpr, Literal, Predicate, StaticPromotion,
    UntypedValueCheck, atomize_if_necessary, promote_runtime, promote_static,
};
pub use sequence::{Item, Sequence};
pub use types::{ReturnClass, XdmType, wider_numeric};
pub use value::{AtomicValue, NumericValue};
