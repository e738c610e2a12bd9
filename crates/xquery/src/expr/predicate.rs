//! Predicate evaluation: filtering a context node set by a sub-expression.
//!
//! The selection algorithm depends on what the predicate body yields:
//!
//! - **nodes**: the body runs once over the whole context in predicate mode;
//!   every result node points back at the context ancestors it was reached
//!   from, and those ancestors are selected.
//! - **a number**: the body is a position. It runs once per context node,
//!   and the node at that position among its siblings (in the context) is
//!   selected.
//! - **anything else**: the body runs once per context node and the node is
//!   kept if the effective boolean value is true.

use super::{EvalContext, Expression};
use crate::error::{SourceLocation, XQueryError};
use crate::sequence::{Item, Sequence};
use crate::types::{ReturnClass, XdmType};
use crate::value::AtomicValue;
use std::fmt;
use std::ops::Range;
use std::time::Instant;
use xstore_dom::{DocumentId, DocumentSet, Gid, NodeRef, NodeSet, level_of, sibling_range_of};

/// A predicate `[body]` applied to a context node set.
#[derive(Debug)]
pub struct Predicate {
    body: Box<dyn Expression>,
    location: Option<SourceLocation>,
}

impl Predicate {
    pub fn new(body: Box<dyn Expression>) -> Self {
        Self {
            body,
            location: None,
        }
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn body(&self) -> &dyn Expression {
        self.body.as_ref()
    }

    /// Filters `context` by the predicate body.
    ///
    /// `docs` scopes a node-yielding body, which runs once over the whole
    /// context. Every other body runs per node, scoped to that node's
    /// document.
    pub fn evaluate(
        &self,
        ctx: &EvalContext<'_>,
        docs: &DocumentSet,
        context: &NodeSet,
    ) -> Result<NodeSet, XQueryError> {
        let started = Instant::now();
        let class = self.body.return_class();
        let result = match class {
            ReturnClass::NodeSet => self.select_by_backlinks(ctx, docs, context),
            ReturnClass::Numeric => self.select_by_position(ctx, context),
            ReturnClass::Boolean | ReturnClass::String | ReturnClass::OtherAtomic => {
                self.select_by_truth(ctx, context)
            }
        }
        .map_err(|e| e.at(self.location))?;

        if ctx.config.log_timings {
            log::debug!(
                "predicate {self} ({class:?}) found {} of {} in {:?}",
                result.len(),
                context.len(),
                started.elapsed()
            );
        }
        Ok(result)
    }

    fn select_by_backlinks(
        &self,
        ctx: &EvalContext<'_>,
        docs: &DocumentSet,
        context: &NodeSet,
    ) -> Result<NodeSet, XQueryError> {
        ctx.check_interrupt()?;
        let found = self
            .body
            .eval(&ctx.with_predicate_mode(true), docs, context)?
            .into_node_set()?;

        let mut result = NodeSet::new();
        for node in &found {
            let Some(links) = node.context().filter(|links| !links.is_empty()) else {
                log::warn!(
                    "node {} of document {} was selected without a context backlink, skipping it",
                    node.gid,
                    node.doc
                );
                continue;
            };
            for &ancestor in links {
                if let Some(parent) = context.get(node.doc, ancestor) {
                    let mut parent = parent.clone();
                    parent.add_matches(&node.matches);
                    result.add(parent);
                }
            }
        }
        Ok(result)
    }

    fn select_by_truth(
        &self,
        ctx: &EvalContext<'_>,
        context: &NodeSet,
    ) -> Result<NodeSet, XQueryError> {
        let inner = ctx.with_predicate_mode(false);
        let mut result = NodeSet::new();
        for node in context {
            ctx.check_interrupt()?;
            if self.eval_single(&inner, node)?.effective_boolean_value()? {
                result.add(node.clone());
            }
        }
        Ok(result)
    }

    fn select_by_position(
        &self,
        ctx: &EvalContext<'_>,
        context: &NodeSet,
    ) -> Result<NodeSet, XQueryError> {
        let inner = ctx.with_predicate_mode(false);
        let mut result = NodeSet::new();
        let mut last_group: Option<(DocumentId, Gid, u64)> = None;

        for node in context {
            ctx.check_interrupt()?;
            let Some(pos) = position(&self.eval_single(&inner, node)?)? else {
                continue;
            };
            let group = sibling_group(ctx, node)?;

            // Consecutive siblings asking for the same position select the
            // same node.
            let group_start = group.as_ref().map_or(node.gid, |g| g.start);
            let key = (node.doc, group_start, pos.to_bits());
            if ctx.config.memoize_sibling_groups && last_group == Some(key) {
                continue;
            }
            last_group = Some(key);

            let Some(index) = as_index(pos) else {
                continue;
            };
            let selected = match group {
                Some(group) => context.range_iter(node.doc, group.start, group.end).nth(index),
                None => (index == 0).then_some(node),
            };
            if let Some(sibling) = selected {
                result.add(sibling.clone());
            }
        }
        Ok(result)
    }

    fn eval_single(&self, ctx: &EvalContext<'_>, node: &NodeRef) -> Result<Sequence, XQueryError> {
        self.body.eval(
            ctx,
            &DocumentSet::singleton(node.doc),
            &NodeSet::singleton(node.clone()),
        )
    }
}

/// The GIDs `node` shares with its siblings, `None` for a root, which is
/// alone in its group.
fn sibling_group(ctx: &EvalContext<'_>, node: &NodeRef) -> Result<Option<Range<Gid>>, XQueryError> {
    let table = ctx.store.level_table(node.doc)?;
    if level_of(table, node.gid)? == 0 {
        return Ok(None);
    }
    Ok(Some(sibling_range_of(table, node.gid)?))
}

/// Position requested by one evaluation of a numeric predicate body, which
/// must yield at most one item.
fn position(seq: &Sequence) -> Result<Option<f64>, XQueryError> {
    match seq.zero_or_one()? {
        None => Ok(None),
        Some(Item::Atomic(value)) => match value.convert_to(XdmType::Double)? {
            AtomicValue::Double(pos) => Ok(Some(pos)),
            other => Err(XQueryError::type_error(format!(
                "expected a numeric position, found {}",
                other.type_of()
            ))),
        },
        Some(Item::Node(_)) => Err(XQueryError::type_error(
            "expected a numeric position, found a node",
        )),
    }
}

/// Zero-based index for a one-based position; non-integral positions and
/// positions below one select nothing.
fn as_index(pos: f64) -> Option<usize> {
    if pos.fract() != 0.0 || pos < 1.0 || pos > usize::MAX as f64 {
        return None;
    }
    Some(pos as usize - 1)
}

impl Expression for Predicate {
    fn static_type(&self) -> XdmType {
        XdmType::Node
    }

    fn eval(
        &self,
        ctx: &EvalContext<'_>,
        docs: &DocumentSet,
        context: &NodeSet,
    ) -> Result<Sequence, XQueryError> {
        self.evaluate(ctx, docs, context).map(Sequence::from)
    }

    fn location(&self) -> Option<SourceLocation> {
        self.location
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.body)
    }
}

/// A node-yielding expression followed by predicates, applied left to right.
#[derive(Debug)]
pub struct FilterExpr {
    base: Box<dyn Expression>,
    predicates: Vec<Predicate>,
}

impl FilterExpr {
    pub fn new(base: Box<dyn Expression>) -> Self {
        Self {
            base,
            predicates: Vec::new(),
        }
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }
}

impl Expression for FilterExpr {
    fn static_type(&self) -> XdmType {
        self.base.static_type()
    }

    fn eval(
        &self,
        ctx: &EvalContext<'_>,
        docs: &DocumentSet,
        context: &NodeSet,
    ) -> Result<Sequence, XQueryError> {
        let mut nodes = self.base.eval(ctx, docs, context)?.into_node_set()?;
        for predicate in &self.predicates {
            if nodes.is_empty() {
                break;
            }
            nodes = predicate.evaluate(ctx, docs, &nodes)?;
        }
        Ok(Sequence::from(nodes))
    }

    fn location(&self) -> Option<SourceLocation> {
        self.base.location()
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        for predicate in &self.predicates {
            write!(f, "{predicate}")?;
        }
        Ok(())
    }
}
