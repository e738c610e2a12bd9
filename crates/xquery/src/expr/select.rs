//! Structural joins between the context and a precomputed candidate set.
//!
//! Candidates typically come from an index lookup by name. Ancestry is
//! decided from GIDs alone, so no document is loaded.

use super::{EvalContext, Expression};
use crate::error::XQueryError;
use crate::sequence::Sequence;
use crate::types::XdmType;
use std::fmt;
use xstore_dom::{DocumentSet, Gid, NodeRef, NodeSet, level_of, parent_of};

/// A copy of `candidate` ready to be returned from a selection step.
fn selected(candidate: &NodeRef) -> NodeRef {
    let mut node = candidate.clone();
    node.clear_context();
    node
}

/// `child::name`: candidates whose parent is a context node.
#[derive(Debug)]
pub struct ChildSelect {
    name: String,
    candidates: NodeSet,
}

impl ChildSelect {
    pub fn new(name: impl Into<String>, candidates: NodeSet) -> Self {
        Self {
            name: name.into(),
            candidates,
        }
    }
}

impl Expression for ChildSelect {
    fn static_type(&self) -> XdmType {
        XdmType::Node
    }

    fn eval(
        &self,
        ctx: &EvalContext<'_>,
        docs: &DocumentSet,
        context: &NodeSet,
    ) -> Result<Sequence, XQueryError> {
        let mut result = NodeSet::new();
        for candidate in self.candidates.iter().filter(|c| docs.contains(c.doc)) {
            let table = ctx.store.level_table(candidate.doc)?;
            if level_of(table, candidate.gid)? == 0 {
                continue;
            }
            let parent = parent_of(table, candidate.gid)?;
            if !context.contains_key(candidate.doc, parent) {
                continue;
            }
            let mut node = selected(candidate);
            if ctx.in_predicate() {
                node.add_context(parent);
            }
            result.add(node);
        }
        Ok(Sequence::from(result))
    }
}

impl fmt::Display for ChildSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "child::{}", self.name)
    }
}

/// `descendant::name`: candidates with at least one context node among
/// their ancestors.
#[derive(Debug)]
pub struct DescendantSelect {
    name: String,
    candidates: NodeSet,
}

impl DescendantSelect {
    pub fn new(name: impl Into<String>, candidates: NodeSet) -> Self {
        Self {
            name: name.into(),
            candidates,
        }
    }
}

impl Expression for DescendantSelect {
    fn static_type(&self) -> XdmType {
        XdmType::Node
    }

    fn eval(
        &self,
        ctx: &EvalContext<'_>,
        docs: &DocumentSet,
        context: &NodeSet,
    ) -> Result<Sequence, XQueryError> {
        let mut result = NodeSet::new();
        for candidate in self.candidates.iter().filter(|c| docs.contains(c.doc)) {
            let table = ctx.store.level_table(candidate.doc)?;
            let mut ancestors: Vec<Gid> = Vec::new();
            let mut gid = candidate.gid;
            while level_of(table, gid)? > 0 {
                gid = parent_of(table, gid)?;
                if context.contains_key(candidate.doc, gid) {
                    ancestors.push(gid);
                    // Outside predicate mode the nearest match decides.
                    if !ctx.in_predicate() {
                        break;
                    }
                }
            }
            if ancestors.is_empty() {
                continue;
            }
            let mut node = selected(candidate);
            if ctx.in_predicate() {
                for ancestor in ancestors {
                    node.add_context(ancestor);
                }
            }
            result.add(node);
        }
        Ok(Sequence::from(result))
    }
}

impl fmt::Display for DescendantSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "descendant::{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvaluatorConfig;
    use crate::sequence::Item;
    use xstore_dom::{DocumentId, DocumentRegistry, LevelTable};

    // root(1) -> children 2..5 -> grandchildren 5..11
    fn store(doc: DocumentId) -> DocumentRegistry {
        let mut store = DocumentRegistry::new();
        store.insert_document(doc, LevelTable::from_orders(&[1, 3, 2]).unwrap());
        store
    }

    fn nodes(seq: Sequence) -> Vec<NodeRef> {
        seq.into_iter()
            .filter_map(|item| match item {
                Item::Node(n) => Some(n),
                Item::Atomic(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_child_select() {
        let doc = DocumentId::new(1);
        let store = store(doc);
        let config = EvaluatorConfig::default();
        let ctx = EvalContext::new(&store, &config);
        let docs = DocumentSet::singleton(doc);

        let candidates: NodeSet = [1, 3, 5, 7, 8]
            .into_iter()
            .map(|g| NodeRef::new(doc, g))
            .collect();
        let step = ChildSelect::new("b", candidates);
        let context = NodeSet::singleton(NodeRef::new(doc, 3));

        let found = nodes(step.eval(&ctx, &docs, &context).unwrap());
        let gids: Vec<Gid> = found.iter().map(|n| n.gid).collect();
        assert_eq!(gids, vec![7, 8]);
        assert!(found.iter().all(|n| n.context().is_none()));

        let found = nodes(step.eval(&ctx.with_predicate_mode(true), &docs, &context).unwrap());
        assert!(found.iter().all(|n| n.context() == Some(&[3][..])));
        assert_eq!(step.to_string(), "child::b");
    }

    #[test]
    fn test_descendant_select_records_every_ancestor() {
        let doc = DocumentId::new(1);
        let store = store(doc);
        let config = EvaluatorConfig::default();
        let ctx = EvalContext::new(&store, &config).with_predicate_mode(true);
        let docs = DocumentSet::singleton(doc);

        let step = DescendantSelect::new("c", NodeSet::singleton(NodeRef::new(doc, 9)));
        let context: NodeSet = [1, 4].into_iter().map(|g| NodeRef::new(doc, g)).collect();

        let found = nodes(step.eval(&ctx, &docs, &context).unwrap());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].context(), Some(&[4, 1][..]));
    }

    #[test]
    fn test_documents_outside_scope_are_ignored() {
        let doc = DocumentId::new(1);
        let store = store(doc);
        let config = EvaluatorConfig::default();
        let ctx = EvalContext::new(&store, &config);

        let step = ChildSelect::new("*", NodeSet::singleton(NodeRef::new(doc, 2)));
        let context = NodeSet::singleton(NodeRef::new(doc, 1));
        let seq = step.eval(&ctx, &DocumentSet::singleton(DocumentId::new(2)), &context).unwrap();
        assert!(seq.is_empty());
    }
}
