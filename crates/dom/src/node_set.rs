use crate::ids::{DocumentId, Gid};
use crate::node::NodeRef;
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Nodes unique by `(document, GID)`.
///
/// Iteration is ordered by document, then GID. Siblings occupy a contiguous
/// GID span, so [`NodeSet::range`] retrieves a whole sibling group in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet {
    nodes: BTreeMap<(DocumentId, Gid), NodeRef>,
}

impl NodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn singleton(node: NodeRef) -> Self {
        let mut set = Self::new();
        set.add(node);
        set
    }

    /// Inserts `node`, or merges its annotations and backlinks into the
    /// entry already present for the same `(document, GID)`.
    pub fn add(&mut self, node: NodeRef) {
        match self.nodes.entry(node.key()) {
            btree_map::Entry::Occupied(mut existing) => existing.get_mut().absorb(&node),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(node);
            }
        }
    }

    pub fn contains(&self, node: &NodeRef) -> bool {
        self.nodes.contains_key(&node.key())
    }

    pub fn contains_key(&self, doc: DocumentId, gid: Gid) -> bool {
        self.nodes.contains_key(&(doc, gid))
    }

    pub fn get(&self, doc: DocumentId, gid: Gid) -> Option<&NodeRef> {
        self.nodes.get(&(doc, gid))
    }

    pub fn get_mut(&mut self, doc: DocumentId, gid: Gid) -> Option<&mut NodeRef> {
        self.nodes.get_mut(&(doc, gid))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeRef> {
        self.nodes.values()
    }

    /// Nodes of `doc` with `lo <= gid < hi`, in GID order.
    pub fn range_iter(&self, doc: DocumentId, lo: Gid, hi: Gid) -> impl Iterator<Item = &NodeRef> {
        // BTreeMap::range panics on an inverted range.
        let bounds = if lo < hi {
            (doc, lo)..(doc, hi)
        } else {
            (doc, lo)..(doc, lo)
        };
        self.nodes.range(bounds).map(|(_, node)| node)
    }

    pub fn range(&self, doc: DocumentId, lo: Gid, hi: Gid) -> NodeSet {
        self.range_iter(doc, lo, hi).cloned().collect()
    }

    /// Distinct documents referenced by the set, ascending.
    pub fn documents(&self) -> impl Iterator<Item = DocumentId> + '_ {
        let mut last = None;
        self.nodes.keys().filter_map(move |&(doc, _)| {
            if last == Some(doc) {
                None
            } else {
                last = Some(doc);
                Some(doc)
            }
        })
    }
}

impl FromIterator<NodeRef> for NodeSet {
    fn from_iter<I: IntoIterator<Item = NodeRef>>(iter: I) -> Self {
        let mut set = NodeSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<NodeRef> for NodeSet {
    fn extend<I: IntoIterator<Item = NodeRef>>(&mut self, iter: I) {
        for node in iter {
            self.add(node);
        }
    }
}

impl IntoIterator for NodeSet {
    type Item = NodeRef;
    type IntoIter = btree_map::IntoValues<(DocumentId, Gid), NodeRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_values()
    }
}

impl<'a> IntoIterator for &'a NodeSet {
    type Item = &'a NodeRef;
    type IntoIter = btree_map::Values<'a, (DocumentId, Gid), NodeRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.values()
    }
}
