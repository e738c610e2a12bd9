use crate::ids::{DocumentId, Gid};
use std::collections::BTreeSet;

/// A search hit recorded against a node, e.g. a matched term and its
/// character span in the node's text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Match {
    pub term: String,
    pub offset: u32,
    pub length: u32,
}

impl Match {
    pub fn new(term: impl Into<String>, offset: u32, length: u32) -> Self {
        Self {
            term: term.into(),
            offset,
            length,
        }
    }
}

/// Match annotations of one node. Merging is a set union, so annotations
/// collected along different evaluation paths are never lost.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet(BTreeSet<Match>);

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, m: Match) -> bool {
        self.0.insert(m)
    }

    pub fn merge(&mut self, other: &MatchSet) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Match> {
        self.0.iter()
    }
}

impl FromIterator<Match> for MatchSet {
    fn from_iter<I: IntoIterator<Item = Match>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Reference to one node of a stored document.
///
/// `context` holds the context backlinks: ancestor GIDs recorded when the
/// node was selected inside a node-set predicate. It is `None` when the node
/// was produced outside predicate mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRef {
    pub doc: DocumentId,
    pub gid: Gid,
    pub matches: MatchSet,
    context: Option<Vec<Gid>>,
}

impl NodeRef {
    pub fn new(doc: DocumentId, gid: Gid) -> Self {
        Self {
            doc,
            gid,
            matches: MatchSet::new(),
            context: None,
        }
    }

    pub fn with_match(mut self, m: Match) -> Self {
        self.matches.insert(m);
        self
    }

    /// Identity of the node inside a [`NodeSet`](crate::NodeSet).
    pub fn key(&self) -> (DocumentId, Gid) {
        (self.doc, self.gid)
    }

    pub fn add_matches(&mut self, other: &MatchSet) {
        self.matches.merge(other);
    }

    /// Records `ancestor` as a context backlink. Repeated GIDs are ignored.
    pub fn add_context(&mut self, ancestor: Gid) {
        let links = self.context.get_or_insert_with(Vec::new);
        if !links.contains(&ancestor) {
            links.push(ancestor);
        }
    }

    pub fn context(&self) -> Option<&[Gid]> {
        self.context.as_deref()
    }

    pub fn clear_context(&mut self) {
        self.context = None;
    }

    /// Merges the annotations and backlinks of `other` into `self`.
    pub(crate) fn absorb(&mut self, other: &NodeRef) {
        self.add_matches(&other.matches);
        if let Some(links) = other.context() {
            for &gid in links {
                self.add_context(gid);
            }
        }
    }
}
