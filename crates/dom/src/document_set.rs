use crate::ids::DocumentId;
use std::collections::BTreeSet;

/// Documents considered by one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSet(BTreeSet<DocumentId>);

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn singleton(doc: DocumentId) -> Self {
        Self(BTreeSet::from([doc]))
    }

    pub fn add(&mut self, doc: DocumentId) -> bool {
        self.0.insert(doc)
    }

    pub fn contains(&self, doc: DocumentId) -> bool {
        self.0.contains(&doc)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.0.iter().copied()
    }

    pub fn union(&self, other: &DocumentSet) -> DocumentSet {
        self.0.union(&other.0).copied().collect()
    }
}

impl FromIterator<DocumentId> for DocumentSet {
    fn from_iter<I: IntoIterator<Item = DocumentId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<DocumentId> for DocumentSet {
    fn extend<I: IntoIterator<Item = DocumentId>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}
