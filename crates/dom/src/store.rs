//! DocumentStore trait for abstracting access to stored documents.
//!
//! The evaluator only needs two things from storage: the level table of a
//! document, to navigate its tree, and the string value of a node, to
//! atomize it.

use crate::error::DomError;
use crate::ids::{DocumentId, Gid};
use crate::level_table::LevelTable;
use crate::node::NodeRef;
use std::collections::HashMap;
use std::fmt::Debug;

/// Read access to stored documents during one query evaluation.
///
/// # Implementations
///
/// - [`DocumentRegistry`]: documents held in memory (always available)
pub trait DocumentStore: Send + Sync + Debug {
    /// Level table of `doc`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::UnknownDocument`] if the store does not hold `doc`.
    fn level_table(&self, doc: DocumentId) -> Result<&LevelTable, DomError>;

    /// Concatenated text content of `node`.
    fn string_value(&self, node: &NodeRef) -> Result<String, DomError>;

    /// Returns a human-readable name for this store (for logging/debugging).
    fn name(&self) -> &'static str;
}

#[derive(Debug, Default)]
struct StoredDocument {
    table: Option<LevelTable>,
    values: HashMap<Gid, String>,
}

/// An in-memory document store.
///
/// Documents are registered before evaluation; the registry is then shared
/// read-only by every query that uses it.
#[derive(Debug, Default)]
pub struct DocumentRegistry {
    documents: HashMap<DocumentId, StoredDocument>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `doc` with its level table, replacing any previous table.
    pub fn insert_document(&mut self, doc: DocumentId, table: LevelTable) {
        self.documents.entry(doc).or_default().table = Some(table);
    }

    /// Stores the string value of node `gid` of `doc`.
    pub fn set_value(&mut self, doc: DocumentId, gid: Gid, value: impl Into<String>) {
        self.documents
            .entry(doc)
            .or_default()
            .values
            .insert(gid, value.into());
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentStore for DocumentRegistry {
    fn level_table(&self, doc: DocumentId) -> Result<&LevelTable, DomError> {
        self.documents
            .get(&doc)
            .and_then(|stored| stored.table.as_ref())
            .ok_or(DomError::UnknownDocument(doc))
    }

    fn string_value(&self, node: &NodeRef) -> Result<String, DomError> {
        let stored = self
            .documents
            .get(&node.doc)
            .ok_or(DomError::UnknownDocument(node.doc))?;
        stored
            .values
            .get(&node.gid)
            .cloned()
            .ok_or(DomError::MissingNodeValue {
                doc: node.doc,
                gid: node.gid,
            })
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}
