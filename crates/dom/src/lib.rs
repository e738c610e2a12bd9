//! Document-side data model of the query engine.
//!
//! Nodes are addressed by a level-ordered identifier (GID). Parent, child and
//! sibling relationships are derived arithmetically from a per-document
//! [`LevelTable`] by the free functions in [`addressing`]; no node stores a
//! pointer to another.
//!
//! # Key Types
//!
//! - [`NodeRef`]: a node of a document plus its accumulated match annotations
//! - [`NodeSet`]: nodes unique by `(document, GID)`, ordered by GID per document
//! - [`DocumentSet`]: the documents a query evaluation considers
//! - [`DocumentStore`]: what the evaluator needs from the storage layer

pub mod addressing;
pub mod document_set;
pub mod error;
pub mod ids;
pub mod level_table;
pub mod node;
pub mod node_set;
pub mod storage;
pub mod store;

pub use addressing::{child_range_of, level_of, parent_of, sibling_range_of};
pub use document_set::DocumentSet;
pub use error::DomError;
pub use ids::{DocumentId, Gid};
pub use level_table::LevelTable;
pub use node::{Match, MatchSet, NodeRef};
pub use node_set::NodeSet;
pub use store::{DocumentRegistry, DocumentStore};
