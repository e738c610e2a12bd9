//! Identifier types for documents and nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Level-ordered node identifier. Only meaningful together with the
/// [`LevelTable`](crate::LevelTable) of the document that owns the node.
pub type Gid = u64;

/// Identifier of a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(u32);

impl DocumentId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for DocumentId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<DocumentId> for u32 {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
