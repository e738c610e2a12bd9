use crate::ids::{DocumentId, Gid};
use thiserror::Error;
use xstore_codec::CodecError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("Invalid level table: {0}")]
    InvalidLevelTable(String),

    #[error("GID {gid} is outside the level table")]
    GidOutOfRange { gid: Gid },

    #[error("GID {gid} is the root and has no parent")]
    RootHasNoParent { gid: Gid },

    #[error("GID {gid} is on the deepest level and has no children")]
    NoChildLevel { gid: Gid },

    #[error("Document {0} not found")]
    UnknownDocument(DocumentId),

    #[error("No value stored for node {gid} of document {doc}")]
    MissingNodeValue { doc: DocumentId, gid: Gid },

    #[error("Storage encoding error: {0}")]
    Codec(#[from] CodecError),
}
