//! Persistent encoding of node references, node sets and level tables.
//!
//! Only identities are written. Match annotations and context backlinks are
//! evaluation state and never reach storage.

use crate::error::DomError;
use crate::ids::{DocumentId, Gid};
use crate::level_table::LevelTable;
use crate::node::NodeRef;
use crate::node_set::NodeSet;
use xstore_codec::{VariableByteInput, VariableByteOutput};

pub fn write_node_ref(out: &mut VariableByteOutput, node: &NodeRef) {
    out.write_int(node.doc.get());
    out.write_long(node.gid);
}

pub fn read_node_ref(input: &mut VariableByteInput<'_>) -> Result<NodeRef, DomError> {
    let doc = DocumentId::new(input.read_int()?);
    let gid = input.read_long()?;
    Ok(NodeRef::new(doc, gid))
}

/// Writes `set` grouped by document with delta-encoded GIDs.
///
/// The per-document node count is reserved up front and backpatched once the
/// group has been written.
pub fn write_node_set(out: &mut VariableByteOutput, set: &NodeSet) -> Result<(), DomError> {
    let docs: Vec<DocumentId> = set.documents().collect();
    out.write_int(docs.len() as u32);

    let mut nodes = set.iter().peekable();
    for doc in docs {
        out.write_int(doc.get());
        let count_slot = out.reserve_int();
        let mut count: u32 = 0;
        let mut previous: Gid = 0;
        while let Some(node) = nodes.next_if(|n| n.doc == doc) {
            out.write_long(node.gid - previous);
            previous = node.gid;
            count += 1;
        }
        out.patch_int(count_slot, count)?;
    }
    Ok(())
}

pub fn read_node_set(input: &mut VariableByteInput<'_>) -> Result<NodeSet, DomError> {
    let mut set = NodeSet::new();
    let doc_count = input.read_int()?;
    for _ in 0..doc_count {
        let doc = DocumentId::new(input.read_int()?);
        let count = input.read_int()?;
        let mut gid: Gid = 0;
        for _ in 0..count {
            gid = gid
                .checked_add(input.read_long()?)
                .ok_or(DomError::GidOutOfRange { gid })?;
            set.add(NodeRef::new(doc, gid));
        }
    }
    Ok(set)
}

pub fn write_level_table(out: &mut VariableByteOutput, table: &LevelTable) {
    out.write_int(table.level_count() as u32);
    for (&start, &order) in table.starts().iter().zip(table.orders()) {
        out.write_long(start);
        out.write_long(order);
    }
}

/// Reads a level table and validates it like [`LevelTable::new`].
pub fn read_level_table(input: &mut VariableByteInput<'_>) -> Result<LevelTable, DomError> {
    let levels = input.read_int()? as usize;
    // Each level takes at least two bytes.
    let mut start = Vec::with_capacity(levels.min(input.available() / 2));
    let mut order = Vec::with_capacity(start.capacity());
    for _ in 0..levels {
        start.push(input.read_long()?);
        order.push(input.read_long()?);
    }
    LevelTable::new(start, order)
}
