//! Arithmetic tree navigation over a [`LevelTable`].
//!
//! A node on level `L` with GID `g` owns `order[L + 1]` consecutive child
//! slots on level `L + 1`. Slot `k` of the level (counting from
//! `start[L]`) maps to children starting at `start[L + 1] + k * order[L + 1]`,
//! so every relationship reduces to a division or a multiplication.

use crate::error::DomError;
use crate::ids::Gid;
use crate::level_table::LevelTable;
use std::ops::Range;

/// Level holding `gid`.
pub fn level_of(table: &LevelTable, gid: Gid) -> Result<usize, DomError> {
    let starts = table.starts();
    let above = starts.partition_point(|&start| start <= gid);
    if above == 0 {
        return Err(DomError::GidOutOfRange { gid });
    }
    let level = above - 1;
    match table.level_end(level) {
        Some(end) if gid >= end => Err(DomError::GidOutOfRange { gid }),
        _ => Ok(level),
    }
}

pub fn parent_of(table: &LevelTable, gid: Gid) -> Result<Gid, DomError> {
    let level = level_of(table, gid)?;
    if level == 0 {
        return Err(DomError::RootHasNoParent { gid });
    }
    let starts = table.starts();
    let order = table.orders()[level];
    Ok((gid - starts[level]) / order + starts[level - 1])
}

/// GID span reserved for the direct children of `gid`.
///
/// The span covers every child slot, occupied or not.
pub fn child_range_of(table: &LevelTable, gid: Gid) -> Result<Range<Gid>, DomError> {
    let level = level_of(table, gid)?;
    let child_level = level + 1;
    let (Some(child_start), Some(order)) = (table.start(child_level), table.order(child_level))
    else {
        return Err(DomError::NoChildLevel { gid });
    };
    let first = (gid - table.starts()[level])
        .checked_mul(order)
        .and_then(|n| n.checked_add(child_start))
        .ok_or(DomError::GidOutOfRange { gid })?;
    let end = first
        .checked_add(order)
        .ok_or(DomError::GidOutOfRange { gid })?;
    Ok(first..end)
}

/// Span shared by `gid` and all of its siblings, `gid` included.
pub fn sibling_range_of(table: &LevelTable, gid: Gid) -> Result<Range<Gid>, DomError> {
    let parent = parent_of(table, gid)?;
    child_range_of(table, parent)
}
