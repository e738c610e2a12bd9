//! Per-document table of level start points and branching orders.

use crate::error::DomError;
use crate::ids::Gid;
use serde::{Deserialize, Serialize};

/// Start GID and branching order of every tree level of one document.
///
/// `start[L]` is the first GID on level `L`; `order[L]` is the number of
/// child slots each node on level `L - 1` owns on level `L`. Start points are
/// strictly increasing and every order is at least 1. Level 0 holds the
/// document root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLevelTable", into = "RawLevelTable")]
pub struct LevelTable {
    start: Vec<Gid>,
    order: Vec<u64>,
}

#[derive(Serialize, Deserialize)]
struct RawLevelTable {
    start: Vec<Gid>,
    order: Vec<u64>,
}

impl TryFrom<RawLevelTable> for LevelTable {
    type Error = DomError;

    fn try_from(raw: RawLevelTable) -> Result<Self, Self::Error> {
        LevelTable::new(raw.start, raw.order)
    }
}

impl From<LevelTable> for RawLevelTable {
    fn from(table: LevelTable) -> Self {
        RawLevelTable {
            start: table.start,
            order: table.order,
        }
    }
}

impl LevelTable {
    pub fn new(start: Vec<Gid>, order: Vec<u64>) -> Result<Self, DomError> {
        if start.is_empty() {
            return Err(DomError::InvalidLevelTable(
                "at least one level is required".to_string(),
            ));
        }
        if start.len() != order.len() {
            return Err(DomError::InvalidLevelTable(format!(
                "{} start points but {} orders",
                start.len(),
                order.len()
            )));
        }
        if let Some(level) = start.windows(2).position(|w| w[0] >= w[1]) {
            return Err(DomError::InvalidLevelTable(format!(
                "start point of level {} is not above level {}",
                level + 1,
                level
            )));
        }
        if let Some(level) = order.iter().position(|&o| o == 0) {
            return Err(DomError::InvalidLevelTable(format!(
                "order of level {level} is zero"
            )));
        }
        Ok(Self { start, order })
    }

    /// Builds the table of a complete tree whose root has GID 1.
    ///
    /// `orders[0]` belongs to the root level and must be 1; `orders[L]` is
    /// the maximum fan-out of a node on level `L - 1`.
    pub fn from_orders(orders: &[u64]) -> Result<Self, DomError> {
        if orders.first() != Some(&1) {
            return Err(DomError::InvalidLevelTable(
                "the root level must have order 1".to_string(),
            ));
        }
        let mut start: Vec<Gid> = Vec::with_capacity(orders.len());
        start.push(1);
        if orders.len() > 1 {
            start.push(2);
        }
        for level in 1..orders.len().saturating_sub(1) {
            let width = start[level] - start[level - 1];
            let next = width
                .checked_mul(orders[level])
                .and_then(|n| n.checked_add(start[level]))
                .ok_or_else(|| {
                    DomError::InvalidLevelTable(format!(
                        "level {} overflows the GID space",
                        level + 1
                    ))
                })?;
            start.push(next);
        }
        Self::new(start, orders.to_vec())
    }

    /// Number of levels, including the root level.
    pub fn level_count(&self) -> usize {
        self.start.len()
    }

    pub fn start(&self, level: usize) -> Option<Gid> {
        self.start.get(level).copied()
    }

    pub fn order(&self, level: usize) -> Option<u64> {
        self.order.get(level).copied()
    }

    pub fn starts(&self) -> &[Gid] {
        &self.start
    }

    pub fn orders(&self) -> &[u64] {
        &self.order
    }

    /// First GID past the last slot of `level`, if it can be represented.
    pub(crate) fn level_end(&self, level: usize) -> Option<Gid> {
        if let Some(&next) = self.start.get(level + 1) {
            return Some(next);
        }
        let width = match level {
            0 => 1,
            _ => (self.start[level] - self.start[level - 1]).checked_mul(self.order[level])?,
        };
        self.start[level].checked_add(width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_orders_computes_start_points() {
        let table = LevelTable::from_orders(&[1, 3, 2]).unwrap();
        // root = 1; level 1 = 2..5; level 2 = 5..11
        assert_eq!(table.starts(), &[1, 2, 5]);
        assert_eq!(table.level_end(2), Some(11));
    }

    #[test]
    fn test_rejects_unsorted_start_points() {
        let err = LevelTable::new(vec![1, 5, 5], vec![1, 4, 2]).unwrap_err();
        assert!(matches!(err, DomError::InvalidLevelTable(_)));
    }

    #[test]
    fn test_rejects_zero_order() {
        assert!(LevelTable::new(vec![1, 2], vec![1, 0]).is_err());
    }

    #[test]
    fn test_rejects_length_mismatch() {
        assert!(LevelTable::new(vec![1, 2], vec![1]).is_err());
        assert!(LevelTable::new(vec![], vec![]).is_err());
    }

    #[test]
    fn test_from_orders_requires_single_root() {
        assert!(LevelTable::from_orders(&[2, 3]).is_err());
        assert!(LevelTable::from_orders(&[]).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: LevelTable = serde_json::from_str(r#"{"start":[1,2,4],"order":[1,2,2]}"#).unwrap();
        assert_eq!(ok.level_count(), 3);

        let bad = serde_json::from_str::<LevelTable>(r#"{"start":[1,1],"order":[1,2]}"#);
        assert!(bad.is_err());
    }
}
