use crate::error::XQueryError;
use crate::value::AtomicValue;
use xstore_dom::{NodeRef, NodeSet};

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Node(NodeRef),
    Atomic(AtomicValue),
}

impl From<NodeRef> for Item {
    fn from(node: NodeRef) -> Self {
        Item::Node(node)
    }
}

impl From<AtomicValue> for Item {
    fn from(value: AtomicValue) -> Self {
        Item::Atomic(value)
    }
}

/// Ordered result of evaluating an expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequence {
    items: Vec<Item>,
}

impl Sequence {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&Item> {
        self.items.first()
    }

    pub fn push(&mut self, item: impl Into<Item>) {
        self.items.push(item.into());
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// The only item of the sequence, `None` if empty.
    pub fn zero_or_one(&self) -> Result<Option<&Item>, XQueryError> {
        match self.items.len() {
            0 | 1 => Ok(self.items.first()),
            n => Err(XQueryError::cardinality("zero or one", n)),
        }
    }

    /// Collects the nodes of a node-only sequence.
    pub fn into_node_set(self) -> Result<NodeSet, XQueryError> {
        self.items
            .into_iter()
            .map(|item| match item {
                Item::Node(node) => Ok(node),
                Item::Atomic(value) => Err(XQueryError::type_error(format!(
                    "expected a node, found {}",
                    value.type_of()
                ))),
            })
            .collect()
    }

    pub fn effective_boolean_value(&self) -> Result<bool, XQueryError> {
        let value = match self.items.as_slice() {
            [] => return Ok(false),
            [Item::Node(_), ..] => return Ok(true),
            [Item::Atomic(value)] => value,
            [Item::Atomic(_), ..] => {
                return Err(XQueryError::ebv_error(format!(
                    "effective boolean value of a sequence of {} atomic values",
                    self.items.len()
                )));
            }
        };
        match value {
            AtomicValue::Boolean(b) => Ok(*b),
            AtomicValue::String(s) | AtomicValue::UntypedAtomic(s) => Ok(!s.is_empty()),
            AtomicValue::Integer(i) => Ok(*i != 0),
            AtomicValue::Decimal(d) => Ok(!d.is_zero()),
            AtomicValue::Float(f) => Ok(*f != 0.0 && !f.is_nan()),
            AtomicValue::Double(d) => Ok(*d != 0.0 && !d.is_nan()),
            other => Err(XQueryError::ebv_error(format!(
                "effective boolean value is not defined for {}",
                other.type_of()
            ))),
        }
    }
}

impl From<AtomicValue> for Sequence {
    fn from(value: AtomicValue) -> Self {
        Self {
            items: vec![Item::Atomic(value)],
        }
    }
}

impl From<NodeSet> for Sequence {
    fn from(nodes: NodeSet) -> Self {
        nodes.into_iter().map(Item::Node).collect()
    }
}

impl FromIterator<Item> for Sequence {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Sequence {
    type Item = Item;
    type IntoIter = std::vec::IntoIter<Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
