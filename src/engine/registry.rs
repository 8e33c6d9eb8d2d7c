//! Node Registry - Slot allocation for the node arena.
//!
//! Manages the lifecycle of node slots:
//! - Free index pool for O(1) reuse
//! - Stale-handle detection (a freed slot is `None` until reused)

use std::ops::{Index, IndexMut};

use super::node::{Node, NodeId};

// =============================================================================
// Arena
// =============================================================================

#[derive(Default)]
pub(crate) struct NodeArena {
    slots: Vec<Option<Node>>,
    /// Pool of freed indices for reuse.
    free: Vec<usize>,
    /// Number of live nodes.
    count: usize,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a slot for `node`, reusing a freed index when one exists.
    pub fn allocate(&mut self, node: Node) -> NodeId {
        self.count += 1;
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Release a slot back to the pool. Returns the node that occupied it.
    pub fn release(&mut self, id: NodeId) -> Option<Node> {
        let node = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        self.count -= 1;
        Some(node)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0)?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.0)?.as_mut()
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.count
    }
}

// Indexing is for ids already validated by the caller; a stale id here is a bug.
impl Index<NodeId> for NodeArena {
    type Output = Node;

    #[inline]
    fn index(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("stale node handle {id}"),
        }
    }
}

impl IndexMut<NodeId> for NodeArena {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("stale node handle {id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Style;

    #[test]
    fn test_index_reuse() {
        let mut arena = NodeArena::new();
        let a = arena.allocate(Node::new(Style::default()));
        let b = arena.allocate(Node::new(Style::default()));
        assert_eq!(a, NodeId(0));
        assert_eq!(b, NodeId(1));
        assert_eq!(arena.len(), 2);

        assert!(arena.release(a).is_some());
        assert!(!arena.contains(a));
        assert!(arena.release(a).is_none());
        assert_eq!(arena.len(), 1);

        let c = arena.allocate(Node::new(Style::default()));
        assert_eq!(c, a);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_unknown_handle() {
        let arena = NodeArena::new();
        assert!(arena.get(NodeId(3)).is_none());
    }
}
