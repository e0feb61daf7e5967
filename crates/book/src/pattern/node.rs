//! Linked coordinate nodes along one axis of a paper grid.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. A chain is
//! built front to back with [`NodeArena::create_next`]; margin and hole
//! boundaries are then spliced in with [`NodeArena::insert`], and finally
//! [`NodeArena::update_indices`] bakes the grid index of every node.

/// Handle to a node inside a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn raw(self) -> usize {
        self.0
    }
}

/// One coordinate along an axis.
#[derive(Debug, Clone, PartialEq)]
pub struct PaperNode {
    pub value: f32,
    /// Grid index, valid after [`NodeArena::update_indices`]
    pub index: usize,
    /// The quad strip starting at this node is cut out
    pub hole: bool,
    /// The node is interpolated from its non-seam neighbors
    pub seam: bool,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

impl PaperNode {
    pub fn prev(&self) -> Option<NodeId> {
        self.prev
    }

    pub fn next(&self) -> Option<NodeId> {
        self.next
    }
}

#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: Vec<PaperNode>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached node.
    pub fn create(&mut self, value: f32, hole: bool, seam: bool) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(PaperNode {
            value,
            index: 0,
            hole,
            seam,
            prev: None,
            next: None,
        });
        id
    }

    /// Create a node and make it the successor of `from`.
    pub fn create_next(&mut self, from: NodeId, value: f32, hole: bool, seam: bool) -> NodeId {
        let id = self.create(value, hole, seam);
        self.nodes[id.0].prev = Some(from);
        self.nodes[from.0].next = Some(id);
        id
    }

    pub fn get(&self, id: NodeId) -> &PaperNode {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut PaperNode {
        &mut self.nodes[id.0]
    }

    /// Splice `node` into the chain after `from`, keeping values sorted.
    ///
    /// Fails when `node` is not strictly greater than `from`, equals an
    /// existing value, or lies past the last node of the chain. An inserted
    /// node takes the hole flag of its predecessor.
    pub fn insert(&mut self, from: NodeId, node: NodeId) -> bool {
        let value = self.nodes[node.0].value;
        let mut current = from;
        loop {
            let cur = &self.nodes[current.0];
            if cur.value >= value {
                return false;
            }
            let Some(next) = cur.next else {
                return false;
            };
            if self.nodes[next.0].value > value {
                let hole = cur.hole;
                self.nodes[next.0].prev = Some(node);
                self.nodes[current.0].next = Some(node);
                let inserted = &mut self.nodes[node.0];
                inserted.prev = Some(current);
                inserted.next = Some(next);
                inserted.hole = hole;
                return true;
            }
            current = next;
        }
    }

    /// Number every node of the chain starting at `root` from 0.
    pub fn update_indices(&mut self, root: NodeId) {
        let mut index = 0;
        let mut current = Some(root);
        while let Some(id) = current {
            self.nodes[id.0].index = index;
            index += 1;
            current = self.nodes[id.0].next;
        }
    }

    pub fn prev_none_seam(&self, id: NodeId) -> Option<NodeId> {
        self.walk(id, |n| n.prev, |n| n.seam)
    }

    pub fn next_none_seam(&self, id: NodeId) -> Option<NodeId> {
        self.walk(id, |n| n.next, |n| n.seam)
    }

    pub fn prev_none_hole(&self, id: NodeId) -> Option<NodeId> {
        self.walk(id, |n| n.prev, |n| n.hole)
    }

    pub fn next_none_hole(&self, id: NodeId) -> Option<NodeId> {
        self.walk(id, |n| n.next, |n| n.hole)
    }

    /// First node reached from `id` through `step` that does not match `skip`.
    fn walk(
        &self,
        id: NodeId,
        step: impl Fn(&PaperNode) -> Option<NodeId>,
        skip: impl Fn(&PaperNode) -> bool,
    ) -> Option<NodeId> {
        let mut current = step(&self.nodes[id.0])?;
        while skip(&self.nodes[current.0]) {
            current = step(&self.nodes[current.0])?;
        }
        Some(current)
    }

    /// Ids of the chain starting at `root`, in order.
    pub fn chain(&self, root: NodeId) -> Vec<NodeId> {
        let mut ids = Vec::new();
        let mut current = Some(root);
        while let Some(id) = current {
            ids.push(id);
            current = self.nodes[id.0].next;
        }
        ids
    }

    pub fn values(&self, root: NodeId) -> Vec<f32> {
        self.chain(root).into_iter().map(|id| self.nodes[id.0].value).collect()
    }

    pub fn holes(&self, root: NodeId) -> Vec<bool> {
        self.chain(root).into_iter().map(|id| self.nodes[id.0].hole).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(arena: &mut NodeArena, values: &[f32]) -> NodeId {
        let root = arena.create(values[0], false, false);
        let mut current = root;
        for &value in &values[1..] {
            current = arena.create_next(current, value, false, false);
        }
        root
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut arena = NodeArena::new();
        let root = chain(&mut arena, &[0.0, 1.0, 2.0]);
        let node = arena.create(1.5, false, true);
        assert!(arena.insert(root, node));
        arena.update_indices(root);
        assert_eq!(arena.values(root), vec![0.0, 1.0, 1.5, 2.0]);
        assert_eq!(arena.get(node).index, 2);
    }

    #[test]
    fn test_insert_rejects_equal_and_out_of_range() {
        let mut arena = NodeArena::new();
        let root = chain(&mut arena, &[0.0, 1.0, 2.0]);

        let equal = arena.create(1.0, false, true);
        assert!(!arena.insert(root, equal));

        let at_root = arena.create(0.0, false, true);
        assert!(!arena.insert(root, at_root));

        let past_end = arena.create(3.0, false, true);
        assert!(!arena.insert(root, past_end));

        assert_eq!(arena.values(root), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_inserted_node_inherits_hole() {
        let mut arena = NodeArena::new();
        let root = arena.create(0.0, false, false);
        let hole = arena.create_next(root, 1.0, true, false);
        arena.create_next(hole, 2.0, false, false);

        let node = arena.create(1.5, false, true);
        assert!(arena.insert(root, node));
        assert!(arena.get(node).hole);
        assert_eq!(arena.holes(root), vec![false, true, true, false]);
    }

    #[test]
    fn test_none_seam_and_none_hole_walks() {
        let mut arena = NodeArena::new();
        let root = chain(&mut arena, &[0.0, 3.0]);
        let a = arena.create(1.0, false, true);
        let b = arena.create(2.0, false, true);
        assert!(arena.insert(root, a));
        assert!(arena.insert(root, b));

        assert_eq!(arena.prev_none_seam(b), Some(root));
        let last = arena.next_none_seam(a).unwrap();
        assert_eq!(arena.get(last).value, 3.0);
        assert_eq!(arena.prev_none_seam(root), None);

        arena.get_mut(a).hole = true;
        arena.get_mut(b).hole = true;
        assert_eq!(arena.next_none_hole(root), Some(last));
        assert_eq!(arena.prev_none_hole(last), Some(root));
    }
}
