//! Widget registry: the slotmap arena holding every live widget.
//!
//! Identity lookup, tree relations and broadcast all go through here, so the
//! tree never needs owning back-pointers. Removing a subtree is O(subtree size).

use slotmap::SlotMap;

use super::node::{NodeId, WidgetNode};
use crate::error::{Error, Result};

/// Empty slice returned for unknown ids.
const NO_CHILDREN: &[NodeId] = &[];

/// Identity → widget table plus parent/child relations.
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    nodes: SlotMap<NodeId, WidgetNode>,
    next_serial: u64,
}

impl WidgetRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a detached node and return its identity.
    ///
    /// Always succeeds. Identities are never handed out twice: a recycled arena
    /// slot comes back with a bumped version, and `serial` is monotonic.
    pub fn register(&mut self, mut node: WidgetNode) -> NodeId {
        self.next_serial += 1;
        node.serial = self.next_serial;
        node.parent = None;
        node.children.clear();
        self.nodes.insert(node)
    }

    /// Register `node` as the last child of `parent`.
    pub fn register_child(&mut self, parent: NodeId, node: WidgetNode) -> Result<NodeId> {
        if !self.nodes.contains_key(parent) {
            return Err(Error::NotFound(parent));
        }
        let id = self.register(node);
        self.link(parent, id);
        Ok(id)
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
    }

    /// Remove one entry and detach it from its parent.
    ///
    /// Idempotent: unknown ids are ignored. Children of the removed entry are
    /// left parentless; use [`remove_subtree`](Self::remove_subtree) to destroy.
    pub fn unregister(&mut self, id: NodeId) -> Option<WidgetNode> {
        let node = self.nodes.remove(id)?;
        if let Some(parent) = node.parent {
            if let Some(p) = self.nodes.get_mut(parent) {
                p.children.retain(|&c| c != id);
            }
        }
        for &child in &node.children {
            if let Some(c) = self.nodes.get_mut(child) {
                c.parent = None;
            }
        }
        Some(node)
    }

    /// Destroy `id` and every descendant. Returns the removed ids, deepest first.
    pub fn remove_subtree(&mut self, id: NodeId) -> Vec<NodeId> {
        if !self.nodes.contains_key(id) {
            return Vec::new();
        }
        let mut order = self.walk_depth_first(id);
        order.reverse();
        for &node in &order {
            self.unregister(node);
        }
        order
    }

    /// Lookup by identity.
    pub fn lookup(&self, id: NodeId) -> Result<&WidgetNode> {
        self.nodes.get(id).ok_or(Error::NotFound(id))
    }

    /// Mutable lookup by identity.
    pub fn lookup_mut(&mut self, id: NodeId) -> Result<&mut WidgetNode> {
        self.nodes.get_mut(id).ok_or(Error::NotFound(id))
    }

    pub fn get(&self, id: NodeId) -> Option<&WidgetNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut WidgetNode> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live widgets.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Snapshot of every live id.
    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.keys().collect()
    }

    /// Apply `action` to every node matching `predicate`.
    ///
    /// The id set is snapshotted first, so `action` may create or destroy
    /// widgets; ids destroyed mid-broadcast are skipped. Returns how many
    /// nodes the action ran on.
    pub fn broadcast<P, A>(&mut self, mut predicate: P, mut action: A) -> usize
    where
        P: FnMut(&WidgetNode) -> bool,
        A: FnMut(&mut WidgetRegistry, NodeId),
    {
        let mut applied = 0;
        for id in self.ids() {
            let matches = match self.nodes.get(id) {
                Some(node) => predicate(node),
                None => continue,
            };
            if matches {
                action(self, id);
                applied += 1;
            }
        }
        applied
    }

    // ── Tree relations ───────────────────────────────────────────────

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Children in insertion order; empty for unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(NO_CHILDREN)
    }

    /// Children sorted for painting: ascending z-index, insertion order on ties.
    pub fn paint_order(&self, id: NodeId) -> Vec<NodeId> {
        let mut kids = self.children(id).to_vec();
        kids.sort_by_key(|&c| self.nodes.get(c).map(|n| n.z_index).unwrap_or(0));
        kids
    }

    /// Ancestors from the immediate parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent(current) {
            out.push(p);
            current = p;
        }
        out
    }

    /// Number of ancestors.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(p) = self.parent(current) {
            depth += 1;
            current = p;
        }
        depth
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        id == ancestor || self.ancestors(id).contains(&ancestor)
    }

    /// Pre-order depth-first traversal (tab order) starting at `start`.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::kind::WidgetKind;
    use std::collections::HashSet;

    /// ```text
    ///       root
    ///      /    \
    ///    a        b
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (WidgetRegistry, [NodeId; 5]) {
        let mut reg = WidgetRegistry::new();
        let root = reg.register(WidgetNode::new(WidgetKind::Window));
        let a = reg.register_child(root, WidgetNode::new(WidgetKind::Frame)).unwrap();
        let b = reg.register_child(root, WidgetNode::new(WidgetKind::Frame)).unwrap();
        let c = reg.register_child(a, WidgetNode::new(WidgetKind::Button)).unwrap();
        let d = reg.register_child(a, WidgetNode::new(WidgetKind::Label)).unwrap();
        (reg, [root, a, b, c, d])
    }

    #[test]
    fn relations() {
        let (reg, [root, a, b, c, d]) = build_tree();
        assert_eq!(reg.children(root), &[a, b]);
        assert_eq!(reg.children(a), &[c, d]);
        assert_eq!(reg.parent(c), Some(a));
        assert_eq!(reg.ancestors(c), vec![a, root]);
        assert_eq!(reg.depth(d), 2);
        assert_eq!(reg.depth(root), 0);
    }

    #[test]
    fn register_child_of_missing_parent_fails() {
        let (mut reg, [_, a, ..]) = build_tree();
        reg.remove_subtree(a);
        let err = reg.register_child(a, WidgetNode::new(WidgetKind::Label)).unwrap_err();
        assert!(matches!(err, Error::NotFound(id) if id == a));
    }

    #[test]
    fn lookup_miss_is_not_found() {
        let (mut reg, [_, _, b, ..]) = build_tree();
        reg.remove_subtree(b);
        assert!(matches!(reg.lookup(b), Err(Error::NotFound(_))));
    }

    #[test]
    fn unregister_is_idempotent() {
        let (mut reg, [root, a, b, ..]) = build_tree();
        assert!(reg.unregister(b).is_some());
        assert!(reg.unregister(b).is_none());
        assert_eq!(reg.children(root), &[a]);
    }

    #[test]
    fn remove_subtree_drops_exactly_the_subtree() {
        let (mut reg, [root, a, b, c, d]) = build_tree();
        let before = reg.len();
        let removed = reg.remove_subtree(a);
        assert_eq!(removed.len(), 3);
        assert_eq!(reg.len(), before - 3);
        for id in [a, c, d] {
            assert!(!reg.contains(id));
        }
        assert_eq!(reg.children(root), &[b]);
    }

    #[test]
    fn identities_are_never_reused() {
        let mut reg = WidgetRegistry::new();
        let root = reg.register(WidgetNode::new(WidgetKind::Window));
        let first: Vec<NodeId> = (0..1000)
            .map(|_| reg.register_child(root, WidgetNode::new(WidgetKind::Label)).unwrap())
            .collect();
        for &id in &first {
            reg.remove_subtree(id);
        }
        let dead: HashSet<NodeId> = first.into_iter().collect();
        for _ in 0..1000 {
            let id = reg.register_child(root, WidgetNode::new(WidgetKind::Label)).unwrap();
            assert!(!dead.contains(&id));
        }
    }

    #[test]
    fn serials_are_monotonic() {
        let (reg, [root, a, b, ..]) = build_tree();
        let s = |id| reg.get(id).unwrap().serial();
        assert!(s(root) < s(a));
        assert!(s(a) < s(b));
    }

    #[test]
    fn broadcast_survives_destruction_mid_iteration() {
        let (mut reg, [root, a, ..]) = build_tree();
        let mut visited = 0;
        let applied = reg.broadcast(
            |_| true,
            |reg, id| {
                visited += 1;
                if id == a {
                    reg.remove_subtree(a);
                }
            },
        );
        assert_eq!(applied, visited);
        assert!(applied <= 5);
        assert!(reg.contains(root));
        assert!(!reg.contains(a));
    }

    #[test]
    fn broadcast_respects_predicate() {
        let (mut reg, _) = build_tree();
        let applied = reg.broadcast(
            |n| n.kind() == WidgetKind::Frame,
            |reg, id| reg.get_mut(id).unwrap().z_index = 7,
        );
        assert_eq!(applied, 2);
    }

    #[test]
    fn walk_depth_first_is_tab_order() {
        let (reg, [root, a, b, c, d]) = build_tree();
        assert_eq!(reg.walk_depth_first(root), vec![root, a, c, d, b]);
    }

    #[test]
    fn paint_order_sorts_by_z() {
        let (mut reg, [root, a, b, ..]) = build_tree();
        reg.get_mut(a).unwrap().z_index = 5;
        assert_eq!(reg.paint_order(root), vec![b, a]);
    }
}
