//! Tab order.
//!
//! [`FocusChain`] is the pre-order walk of the tree filtered to nodes that can
//! take focus. Hidden or disabled nodes prune their whole subtree. The chain
//! is rebuilt on demand, so it always reflects the current tree.

use crate::dom::node::NodeId;
use crate::dom::registry::WidgetRegistry;

/// Focusable nodes in tab order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusChain {
    nodes: Vec<NodeId>,
}

impl FocusChain {
    /// Collect the chain under `root`.
    pub fn build(registry: &WidgetRegistry, root: NodeId) -> Self {
        let mut nodes = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = registry.get(id) else {
                continue;
            };
            if !node.is_visible() || !node.is_enabled() {
                continue;
            }
            if node.is_focusable() {
                nodes.push(id);
            }
            stack.extend(node.children().iter().rev().copied());
        }
        Self { nodes }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    /// The node after `current`, wrapping. With no current focus (or a current
    /// node outside the chain) this is the first node.
    pub fn next(&self, current: Option<NodeId>) -> Option<NodeId> {
        let len = self.nodes.len();
        if len == 0 {
            return None;
        }
        let index = match self.position(current) {
            Some(i) => (i + 1) % len,
            None => 0,
        };
        self.nodes.get(index).copied()
    }

    /// The node before `current`, wrapping. With no current focus this is the
    /// last node.
    pub fn previous(&self, current: Option<NodeId>) -> Option<NodeId> {
        let len = self.nodes.len();
        if len == 0 {
            return None;
        }
        let index = match self.position(current) {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.nodes.get(index).copied()
    }

    fn position(&self, current: Option<NodeId>) -> Option<usize> {
        current.and_then(|c| self.nodes.iter().position(|&n| n == c))
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::node::WidgetNode;
    use crate::widget::kind::WidgetKind;

    /// root
    /// ├── a (Button)
    /// ├── frame
    /// │   ├── b (Entry)
    /// │   └── label
    /// └── c (Scale)
    fn tree() -> (WidgetRegistry, NodeId, [NodeId; 4]) {
        let mut reg = WidgetRegistry::new();
        let root = reg.register(WidgetNode::new(WidgetKind::Window));
        let a = reg.register_child(root, WidgetNode::new(WidgetKind::Button)).unwrap();
        let frame = reg.register_child(root, WidgetNode::new(WidgetKind::Frame)).unwrap();
        let b = reg.register_child(frame, WidgetNode::new(WidgetKind::Entry)).unwrap();
        reg.register_child(frame, WidgetNode::new(WidgetKind::Label)).unwrap();
        let c = reg.register_child(root, WidgetNode::new(WidgetKind::Scale)).unwrap();
        (reg, root, [a, frame, b, c])
    }

    #[test]
    fn tree_order_filtered_to_focusable() {
        let (reg, root, [a, _, b, c]) = tree();
        let chain = FocusChain::build(&reg, root);
        assert_eq!(chain.nodes(), &[a, b, c]);
    }

    #[test]
    fn next_and_previous_wrap() {
        let (reg, root, [a, _, b, c]) = tree();
        let chain = FocusChain::build(&reg, root);
        assert_eq!(chain.next(None), Some(a));
        assert_eq!(chain.next(Some(a)), Some(b));
        assert_eq!(chain.next(Some(c)), Some(a));
        assert_eq!(chain.previous(None), Some(c));
        assert_eq!(chain.previous(Some(a)), Some(c));
        assert_eq!(chain.previous(Some(b)), Some(a));
    }

    #[test]
    fn hidden_or_disabled_subtrees_are_skipped() {
        let (mut reg, root, [a, frame, _, c]) = tree();
        reg.get_mut(frame).unwrap().visible = false;
        assert_eq!(FocusChain::build(&reg, root).nodes(), &[a, c]);
        reg.get_mut(frame).unwrap().visible = true;
        reg.get_mut(c).unwrap().enabled = false;
        assert_eq!(FocusChain::build(&reg, root).len(), 2);
    }

    #[test]
    fn empty_chain() {
        let mut reg = WidgetRegistry::new();
        let root = reg.register(WidgetNode::new(WidgetKind::Window));
        let chain = FocusChain::build(&reg, root);
        assert!(chain.is_empty());
        assert_eq!(chain.next(None), None);
        assert_eq!(chain.previous(None), None);
    }
}
