//! Pending-layout and pending-paint sets, drained once per frame.
//!
//! Marking is idempotent: a node sits in each set at most once. The layout
//! set mirrors every node's [`LayoutState`]; marking goes through here so the
//! two never disagree.

use std::collections::HashSet;

use bitflags::bitflags;

use crate::dom::node::{LayoutState, NodeId};
use crate::dom::registry::WidgetRegistry;
use crate::geometry::Rect;

bitflags! {
    /// Work a node is waiting for.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Dirty: u8 {
        const LAYOUT = 0b01;
        const PAINT  = 0b10;
    }
}

/// Per-frame invalidation bookkeeping.
#[derive(Debug, Default)]
pub struct Invalidation {
    layout: HashSet<NodeId>,
    paint: HashSet<NodeId>,
    /// Screen area to repaint besides the rects of paint-pending nodes.
    damage: Rect,
}

impl Invalidation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` for the given work. Unknown ids are ignored.
    pub fn mark(&mut self, registry: &mut WidgetRegistry, id: NodeId, dirty: Dirty) {
        let Some(node) = registry.get_mut(id) else {
            return;
        };
        if dirty.contains(Dirty::LAYOUT) {
            node.layout_state = LayoutState::PendingLayout;
            self.layout.insert(id);
        }
        if dirty.contains(Dirty::PAINT) {
            self.paint.insert(id);
        }
    }

    /// Mark `id` and every ancestor for layout, and `id` for paint.
    ///
    /// Used when the node's requested size may have changed.
    pub fn mark_geometry(&mut self, registry: &mut WidgetRegistry, id: NodeId) {
        self.mark(registry, id, Dirty::LAYOUT | Dirty::PAINT);
        for ancestor in registry.ancestors(id) {
            self.mark(registry, ancestor, Dirty::LAYOUT);
        }
    }

    pub fn mark_paint(&mut self, registry: &mut WidgetRegistry, id: NodeId) {
        self.mark(registry, id, Dirty::PAINT);
    }

    /// Add screen area to repaint.
    pub fn add_damage(&mut self, rect: Rect) {
        self.damage = self.damage.union(rect);
    }

    pub fn dirty(&self, id: NodeId) -> Dirty {
        let mut dirty = Dirty::empty();
        dirty.set(Dirty::LAYOUT, self.layout.contains(&id));
        dirty.set(Dirty::PAINT, self.paint.contains(&id));
        dirty
    }

    pub fn is_layout_pending(&self) -> bool {
        !self.layout.is_empty()
    }

    pub fn is_paint_pending(&self) -> bool {
        !self.paint.is_empty() || !self.damage.is_empty()
    }

    pub fn layout_len(&self) -> usize {
        self.layout.len()
    }

    pub fn paint_len(&self) -> usize {
        self.paint.len()
    }

    /// Drain the layout set.
    pub fn take_layout(&mut self) -> Vec<NodeId> {
        self.layout.drain().collect()
    }

    /// Drop a node from the layout set, marking it clean.
    pub(crate) fn settle(&mut self, registry: &mut WidgetRegistry, id: NodeId) {
        self.layout.remove(&id);
        if let Some(node) = registry.get_mut(id) {
            node.layout_state = LayoutState::Clean;
        }
    }

    /// Drain the paint set and damage into one region: the union of the
    /// pending nodes' rects and the accumulated damage.
    pub fn take_paint(&mut self, registry: &WidgetRegistry) -> Rect {
        let region = self
            .paint
            .drain()
            .filter_map(|id| registry.get(id))
            .fold(self.damage, |acc, node| acc.union(node.rect));
        self.damage = Rect::EMPTY;
        region
    }

    /// Forget a destroyed node.
    pub fn forget(&mut self, id: NodeId) {
        self.layout.remove(&id);
        self.paint.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::node::WidgetNode;
    use crate::widget::kind::WidgetKind;

    fn tree() -> (WidgetRegistry, NodeId, NodeId, NodeId) {
        let mut reg = WidgetRegistry::new();
        let root = reg.register(WidgetNode::new(WidgetKind::Window));
        let frame = reg.register_child(root, WidgetNode::new(WidgetKind::Frame)).unwrap();
        let label = reg.register_child(frame, WidgetNode::new(WidgetKind::Label)).unwrap();
        for id in [root, frame, label] {
            reg.get_mut(id).unwrap().layout_state = LayoutState::Clean;
        }
        (reg, root, frame, label)
    }

    #[test]
    fn marking_is_idempotent() {
        let (mut reg, _, _, label) = tree();
        let mut inv = Invalidation::new();
        inv.mark(&mut reg, label, Dirty::LAYOUT | Dirty::PAINT);
        inv.mark(&mut reg, label, Dirty::LAYOUT);
        assert_eq!(inv.layout_len(), 1);
        assert_eq!(inv.paint_len(), 1);
        assert_eq!(reg.get(label).unwrap().layout_state(), LayoutState::PendingLayout);
    }

    #[test]
    fn geometry_marks_ancestors_for_layout_only() {
        let (mut reg, root, frame, label) = tree();
        let mut inv = Invalidation::new();
        inv.mark_geometry(&mut reg, label);
        assert_eq!(inv.dirty(label), Dirty::LAYOUT | Dirty::PAINT);
        assert_eq!(inv.dirty(frame), Dirty::LAYOUT);
        assert_eq!(inv.dirty(root), Dirty::LAYOUT);
    }

    #[test]
    fn take_paint_unions_rects_and_damage() {
        let (mut reg, _, frame, label) = tree();
        reg.get_mut(frame).unwrap().rect = Rect::new(0, 0, 10, 10);
        reg.get_mut(label).unwrap().rect = Rect::new(20, 0, 5, 5);
        let mut inv = Invalidation::new();
        inv.mark_paint(&mut reg, frame);
        inv.add_damage(Rect::new(0, 20, 1, 1));
        assert_eq!(inv.take_paint(&reg), Rect::new(0, 0, 10, 21));
        assert!(!inv.is_paint_pending());
    }

    #[test]
    fn settle_clears_state() {
        let (mut reg, _, _, label) = tree();
        let mut inv = Invalidation::new();
        inv.mark(&mut reg, label, Dirty::LAYOUT);
        inv.settle(&mut reg, label);
        assert!(!inv.is_layout_pending());
        assert_eq!(reg.get(label).unwrap().layout_state(), LayoutState::Clean);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let (mut reg, _, _, label) = tree();
        reg.remove_subtree(label);
        let mut inv = Invalidation::new();
        inv.mark(&mut reg, label, Dirty::all());
        assert_eq!(inv.dirty(label), Dirty::empty());
    }
}
