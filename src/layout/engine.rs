//! The layout pass.
//!
//! [`LayoutEngine::run`] drains the pending-layout set in waves. Each wave is
//! processed parents first (by depth), since a child's rectangle comes from
//! its parent's manager. Processing a node marks it `Clean`; processing a
//! container re-runs its manager, which assigns every child a rectangle and
//! re-marks children whose rectangle changed. The pass ends when the set is
//! empty.
//!
//! No node may be processed more than `max_iterations` times in one pass.
//! Exceeding that aborts the pass with `LayoutDivergence`: every rectangle
//! written during the pass is restored, and the offending container's subtree
//! is quarantined (kept `Clean` and skipped) until the host reconfigures it.

use std::collections::{HashMap, HashSet};

use crate::dom::node::NodeId;
use crate::dom::registry::WidgetRegistry;
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::invalidation::{Dirty, Invalidation};
use crate::theme::ThemeStore;
use crate::widget::measure::{child_inputs, content_insets};

use super::manager::{ArrangeCx, GeometryManager};

/// Default per-node processing cap for one pass.
pub const DEFAULT_MAX_ITERATIONS: usize = 32;

/// Summary of one successful pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutReport {
    /// Nodes processed, counting repeats.
    pub processed: usize,
    /// Waves drained from the pending set.
    pub waves: usize,
    /// Nodes whose rectangle changed.
    pub moved: usize,
}

/// Drives geometry managers over the pending-layout set.
#[derive(Debug)]
pub struct LayoutEngine {
    max_iterations: usize,
    quarantined: HashSet<NodeId>,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITERATIONS)
    }
}

/// Mutable state of a pass in progress.
#[derive(Default)]
struct Pass {
    counts: HashMap<NodeId, usize>,
    /// Rectangles as they were before this pass first wrote them.
    original: HashMap<NodeId, Rect>,
    /// Which container last re-marked a node.
    marked_by: HashMap<NodeId, NodeId>,
    processed: Vec<NodeId>,
    report: LayoutReport,
}

impl LayoutEngine {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations: max_iterations.max(1),
            quarantined: HashSet::new(),
        }
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn is_quarantined(&self, id: NodeId) -> bool {
        self.quarantined.contains(&id)
    }

    /// Lift the quarantine on `id`, if any. Returns whether it was quarantined.
    pub fn release(&mut self, id: NodeId) -> bool {
        self.quarantined.remove(&id)
    }

    /// Drop quarantine entries for destroyed nodes.
    pub fn forget(&mut self, id: NodeId) {
        self.quarantined.remove(&id);
    }

    fn in_quarantine(&self, registry: &WidgetRegistry, id: NodeId) -> bool {
        if self.quarantined.is_empty() {
            return false;
        }
        self.quarantined.contains(&id)
            || registry
                .ancestors(id)
                .iter()
                .any(|a| self.quarantined.contains(a))
    }

    /// Run one pass. `window` is the rectangle given to `root`.
    pub fn run(
        &mut self,
        registry: &mut WidgetRegistry,
        themes: &ThemeStore,
        invalidation: &mut Invalidation,
        root: NodeId,
        window: Rect,
    ) -> Result<LayoutReport> {
        let mut pass = Pass::default();
        loop {
            let mut wave: Vec<NodeId> = invalidation
                .take_layout()
                .into_iter()
                .filter(|&id| registry.contains(id))
                .collect();
            if wave.is_empty() {
                break;
            }
            pass.report.waves += 1;
            wave.sort_by_key(|&id| {
                (registry.depth(id), registry.get(id).map(|n| n.serial()).unwrap_or(0))
            });

            for (index, &id) in wave.iter().enumerate() {
                if self.in_quarantine(registry, id) {
                    invalidation.settle(registry, id);
                    continue;
                }
                let count = pass.counts.entry(id).or_insert(0);
                *count += 1;
                if *count > self.max_iterations {
                    let iterations = *count - 1;
                    let container = self.offender(registry, &pass, id);
                    let unfinished = wave[index..].iter().copied();
                    self.abort(registry, invalidation, &pass, container, unfinished);
                    return Err(Error::LayoutDivergence {
                        container,
                        iterations,
                    });
                }
                self.process(registry, themes, invalidation, &mut pass, root, window, id);
            }
        }
        tracing::trace!(
            processed = pass.report.processed,
            waves = pass.report.waves,
            moved = pass.report.moved,
            "layout pass complete"
        );
        Ok(pass.report)
    }

    #[allow(clippy::too_many_arguments)]
    fn process(
        &mut self,
        registry: &mut WidgetRegistry,
        themes: &ThemeStore,
        invalidation: &mut Invalidation,
        pass: &mut Pass,
        root: NodeId,
        window: Rect,
        id: NodeId,
    ) {
        invalidation.settle(registry, id);
        pass.processed.push(id);
        pass.report.processed += 1;

        if id == root {
            set_rect(registry, invalidation, pass, id, window);
        }

        let Some(node) = registry.get(id) else {
            return;
        };
        if node.children().is_empty() {
            return;
        }
        let area = node.rect().inset(content_insets(themes, node));
        let inputs = child_inputs(registry, themes, id);

        // The manager is taken out so custom strategies can run with `&mut self`.
        let owned = registry.get_mut(id).and_then(|n| n.manager.take());
        let had_manager = owned.is_some();
        let mut manager = owned.unwrap_or(GeometryManager::Place);
        let mut cx = ArrangeCx::new(id);
        let rects = manager.arrange(&mut cx, area, &inputs);
        if had_manager {
            if let Some(node) = registry.get_mut(id) {
                node.manager = Some(manager);
            }
        }

        for (input, rect) in inputs.iter().zip(rects) {
            if set_rect(registry, invalidation, pass, input.id, rect) {
                invalidation.mark(registry, input.id, Dirty::LAYOUT);
                pass.marked_by.insert(input.id, id);
            }
        }

        for node in cx.take_remarked() {
            if !registry.contains(node) {
                continue;
            }
            invalidation.mark(registry, node, Dirty::LAYOUT);
            pass.marked_by.insert(node, id);
            if let Some(parent) = registry.parent(node) {
                invalidation.mark(registry, parent, Dirty::LAYOUT);
                pass.marked_by.insert(parent, id);
            }
        }
    }

    /// The container to blame for `id` exceeding the cap.
    fn offender(&self, registry: &WidgetRegistry, pass: &Pass, id: NodeId) -> NodeId {
        if let Some(&by) = pass.marked_by.get(&id) {
            return by;
        }
        match registry.get(id) {
            Some(node) if !node.children().is_empty() => id,
            _ => registry.parent(id).unwrap_or(id),
        }
    }

    fn abort(
        &mut self,
        registry: &mut WidgetRegistry,
        invalidation: &mut Invalidation,
        pass: &Pass,
        container: NodeId,
        unfinished: impl Iterator<Item = NodeId>,
    ) {
        for (&id, &rect) in &pass.original {
            if let Some(node) = registry.get_mut(id) {
                node.rect = rect;
            }
        }
        self.quarantined.insert(container);

        // Everything this pass touched is retried next frame, except the
        // quarantined subtree, which is forced clean.
        let retry: Vec<NodeId> = pass
            .processed
            .iter()
            .copied()
            .chain(unfinished)
            .chain(invalidation.take_layout())
            .collect();
        for id in retry {
            if !registry.contains(id) {
                continue;
            }
            if self.in_quarantine(registry, id) {
                invalidation.settle(registry, id);
            } else {
                invalidation.mark(registry, id, Dirty::LAYOUT);
            }
        }
        for id in registry.walk_depth_first(container) {
            invalidation.settle(registry, id);
        }
    }
}

/// Write `rect` to `id`, recording the original and the damage. Returns
/// whether the rectangle changed.
fn set_rect(
    registry: &mut WidgetRegistry,
    invalidation: &mut Invalidation,
    pass: &mut Pass,
    id: NodeId,
    rect: Rect,
) -> bool {
    let Some(node) = registry.get_mut(id) else {
        return false;
    };
    let old = node.rect;
    if old == rect {
        return false;
    }
    node.rect = rect;
    pass.original.entry(id).or_insert(old);
    pass.report.moved += 1;
    invalidation.add_damage(old);
    invalidation.mark_paint(registry, id);
    true
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::node::{LayoutState, WidgetNode};
    use crate::geometry::Size;
    use crate::layout::manager::{ArrangeChildren, ChildInput};
    use crate::layout::pack::{Fill, PackOptions, Side};
    use crate::widget::kind::WidgetKind;

    struct Fixture {
        reg: WidgetRegistry,
        themes: ThemeStore,
        inv: Invalidation,
        engine: LayoutEngine,
        root: NodeId,
    }

    const WINDOW: Rect = Rect::new(0, 0, 200, 100);

    impl Fixture {
        fn new() -> Self {
            let mut reg = WidgetRegistry::new();
            let root = reg.register(WidgetNode::new(WidgetKind::Window));
            let mut inv = Invalidation::new();
            inv.mark(&mut reg, root, Dirty::LAYOUT);
            Self {
                reg,
                themes: ThemeStore::new(),
                inv,
                engine: LayoutEngine::new(8),
                root,
            }
        }

        fn add(&mut self, parent: NodeId, kind: WidgetKind) -> NodeId {
            let id = self.reg.register_child(parent, WidgetNode::new(kind)).unwrap();
            self.inv.mark_geometry(&mut self.reg, id);
            id
        }

        fn run(&mut self) -> Result<LayoutReport> {
            self.engine
                .run(&mut self.reg, &self.themes, &mut self.inv, self.root, WINDOW)
        }

        fn rect(&self, id: NodeId) -> Rect {
            self.reg.get(id).unwrap().rect()
        }
    }

    /// Re-marks its first child on every arrange.
    struct Restless;

    impl ArrangeChildren for Restless {
        fn arrange(&mut self, cx: &mut ArrangeCx, area: Rect, children: &[ChildInput]) -> Vec<Rect> {
            if let Some(first) = children.first() {
                cx.mark_pending(first.id);
            }
            vec![area; children.len()]
        }
    }

    #[test]
    fn root_gets_window_and_children_get_rects() {
        let mut fx = Fixture::new();
        fx.reg.get_mut(fx.root).unwrap().manager = Some(GeometryManager::Pack);
        let a = fx.add(fx.root, WidgetKind::Frame);
        let b = fx.add(fx.root, WidgetKind::Frame);
        let o = PackOptions::new().side(Side::Left).expand(true).fill(Fill::Both);
        fx.reg.get_mut(a).unwrap().layout_options = o.clone().into();
        fx.reg.get_mut(b).unwrap().layout_options = o.into();

        fx.run().unwrap();
        assert_eq!(fx.rect(fx.root), WINDOW);
        assert_eq!(fx.rect(a), Rect::new(0, 0, 100, 100));
        assert_eq!(fx.rect(b), Rect::new(100, 0, 100, 100));
        assert!(!fx.inv.is_layout_pending());
        for id in [fx.root, a, b] {
            assert_eq!(fx.reg.get(id).unwrap().layout_state(), LayoutState::Clean);
        }
    }

    #[test]
    fn children_stay_inside_parents() {
        let mut fx = Fixture::new();
        let frame = fx.add(fx.root, WidgetKind::Frame);
        fx.reg.get_mut(frame).unwrap().layout_options =
            crate::layout::place::PlaceOptions::at(150, 50).size(100, 100).into();
        let inner = fx.add(frame, WidgetKind::Frame);
        fx.reg.get_mut(inner).unwrap().layout_options =
            crate::layout::place::PlaceOptions::at(-10, -10).size(500, 500).into();
        fx.run().unwrap();
        let (f, i) = (fx.rect(frame), fx.rect(inner));
        assert!(WINDOW.contains_rect(f));
        assert!(f.contains_rect(i));
        assert_eq!(f, Rect::new(150, 50, 50, 50));
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let mut fx = Fixture::new();
        fx.add(fx.root, WidgetKind::Label);
        fx.run().unwrap();
        let report = fx.run().unwrap();
        assert_eq!(report, LayoutReport::default());
    }

    #[test]
    fn divergence_is_caught_and_rolled_back() {
        let mut fx = Fixture::new();
        let frame = fx.add(fx.root, WidgetKind::Frame);
        fx.reg.get_mut(frame).unwrap().layout_options =
            crate::layout::place::PlaceOptions::at(0, 0).size(50, 50).into();
        fx.run().unwrap();
        let before = fx.rect(frame);

        fx.reg.get_mut(frame).unwrap().manager = Some(GeometryManager::custom(Restless));
        let child = fx.add(frame, WidgetKind::Label);
        let err = fx.run().unwrap_err();
        match err {
            Error::LayoutDivergence { container, iterations } => {
                assert_eq!(container, frame);
                assert_eq!(iterations, 8);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fx.rect(frame), before);
        assert_eq!(fx.rect(child), Rect::EMPTY);
        assert!(fx.engine.is_quarantined(frame));

        // Next frame converges with the subtree held clean.
        fx.run().unwrap();
        assert_eq!(fx.reg.get(child).unwrap().layout_state(), LayoutState::Clean);
        assert!(!fx.inv.is_layout_pending());
    }

    #[test]
    fn released_quarantine_lays_out_again() {
        let mut fx = Fixture::new();
        let frame = fx.add(fx.root, WidgetKind::Frame);
        fx.reg.get_mut(frame).unwrap().manager = Some(GeometryManager::custom(Restless));
        let child = fx.add(frame, WidgetKind::Label);
        assert!(fx.run().is_err());

        fx.reg.get_mut(frame).unwrap().manager = Some(GeometryManager::Place);
        assert!(fx.engine.release(frame));
        fx.inv.mark_geometry(&mut fx.reg, frame);
        fx.run().unwrap();
        assert_eq!(fx.rect(child).origin(), fx.rect(frame).origin());
        assert_ne!(fx.rect(child).size(), Size::ZERO);
    }
}
