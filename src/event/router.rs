//! Event routing: hit-testing, focus, pointer capture, bubbling.
//!
//! Pointer events go to the capturing node when a capture is active,
//! otherwise to the deepest visible, enabled node under the pointer. Key and
//! text events go to the focused node. Delivery bubbles from the target up
//! through its ancestors until a handler consumes the event. Whatever no
//! handler claims falls through to the target kind's built-in behavior and
//! then, for Tab and Shift+Tab, to focus navigation. Anything left is
//! reported unconsumed.

use std::fmt;

use slotmap::SecondaryMap;

use crate::config::mediator::ConfigBatch;
use crate::config::value::Value;
use crate::context::ToolkitContext;
use crate::dom::node::{NodeId, WidgetNode};
use crate::dom::registry::WidgetRegistry;
use crate::error::Result;
use crate::geometry::Point;
use crate::widget::behavior;

use super::input::{EventKind, InputEvent};

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Whether a handler claimed an event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Handled {
    /// Stop bubbling; the event is consumed.
    Consumed,
    /// Let the event continue to the parent.
    Ignored,
}

/// Result of routing one event, reported to the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Consumed,
    Unconsumed,
}

impl Outcome {
    pub fn is_consumed(self) -> bool {
        self == Outcome::Consumed
    }
}

impl From<bool> for Outcome {
    fn from(consumed: bool) -> Self {
        if consumed {
            Outcome::Consumed
        } else {
            Outcome::Unconsumed
        }
    }
}

/// A per-node input callback.
pub type EventHandler = Box<dyn FnMut(&mut EventCx<'_>, &InputEvent) -> Handled>;

/// What a handler sees while it runs.
pub struct EventCx<'a> {
    ctx: &'a mut ToolkitContext,
    target: NodeId,
    current: NodeId,
}

impl<'a> EventCx<'a> {
    /// The node the event was routed to.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The node whose handler is running.
    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn registry(&self) -> &WidgetRegistry {
        self.ctx.registry()
    }

    pub fn node(&self, id: NodeId) -> Result<&WidgetNode> {
        self.ctx.node(id)
    }

    pub fn configure(&mut self, id: NodeId, batch: impl Into<ConfigBatch>) -> Result<()> {
        self.ctx.configure(id, batch)
    }

    pub fn cget(&self, id: NodeId, key: &str) -> Result<Value> {
        self.ctx.cget(id, key)
    }

    /// Move focus to `id`. Returns whether the node could take focus.
    pub fn focus(&mut self, id: NodeId) -> Result<bool> {
        self.ctx.focus(id)
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.ctx.focused()
    }

    /// Route every pointer event to the current node until released.
    pub fn capture_pointer(&mut self) {
        self.ctx.capture(self.current);
    }

    pub fn release_capture(&mut self) -> Option<NodeId> {
        self.ctx.release_capture()
    }

    pub fn captured(&self) -> Option<NodeId> {
        self.ctx.captured()
    }

    /// Full access to the toolkit, for creating or destroying widgets.
    pub fn context(&mut self) -> &mut ToolkitContext {
        self.ctx
    }
}

// ---------------------------------------------------------------------------
// EventRouter
// ---------------------------------------------------------------------------

/// Focus, capture and handler tables.
///
/// Focus and capture are non-owning handles, validated against the registry
/// every time they are used.
#[derive(Default)]
pub struct EventRouter {
    pub(crate) focused: Option<NodeId>,
    pub(crate) captured: Option<NodeId>,
    pub(crate) hovered: Option<NodeId>,
    handlers: SecondaryMap<NodeId, EventHandler>,
}

impl fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRouter")
            .field("focused", &self.focused)
            .field("captured", &self.captured)
            .field("hovered", &self.hovered)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handler` on `id`, replacing any previous one.
    pub fn set_handler<F>(&mut self, id: NodeId, handler: F)
    where
        F: FnMut(&mut EventCx<'_>, &InputEvent) -> Handled + 'static,
    {
        self.handlers.insert(id, Box::new(handler));
    }

    pub fn remove_handler(&mut self, id: NodeId) -> bool {
        self.handlers.remove(id).is_some()
    }

    pub fn has_handler(&self, id: NodeId) -> bool {
        self.handlers.contains_key(id)
    }

    /// Drop everything held for a destroyed node.
    pub fn forget(&mut self, id: NodeId) {
        self.handlers.remove(id);
        if self.focused == Some(id) {
            self.focused = None;
        }
        if self.captured == Some(id) {
            self.captured = None;
        }
        if self.hovered == Some(id) {
            self.hovered = None;
        }
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
        self.focused = None;
        self.captured = None;
        self.hovered = None;
    }
}

// ---------------------------------------------------------------------------
// Hit-testing
// ---------------------------------------------------------------------------

/// The deepest visible, enabled node under `point`, searching children from
/// the highest z-index down (later siblings first on ties).
///
/// The root itself is never a hit: a point on bare window background, or
/// outside the window, yields `None`.
pub fn hit_test(registry: &WidgetRegistry, root: NodeId, point: Point) -> Option<NodeId> {
    hit_node(registry, root, point).filter(|&hit| hit != root)
}

fn hit_node(registry: &WidgetRegistry, id: NodeId, point: Point) -> Option<NodeId> {
    let node = registry.get(id)?;
    if !node.is_visible() || !node.is_enabled() || !node.rect().contains(point) {
        return None;
    }
    registry
        .paint_order(id)
        .into_iter()
        .rev()
        .find_map(|child| hit_node(registry, child, point))
        .or(Some(id))
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Route one event through `ctx`.
pub(crate) fn route(ctx: &mut ToolkitContext, event: &InputEvent) -> Outcome {
    let outcome = match &event.kind {
        EventKind::Resize(size) => {
            ctx.resize(*size);
            Outcome::Consumed
        }
        EventKind::FocusLost => {
            if let Some(id) = ctx.release_capture() {
                tracing::debug!(?id, "pointer capture force-released on focus loss");
            }
            ctx.set_hover(None);
            Outcome::Consumed
        }
        EventKind::PointerMove { position }
        | EventKind::PointerDown { position, .. }
        | EventKind::PointerUp { position, .. } => route_pointer(ctx, event, *position),
        EventKind::KeyDown(_) | EventKind::KeyUp(_) | EventKind::TextInput(_) => {
            route_keyboard(ctx, event)
        }
    };
    if !outcome.is_consumed() {
        tracing::trace!(kind = ?event.kind, "event unconsumed");
    }
    outcome
}

fn route_pointer(ctx: &mut ToolkitContext, event: &InputEvent, position: Point) -> Outcome {
    let under = hit_test(ctx.registry(), ctx.root(), position);
    ctx.set_hover(under);
    let target = ctx.captured().or(under);
    let Some(target) = target else {
        return Outcome::Unconsumed;
    };
    if matches!(event.kind, EventKind::PointerDown { .. }) && ctx.can_focus(target) {
        ctx.set_focus(Some(target));
    }
    (deliver(ctx, target, event) || behavior::default_action(ctx, target, event)).into()
}

fn route_keyboard(ctx: &mut ToolkitContext, event: &InputEvent) -> Outcome {
    if let Some(target) = ctx.focused() {
        if deliver(ctx, target, event) || behavior::default_action(ctx, target, event) {
            return Outcome::Consumed;
        }
    }
    if let EventKind::KeyDown(key) = &event.kind {
        if key.is_back_tab() {
            ctx.focus_previous();
            return Outcome::Consumed;
        }
        if key.is_tab() {
            ctx.focus_next();
            return Outcome::Consumed;
        }
    }
    Outcome::Unconsumed
}

/// Bubble `event` from `target` to the root. Returns whether a handler
/// consumed it.
fn deliver(ctx: &mut ToolkitContext, target: NodeId, event: &InputEvent) -> bool {
    let mut path = vec![target];
    path.extend(ctx.registry().ancestors(target));
    for current in path {
        if !ctx.registry().contains(current) {
            continue;
        }
        // Taken out while it runs so the handler can borrow the context.
        let Some(mut handler) = ctx.router.handlers.remove(current) else {
            continue;
        };
        let handled = {
            let mut cx = EventCx {
                ctx: &mut *ctx,
                target,
                current,
            };
            handler(&mut cx, event)
        };
        if ctx.registry().contains(current) && !ctx.router.has_handler(current) {
            ctx.router.handlers.insert(current, handler);
        }
        if handled == Handled::Consumed {
            return true;
        }
    }
    false
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::widget::kind::WidgetKind;

    fn placed(reg: &mut WidgetRegistry, parent: NodeId, kind: WidgetKind, rect: Rect) -> NodeId {
        let id = reg.register_child(parent, WidgetNode::new(kind)).unwrap();
        reg.get_mut(id).unwrap().rect = rect;
        id
    }

    fn scene() -> (WidgetRegistry, NodeId) {
        let mut reg = WidgetRegistry::new();
        let root = reg.register(WidgetNode::new(WidgetKind::Window));
        reg.get_mut(root).unwrap().rect = Rect::new(0, 0, 100, 100);
        (reg, root)
    }

    #[test]
    fn deepest_node_wins() {
        let (mut reg, root) = scene();
        let frame = placed(&mut reg, root, WidgetKind::Frame, Rect::new(0, 0, 50, 50));
        let button = placed(&mut reg, frame, WidgetKind::Button, Rect::new(10, 10, 10, 10));
        assert_eq!(hit_test(&reg, root, Point::new(15, 15)), Some(button));
        assert_eq!(hit_test(&reg, root, Point::new(30, 30)), Some(frame));
    }

    #[test]
    fn higher_z_wins_among_overlaps() {
        let (mut reg, root) = scene();
        let low = placed(&mut reg, root, WidgetKind::Frame, Rect::new(0, 0, 40, 40));
        let high = placed(&mut reg, root, WidgetKind::Frame, Rect::new(20, 20, 40, 40));
        reg.get_mut(low).unwrap().z_index = 5;
        assert_eq!(hit_test(&reg, root, Point::new(25, 25)), Some(low));
        reg.get_mut(low).unwrap().z_index = 0;
        // Equal z: the later sibling is on top.
        assert_eq!(hit_test(&reg, root, Point::new(25, 25)), Some(high));
    }

    #[test]
    fn hidden_and_disabled_are_transparent() {
        let (mut reg, root) = scene();
        let under = placed(&mut reg, root, WidgetKind::Frame, Rect::new(0, 0, 40, 40));
        let over = placed(&mut reg, root, WidgetKind::Frame, Rect::new(0, 0, 40, 40));
        reg.get_mut(over).unwrap().visible = false;
        assert_eq!(hit_test(&reg, root, Point::new(5, 5)), Some(under));
        reg.get_mut(over).unwrap().visible = true;
        reg.get_mut(over).unwrap().enabled = false;
        assert_eq!(hit_test(&reg, root, Point::new(5, 5)), Some(under));
    }

    #[test]
    fn misses_return_none() {
        let (mut reg, root) = scene();
        placed(&mut reg, root, WidgetKind::Frame, Rect::new(0, 0, 10, 10));
        assert_eq!(hit_test(&reg, root, Point::new(50, 50)), None);
        assert_eq!(hit_test(&reg, root, Point::new(500, 5)), None);
    }

    #[test]
    fn router_forgets_destroyed_nodes() {
        let (mut reg, root) = scene();
        let b = placed(&mut reg, root, WidgetKind::Button, Rect::new(0, 0, 10, 10));
        let mut router = EventRouter::new();
        router.set_handler(b, |_, _| Handled::Consumed);
        router.focused = Some(b);
        router.captured = Some(b);
        router.forget(b);
        assert!(!router.has_handler(b));
        assert_eq!(router.focused, None);
        assert_eq!(router.captured, None);
    }
}
