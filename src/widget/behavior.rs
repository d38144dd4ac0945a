//! Built-in reactions of the interactive kinds.
//!
//! These run only when no handler on the target or its ancestors consumed
//! the event, and they act purely through `configure`, so every state change
//! goes through the same validation and invalidation as host code.

use crate::config::mediator::ConfigBatch;
use crate::context::ToolkitContext;
use crate::dom::node::NodeId;
use crate::event::input::{EventKind, InputEvent, Key, Modifiers, PointerButton};
use crate::geometry::{Point, Rect};

use super::kind::WidgetKind;

/// Apply the target kind's built-in behavior. Returns whether it consumed
/// the event.
pub(crate) fn default_action(ctx: &mut ToolkitContext, target: NodeId, event: &InputEvent) -> bool {
    let Ok(node) = ctx.node(target) else {
        return false;
    };
    let (kind, rect) = (node.kind(), node.rect());
    let captured = ctx.captured() == Some(target);

    match (kind, &event.kind) {
        (WidgetKind::CheckButton, EventKind::PointerDown { button: PointerButton::Left, .. }) => {
            toggle(ctx, target)
        }
        (WidgetKind::CheckButton, EventKind::KeyDown(k))
            if matches!(k.code, Key::Char(' ') | Key::Enter) =>
        {
            toggle(ctx, target)
        }

        (WidgetKind::RadioButton, EventKind::PointerDown { button: PointerButton::Left, .. }) => {
            select(ctx, target)
        }
        (WidgetKind::RadioButton, EventKind::KeyDown(k))
            if matches!(k.code, Key::Char(' ') | Key::Enter) =>
        {
            select(ctx, target)
        }

        (WidgetKind::Entry, EventKind::TextInput(text)) => edit(ctx, target, |s| s.push_str(text)),
        (WidgetKind::Entry, EventKind::KeyDown(k)) if k.code == Key::Backspace => {
            edit(ctx, target, |s| {
                s.pop();
            })
        }
        // The characters arrive as text input.
        (WidgetKind::Entry, EventKind::KeyDown(k)) => {
            matches!(k.code, Key::Char(_)) && !k.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT)
        }

        (WidgetKind::Scale, EventKind::PointerDown { position, button: PointerButton::Left }) => {
            ctx.capture(target);
            slide(ctx, target, rect, *position)
        }
        (WidgetKind::Scale, EventKind::PointerMove { position }) if captured => {
            slide(ctx, target, rect, *position)
        }
        (WidgetKind::Scale, EventKind::PointerUp { .. }) if captured => {
            ctx.release_capture();
            true
        }
        _ => false,
    }
}

fn toggle(ctx: &mut ToolkitContext, id: NodeId) -> bool {
    let checked = ctx
        .cget(id, "checked")
        .ok()
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    ctx.configure(id, ConfigBatch::new().set("checked", !checked)).is_ok()
}

/// Check a radio button; its group peers are cleared by `configure`.
fn select(ctx: &mut ToolkitContext, id: NodeId) -> bool {
    ctx.configure(id, ConfigBatch::new().set("checked", true)).is_ok()
}

fn edit(ctx: &mut ToolkitContext, id: NodeId, change: impl FnOnce(&mut String)) -> bool {
    let mut text = ctx
        .cget(id, "text")
        .ok()
        .and_then(|v| v.as_text().map(str::to_string))
        .unwrap_or_default();
    change(&mut text);
    ctx.configure(id, ConfigBatch::new().set("text", text)).is_ok()
}

fn number(ctx: &ToolkitContext, id: NodeId, key: &str) -> f64 {
    ctx.cget(id, key)
        .ok()
        .and_then(|v| v.as_float())
        .unwrap_or(0.0)
}

/// Set a scale's value from a pointer position along its track, snapped to
/// `step` when it is positive.
fn slide(ctx: &mut ToolkitContext, id: NodeId, track: Rect, position: Point) -> bool {
    let vertical = ctx
        .cget(id, "orientation")
        .ok()
        .and_then(|v| v.as_text().map(|s| s.eq_ignore_ascii_case("vertical")))
        .unwrap_or(false);
    let fraction = if vertical {
        let span = (track.height - 1).max(1) as f64;
        (track.bottom() - 1 - position.y) as f64 / span
    } else {
        let span = (track.width - 1).max(1) as f64;
        (position.x - track.x) as f64 / span
    }
    .clamp(0.0, 1.0);
    let (from, to) = (number(ctx, id, "from"), number(ctx, id, "to"));
    let mut value = from + fraction * (to - from);
    let step = number(ctx, id, "step");
    if step > 0.0 {
        let (low, high) = (from.min(to), from.max(to));
        value = (from + ((value - from) / step).round() * step).clamp(low, high);
    }
    ctx.configure(id, ConfigBatch::new().set("value", value)).is_ok()
}

// ===========================================================================
// Tests
// ===========================================================================
