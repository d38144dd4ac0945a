//! The paint pass.
//!
//! Walks the tree in paint order (children by ascending z-index, insertion
//! order on ties) and describes every visible widget that intersects the
//! dirty region as backend primitives. Hidden widgets hide their subtree.

use crate::backend::{DrawBackend, DrawStyle};
use crate::config::value::{Color, Value};
use crate::dom::node::{NodeId, WidgetNode};
use crate::dom::registry::WidgetRegistry;
use crate::error::Result;
use crate::geometry::{clamp_extent, Insets, Rect};
use crate::theme::ThemeStore;
use crate::widget::kind::WidgetKind;
use crate::widget::measure::content_insets;

/// Resolved style lookups for one node.
struct Styled<'a> {
    themes: &'a ThemeStore,
    node: &'a WidgetNode,
}

impl Styled<'_> {
    fn value(&self, key: &str) -> Option<Value> {
        self.themes.resolve(self.node.kind(), key, self.node.overrides()).ok()
    }

    fn color(&self, key: &str) -> Color {
        self.value(key).and_then(|v| v.as_color()).unwrap_or(Color::TRANSPARENT)
    }

    fn int(&self, key: &str) -> i32 {
        self.value(key)
            .and_then(|v| v.as_int())
            .map(clamp_extent)
            .unwrap_or(0)
    }

    fn float(&self, key: &str) -> f64 {
        self.value(key).and_then(|v| v.as_float()).unwrap_or(0.0)
    }

    fn flag(&self, key: &str) -> bool {
        self.value(key).and_then(|v| v.as_bool()).unwrap_or(false)
    }

    fn text(&self, key: &str) -> String {
        self.value(key)
            .and_then(|v| v.as_text().map(str::to_string))
            .unwrap_or_default()
    }

    fn vertical(&self) -> bool {
        self.text("orientation").eq_ignore_ascii_case("vertical")
    }

    /// The widget's box: background fill with its border.
    fn frame(&self) -> DrawStyle {
        DrawStyle {
            fill: self.color("background"),
            stroke: self.color("border_color"),
            stroke_width: self.int("border_width").max(0),
            radius: self.int("border_radius").max(0),
            text_color: self.color("foreground"),
            font_family: self.text("font_family"),
            font_size: self.int("font_size").max(0),
        }
    }

    /// Text over the widget's background.
    fn ink(&self) -> DrawStyle {
        DrawStyle {
            stroke: Color::TRANSPARENT,
            stroke_width: 0,
            ..self.frame()
        }
    }

    fn solid(&self, fill: Color, radius: i32) -> DrawStyle {
        DrawStyle {
            fill,
            stroke: Color::TRANSPARENT,
            stroke_width: 0,
            radius,
            ..self.frame()
        }
    }
}

/// Interaction state that changes how a node is drawn.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Highlight {
    pub focused: Option<NodeId>,
    /// The node under the pointer.
    pub hovered: Option<NodeId>,
}

/// Paint every visible node under `root` that intersects `dirty`.
/// Returns how many nodes were drawn.
pub fn paint(
    registry: &WidgetRegistry,
    themes: &ThemeStore,
    root: NodeId,
    dirty: Rect,
    highlight: Highlight,
    backend: &mut dyn DrawBackend,
) -> Result<usize> {
    let mut painted = 0;
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let Some(node) = registry.get(id) else {
            continue;
        };
        if !node.is_visible() {
            continue;
        }
        if node.rect().overlaps(dirty) {
            let focused = highlight.focused == Some(id);
            let hovered = highlight.hovered == Some(id);
            draw_node(themes, node, focused, hovered, backend)?;
            painted += 1;
        }
        // Reversed so the lowest z-index pops first.
        stack.extend(registry.paint_order(id).into_iter().rev());
    }
    Ok(painted)
}

fn draw_node(
    themes: &ThemeStore,
    node: &WidgetNode,
    focused: bool,
    hovered: bool,
    backend: &mut dyn DrawBackend,
) -> Result<()> {
    let s = Styled { themes, node };
    let rect = node.rect();
    let content = rect.inset(content_insets(themes, node));
    let fs = s.int("font_size").max(0);

    match node.kind() {
        WidgetKind::Window | WidgetKind::Frame => {
            backend.draw_rect(rect, &s.frame())?;
        }
        WidgetKind::Label | WidgetKind::Button => {
            let mut frame = s.frame();
            if hovered && node.kind() == WidgetKind::Button {
                frame.fill = s.color("hover");
            }
            backend.draw_rect(rect, &frame)?;
            let image = s.text("image");
            if !image.is_empty() {
                backend.draw_image(content, &image, &s.ink())?;
            }
            let text = s.text("text");
            if !text.is_empty() {
                backend.draw_text(content, &text, &s.ink())?;
            }
        }
        WidgetKind::CheckButton | WidgetKind::RadioButton => {
            backend.draw_rect(rect, &s.frame())?;
            let side = fs.min(content.height).max(0);
            let corner = if node.kind() == WidgetKind::RadioButton { side / 2 } else { 2 };
            let mark = Rect::new(content.x, content.y, side, side);
            let fill = if s.flag("checked") {
                s.color("check_color")
            } else {
                s.color("background")
            };
            let box_style = DrawStyle {
                stroke_width: 1,
                ..s.solid(fill, corner)
            };
            backend.draw_rect(mark, &DrawStyle { stroke: s.color("border_color"), ..box_style })?;
            let label = content.inset(Insets {
                left: side + side / 2,
                ..Insets::ZERO
            });
            let text = s.text("text");
            if !text.is_empty() {
                backend.draw_text(label, &text, &s.ink())?;
            }
        }
        WidgetKind::Entry => {
            backend.draw_rect(rect, &s.frame())?;
            let text = s.text("text");
            let mask = s.text("show");
            if text.is_empty() {
                let placeholder = s.text("placeholder");
                if !placeholder.is_empty() {
                    let dim = DrawStyle {
                        text_color: s.color("border_color"),
                        ..s.ink()
                    };
                    backend.draw_text(content, &placeholder, &dim)?;
                }
            } else if let Some(ch) = mask.chars().next() {
                let masked: String = std::iter::repeat(ch).take(text.chars().count()).collect();
                backend.draw_text(content, &masked, &s.ink())?;
            } else {
                backend.draw_text(content, &text, &s.ink())?;
            }
        }
        WidgetKind::Progressbar => {
            backend.draw_rect(rect, &s.frame())?;
            let (min, max) = (s.float("minimum"), s.float("maximum"));
            let fraction = if max > min {
                ((s.float("value") - min) / (max - min)).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let bar = if s.vertical() {
                let h = (content.height as f64 * fraction).round() as i32;
                Rect::new(content.x, content.bottom() - h, content.width, h)
            } else {
                let w = (content.width as f64 * fraction).round() as i32;
                Rect::new(content.x, content.y, w, content.height)
            };
            backend.draw_rect(bar, &s.solid(s.color("bar_color"), s.int("border_radius")))?;
            if s.flag("show_value") {
                let label = format!("{}%", (fraction * 100.0).round() as i64);
                backend.draw_text(content, &label, &s.ink())?;
            }
        }
        WidgetKind::Separator => {
            let t = s.int("thickness").max(0);
            let line = if s.vertical() {
                Rect::new(content.x + (content.width - t) / 2, content.y, t, content.height)
            } else {
                Rect::new(content.x, content.y + (content.height - t) / 2, content.width, t)
            };
            backend.draw_rect(line, &s.solid(s.color("color"), 0))?;
        }
        WidgetKind::Scale => {
            backend.draw_rect(rect, &s.frame())?;
            let (from, to) = (s.float("from"), s.float("to"));
            let value = s.float("value");
            let fraction = if to != from {
                ((value - from) / (to - from)).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let r = s.int("handle_radius").max(0);
            let (track, handle) = if s.vertical() {
                let cx = content.x + content.width / 2;
                let cy = content.bottom() - 1 - ((content.height - 1).max(0) as f64 * fraction).round() as i32;
                (
                    Rect::new(cx - 2, content.y, 4, content.height),
                    Rect::new(cx - r, cy - r, r * 2, r * 2),
                )
            } else {
                let cy = content.y + content.height / 2;
                let cx = content.x + ((content.width - 1).max(0) as f64 * fraction).round() as i32;
                (
                    Rect::new(content.x, cy - 2, content.width, 4),
                    Rect::new(cx - r, cy - r, r * 2, r * 2),
                )
            };
            backend.draw_rect(track, &s.solid(s.color("track_color"), 2))?;
            backend.draw_rect(handle, &s.solid(s.color("handle_color"), r))?;
            if s.flag("show_value") {
                backend.draw_text(content, &format!("{value:.0}"), &s.ink())?;
            }
        }
    }

    if focused {
        let ring = DrawStyle {
            fill: Color::TRANSPARENT,
            stroke: s.color("foreground"),
            stroke_width: 1,
            ..s.frame()
        };
        backend.draw_rect(rect, &ring)?;
    }
    Ok(())
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::recording::{DrawCall, RecordingBackend};

    fn scene() -> (WidgetRegistry, ThemeStore, NodeId) {
        let mut reg = WidgetRegistry::new();
        let root = reg.register(WidgetNode::new(WidgetKind::Window));
        reg.get_mut(root).unwrap().rect = Rect::new(0, 0, 100, 100);
        (reg, ThemeStore::new(), root)
    }

    fn add(reg: &mut WidgetRegistry, parent: NodeId, kind: WidgetKind, rect: Rect) -> NodeId {
        let id = reg.register_child(parent, WidgetNode::new(kind)).unwrap();
        reg.get_mut(id).unwrap().rect = rect;
        id
    }

    #[test]
    fn paints_in_z_order() {
        let (mut reg, themes, root) = scene();
        let top = add(&mut reg, root, WidgetKind::Frame, Rect::new(0, 0, 10, 10));
        let bottom = add(&mut reg, root, WidgetKind::Frame, Rect::new(20, 0, 10, 10));
        reg.get_mut(top).unwrap().z_index = 1;
        let mut backend = RecordingBackend::new();
        let n = paint(&reg, &themes, root, Rect::new(0, 0, 100, 100), Highlight::default(), &mut backend).unwrap();
        assert_eq!(n, 3);
        let rects: Vec<Rect> = backend.rects().collect();
        assert_eq!(
            rects,
            vec![
                Rect::new(0, 0, 100, 100),
                reg.get(bottom).unwrap().rect(),
                reg.get(top).unwrap().rect(),
            ]
        );
    }

    #[test]
    fn only_dirty_nodes_are_drawn() {
        let (mut reg, themes, root) = scene();
        add(&mut reg, root, WidgetKind::Frame, Rect::new(0, 0, 10, 10));
        let far = add(&mut reg, root, WidgetKind::Frame, Rect::new(50, 50, 10, 10));
        let mut backend = RecordingBackend::new();
        let dirty = Rect::new(55, 55, 2, 2);
        let n = paint(&reg, &themes, root, dirty, Highlight::default(), &mut backend).unwrap();
        // The root and the far frame.
        assert_eq!(n, 2);
        assert!(backend.rects().any(|r| r == reg.get(far).unwrap().rect()));
    }

    #[test]
    fn hidden_subtrees_are_skipped() {
        let (mut reg, themes, root) = scene();
        let frame = add(&mut reg, root, WidgetKind::Frame, Rect::new(0, 0, 50, 50));
        add(&mut reg, frame, WidgetKind::Label, Rect::new(0, 0, 10, 10));
        reg.get_mut(frame).unwrap().visible = false;
        let mut backend = RecordingBackend::new();
        let n = paint(&reg, &themes, root, Rect::new(0, 0, 100, 100), Highlight::default(), &mut backend).unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn label_text_is_drawn_inside_padding() {
        let (mut reg, themes, root) = scene();
        let label = add(&mut reg, root, WidgetKind::Label, Rect::new(0, 0, 40, 20));
        let node = reg.get_mut(label).unwrap();
        node.config.insert("text".into(), Value::from("hi"));
        node.config.insert("padding".into(), Value::Int(2));
        let mut backend = RecordingBackend::new();
        paint(&reg, &themes, root, Rect::new(0, 0, 100, 100), Highlight::default(), &mut backend).unwrap();
        assert!(backend.calls().iter().any(|c| matches!(
            c,
            DrawCall::Text { rect, text, .. } if text == "hi" && *rect == Rect::new(2, 2, 36, 16)
        )));
    }

    #[test]
    fn entry_masks_text() {
        let (mut reg, themes, root) = scene();
        let entry = add(&mut reg, root, WidgetKind::Entry, Rect::new(0, 0, 40, 20));
        let node = reg.get_mut(entry).unwrap();
        node.config.insert("text".into(), Value::from("secret"));
        node.config.insert("show".into(), Value::from("*"));
        let mut backend = RecordingBackend::new();
        paint(&reg, &themes, root, Rect::new(0, 0, 100, 100), Highlight::default(), &mut backend).unwrap();
        assert_eq!(backend.texts(), vec!["******".to_string()]);
    }

    #[test]
    fn progressbar_fills_by_fraction() {
        let (mut reg, themes, root) = scene();
        let bar = add(&mut reg, root, WidgetKind::Progressbar, Rect::new(0, 0, 104, 24));
        reg.get_mut(bar).unwrap().config.insert("value".into(), Value::Int(25));
        let mut backend = RecordingBackend::new();
        paint(&reg, &themes, root, Rect::new(0, 0, 200, 200), Highlight::default(), &mut backend).unwrap();
        // border_width 2 leaves a 100x20 content box.
        assert!(backend.rects().any(|r| r == Rect::new(2, 2, 25, 20)));
        assert_eq!(backend.texts(), vec!["25%".to_string()]);
    }

    #[test]
    fn focus_ring_follows_focus() {
        let (mut reg, themes, root) = scene();
        let button = add(&mut reg, root, WidgetKind::Button, Rect::new(0, 0, 20, 10));
        let mut plain = RecordingBackend::new();
        paint(&reg, &themes, root, Rect::new(0, 0, 100, 100), Highlight::default(), &mut plain).unwrap();
        let mut ringed = RecordingBackend::new();
        let focus = Highlight { focused: Some(button), ..Highlight::default() };
        paint(&reg, &themes, root, Rect::new(0, 0, 100, 100), focus, &mut ringed).unwrap();
        assert_eq!(ringed.calls().len(), plain.calls().len() + 1);
    }

    #[test]
    fn hovered_button_uses_hover_fill() {
        let (mut reg, themes, root) = scene();
        let button = add(&mut reg, root, WidgetKind::Button, Rect::new(0, 0, 20, 10));
        let hover = Color::rgb(1, 2, 3);
        reg.get_mut(button).unwrap().config.insert("hover".into(), Value::Color(hover));
        let fill_of = |highlight: Highlight| {
            let mut backend = RecordingBackend::new();
            paint(&reg, &themes, root, Rect::new(0, 0, 100, 100), highlight, &mut backend).unwrap();
            backend.calls().iter().find_map(|c| match c {
                DrawCall::Rect { rect, style } if *rect == Rect::new(0, 0, 20, 10) => Some(style.fill),
                _ => None,
            })
        };
        assert_ne!(fill_of(Highlight::default()), Some(hover));
        let hovered = Highlight { hovered: Some(button), ..Highlight::default() };
        assert_eq!(fill_of(hovered), Some(hover));
    }

    #[test]
    fn radio_mark_is_round() {
        let (mut reg, themes, root) = scene();
        let radio = add(&mut reg, root, WidgetKind::RadioButton, Rect::new(0, 0, 60, 20));
        reg.get_mut(radio).unwrap().config.insert("font_size".into(), Value::Int(10));
        let mut backend = RecordingBackend::new();
        paint(&reg, &themes, root, Rect::new(0, 0, 100, 100), Highlight::default(), &mut backend).unwrap();
        assert!(backend.calls().iter().any(|c| matches!(
            c,
            DrawCall::Rect { rect, style } if *rect == Rect::new(0, 0, 10, 10) && style.radius == 5
        )));
    }
}
