//! Requested-size measurement.
//!
//! A widget's requested size is its explicit `width`/`height` when positive,
//! otherwise an intrinsic measure plus padding and border. Text is measured
//! with a fixed-advance model: each character is half the font size wide.
//! Containers ask their geometry manager to measure their children.

use crate::dom::node::{NodeId, WidgetNode};
use crate::dom::registry::WidgetRegistry;
use crate::geometry::{clamp_extent, Insets, Size};
use crate::layout::manager::ChildInput;
use crate::layout::place;
use crate::theme::ThemeStore;

use super::kind::WidgetKind;

/// Length assumed for bars, scales and empty entries along their long axis.
const TRACK_LENGTH: i32 = 100;

/// Minimum characters an entry reserves.
const ENTRY_CHARS: usize = 10;

fn style_int(themes: &ThemeStore, node: &WidgetNode, key: &str) -> i32 {
    themes
        .resolve(node.kind, key, &node.config)
        .ok()
        .and_then(|v| v.as_int())
        .map(clamp_extent)
        .unwrap_or(0)
}

fn style_text(themes: &ThemeStore, node: &WidgetNode, key: &str) -> String {
    themes
        .resolve(node.kind, key, &node.config)
        .ok()
        .and_then(|v| v.as_text().map(str::to_string))
        .unwrap_or_default()
}

/// Advance width of `text` at `font_size`, clamped to the extent range.
pub fn text_width(text: &str, font_size: i32) -> i32 {
    advance(text.chars().count(), font_size)
}

fn advance(chars: usize, font_size: i32) -> i32 {
    let chars = i64::try_from(chars).unwrap_or(i64::MAX);
    clamp_extent(chars.saturating_mul(i64::from(font_size)) / 2)
}

fn is_vertical(themes: &ThemeStore, node: &WidgetNode) -> bool {
    style_text(themes, node, "orientation").eq_ignore_ascii_case("vertical")
}

/// Inner padding plus border on each side.
pub fn content_insets(themes: &ThemeStore, node: &WidgetNode) -> Insets {
    let padding = style_int(themes, node, "padding").max(0);
    let border = style_int(themes, node, "border_width").max(0);
    Insets::uniform(padding.saturating_add(border))
}

fn intrinsic(registry: &WidgetRegistry, themes: &ThemeStore, id: NodeId, node: &WidgetNode) -> Size {
    let fs = style_int(themes, node, "font_size").max(0);
    match node.kind {
        WidgetKind::Window | WidgetKind::Frame => {
            let children = child_inputs(registry, themes, id);
            match &node.manager {
                Some(manager) => manager.measure(&children),
                None => place::measure(&children),
            }
        }
        WidgetKind::Label | WidgetKind::Button => {
            let width = text_width(&style_text(themes, node, "text"), fs);
            let wrap = style_int(themes, node, "wraplength");
            if node.kind == WidgetKind::Label && wrap > 0 && width > wrap {
                let lines = (width - 1) / wrap + 1;
                Size::new(wrap, clamp_extent(i64::from(fs) * i64::from(lines)))
            } else {
                Size::new(width, fs)
            }
        }
        WidgetKind::CheckButton | WidgetKind::RadioButton => {
            let label = text_width(&style_text(themes, node, "text"), fs);
            Size::new(fs.saturating_add(fs / 2).saturating_add(label), fs)
        }
        WidgetKind::Entry => {
            let text = style_text(themes, node, "text");
            let placeholder = style_text(themes, node, "placeholder");
            let chars = text
                .chars()
                .count()
                .max(placeholder.chars().count())
                .max(ENTRY_CHARS);
            Size::new(advance(chars, fs), fs)
        }
        WidgetKind::Progressbar => {
            if is_vertical(themes, node) {
                Size::new(fs, TRACK_LENGTH)
            } else {
                Size::new(TRACK_LENGTH, fs)
            }
        }
        WidgetKind::Separator => {
            let thickness = style_int(themes, node, "thickness").max(0);
            if is_vertical(themes, node) {
                Size::new(thickness, 0)
            } else {
                Size::new(0, thickness)
            }
        }
        WidgetKind::Scale => {
            let across = style_int(themes, node, "handle_radius").saturating_mul(2).max(fs);
            if is_vertical(themes, node) {
                Size::new(across, TRACK_LENGTH)
            } else {
                Size::new(TRACK_LENGTH, across)
            }
        }
    }
}

/// Requested size of `id`. Unknown ids measure as zero.
pub fn requested_size(registry: &WidgetRegistry, themes: &ThemeStore, id: NodeId) -> Size {
    let Some(node) = registry.get(id) else {
        return Size::ZERO;
    };
    let width = style_int(themes, node, "width");
    let height = style_int(themes, node, "height");
    if width > 0 && height > 0 {
        return Size::new(width, height);
    }
    let natural = intrinsic(registry, themes, id, node)
        .non_negative()
        .expand(content_insets(themes, node));
    Size::new(
        if width > 0 { width } else { natural.width },
        if height > 0 { height } else { natural.height },
    )
}

/// Inputs for arranging the children of `id`, in child order.
pub fn child_inputs(registry: &WidgetRegistry, themes: &ThemeStore, id: NodeId) -> Vec<ChildInput> {
    registry
        .children(id)
        .iter()
        .filter_map(|&child| {
            let node = registry.get(child)?;
            Some(ChildInput {
                id: child,
                visible: node.visible,
                requested: requested_size(registry, themes, child),
                options: node.layout_options.clone(),
            })
        })
        .collect()
}
