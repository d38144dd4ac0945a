//! Text dumps of the widget tree for snapshot tests.

use std::fmt::Write;

use crate::context::ToolkitContext;
use crate::dom::node::NodeId;

/// Render the tree under the root as indented text, one widget per line:
/// kind, laid-out rectangle, geometry manager and state flags.
///
/// ```text
/// Window 0,0 200x100 pack
///   Label 0,0 40x18 "hello" focused
/// ```
pub fn dump_tree(ctx: &ToolkitContext) -> String {
    let mut out = String::new();
    dump_node(ctx, ctx.root(), 0, &mut out);
    while out.ends_with('\n') {
        out.pop();
    }
    out
}

fn dump_node(ctx: &ToolkitContext, id: NodeId, depth: usize, out: &mut String) {
    let Ok(node) = ctx.node(id) else {
        return;
    };
    let r = node.rect();
    let _ = write!(
        out,
        "{:indent$}{} {},{} {}x{}",
        "",
        node.kind(),
        r.x,
        r.y,
        r.width,
        r.height,
        indent = depth * 2
    );
    if let Some(manager) = node.manager() {
        let _ = write!(out, " {}", manager.name());
    }
    if let Some(text) = node.override_value("text").and_then(|v| v.as_text()) {
        let _ = write!(out, " {text:?}");
    }
    if !node.is_visible() {
        out.push_str(" hidden");
    }
    if !node.is_enabled() {
        out.push_str(" disabled");
    }
    if ctx.focused() == Some(id) {
        out.push_str(" focused");
    }
    if ctx.is_quarantined(id) {
        out.push_str(" quarantined");
    }
    out.push('\n');
    for &child in node.children() {
        dump_node(ctx, child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppConfig;
    use crate::config::ConfigBatch;
    use crate::layout::pack::{Fill, PackOptions, Side};
    use crate::layout::GeometryManager;
    use crate::widget::kind::WidgetKind;

    #[test]
    fn dump_after_layout() {
        let mut ctx = ToolkitContext::new(&AppConfig::new().with_window_size(200, 100)).unwrap();
        let root = ctx.root();
        ctx.attach_manager(root, GeometryManager::Pack).unwrap();
        let side = PackOptions::new().side(Side::Left).expand(true).fill(Fill::Both);
        let left = ctx.create(root, WidgetKind::Frame, ConfigBatch::new()).unwrap();
        ctx.set_layout_options(left, side.clone()).unwrap();
        let right = ctx.create(root, WidgetKind::Frame, ConfigBatch::new()).unwrap();
        ctx.set_layout_options(right, side).unwrap();
        let b = ctx
            .create(
                left,
                WidgetKind::Button,
                ConfigBatch::new().set("text", "ok").set("width", 30).set("height", 10),
            )
            .unwrap();
        ctx.set_visible(right, false).unwrap();
        ctx.layout().unwrap();
        ctx.focus(b).unwrap();

        insta::assert_snapshot!(dump_tree(&ctx), @r#"
        Window 0,0 200x100 pack
          Frame 0,0 200x100
            Button 0,0 30x10 "ok" focused
          Frame 0,0 0x0 hidden
        "#);
    }
}
