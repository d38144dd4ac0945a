//! Integration tests for trellis-ui.
//!
//! These tests exercise the public API from outside the crate: the toolkit
//! context, geometry managers, routing, and the headless frame driver.

use std::collections::{BTreeMap, HashSet};

use pretty_assertions::assert_eq;
use trellis_ui::app::{AppConfig, LayoutOutcome};
use trellis_ui::config::{Color, ConfigBatch, Value};
use trellis_ui::event::{EventKind, Handled, InputEvent, Key, Modifiers, PointerButton};
use trellis_ui::geometry::{Point, Rect};
use trellis_ui::invalidation::Dirty;
use trellis_ui::layout::{
    ArrangeChildren, ArrangeCx, ChildInput, Fill, GeometryManager, GridManager, GridOptions,
    PackOptions, PlaceOptions, Side, Sticky,
};
use trellis_ui::testing::{DrawCall, Pilot};
use trellis_ui::theme::{Selector, Source, Theme, ThemeStore};
use trellis_ui::widget::WidgetKind;
use trellis_ui::{Error, ToolkitContext};

fn ctx(width: i32, height: i32) -> ToolkitContext {
    ToolkitContext::new(&AppConfig::new().with_window_size(width, height)).unwrap()
}

fn pilot() -> Pilot {
    Pilot::new(AppConfig::new().with_window_size(200, 100)).unwrap()
}

// ---------------------------------------------------------------------------
// Style resolution
// ---------------------------------------------------------------------------

#[test]
fn cascade_order_is_instance_theme_kind_default_fallback() {
    let mut store = ThemeStore::new();
    store
        .load_theme(Theme::new("t").with(Selector::Kind(WidgetKind::Button), "foreground", Color::BLACK))
        .unwrap();
    store.set_active("t").unwrap();
    let none = BTreeMap::new();

    // Kind default beats the fallback.
    let (padding, source) = store.resolve_with_source(WidgetKind::Button, "padding", &none).unwrap();
    assert_eq!((padding, source), (Value::Int(4), Source::KindDefault));
    let (_, source) = store.resolve_with_source(WidgetKind::Label, "padding", &none).unwrap();
    assert_eq!(source, Source::Fallback);

    // The active theme beats the kind default.
    let (fg, source) = store.resolve_with_source(WidgetKind::Button, "foreground", &none).unwrap();
    assert_eq!((fg, source), (Value::Color(Color::BLACK), Source::Theme));

    // An instance override beats everything.
    let mut overrides = BTreeMap::new();
    overrides.insert("foreground".to_string(), Value::Color(Color::WHITE));
    let (fg, source) = store
        .resolve_with_source(WidgetKind::Button, "foreground", &overrides)
        .unwrap();
    assert_eq!((fg, source), (Value::Color(Color::WHITE), Source::Instance));
}

#[test]
fn resolve_reports_keys_no_layer_knows() {
    let store = ThemeStore::new();
    let err = store
        .resolve(WidgetKind::Label, "sparkle", &BTreeMap::new())
        .unwrap_err();
    assert!(matches!(err, Error::StyleKeyUnknown { ref key, .. } if key == "sparkle"));
}

#[test]
fn cget_rejects_keys_outside_the_kind_schema() {
    let mut ctx = ctx(200, 100);
    let root = ctx.root();
    let label = ctx.create(root, WidgetKind::Label, ConfigBatch::new()).unwrap();
    assert!(matches!(
        ctx.cget(label, "checked"),
        Err(Error::UnknownConfigKey { .. })
    ));
}

#[test]
fn theme_source_round_trips_into_cget() {
    let mut ctx = ctx(200, 100);
    ctx.load_theme_source(
        r#"
        theme "ocean" {
            * { foreground: #102030; }
            Button, CheckButton { background: #3A8DFF; padding: 6; }
        }
        "#,
    )
    .unwrap();
    ctx.set_active_theme("ocean").unwrap();
    let root = ctx.root();
    let b = ctx.create(root, WidgetKind::Button, ConfigBatch::new()).unwrap();
    assert_eq!(ctx.cget(b, "padding").unwrap(), Value::Int(6));
    assert_eq!(ctx.cget(b, "foreground").unwrap(), Value::Color(Color::rgb(0x10, 0x20, 0x30)));
}

#[test]
fn theme_switch_marks_widgets_for_repaint() {
    let mut pilot = pilot();
    let root = pilot.ctx().root();
    let label = pilot
        .ctx_mut()
        .create(root, WidgetKind::Label, ConfigBatch::new().set("text", "x"))
        .unwrap();
    pilot.frame().unwrap();
    pilot.ctx_mut().set_active_theme("light").unwrap();
    assert!(pilot.ctx().invalidation().dirty(label).contains(Dirty::PAINT));
    let report = pilot.frame().unwrap();
    assert!(report.presented);
}

// ---------------------------------------------------------------------------
// configure / cget
// ---------------------------------------------------------------------------

#[test]
fn configure_is_all_or_nothing() {
    let mut ctx = ctx(200, 100);
    let root = ctx.root();
    let b = ctx.create(root, WidgetKind::Button, ConfigBatch::new()).unwrap();
    let before: Vec<Value> = ["text", "padding", "width"]
        .iter()
        .map(|k| ctx.cget(b, k).unwrap())
        .collect();

    let batch = ConfigBatch::new()
        .set("text", "new")
        .set("padding", 9)
        .set("no_such_key", 1)
        .set("width", 50);
    let err = ctx.configure(b, batch).unwrap_err();
    assert!(matches!(err, Error::InvalidConfigKey { ref key, .. } if key == "no_such_key"));

    let after: Vec<Value> = ["text", "padding", "width"]
        .iter()
        .map(|k| ctx.cget(b, k).unwrap())
        .collect();
    assert_eq!(before, after);
}

#[test]
fn configure_rejects_wrong_types() {
    let mut ctx = ctx(200, 100);
    let root = ctx.root();
    let b = ctx.create(root, WidgetKind::Button, ConfigBatch::new()).unwrap();
    let err = ctx
        .configure(b, ConfigBatch::new().set("text", "ok").set("padding", "wide"))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfigValue { .. }));
    assert_eq!(ctx.cget(b, "text").unwrap(), Value::from(""));
}

#[test]
fn configure_on_destroyed_widget_is_not_found() {
    let mut ctx = ctx(200, 100);
    let root = ctx.root();
    let b = ctx.create(root, WidgetKind::Button, ConfigBatch::new()).unwrap();
    ctx.destroy(b).unwrap();
    assert!(matches!(
        ctx.configure(b, ConfigBatch::new().set("text", "x")),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(ctx.cget(b, "text"), Err(Error::NotFound(_))));
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[test]
fn identities_are_never_reused() {
    let mut ctx = ctx(200, 100);
    let root = ctx.root();
    let first: Vec<_> = (0..1000)
        .map(|_| ctx.create(root, WidgetKind::Label, ConfigBatch::new()).unwrap())
        .collect();
    for &id in &first {
        ctx.destroy(id).unwrap();
    }
    let destroyed: HashSet<_> = first.into_iter().collect();
    for _ in 0..1000 {
        let id = ctx.create(root, WidgetKind::Label, ConfigBatch::new()).unwrap();
        assert!(!destroyed.contains(&id));
    }
    assert_eq!(ctx.registry().len(), 1001);
}

#[test]
fn destroying_a_parent_removes_exactly_its_subtree() {
    let mut ctx = ctx(200, 100);
    let root = ctx.root();
    let keep = ctx.create(root, WidgetKind::Label, ConfigBatch::new()).unwrap();
    let parent = ctx.create(root, WidgetKind::Frame, ConfigBatch::new()).unwrap();
    let mut subtree = vec![parent];
    for _ in 0..3 {
        let inner = ctx.create(parent, WidgetKind::Frame, ConfigBatch::new()).unwrap();
        subtree.push(inner);
        for _ in 0..2 {
            subtree.push(ctx.create(inner, WidgetKind::Button, ConfigBatch::new()).unwrap());
        }
    }
    let before = ctx.registry().len();
    assert_eq!(ctx.destroy(parent).unwrap(), subtree.len());
    assert_eq!(ctx.registry().len(), before - subtree.len());
    assert!(subtree.iter().all(|&id| !ctx.registry().contains(id)));
    assert!(ctx.registry().contains(keep));
    assert_eq!(ctx.children(root).unwrap(), &[keep]);
}

// ---------------------------------------------------------------------------
// Geometry managers
// ---------------------------------------------------------------------------

#[test]
fn pack_expanders_split_width_exactly() {
    for width in [200, 201, 7] {
        let mut ctx = ctx(width, 50);
        let root = ctx.root();
        ctx.attach_manager(root, GeometryManager::Pack).unwrap();
        let opts = PackOptions::new().side(Side::Left).expand(true).fill(Fill::Both);
        let a = ctx.create(root, WidgetKind::Frame, ConfigBatch::new()).unwrap();
        let b = ctx.create(root, WidgetKind::Frame, ConfigBatch::new()).unwrap();
        ctx.set_layout_options(a, opts.clone()).unwrap();
        ctx.set_layout_options(b, opts).unwrap();
        ctx.layout().unwrap();

        let (ra, rb) = (ctx.rect(a).unwrap(), ctx.rect(b).unwrap());
        assert_eq!(ra.width + rb.width, width);
        assert!((ra.width - rb.width).abs() <= 1);
        assert_eq!(rb.x, ra.right());
    }
}

#[test]
fn grid_rowspan_gets_sum_of_rows() {
    let mut ctx = ctx(200, 100);
    let root = ctx.root();
    let grid = GridManager::new(2, 2).row(0, 0, 10).row(1, 0, 20).column(0, 1, 0).column(1, 3, 0);
    ctx.attach_manager(root, GeometryManager::Grid(grid)).unwrap();
    let tall = ctx
        .create(root, WidgetKind::Frame, ConfigBatch::new().set("width", 5).set("height", 5))
        .unwrap();
    ctx.set_layout_options(tall, GridOptions::at(0, 1).span(2, 1).sticky(Sticky::all()))
        .unwrap();
    ctx.layout().unwrap();
    let rect = ctx.rect(tall).unwrap();
    assert_eq!(rect.y, 0);
    assert_eq!(rect.height, 30);
}

#[test]
fn grid_rejects_spans_past_bounds() {
    let mut ctx = ctx(200, 100);
    let root = ctx.root();
    ctx.attach_manager(root, GeometryManager::Grid(GridManager::new(2, 2)))
        .unwrap();
    let child = ctx.create(root, WidgetKind::Label, ConfigBatch::new()).unwrap();
    let err = ctx
        .set_layout_options(child, GridOptions::at(0, 1).span(1, 2))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidSpan { .. }));
}

#[test]
fn nested_managers_keep_children_inside_parents() {
    let mut ctx = ctx(300, 200);
    let root = ctx.root();
    ctx.attach_manager(root, GeometryManager::Pack).unwrap();
    let side = ctx.create(root, WidgetKind::Frame, ConfigBatch::new().set("padding", 5)).unwrap();
    ctx.set_layout_options(side, PackOptions::new().side(Side::Top).fill(Fill::X))
        .unwrap();
    ctx.attach_manager(side, GeometryManager::Grid(GridManager::new(1, 3).column(1, 1, 0)))
        .unwrap();
    let mut leaves = Vec::new();
    for column in 0..3 {
        let b = ctx
            .create(side, WidgetKind::Button, ConfigBatch::new().set("text", "go"))
            .unwrap();
        ctx.set_layout_options(b, GridOptions::at(0, column)).unwrap();
        leaves.push(b);
    }
    let body = ctx.create(root, WidgetKind::Frame, ConfigBatch::new()).unwrap();
    ctx.set_layout_options(body, PackOptions::new().expand(true).fill(Fill::Both))
        .unwrap();
    let placed = ctx
        .create(body, WidgetKind::Label, ConfigBatch::new().set("text", "far"))
        .unwrap();
    ctx.set_layout_options(placed, PlaceOptions::at(10, 10).relative(0.5, 0.0))
        .unwrap();
    ctx.layout().unwrap();

    let side_rect = ctx.rect(side).unwrap();
    assert_eq!(side_rect.width, 300);
    for &leaf in &leaves {
        assert!(side_rect.contains_rect(ctx.rect(leaf).unwrap()));
    }
    let body_rect = ctx.rect(body).unwrap();
    assert_eq!(body_rect.y, side_rect.bottom());
    assert_eq!(body_rect.bottom(), 200);
    assert!(body_rect.contains_rect(ctx.rect(placed).unwrap()));
    assert!(!ctx.is_layout_pending());
}

#[derive(Debug)]
struct AlwaysDirty;

impl ArrangeChildren for AlwaysDirty {
    fn arrange(&mut self, cx: &mut ArrangeCx, area: Rect, children: &[ChildInput]) -> Vec<Rect> {
        if let Some(first) = children.first() {
            cx.mark_pending(first.id);
        }
        vec![area; children.len()]
    }
}

#[test]
fn divergence_is_caught_and_the_loop_keeps_going() {
    let mut pilot = Pilot::new(
        AppConfig::new()
            .with_window_size(200, 100)
            .with_max_layout_iterations(16),
    )
    .unwrap();
    let root = pilot.ctx().root();
    let frame = pilot.ctx_mut().create(root, WidgetKind::Frame, ConfigBatch::new()).unwrap();
    pilot
        .ctx_mut()
        .attach_manager(frame, GeometryManager::custom(AlwaysDirty))
        .unwrap();
    pilot.ctx_mut().create(frame, WidgetKind::Label, ConfigBatch::new()).unwrap();

    let report = pilot.frame().unwrap();
    match report.layout {
        LayoutOutcome::Diverged { container, iterations } => {
            assert_eq!(container, frame);
            assert_eq!(iterations, 16);
        }
        other => panic!("expected divergence, got {other:?}"),
    }
    for _ in 0..3 {
        let report = pilot.frame().unwrap();
        assert!(!matches!(report.layout, LayoutOutcome::Diverged { .. }));
    }
    assert!(pilot.ctx().is_quarantined(frame));
}

// ---------------------------------------------------------------------------
// Hit testing and routing
// ---------------------------------------------------------------------------

#[test]
fn hit_test_picks_topmost_enabled_widget() {
    let mut ctx = ctx(200, 100);
    let root = ctx.root();
    let low = ctx.create(root, WidgetKind::Button, ConfigBatch::new()).unwrap();
    let high = ctx.create(root, WidgetKind::Button, ConfigBatch::new()).unwrap();
    let top = ctx.create(root, WidgetKind::Button, ConfigBatch::new()).unwrap();
    for id in [low, high, top] {
        ctx.set_layout_options(id, PlaceOptions::at(10, 10).size(50, 50)).unwrap();
    }
    ctx.set_z(low, 5).unwrap();
    ctx.set_z(high, 10).unwrap();
    ctx.set_enabled(top, false).unwrap();
    ctx.layout().unwrap();

    assert_eq!(ctx.hit_test(Point::new(30, 30)), Some(high));
    ctx.set_visible(high, false).unwrap();
    ctx.layout().unwrap();
    assert_eq!(ctx.hit_test(Point::new(30, 30)), Some(low));
    assert_eq!(ctx.hit_test(Point::new(150, 90)), None);
    assert_eq!(ctx.hit_test(Point::new(-1, -1)), None);
}

#[test]
fn handlers_bubble_to_ancestors() {
    let mut pilot = pilot();
    let root = pilot.ctx().root();
    let frame = pilot.ctx_mut().create(root, WidgetKind::Frame, ConfigBatch::new()).unwrap();
    pilot
        .ctx_mut()
        .set_layout_options(frame, PlaceOptions::at(0, 0).size(100, 100))
        .unwrap();
    let label = pilot
        .ctx_mut()
        .create(frame, WidgetKind::Label, ConfigBatch::new().set("text", "hi"))
        .unwrap();
    pilot.ctx_mut().on_event(frame, |cx, event| {
        if matches!(event.kind, EventKind::PointerDown { .. }) {
            let target = cx.target();
            cx.configure(target, ConfigBatch::new().set("text", "clicked")).unwrap();
            Handled::Consumed
        } else {
            Handled::Ignored
        }
    })
    .unwrap();
    pilot.frame().unwrap();

    let report = pilot.click(Point::new(2, 2)).unwrap();
    assert_eq!(report.consumed, 1);
    assert_eq!(pilot.ctx().cget(label, "text").unwrap(), Value::from("clicked"));
}

#[test]
fn tab_cycles_focus_in_tree_order() {
    let mut pilot = pilot();
    let root = pilot.ctx().root();
    let a = pilot.ctx_mut().create(root, WidgetKind::Button, ConfigBatch::new()).unwrap();
    let frame = pilot.ctx_mut().create(root, WidgetKind::Frame, ConfigBatch::new()).unwrap();
    let b = pilot.ctx_mut().create(frame, WidgetKind::Entry, ConfigBatch::new()).unwrap();
    pilot.ctx_mut().create(root, WidgetKind::Label, ConfigBatch::new()).unwrap();
    let c = pilot.ctx_mut().create(root, WidgetKind::CheckButton, ConfigBatch::new()).unwrap();

    let mut order = Vec::new();
    for _ in 0..4 {
        let report = pilot.press(Key::Tab).unwrap();
        assert!(report.unconsumed.iter().all(|e| matches!(e.kind, EventKind::KeyUp(_))));
        order.push(pilot.ctx().focused());
    }
    assert_eq!(order, vec![Some(a), Some(b), Some(c), Some(a)]);

    pilot.press_with(Key::Tab, Modifiers::SHIFT).unwrap();
    assert_eq!(pilot.ctx().focused(), Some(c));
    pilot.press(Key::BackTab).unwrap();
    assert_eq!(pilot.ctx().focused(), Some(b));
}

#[test]
fn capture_routes_pointer_until_released() {
    let mut pilot = pilot();
    let root = pilot.ctx().root();
    let grab = pilot.ctx_mut().create(root, WidgetKind::Button, ConfigBatch::new()).unwrap();
    pilot
        .ctx_mut()
        .set_layout_options(grab, PlaceOptions::at(0, 0).size(20, 20))
        .unwrap();
    let seen = std::rc::Rc::new(std::cell::Cell::new(0));
    let counter = seen.clone();
    pilot.ctx_mut().on_event(grab, move |cx, event| match event.kind {
        EventKind::PointerDown { .. } => {
            cx.capture_pointer();
            Handled::Consumed
        }
        EventKind::PointerMove { .. } => {
            counter.set(counter.get() + 1);
            Handled::Consumed
        }
        EventKind::PointerUp { .. } => {
            cx.release_capture();
            Handled::Consumed
        }
        _ => Handled::Ignored,
    })
    .unwrap();
    pilot.frame().unwrap();

    pilot
        .send([EventKind::PointerDown { position: Point::new(5, 5), button: PointerButton::Left }])
        .unwrap();
    assert_eq!(pilot.ctx().captured(), Some(grab));
    let report = pilot.move_to(Point::new(150, 90)).unwrap();
    assert_eq!(report.consumed, 1);
    pilot
        .send([EventKind::PointerUp { position: Point::new(150, 90), button: PointerButton::Left }])
        .unwrap();
    assert_eq!(pilot.ctx().captured(), None);
    let report = pilot.move_to(Point::new(150, 90)).unwrap();
    assert_eq!(report.unconsumed.len(), 1);
    assert_eq!(seen.get(), 1);
}

#[test]
fn focus_lost_releases_capture() {
    let mut ctx = ctx(200, 100);
    let root = ctx.root();
    let b = ctx.create(root, WidgetKind::Button, ConfigBatch::new()).unwrap();
    ctx.capture(b);
    let outcome = ctx.dispatch(&InputEvent::new(Default::default(), EventKind::FocusLost));
    assert!(outcome.is_consumed());
    assert_eq!(ctx.captured(), None);
}

// ---------------------------------------------------------------------------
// Built-in behaviors through the frame driver
// ---------------------------------------------------------------------------

#[test]
fn typing_into_a_focused_entry() {
    let mut pilot = pilot();
    let root = pilot.ctx().root();
    let entry = pilot.ctx_mut().create(root, WidgetKind::Entry, ConfigBatch::new()).unwrap();
    pilot.click_widget(entry).unwrap();
    assert_eq!(pilot.ctx().focused(), Some(entry));
    pilot.type_text("abc").unwrap();
    pilot.press(Key::Backspace).unwrap();
    assert_eq!(pilot.ctx().cget(entry, "text").unwrap(), Value::from("ab"));
    let report = pilot.frame().unwrap();
    assert!(!report.presented);
}

#[test]
fn space_toggles_focused_checkbutton() {
    let mut pilot = pilot();
    let root = pilot.ctx().root();
    let check = pilot
        .ctx_mut()
        .create(root, WidgetKind::CheckButton, ConfigBatch::new())
        .unwrap();
    pilot.ctx_mut().focus(check).unwrap();
    pilot.press(Key::Char(' ')).unwrap();
    assert_eq!(pilot.ctx().cget(check, "checked").unwrap(), Value::Bool(true));
    pilot.press(Key::Enter).unwrap();
    assert_eq!(pilot.ctx().cget(check, "checked").unwrap(), Value::Bool(false));
}

#[test]
fn clicking_radio_buttons_moves_the_selection() {
    let mut pilot = pilot();
    let root = pilot.ctx().root();
    pilot.ctx_mut().attach_manager(root, GeometryManager::Pack).unwrap();
    let mut radios = Vec::new();
    for label in ["small", "large"] {
        let id = pilot
            .ctx_mut()
            .create(root, WidgetKind::RadioButton, ConfigBatch::new().set("text", label).set("group", "size"))
            .unwrap();
        pilot.ctx_mut().set_layout_options(id, PackOptions::new()).unwrap();
        radios.push(id);
    }
    let checked = |pilot: &Pilot| -> Vec<bool> {
        radios
            .iter()
            .map(|&id| pilot.ctx().cget(id, "checked").unwrap() == Value::Bool(true))
            .collect()
    };
    pilot.click_widget(radios[0]).unwrap();
    assert_eq!(checked(&pilot), vec![true, false]);
    pilot.click_widget(radios[1]).unwrap();
    assert_eq!(checked(&pilot), vec![false, true]);
    pilot.press(Key::Char(' ')).unwrap();
    assert_eq!(checked(&pilot), vec![false, true]);
}

#[test]
fn hovering_a_button_repaints_it_with_hover_color() {
    let mut pilot = pilot();
    let root = pilot.ctx().root();
    let hover = Color::rgb(0x10, 0x20, 0x30);
    let button = pilot
        .ctx_mut()
        .create(root, WidgetKind::Button, ConfigBatch::new().set("hover", hover))
        .unwrap();
    pilot
        .ctx_mut()
        .set_layout_options(button, PlaceOptions::at(10, 10).size(40, 20))
        .unwrap();
    pilot.frame().unwrap();
    let fill = |pilot: &Pilot| {
        pilot.backend().last_frame().iter().find_map(|call| match call {
            DrawCall::Rect { rect, style } if *rect == Rect::new(10, 10, 40, 20) => Some(style.fill),
            _ => None,
        })
    };

    let report = pilot.move_to(Point::new(20, 20)).unwrap();
    assert!(report.presented);
    assert_eq!(pilot.ctx().hovered(), Some(button));
    assert_eq!(fill(&pilot), Some(hover));

    let report = pilot.move_to(Point::new(25, 20)).unwrap();
    assert!(!report.presented);

    pilot.move_to(Point::new(150, 80)).unwrap();
    assert_eq!(pilot.ctx().hovered(), None);
    assert!(fill(&pilot).is_some_and(|c| c != hover));
}

#[test]
fn paint_draws_widget_text() {
    let mut pilot = pilot();
    let root = pilot.ctx().root();
    pilot
        .ctx_mut()
        .create(root, WidgetKind::Button, ConfigBatch::new().set("text", "Save"))
        .unwrap();
    pilot.frame().unwrap();
    assert!(pilot.backend().texts().contains(&"Save".to_string()));
}
