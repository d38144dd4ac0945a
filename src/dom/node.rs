//! Node types: NodeId, WidgetNode, LayoutState.

use std::collections::BTreeMap;

use slotmap::new_key_type;

use crate::config::value::Value;
use crate::geometry::Rect;
use crate::layout::manager::{GeometryManager, LayoutOptions};
use crate::widget::kind::WidgetKind;

new_key_type! {
    /// Handle of a widget. Copy, lightweight, never aliases a destroyed widget:
    /// a reused arena slot carries a new version.
    pub struct NodeId;
}

/// Per-node layout state machine.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayoutState {
    /// Geometry is up to date.
    Clean,
    /// Waiting for the next layout pass. Every new node starts here.
    #[default]
    PendingLayout,
}

/// A single widget in the tree.
///
/// The parent owns the children listed in `children`; `parent` is a
/// non-owning back reference validated against the registry before use.
#[derive(Debug)]
pub struct WidgetNode {
    pub(crate) kind: WidgetKind,
    pub(crate) serial: u64,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Instance overrides; only schema keys ever land here.
    pub(crate) config: BTreeMap<String, Value>,
    pub(crate) rect: Rect,
    pub(crate) visible: bool,
    pub(crate) enabled: bool,
    pub(crate) focusable: bool,
    pub(crate) z_index: i32,
    pub(crate) manager: Option<GeometryManager>,
    /// How this node's parent should place it.
    pub(crate) layout_options: LayoutOptions,
    pub(crate) layout_state: LayoutState,
}

impl WidgetNode {
    /// A fresh node of `kind` with default flags and no overrides.
    pub fn new(kind: WidgetKind) -> Self {
        Self {
            kind,
            serial: 0,
            parent: None,
            children: Vec::new(),
            config: BTreeMap::new(),
            rect: Rect::EMPTY,
            visible: true,
            enabled: true,
            focusable: kind.default_focusable(),
            z_index: 0,
            manager: None,
            layout_options: LayoutOptions::default(),
            layout_state: LayoutState::PendingLayout,
        }
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    /// Creation sequence number, unique for the registry's lifetime.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in paint/layout/tab order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The computed rectangle from the last layout pass.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_focusable(&self) -> bool {
        self.focusable
    }

    /// Stacking order among siblings; higher paints later and hit-tests first.
    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    pub fn layout_state(&self) -> LayoutState {
        self.layout_state
    }

    pub fn manager(&self) -> Option<&GeometryManager> {
        self.manager.as_ref()
    }

    pub fn layout_options(&self) -> &LayoutOptions {
        &self.layout_options
    }

    /// Instance override for `key`, if one was configured.
    pub fn override_value(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    /// All instance overrides.
    pub fn overrides(&self) -> &BTreeMap<String, Value> {
        &self.config
    }

    /// Visible, enabled and flagged focusable.
    pub fn can_take_focus(&self) -> bool {
        self.focusable && self.visible && self.enabled
    }
}
