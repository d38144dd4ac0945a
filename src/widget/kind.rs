//! Widget kinds and their configuration schemas.
//!
//! Every kind declares the keys `configure`/`cget` accept, the value type of
//! each key, and what a change to the key invalidates.

use std::fmt;

use crate::config::value::ValueType;

// ---------------------------------------------------------------------------
// Affects
// ---------------------------------------------------------------------------

/// What a configuration change invalidates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Affects {
    /// Changes the requested size: re-layout the node and its ancestors.
    Geometry,
    /// Changes appearance only: repaint the node.
    Paint,
    /// Bookkeeping only.
    None,
}

/// One schema entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeySpec {
    pub key: &'static str,
    pub ty: ValueType,
    pub affects: Affects,
}

const fn spec(key: &'static str, ty: ValueType, affects: Affects) -> KeySpec {
    KeySpec { key, ty, affects }
}

use Affects::{Geometry as G, None as N, Paint as P};
use ValueType::{Bool, Color, Int, Number, Text};

/// Keys every kind accepts.
const COMMON: &[KeySpec] = &[
    spec("width", Int, G),
    spec("height", Int, G),
    spec("padding", Int, G),
    spec("border_width", Int, G),
    spec("font_family", Text, G),
    spec("font_size", Int, G),
    spec("background", Color, P),
    spec("foreground", Color, P),
    spec("border_color", Color, P),
    spec("border_radius", Int, P),
    spec("cursor", Text, N),
];

const WINDOW: &[KeySpec] = &[spec("title", Text, N)];

const FRAME: &[KeySpec] = &[spec("relief", Text, P)];

const LABEL: &[KeySpec] = &[
    spec("text", Text, G),
    spec("image", Text, G),
    spec("underline", Bool, P),
    spec("wraplength", Int, G),
];

const BUTTON: &[KeySpec] = &[
    spec("text", Text, G),
    spec("image", Text, P),
    spec("hover", Color, P),
    spec("active", Color, P),
];

const CHECK_BUTTON: &[KeySpec] = &[
    spec("text", Text, G),
    spec("checked", Bool, P),
    spec("check_color", Color, P),
];

const RADIO_BUTTON: &[KeySpec] = &[
    spec("text", Text, G),
    spec("checked", Bool, P),
    spec("group", Text, N),
    spec("check_color", Color, P),
];

const ENTRY: &[KeySpec] = &[
    spec("text", Text, P),
    spec("placeholder", Text, P),
    spec("show", Text, P),
    spec("cursor_color", Color, P),
];

const PROGRESSBAR: &[KeySpec] = &[
    spec("value", Number, P),
    spec("minimum", Number, P),
    spec("maximum", Number, P),
    spec("bar_color", Color, P),
    spec("show_value", Bool, P),
    spec("orientation", Text, G),
];

const SEPARATOR: &[KeySpec] = &[
    spec("orientation", Text, G),
    spec("thickness", Int, G),
    spec("color", Color, P),
];

const SCALE: &[KeySpec] = &[
    spec("value", Number, P),
    spec("from", Number, P),
    spec("to", Number, P),
    spec("track_color", Color, P),
    spec("handle_color", Color, P),
    spec("handle_radius", Int, G),
    spec("show_value", Bool, P),
    spec("orientation", Text, G),
    spec("step", Number, P),
];

// ---------------------------------------------------------------------------
// WidgetKind
// ---------------------------------------------------------------------------

/// The concrete widget variants.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WidgetKind {
    /// The toolkit-owned root covering the window.
    Window,
    Frame,
    Label,
    Button,
    CheckButton,
    /// A check mark that is exclusive within its `group`.
    RadioButton,
    Entry,
    Progressbar,
    Separator,
    Scale,
}

impl WidgetKind {
    /// Every kind, in declaration order.
    pub const ALL: [WidgetKind; 10] = [
        WidgetKind::Window,
        WidgetKind::Frame,
        WidgetKind::Label,
        WidgetKind::Button,
        WidgetKind::CheckButton,
        WidgetKind::RadioButton,
        WidgetKind::Entry,
        WidgetKind::Progressbar,
        WidgetKind::Separator,
        WidgetKind::Scale,
    ];

    /// Type name as used in theme sources.
    pub const fn name(self) -> &'static str {
        match self {
            WidgetKind::Window => "Window",
            WidgetKind::Frame => "Frame",
            WidgetKind::Label => "Label",
            WidgetKind::Button => "Button",
            WidgetKind::CheckButton => "CheckButton",
            WidgetKind::RadioButton => "RadioButton",
            WidgetKind::Entry => "Entry",
            WidgetKind::Progressbar => "Progressbar",
            WidgetKind::Separator => "Separator",
            WidgetKind::Scale => "Scale",
        }
    }

    /// Look a kind up by its type name.
    pub fn from_name(name: &str) -> Option<WidgetKind> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Kind-specific schema entries (common keys excluded).
    const fn own_keys(self) -> &'static [KeySpec] {
        match self {
            WidgetKind::Window => WINDOW,
            WidgetKind::Frame => FRAME,
            WidgetKind::Label => LABEL,
            WidgetKind::Button => BUTTON,
            WidgetKind::CheckButton => CHECK_BUTTON,
            WidgetKind::RadioButton => RADIO_BUTTON,
            WidgetKind::Entry => ENTRY,
            WidgetKind::Progressbar => PROGRESSBAR,
            WidgetKind::Separator => SEPARATOR,
            WidgetKind::Scale => SCALE,
        }
    }

    /// The schema entry for `key`, if the kind declares it.
    pub fn spec(self, key: &str) -> Option<&'static KeySpec> {
        self.own_keys()
            .iter()
            .chain(COMMON.iter())
            .find(|s| s.key == key)
    }

    /// All schema entries: kind keys first, then the common keys.
    pub fn keys(self) -> impl Iterator<Item = &'static KeySpec> {
        self.own_keys().iter().chain(COMMON.iter())
    }

    /// Whether nodes of this kind may own children and a geometry manager.
    pub const fn is_container(self) -> bool {
        matches!(self, WidgetKind::Window | WidgetKind::Frame)
    }

    /// Initial value of the node's focusable flag.
    pub const fn default_focusable(self) -> bool {
        matches!(
            self,
            WidgetKind::Button
                | WidgetKind::CheckButton
                | WidgetKind::RadioButton
                | WidgetKind::Entry
                | WidgetKind::Scale
        )
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
