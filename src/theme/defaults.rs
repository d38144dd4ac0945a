//! Built-in style tables: global fallbacks, per-kind defaults, and the
//! `light` and `dark` themes.

use crate::config::value::{Color, Value};
use crate::widget::kind::WidgetKind;

use super::store::{Selector, Theme};

const NAVY: Color = Color::rgb(0x22, 0x30, 0x4A);
const SLATE: Color = Color::rgb(0x28, 0x36, 0x5A);
const SNOW: Color = Color::rgb(0xF5, 0xF7, 0xFA);
const ACCENT: Color = Color::rgb(0x3A, 0x8D, 0xFF);
const ACCENT_2: Color = Color::rgb(0x33, 0x9C, 0xFF);
const SELECT: Color = Color::rgb(0x2C, 0x82, 0xC9);
const BORDER: Color = Color::rgb(0x2C, 0x3E, 0x50);
const INK: Color = Color::rgb(0x1F, 0x23, 0x28);
const PAPER: Color = Color::rgb(0xFA, 0xFB, 0xFC);
const MIST: Color = Color::rgb(0xE4, 0xE8, 0xEE);

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

/// Last-resort values. Every key any kind declares has one.
pub fn fallbacks() -> Vec<(&'static str, Value)> {
    vec![
        ("width", Value::Int(0)),
        ("height", Value::Int(0)),
        ("padding", Value::Int(0)),
        ("border_width", Value::Int(0)),
        ("font_family", text("Segoe UI")),
        ("font_size", Value::Int(18)),
        ("background", Value::Color(NAVY)),
        ("foreground", Value::Color(SNOW)),
        ("border_color", Value::Color(BORDER)),
        ("border_radius", Value::Int(0)),
        ("cursor", text("arrow")),
        ("title", text("")),
        ("relief", text("flat")),
        ("text", text("")),
        ("image", text("")),
        ("underline", Value::Bool(false)),
        ("wraplength", Value::Int(0)),
        ("hover", Value::Color(ACCENT_2)),
        ("active", Value::Color(SELECT)),
        ("checked", Value::Bool(false)),
        ("check_color", Value::Color(ACCENT)),
        ("placeholder", text("")),
        ("show", text("")),
        ("cursor_color", Value::Color(SNOW)),
        ("value", Value::Float(0.0)),
        ("minimum", Value::Float(0.0)),
        ("maximum", Value::Float(100.0)),
        ("bar_color", Value::Color(ACCENT)),
        ("show_value", Value::Bool(false)),
        ("orientation", text("horizontal")),
        ("thickness", Value::Int(1)),
        ("color", Value::Color(ACCENT_2)),
        ("from", Value::Float(0.0)),
        ("to", Value::Float(100.0)),
        ("track_color", Value::Color(ACCENT_2)),
        ("handle_color", Value::Color(ACCENT)),
        ("handle_radius", Value::Int(6)),
        ("step", Value::Float(0.0)),
        ("group", text("")),
    ]
}

/// Per-kind defaults layered above the fallbacks.
pub fn kind_defaults() -> Vec<(WidgetKind, &'static str, Value)> {
    use WidgetKind::*;
    vec![
        (Window, "title", text("trellis")),
        (Frame, "background", Value::Color(SLATE)),
        (Frame, "border_color", Value::Color(ACCENT_2)),
        (Button, "background", Value::Color(ACCENT)),
        (Button, "border_color", Value::Color(ACCENT_2)),
        (Button, "border_radius", Value::Int(8)),
        (Button, "padding", Value::Int(4)),
        (Button, "cursor", text("hand")),
        (CheckButton, "border_color", Value::Color(ACCENT_2)),
        (RadioButton, "border_color", Value::Color(ACCENT_2)),
        (Entry, "background", Value::Color(SLATE)),
        (Entry, "border_color", Value::Color(ACCENT_2)),
        (Entry, "border_radius", Value::Int(8)),
        (Entry, "border_width", Value::Int(2)),
        (Entry, "cursor", text("ibeam")),
        (Progressbar, "border_color", Value::Color(ACCENT_2)),
        (Progressbar, "border_width", Value::Int(2)),
        (Progressbar, "show_value", Value::Bool(true)),
        (Separator, "thickness", Value::Int(3)),
        (Separator, "padding", Value::Int(4)),
        (Scale, "handle_radius", Value::Int(12)),
        (Scale, "show_value", Value::Bool(true)),
        (Scale, "step", Value::Float(1.0)),
    ]
}

/// The dark palette, matching the kind defaults.
pub fn dark() -> Theme {
    Theme::new("dark")
        .with(Selector::Any, "background", NAVY)
        .with(Selector::Any, "foreground", SNOW)
        .with(Selector::Kind(WidgetKind::Frame), "background", SLATE)
        .with(Selector::Kind(WidgetKind::Entry), "background", SLATE)
        .with(Selector::Kind(WidgetKind::Button), "background", ACCENT)
}

/// A light palette.
pub fn light() -> Theme {
    Theme::new("light")
        .with(Selector::Any, "background", PAPER)
        .with(Selector::Any, "foreground", INK)
        .with(Selector::Any, "border_color", MIST)
        .with(Selector::Kind(WidgetKind::Frame), "background", MIST)
        .with(Selector::Kind(WidgetKind::Entry), "background", Color::WHITE)
        .with(Selector::Kind(WidgetKind::Entry), "cursor_color", INK)
        .with(Selector::Kind(WidgetKind::Button), "background", ACCENT)
        .with(Selector::Kind(WidgetKind::Button), "foreground", Color::WHITE)
        .with(Selector::Kind(WidgetKind::Separator), "color", MIST)
}
