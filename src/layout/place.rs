//! Absolute placement.
//!
//! Each child is positioned independently from explicit pixel coordinates,
//! coordinates relative to the container size, or both added together.

use crate::geometry::{Anchor, Point, Rect, Size};

use super::manager::{collapsed, ChildInput, LayoutOptions};

/// Per-child placement options.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaceOptions {
    pub x: i32,
    pub y: i32,
    pub width: Option<i32>,
    pub height: Option<i32>,
    /// Fraction of the container width added to `x`.
    pub relx: f32,
    pub rely: f32,
    pub relwidth: Option<f32>,
    pub relheight: Option<f32>,
    /// Which point of the child sits at the computed position.
    pub anchor: Anchor,
    /// Allow the child to extend past the container bounds.
    pub overflow: bool,
}

impl Default for PlaceOptions {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: None,
            height: None,
            relx: 0.0,
            rely: 0.0,
            relwidth: None,
            relheight: None,
            anchor: Anchor::NW,
            overflow: false,
        }
    }
}

impl PlaceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit position.
    pub fn at(x: i32, y: i32) -> Self {
        Self { x, y, ..Self::default() }
    }

    pub fn size(mut self, width: i32, height: i32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn relative(mut self, relx: f32, rely: f32) -> Self {
        self.relx = relx;
        self.rely = rely;
        self
    }

    pub fn relative_size(mut self, relwidth: f32, relheight: f32) -> Self {
        self.relwidth = Some(relwidth);
        self.relheight = Some(relheight);
        self
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn overflow(mut self, overflow: bool) -> Self {
        self.overflow = overflow;
        self
    }

    fn extent(fixed: Option<i32>, rel: Option<f32>, outer: i32, requested: i32) -> i32 {
        if fixed.is_none() && rel.is_none() {
            return requested;
        }
        let rel = rel.map(|r| (r * outer as f32).round() as i32).unwrap_or(0);
        fixed.unwrap_or(0).saturating_add(rel).max(0)
    }

    /// The rectangle for a child of `requested` size inside `area`, unclipped.
    pub fn resolve(&self, area: Rect, requested: Size) -> Rect {
        let size = Size::new(
            Self::extent(self.width, self.relwidth, area.width, requested.width),
            Self::extent(self.height, self.relheight, area.height, requested.height),
        );
        let point = Point::new(
            area.x
                .saturating_add(self.x)
                .saturating_add((self.relx * area.width as f32).round() as i32),
            area.y
                .saturating_add(self.y)
                .saturating_add((self.rely * area.height as f32).round() as i32),
        );
        Rect::from_parts(self.anchor.origin_for(point, size), size)
    }
}

fn options_of(child: &ChildInput) -> PlaceOptions {
    match &child.options {
        LayoutOptions::Place(o) => o.clone(),
        _ => PlaceOptions::default(),
    }
}

/// Place every child. Clipping to `area` is left to the caller, which knows
/// about `overflow`.
pub fn arrange(area: Rect, children: &[ChildInput]) -> Vec<Rect> {
    children
        .iter()
        .map(|child| {
            if child.visible {
                options_of(child).resolve(area, child.requested)
            } else {
                collapsed(area)
            }
        })
        .collect()
}

/// Bounding size of children with absolute coordinates; relative ones
/// contribute only their requested size.
pub fn measure(children: &[ChildInput]) -> Size {
    let origin = Rect::EMPTY;
    children
        .iter()
        .filter(|c| c.visible)
        .fold(Size::ZERO, |acc, child| {
            let o = options_of(child);
            let r = o.resolve(origin, child.requested);
            acc.max(Size::new(r.right(), r.bottom()))
        })
}

// ===========================================================================
// Tests
// ===========================================================================
