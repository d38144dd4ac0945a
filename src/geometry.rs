//! Core geometry types: Point, Size, Rect, Insets, Anchor.
//!
//! Backend coordinates are integer pixels with the origin at the top-left.
//! Widths and heights are never negative once they leave a geometry manager.

use std::ops::{Add, Sub};

/// Largest width, height or offset a style value may produce.
pub const MAX_EXTENT: i32 = 1 << 20;

/// Narrow a style integer into `-MAX_EXTENT..=MAX_EXTENT`.
#[inline]
pub fn clamp_extent(v: i64) -> i32 {
    v.clamp(-i64::from(MAX_EXTENT), i64::from(MAX_EXTENT)) as i32
}

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A position in backend pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;
    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A width/height pair in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// The empty size.
    pub const ZERO: Size = Size { width: 0, height: 0 };

    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Grow by insets on every side.
    #[inline]
    pub const fn expand(self, insets: Insets) -> Size {
        Size {
            width: self.width.saturating_add(insets.horizontal()),
            height: self.height.saturating_add(insets.vertical()),
        }
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, other: Size) -> Size {
        Size::new(self.width.max(other.width), self.height.max(other.height))
    }

    /// Clamp both components to be non-negative.
    #[inline]
    pub fn non_negative(self) -> Size {
        Size::new(self.width.max(0), self.height.max(0))
    }
}

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// An axis-aligned rectangle: the computed geometry of every widget.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Zero-sized rectangle at the origin.
    pub const EMPTY: Rect = Rect { x: 0, y: 0, width: 0, height: 0 };

    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle at `origin` with `size`.
    #[inline]
    pub const fn from_parts(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Exclusive right edge.
    #[inline]
    pub const fn right(self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    #[inline]
    pub const fn bottom(self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Top-left corner.
    #[inline]
    pub const fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub const fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whether the rectangle covers no pixels.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Point-in-rect test (right and bottom edges exclusive).
    #[inline]
    pub const fn contains(self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Whether `other` lies entirely inside `self`.
    ///
    /// Empty rectangles positioned inside the bounds count as contained.
    #[inline]
    pub const fn contains_rect(self, other: Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Whether the two rectangles share at least one pixel.
    #[inline]
    pub const fn overlaps(self, other: Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Overlapping area, or [`Rect::EMPTY`] when disjoint.
    pub fn intersection(self, other: Rect) -> Rect {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        if x2 <= x1 || y2 <= y1 {
            Rect::EMPTY
        } else {
            Rect::new(x1, y1, x2 - x1, y2 - y1)
        }
    }

    /// Smallest rectangle covering both. Empty operands are ignored.
    pub fn union(self, other: Rect) -> Rect {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Rect::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Shrink by `insets`; never produces a negative size.
    pub fn inset(self, insets: Insets) -> Rect {
        let width = self.width.saturating_sub(insets.horizontal()).max(0);
        let height = self.height.saturating_sub(insets.vertical()).max(0);
        let x = self.x.saturating_add(insets.left).min(self.x.saturating_add(self.width.max(0)));
        let y = self.y.saturating_add(insets.top).min(self.y.saturating_add(self.height.max(0)));
        Rect::new(x, y, width, height)
    }

    /// Clip `self` into `bounds`, keeping a zero-sized rect at the nearest
    /// in-bounds position when the two are disjoint.
    pub fn clamp_within(self, bounds: Rect) -> Rect {
        let x = self.x.clamp(bounds.x, bounds.right().max(bounds.x));
        let y = self.y.clamp(bounds.y, bounds.bottom().max(bounds.y));
        let right = self.right().clamp(x, bounds.right().max(x));
        let bottom = self.bottom().clamp(y, bounds.bottom().max(y));
        Rect::new(x, y, right - x, bottom - y)
    }
}

// ---------------------------------------------------------------------------
// Insets
// ---------------------------------------------------------------------------

/// Per-side spacing (padding, borders).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Insets {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Insets {
    /// No spacing.
    pub const ZERO: Insets = Insets { top: 0, right: 0, bottom: 0, left: 0 };

    /// The same spacing on all four sides.
    #[inline]
    pub const fn uniform(v: i32) -> Self {
        Self { top: v, right: v, bottom: v, left: v }
    }

    /// `x` on left/right, `y` on top/bottom.
    #[inline]
    pub const fn symmetric(x: i32, y: i32) -> Self {
        Self { top: y, right: x, bottom: y, left: x }
    }

    #[inline]
    pub const fn horizontal(self) -> i32 {
        self.left.saturating_add(self.right)
    }

    #[inline]
    pub const fn vertical(self) -> i32 {
        self.top.saturating_add(self.bottom)
    }
}

impl Add for Insets {
    type Output = Insets;
    fn add(self, rhs: Insets) -> Insets {
        Insets {
            top: self.top + rhs.top,
            right: self.right + rhs.right,
            bottom: self.bottom + rhs.bottom,
            left: self.left + rhs.left,
        }
    }
}

// ---------------------------------------------------------------------------
// Anchor
// ---------------------------------------------------------------------------

/// Compass anchor used by Pack and Place to position a child inside its parcel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Anchor {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
    #[default]
    Center,
}

impl Anchor {
    /// Horizontal and vertical alignment in halves: 0 = start, 1 = center, 2 = end.
    const fn halves(self) -> (i32, i32) {
        match self {
            Anchor::NW => (0, 0),
            Anchor::N => (1, 0),
            Anchor::NE => (2, 0),
            Anchor::W => (0, 1),
            Anchor::Center => (1, 1),
            Anchor::E => (2, 1),
            Anchor::SW => (0, 2),
            Anchor::S => (1, 2),
            Anchor::SE => (2, 2),
        }
    }

    /// Position a box of `size` inside `outer` according to the anchor.
    pub fn align(self, outer: Rect, size: Size) -> Rect {
        let (hx, hy) = self.halves();
        let w = size.width.clamp(0, outer.width.max(0));
        let h = size.height.clamp(0, outer.height.max(0));
        let x = outer.x.saturating_add(share(outer.width.max(0) - w, hx));
        let y = outer.y.saturating_add(share(outer.height.max(0) - h, hy));
        Rect::new(x, y, w, h)
    }

    /// Top-left corner of a box of `size` whose anchor point sits at `point`.
    pub fn origin_for(self, point: Point, size: Size) -> Point {
        let (hx, hy) = self.halves();
        Point::new(
            point.x.saturating_sub(share(size.width, hx)),
            point.y.saturating_sub(share(size.height, hy)),
        )
    }

    /// Parse a compass string (`"n"`, `"se"`, `"center"`, ...).
    pub fn parse(s: &str) -> Option<Anchor> {
        Some(match s.to_ascii_lowercase().as_str() {
            "n" => Anchor::N,
            "ne" => Anchor::NE,
            "e" => Anchor::E,
            "se" => Anchor::SE,
            "s" => Anchor::S,
            "sw" => Anchor::SW,
            "w" => Anchor::W,
            "nw" => Anchor::NW,
            "center" | "c" => Anchor::Center,
            _ => return None,
        })
    }
}

/// `halves` half-lengths of `len`.
fn share(len: i32, halves: i32) -> i32 {
    (i64::from(len) * i64::from(halves) / 2) as i32
}

// ===========================================================================
// Tests
// ===========================================================================
