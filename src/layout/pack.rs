//! Pack geometry: children carve parcels off the sides of a shrinking cavity.
//!
//! Pass one carves requested parcels to find how much space is left on each
//! axis. Pass two hands that leftover to the `expand` children by weight and
//! carves the final parcels. A parcel never exceeds the remaining cavity, so
//! overconstrained containers starve later children down to zero, never below.

use crate::geometry::{Anchor, Insets, Rect, Size};

use super::manager::{collapsed, ChildInput, LayoutOptions};

/// Which side of the cavity a child is packed against.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Side {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    /// Top and bottom consume height; left and right consume width.
    pub const fn is_vertical(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }

    pub fn parse(s: &str) -> Option<Side> {
        Some(match s.to_ascii_lowercase().as_str() {
            "top" => Side::Top,
            "bottom" => Side::Bottom,
            "left" => Side::Left,
            "right" => Side::Right,
            _ => return None,
        })
    }
}

/// Which axes a child stretches to fill its parcel on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Fill {
    None,
    X,
    Y,
    Both,
}

impl Fill {
    const fn x(self) -> bool {
        matches!(self, Fill::X | Fill::Both)
    }

    const fn y(self) -> bool {
        matches!(self, Fill::Y | Fill::Both)
    }
}

/// Per-child pack options.
#[derive(Clone, Debug, PartialEq)]
pub struct PackOptions {
    pub side: Side,
    /// `None` fills the cross axis of `side`.
    pub fill: Option<Fill>,
    pub expand: bool,
    /// Share of the leftover space among expanding siblings on the same axis.
    pub weight: u32,
    pub anchor: Anchor,
    /// External padding on each side horizontally.
    pub padx: i32,
    pub pady: i32,
    /// Internal padding added to the requested size.
    pub ipadx: i32,
    pub ipady: i32,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            side: Side::Top,
            fill: None,
            expand: false,
            weight: 1,
            anchor: Anchor::Center,
            padx: 0,
            pady: 0,
            ipadx: 0,
            ipady: 0,
        }
    }
}

impl PackOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn fill(mut self, fill: Fill) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn expand(mut self, expand: bool) -> Self {
        self.expand = expand;
        self
    }

    pub fn weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn pad(mut self, padx: i32, pady: i32) -> Self {
        self.padx = padx.max(0);
        self.pady = pady.max(0);
        self
    }

    pub fn ipad(mut self, ipadx: i32, ipady: i32) -> Self {
        self.ipadx = ipadx.max(0);
        self.ipady = ipady.max(0);
        self
    }

    /// Fill mode after applying the cross-axis default.
    pub fn effective_fill(&self) -> Fill {
        self.fill.unwrap_or(if self.side.is_vertical() {
            Fill::X
        } else {
            Fill::Y
        })
    }

    /// Requested size grown by internal padding.
    fn inner_request(&self, requested: Size) -> Size {
        requested.expand(Insets::symmetric(self.ipadx, self.ipady))
    }

    /// Requested size grown by internal and external padding.
    fn outer_request(&self, requested: Size) -> Size {
        self.inner_request(requested)
            .expand(Insets::symmetric(self.padx, self.pady))
    }

    /// Parcel length along the packing axis before expansion.
    fn axis_need(&self, requested: Size) -> i32 {
        let outer = self.outer_request(requested);
        if self.side.is_vertical() {
            outer.height
        } else {
            outer.width
        }
    }
}

fn options_of(child: &ChildInput) -> PackOptions {
    match &child.options {
        LayoutOptions::Pack(o) => o.clone(),
        _ => PackOptions::default(),
    }
}

/// Split `extra` by `weights` so the parts sum to exactly `extra`.
///
/// Uses cumulative flooring, so rounding remainders land on later entries.
/// All-zero weights split evenly.
pub(crate) fn share_by_weight(extra: i32, weights: &[u32]) -> Vec<i32> {
    if weights.is_empty() || extra <= 0 {
        return vec![0; weights.len()];
    }
    let even;
    let weights = if weights.iter().all(|&w| w == 0) {
        even = vec![1; weights.len()];
        &even[..]
    } else {
        weights
    };
    let total: i64 = weights.iter().map(|&w| w as i64).sum();
    let mut shares = Vec::with_capacity(weights.len());
    let mut cumulative = 0i64;
    let mut given = 0i64;
    for &w in weights {
        cumulative += w as i64;
        let upto = extra as i64 * cumulative / total;
        shares.push((upto - given) as i32);
        given = upto;
    }
    shares
}

/// Carve one parcel of `length` from `side` of `cavity`, shrinking it.
fn carve(cavity: &mut Rect, side: Side, length: i32) -> Rect {
    match side {
        Side::Top => {
            let len = length.clamp(0, cavity.height);
            let parcel = Rect::new(cavity.x, cavity.y, cavity.width, len);
            cavity.y += len;
            cavity.height -= len;
            parcel
        }
        Side::Bottom => {
            let len = length.clamp(0, cavity.height);
            cavity.height -= len;
            Rect::new(cavity.x, cavity.bottom(), cavity.width, len)
        }
        Side::Left => {
            let len = length.clamp(0, cavity.width);
            let parcel = Rect::new(cavity.x, cavity.y, len, cavity.height);
            cavity.x += len;
            cavity.width -= len;
            parcel
        }
        Side::Right => {
            let len = length.clamp(0, cavity.width);
            cavity.width -= len;
            Rect::new(cavity.right(), cavity.y, len, cavity.height)
        }
    }
}

/// Arrange children inside `area`.
pub fn arrange(area: Rect, children: &[ChildInput]) -> Vec<Rect> {
    let options: Vec<PackOptions> = children.iter().map(options_of).collect();

    // Pass one: leftover space per axis after requested parcels.
    let mut cavity = area;
    for (child, o) in children.iter().zip(&options) {
        if child.visible {
            carve(&mut cavity, o.side, o.axis_need(child.requested));
        }
    }
    let (extra_w, extra_h) = (cavity.width, cavity.height);

    let expanders = |vertical: bool| -> (Vec<usize>, Vec<u32>) {
        children
            .iter()
            .zip(&options)
            .enumerate()
            .filter(|(_, (c, o))| c.visible && o.expand && o.side.is_vertical() == vertical)
            .map(|(i, (_, o))| (i, o.weight))
            .unzip()
    };
    let mut share = vec![0; children.len()];
    for (vertical, extra) in [(true, extra_h), (false, extra_w)] {
        let (indices, weights) = expanders(vertical);
        for (i, s) in indices.into_iter().zip(share_by_weight(extra, &weights)) {
            share[i] = s;
        }
    }

    // Pass two: final parcels.
    let mut cavity = area;
    children
        .iter()
        .zip(&options)
        .zip(share)
        .map(|((child, o), extra)| {
            if !child.visible {
                return collapsed(area);
            }
            let parcel = carve(&mut cavity, o.side, o.axis_need(child.requested).saturating_add(extra));
            let inner = parcel.inset(Insets::symmetric(o.padx, o.pady));
            let want = o.inner_request(child.requested);
            let fill = o.effective_fill();
            let size = Size::new(
                if fill.x() { inner.width } else { want.width.min(inner.width) },
                if fill.y() { inner.height } else { want.height.min(inner.height) },
            );
            o.anchor.align(inner, size)
        })
        .collect()
}

/// Natural size: stacked parcels along each axis, widest cross extent.
pub fn measure(children: &[ChildInput]) -> Size {
    let (mut width, mut height) = (0i32, 0i32);
    let (mut max_w, mut max_h) = (0i32, 0i32);
    for child in children.iter().filter(|c| c.visible) {
        let o = options_of(child);
        let outer = o.outer_request(child.requested);
        if o.side.is_vertical() {
            max_w = max_w.max(outer.width.saturating_add(width));
            height = height.saturating_add(outer.height);
        } else {
            max_h = max_h.max(outer.height.saturating_add(height));
            width = width.saturating_add(outer.width);
        }
    }
    Size::new(max_w.max(width), max_h.max(height))
}

// ===========================================================================
// Tests
// ===========================================================================
