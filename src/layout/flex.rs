//! Flexbox row/column manager computed with taffy.
//!
//! Each arrange builds a throwaway [`TaffyTree`] mirroring the container and
//! its children, so the manager stays a pure function of its inputs.

use taffy::prelude::*;

use crate::geometry::{Rect, Size};

use super::manager::{collapsed, ChildInput, LayoutOptions};

/// Main axis of a flex container.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Row,
    Column,
}

/// Flex container settings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlexManager {
    pub direction: Direction,
    /// Space between adjacent children on the main axis.
    pub gap: i32,
}

impl FlexManager {
    pub fn row() -> Self {
        Self {
            direction: Direction::Row,
            gap: 0,
        }
    }

    pub fn column() -> Self {
        Self {
            direction: Direction::Column,
            gap: 0,
        }
    }

    pub fn gap(mut self, gap: i32) -> Self {
        self.gap = gap.max(0);
        self
    }

    /// Arrange children inside `area`.
    pub fn arrange(&self, area: Rect, children: &[ChildInput]) -> Vec<Rect> {
        match self.compute(area, children) {
            Ok(rects) => rects,
            Err(err) => {
                tracing::warn!(%err, "flex layout failed, collapsing children");
                vec![collapsed(area); children.len()]
            }
        }
    }

    fn compute(&self, area: Rect, children: &[ChildInput]) -> Result<Vec<Rect>, taffy::TaffyError> {
        let mut tree: TaffyTree<()> = TaffyTree::new();
        let mut leaves = Vec::with_capacity(children.len());
        for child in children {
            leaves.push(tree.new_leaf(child_style(child))?);
        }

        let mut style = Style::default();
        style.display = Display::Flex;
        style.flex_direction = match self.direction {
            Direction::Row => FlexDirection::Row,
            Direction::Column => FlexDirection::Column,
        };
        style.gap = taffy::geometry::Size {
            width: LengthPercentage::from_length(self.gap as f32),
            height: LengthPercentage::from_length(self.gap as f32),
        };
        style.size = taffy::geometry::Size {
            width: Dimension::from_length(area.width as f32),
            height: Dimension::from_length(area.height as f32),
        };
        let root = tree.new_with_children(style, &leaves)?;

        tree.compute_layout(
            root,
            taffy::geometry::Size {
                width: AvailableSpace::Definite(area.width as f32),
                height: AvailableSpace::Definite(area.height as f32),
            },
        )?;

        let mut rects = Vec::with_capacity(children.len());
        for (child, &leaf) in children.iter().zip(&leaves) {
            if !child.visible {
                rects.push(collapsed(area));
                continue;
            }
            let layout = tree.layout(leaf)?;
            rects.push(Rect::new(
                area.x.saturating_add(layout.location.x.round() as i32),
                area.y.saturating_add(layout.location.y.round() as i32),
                layout.size.width.round() as i32,
                layout.size.height.round() as i32,
            ));
        }
        Ok(rects)
    }

    /// Sum of requested sizes plus gaps on the main axis, largest on the cross axis.
    pub fn measure(&self, children: &[ChildInput]) -> Size {
        let visible: Vec<Size> = children
            .iter()
            .filter(|c| c.visible)
            .map(|c| {
                let basis = options_of(c).basis;
                match (self.direction, basis) {
                    (Direction::Row, Some(b)) => Size::new(b, c.requested.height),
                    (Direction::Column, Some(b)) => Size::new(c.requested.width, b),
                    (_, None) => c.requested,
                }
            })
            .collect();
        let count = i32::try_from(visible.len().saturating_sub(1)).unwrap_or(i32::MAX);
        let gaps = self.gap.saturating_mul(count);
        match self.direction {
            Direction::Row => Size::new(
                visible.iter().map(|s| s.width).fold(gaps, i32::saturating_add),
                visible.iter().map(|s| s.height).max().unwrap_or(0),
            ),
            Direction::Column => Size::new(
                visible.iter().map(|s| s.width).max().unwrap_or(0),
                visible.iter().map(|s| s.height).fold(gaps, i32::saturating_add),
            ),
        }
    }
}

/// Per-child flex options.
#[derive(Clone, Debug, PartialEq)]
pub struct FlexOptions {
    pub grow: f32,
    pub shrink: f32,
    /// Main-axis starting size; `None` uses the requested size.
    pub basis: Option<i32>,
}

impl Default for FlexOptions {
    fn default() -> Self {
        Self {
            grow: 0.0,
            shrink: 1.0,
            basis: None,
        }
    }
}

impl FlexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grow(mut self, grow: f32) -> Self {
        self.grow = grow.max(0.0);
        self
    }

    pub fn shrink(mut self, shrink: f32) -> Self {
        self.shrink = shrink.max(0.0);
        self
    }

    pub fn basis(mut self, basis: i32) -> Self {
        self.basis = Some(basis.max(0));
        self
    }
}

fn options_of(child: &ChildInput) -> FlexOptions {
    match &child.options {
        LayoutOptions::Flex(o) => o.clone(),
        _ => FlexOptions::default(),
    }
}

fn child_style(child: &ChildInput) -> Style {
    let o = options_of(child);
    let mut style = Style::default();
    if !child.visible {
        style.display = Display::None;
        return style;
    }
    style.flex_grow = o.grow;
    style.flex_shrink = o.shrink;
    style.flex_basis = match o.basis {
        Some(b) => Dimension::from_length(b as f32),
        None => Dimension::AUTO,
    };
    style.size = taffy::geometry::Size {
        width: Dimension::from_length(child.requested.width as f32),
        height: Dimension::from_length(child.requested.height as f32),
    };
    style.min_size = taffy::geometry::Size {
        width: Dimension::from_length(0.0),
        height: Dimension::from_length(0.0),
    };
    style
}

// ===========================================================================
// Tests
// ===========================================================================
