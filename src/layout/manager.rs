//! Geometry manager variants and per-child layout options.
//!
//! A [`GeometryManager`] is attached to a container and turns the container's
//! content rectangle plus the children's [`LayoutOptions`] and requested sizes
//! into one rectangle per child. The built-in variants are pure functions of
//! their inputs; [`GeometryManager::Custom`] lets hosts plug in their own.

use std::fmt;

use crate::dom::node::NodeId;
use crate::error::{Error, Result};
use crate::geometry::{Rect, Size};

use super::flex::{FlexManager, FlexOptions};
use super::grid::{GridManager, GridOptions};
use super::pack::PackOptions;
use super::place::PlaceOptions;
use super::{pack, place};

// ---------------------------------------------------------------------------
// ChildInput
// ---------------------------------------------------------------------------

/// What a manager knows about one child when arranging.
#[derive(Clone, Debug, PartialEq)]
pub struct ChildInput {
    pub id: NodeId,
    /// Hidden children take no space and receive a zero-sized rectangle.
    pub visible: bool,
    /// Requested (natural) size, before any padding the manager adds.
    pub requested: Size,
    pub options: LayoutOptions,
}

/// Zero-sized rectangle at the origin of `area`, used for hidden children.
pub(crate) fn collapsed(area: Rect) -> Rect {
    Rect::new(area.x, area.y, 0, 0)
}

// ---------------------------------------------------------------------------
// LayoutOptions
// ---------------------------------------------------------------------------

/// How a child asks its parent's manager to place it.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LayoutOptions {
    /// No options given; the manager's defaults apply.
    #[default]
    Unset,
    Place(PlaceOptions),
    Pack(PackOptions),
    Grid(GridOptions),
    Flex(FlexOptions),
}

impl From<PlaceOptions> for LayoutOptions {
    fn from(o: PlaceOptions) -> Self {
        LayoutOptions::Place(o)
    }
}

impl From<PackOptions> for LayoutOptions {
    fn from(o: PackOptions) -> Self {
        LayoutOptions::Pack(o)
    }
}

impl From<GridOptions> for LayoutOptions {
    fn from(o: GridOptions) -> Self {
        LayoutOptions::Grid(o)
    }
}

impl From<FlexOptions> for LayoutOptions {
    fn from(o: FlexOptions) -> Self {
        LayoutOptions::Flex(o)
    }
}

// ---------------------------------------------------------------------------
// Custom strategies
// ---------------------------------------------------------------------------

/// Side channel handed to custom strategies.
///
/// Marking a node here puts it back into the pending-layout set once the
/// current container has been processed.
#[derive(Debug, Default)]
pub struct ArrangeCx {
    container: Option<NodeId>,
    remarked: Vec<NodeId>,
}

impl ArrangeCx {
    pub(crate) fn new(container: NodeId) -> Self {
        Self {
            container: Some(container),
            remarked: Vec::new(),
        }
    }

    /// The container being arranged.
    pub fn container(&self) -> Option<NodeId> {
        self.container
    }

    /// Request another layout pass for `node`.
    pub fn mark_pending(&mut self, node: NodeId) {
        if !self.remarked.contains(&node) {
            self.remarked.push(node);
        }
    }

    pub(crate) fn take_remarked(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.remarked)
    }
}

/// A host-supplied layout strategy.
pub trait ArrangeChildren {
    /// Return exactly one rectangle per entry of `children`, in order.
    fn arrange(&mut self, cx: &mut ArrangeCx, area: Rect, children: &[ChildInput]) -> Vec<Rect>;

    /// Natural size of the arranged children.
    fn measure(&self, children: &[ChildInput]) -> Size {
        children
            .iter()
            .filter(|c| c.visible)
            .fold(Size::ZERO, |acc, c| acc.max(c.requested))
    }

    /// Whether the strategy escapes the content rectangle on purpose.
    fn allows_overflow(&self) -> bool {
        false
    }

    /// Name used in logs and tree dumps.
    fn name(&self) -> &str {
        "custom"
    }
}

// ---------------------------------------------------------------------------
// GeometryManager
// ---------------------------------------------------------------------------

/// Layout strategy attached to a container.
pub enum GeometryManager {
    /// Absolute placement with explicit or relative coordinates.
    Place,
    /// Sequential packing against the sides of a shrinking cavity.
    Pack,
    /// Rows and columns with spans, weights and minimum sizes.
    Grid(GridManager),
    /// Flexbox row or column.
    Flex(FlexManager),
    Custom(Box<dyn ArrangeChildren>),
}

impl fmt::Debug for GeometryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryManager::Place => f.write_str("Place"),
            GeometryManager::Pack => f.write_str("Pack"),
            GeometryManager::Grid(g) => f.debug_tuple("Grid").field(g).finish(),
            GeometryManager::Flex(x) => f.debug_tuple("Flex").field(x).finish(),
            GeometryManager::Custom(c) => write!(f, "Custom({})", c.name()),
        }
    }
}

impl GeometryManager {
    /// Wrap a custom strategy.
    pub fn custom(strategy: impl ArrangeChildren + 'static) -> Self {
        GeometryManager::Custom(Box::new(strategy))
    }

    /// Short name for logs and tree dumps.
    pub fn name(&self) -> &str {
        match self {
            GeometryManager::Place => "place",
            GeometryManager::Pack => "pack",
            GeometryManager::Grid(_) => "grid",
            GeometryManager::Flex(_) => "flex",
            GeometryManager::Custom(c) => c.name(),
        }
    }

    /// Whether children of this manager may be given `options`.
    ///
    /// `Unset` is always accepted; custom strategies accept anything.
    pub fn accepts(&self, options: &LayoutOptions) -> bool {
        matches!(
            (self, options),
            (_, LayoutOptions::Unset)
                | (GeometryManager::Custom(_), _)
                | (GeometryManager::Place, LayoutOptions::Place(_))
                | (GeometryManager::Pack, LayoutOptions::Pack(_))
                | (GeometryManager::Grid(_), LayoutOptions::Grid(_))
                | (GeometryManager::Flex(_), LayoutOptions::Flex(_))
        )
    }

    /// Check one child's options against the manager's declared bounds.
    pub fn validate(&self, options: &LayoutOptions) -> Result<()> {
        match (self, options) {
            (GeometryManager::Grid(g), LayoutOptions::Grid(o)) => g.check_span(o),
            _ => Ok(()),
        }
    }

    /// Whether children may be placed outside the content rectangle.
    pub fn allows_overflow(&self, options: &LayoutOptions) -> bool {
        match (self, options) {
            (GeometryManager::Place, LayoutOptions::Place(o)) => o.overflow,
            (GeometryManager::Custom(c), _) => c.allows_overflow(),
            _ => false,
        }
    }

    /// Compute one rectangle per child. Never fails: degenerate input yields
    /// zero-sized or clipped rectangles.
    pub fn arrange(&mut self, cx: &mut ArrangeCx, area: Rect, children: &[ChildInput]) -> Vec<Rect> {
        let area = Rect::new(area.x, area.y, area.width.max(0), area.height.max(0));
        let mut rects = match self {
            GeometryManager::Place => place::arrange(area, children),
            GeometryManager::Pack => pack::arrange(area, children),
            GeometryManager::Grid(g) => g.arrange(area, children),
            GeometryManager::Flex(f) => f.arrange(area, children),
            GeometryManager::Custom(c) => c.arrange(cx, area, children),
        };
        // A strategy returning the wrong count still sets every child once.
        rects.resize(children.len(), collapsed(area));
        for (rect, child) in rects.iter_mut().zip(children) {
            if !child.visible {
                *rect = collapsed(area);
            } else if !self.allows_overflow(&child.options) {
                *rect = rect.clamp_within(area);
            }
        }
        rects
    }

    /// Natural size of the content area for `children`.
    pub fn measure(&self, children: &[ChildInput]) -> Size {
        match self {
            GeometryManager::Place => place::measure(children),
            GeometryManager::Pack => pack::measure(children),
            GeometryManager::Grid(g) => g.measure(children),
            GeometryManager::Flex(f) => f.measure(children),
            GeometryManager::Custom(c) => c.measure(children),
        }
        .non_negative()
    }
}

/// Build the `InvalidSpan` error for a grid placement.
pub(crate) fn invalid_span(o: &GridOptions, rows: usize, columns: usize) -> Error {
    Error::InvalidSpan {
        row: o.row,
        column: o.column,
        rowspan: o.rowspan,
        columnspan: o.columnspan,
        rows,
        columns,
    }
}

// ===========================================================================
// Tests
// ===========================================================================
