//! Layout: geometry managers and the pass that drives them.

pub mod engine;
pub mod flex;
pub mod grid;
pub mod manager;
pub mod pack;
pub mod place;

pub use engine::{LayoutEngine, LayoutReport};
pub use flex::{Direction, FlexManager, FlexOptions};
pub use grid::{GridManager, GridOptions, Sticky, Track};
pub use manager::{ArrangeChildren, ArrangeCx, ChildInput, GeometryManager, LayoutOptions};
pub use pack::{Fill, PackOptions, Side};
pub use place::PlaceOptions;
