//! Widget arena: slotmap-backed nodes and the registry that owns them.

pub mod node;
pub mod registry;

pub use node::{LayoutState, NodeId, WidgetNode};
pub use registry::WidgetRegistry;
