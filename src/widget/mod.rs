//! Widget kinds, their configuration schemas, requested-size measurement,
//! and the built-in behavior of interactive kinds.

pub(crate) mod behavior;
pub mod kind;
pub mod measure;

pub use kind::{Affects, KeySpec, WidgetKind};
pub use measure::requested_size;
