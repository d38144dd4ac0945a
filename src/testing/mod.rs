//! Headless testing framework: recording backend, scripted input, Pilot,
//! tree dumps.
//!
//! Use the [`Pilot`] to drive an [`App`](crate::app::App) frame by frame
//! without a terminal. The [`RecordingBackend`] keeps every draw call for
//! assertions and [`dump_tree`] renders the widget tree as text for
//! snapshot tests.

pub mod pilot;
pub mod recording;
pub mod scripted;
pub mod snapshot;

pub use pilot::Pilot;
pub use recording::{DrawCall, RecordingBackend};
pub use scripted::ScriptedInput;
pub use snapshot::dump_tree;
