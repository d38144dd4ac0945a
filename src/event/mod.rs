//! Input events, focus order, and routing.

pub mod focus;
pub mod input;
pub mod router;

pub use focus::FocusChain;
pub use input::{EventKind, InputEvent, Key, KeyEvent, Modifiers, PointerButton};
pub use router::{hit_test, EventCx, EventHandler, EventRouter, Handled, Outcome};
