//! # trellis-ui
//!
//! The core of a retained-mode GUI widget toolkit: a widget tree with a
//! per-key configuration model, themeable styles, pluggable geometry
//! managers, and input routing. Drawing and raw input live behind backend
//! traits, so the same core runs in a terminal or headless under test.
//!
//! ## Core Systems
//!
//! - **[`dom`]**: Slotmap-backed widget registry and nodes
//! - **[`config`]**: Typed values and the all-or-nothing `configure`/`cget` mediator
//! - **[`theme`]**: Named themes, a theme source parser, and style resolution
//! - **[`widget`]**: Widget kinds, their key schemas, measurement, built-in behaviors
//! - **[`layout`]**: Place, pack, grid, flex and custom managers; the capped layout pass
//! - **[`invalidation`]**: Pending-layout and pending-paint bookkeeping
//! - **[`event`]**: Input events, hit testing, focus chain, capture, handler bubbling
//! - **[`backend`]**: Drawing and input seams, with a crossterm implementation
//! - **[`paint`]**: Dirty-region paint pass
//! - **[`context`]**: [`ToolkitContext`], the host's programmatic surface
//! - **[`app`]**: Frame driver tying input, layout and paint together
//! - **[`testing`]**: Recording backend, scripted input, Pilot, tree dumps
//! - **[`geometry`]**: Point, Size, Rect, Insets primitives

// Foundation
pub mod error;
pub mod geometry;

// Core systems
pub mod config;
pub mod dom;
pub mod invalidation;
pub mod layout;
pub mod theme;

// Widget system
pub mod widget;

// Events
pub mod event;

// Rendering
pub mod backend;
pub mod paint;

// Application
pub mod app;
pub mod context;

// Headless harness
pub mod testing;

pub use app::{App, AppConfig};
pub use context::ToolkitContext;
pub use error::{Error, Result};
