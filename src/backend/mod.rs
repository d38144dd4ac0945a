//! Collaborator seams: where pixels go and where raw input comes from.
//!
//! The core never rasterizes anything itself. The paint pass describes each
//! widget as rectangles, text runs and images handed to a [`DrawBackend`];
//! the frame driver pulls input from an [`InputSource`] once per frame.

pub mod terminal;

use crate::config::value::Color;
use crate::dom::node::NodeId;
use crate::error::Result;
use crate::event::input::InputEvent;
use crate::geometry::Rect;

/// Resolved appearance for one primitive.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawStyle {
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: i32,
    pub radius: i32,
    pub text_color: Color,
    pub font_family: String,
    pub font_size: i32,
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            fill: Color::TRANSPARENT,
            stroke: Color::TRANSPARENT,
            stroke_width: 0,
            radius: 0,
            text_color: Color::BLACK,
            font_family: String::new(),
            font_size: 0,
        }
    }
}

/// A drawing surface. Coordinates are integer pixels, origin top-left.
pub trait DrawBackend {
    /// Called before any primitive of a frame with the region being redrawn.
    fn begin_frame(&mut self, _dirty: Rect) -> Result<()> {
        Ok(())
    }

    fn draw_rect(&mut self, rect: Rect, style: &DrawStyle) -> Result<()>;

    fn draw_text(&mut self, rect: Rect, text: &str, style: &DrawStyle) -> Result<()>;

    /// `source` is the widget's `image` value; decoding is the backend's job.
    fn draw_image(&mut self, rect: Rect, source: &str, style: &DrawStyle) -> Result<()>;

    /// Show everything drawn since `begin_frame`.
    fn present(&mut self, dirty: Rect) -> Result<()>;

    /// Drop whatever the backend cached for a destroyed widget.
    fn release(&mut self, _node: NodeId) {}
}

/// A non-blocking source of raw input.
pub trait InputSource {
    /// The next pending event, or `None` when nothing is waiting.
    fn poll(&mut self) -> Result<Option<InputEvent>>;
}
