//! A [`DrawBackend`] that records instead of drawing.

use crate::backend::{DrawBackend, DrawStyle};
use crate::dom::node::NodeId;
use crate::error::Result;
use crate::geometry::Rect;

/// One recorded primitive.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Rect { rect: Rect, style: DrawStyle },
    Text { rect: Rect, text: String, style: DrawStyle },
    Image { rect: Rect, source: String, style: DrawStyle },
}

impl DrawCall {
    pub fn rect(&self) -> Rect {
        match self {
            DrawCall::Rect { rect, .. }
            | DrawCall::Text { rect, .. }
            | DrawCall::Image { rect, .. } => *rect,
        }
    }
}

/// Records draw calls, frames and releases.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<DrawCall>,
    /// Dirty region of every `begin_frame`.
    frames: Vec<Rect>,
    /// Index into `calls` where the latest frame started.
    frame_start: usize,
    presents: usize,
    released: Vec<NodeId>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call since creation (or the last [`clear`](Self::clear)).
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Calls made since the latest `begin_frame`.
    pub fn last_frame(&self) -> &[DrawCall] {
        &self.calls[self.frame_start.min(self.calls.len())..]
    }

    /// Rectangles drawn, in order.
    pub fn rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.calls.iter().filter_map(|call| match call {
            DrawCall::Rect { rect, .. } => Some(*rect),
            _ => None,
        })
    }

    /// Text runs drawn, in order.
    pub fn texts(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Dirty regions passed to `begin_frame`, in order.
    pub fn frames(&self) -> &[Rect] {
        &self.frames
    }

    pub fn presents(&self) -> usize {
        self.presents
    }

    pub fn released(&self) -> &[NodeId] {
        &self.released
    }

    pub fn clear(&mut self) {
        self.calls.clear();
        self.frame_start = 0;
    }
}

impl DrawBackend for RecordingBackend {
    fn begin_frame(&mut self, dirty: Rect) -> Result<()> {
        self.frames.push(dirty);
        self.frame_start = self.calls.len();
        Ok(())
    }

    fn draw_rect(&mut self, rect: Rect, style: &DrawStyle) -> Result<()> {
        self.calls.push(DrawCall::Rect { rect, style: style.clone() });
        Ok(())
    }

    fn draw_text(&mut self, rect: Rect, text: &str, style: &DrawStyle) -> Result<()> {
        self.calls.push(DrawCall::Text {
            rect,
            text: text.to_string(),
            style: style.clone(),
        });
        Ok(())
    }

    fn draw_image(&mut self, rect: Rect, source: &str, style: &DrawStyle) -> Result<()> {
        self.calls.push(DrawCall::Image {
            rect,
            source: source.to_string(),
            style: style.clone(),
        });
        Ok(())
    }

    fn present(&mut self, _dirty: Rect) -> Result<()> {
        self.presents += 1;
        Ok(())
    }

    fn release(&mut self, node: NodeId) {
        self.released.push(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_frame_starts_at_begin_frame() {
        let mut rec = RecordingBackend::new();
        let style = DrawStyle::default();
        rec.draw_rect(Rect::new(0, 0, 1, 1), &style).unwrap();
        rec.begin_frame(Rect::new(0, 0, 5, 5)).unwrap();
        rec.draw_text(Rect::new(1, 1, 2, 2), "x", &style).unwrap();
        assert_eq!(rec.calls().len(), 2);
        assert_eq!(rec.last_frame().len(), 1);
        assert_eq!(rec.last_frame()[0].rect(), Rect::new(1, 1, 2, 2));
        assert_eq!(rec.frames(), &[Rect::new(0, 0, 5, 5)]);
    }
}
