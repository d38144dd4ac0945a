//! Crossterm terminal backend.
//!
//! Each cell is one pixel. [`TerminalBackend`] wraps a buffered stdout writer
//! and queues crossterm commands for every primitive; `present` flushes them.
//! [`TerminalInput`] polls crossterm with a zero timeout so the frame loop
//! never blocks.

use std::collections::VecDeque;
use std::io::{self, BufWriter, Stdout, Write};
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{self, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::config::value::Color;
use crate::error::Result;
use crate::event::input::{self, EventKind, InputEvent};
use crate::geometry::{Point, Rect, Size};

use super::{DrawBackend, DrawStyle, InputSource};

fn to_crossterm(color: Color) -> style::Color {
    style::Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

// ---------------------------------------------------------------------------
// TerminalBackend
// ---------------------------------------------------------------------------

/// Terminal output using crossterm.
///
/// Does not take over the terminal on creation; call [`enter`](Self::enter).
pub struct TerminalBackend {
    writer: BufWriter<Stdout>,
    screen: Rect,
    entered: bool,
}

impl TerminalBackend {
    pub fn new() -> Result<Self> {
        let size = Self::size()?;
        Ok(Self {
            writer: BufWriter::new(io::stdout()),
            screen: Rect::new(0, 0, size.width, size.height),
            entered: false,
        })
    }

    /// Terminal size in cells.
    pub fn size() -> Result<Size> {
        let (w, h) = terminal::size()?;
        Ok(Size::new(i32::from(w), i32::from(h)))
    }

    /// Enter the alternate screen with raw mode and mouse reporting.
    pub fn enter(&mut self) -> Result<()> {
        execute!(self.writer, EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;
        terminal::enable_raw_mode()?;
        self.entered = true;
        Ok(())
    }

    /// Restore the terminal.
    pub fn leave(&mut self) -> Result<()> {
        if !self.entered {
            return Ok(());
        }
        terminal::disable_raw_mode()?;
        execute!(self.writer, cursor::Show, DisableMouseCapture, LeaveAlternateScreen)?;
        self.entered = false;
        Ok(())
    }

    /// Visible part of `rect` in cell coordinates.
    fn visible(&self, rect: Rect) -> Option<(u16, u16, u16, u16)> {
        let r = rect.intersection(self.screen);
        if r.is_empty() {
            return None;
        }
        let cell = |v: i32| u16::try_from(v).ok();
        Some((cell(r.x)?, cell(r.y)?, cell(r.width)?, cell(r.height)?))
    }

    fn paint_cells(&mut self, rect: Rect, color: Color) -> io::Result<()> {
        let Some((x, y, w, h)) = self.visible(rect) else {
            return Ok(());
        };
        let blank = " ".repeat(usize::from(w));
        queue!(self.writer, SetBackgroundColor(to_crossterm(color)))?;
        for row in y..y + h {
            queue!(self.writer, cursor::MoveTo(x, row), Print(&blank))?;
        }
        queue!(self.writer, ResetColor)
    }

    fn outline(&mut self, rect: Rect, style: &DrawStyle) -> io::Result<()> {
        if rect.width < 2 || rect.height < 2 {
            return Ok(());
        }
        let (right, bottom) = (rect.right() - 1, rect.bottom() - 1);
        let put = |this: &mut Self, x: i32, y: i32, ch: char| -> io::Result<()> {
            if !this.screen.contains(Point::new(x, y)) {
                return Ok(());
            }
            let (Ok(cx), Ok(cy)) = (u16::try_from(x), u16::try_from(y)) else {
                return Ok(());
            };
            queue!(this.writer, cursor::MoveTo(cx, cy), Print(ch))
        };
        queue!(self.writer, SetForegroundColor(to_crossterm(style.stroke)))?;
        if style.fill.a > 0 {
            queue!(self.writer, SetBackgroundColor(to_crossterm(style.fill)))?;
        }
        for x in rect.x + 1..right {
            put(self, x, rect.y, '─')?;
            put(self, x, bottom, '─')?;
        }
        for y in rect.y + 1..bottom {
            put(self, rect.x, y, '│')?;
            put(self, right, y, '│')?;
        }
        let rounded = style.radius > 0;
        put(self, rect.x, rect.y, if rounded { '╭' } else { '┌' })?;
        put(self, right, rect.y, if rounded { '╮' } else { '┐' })?;
        put(self, rect.x, bottom, if rounded { '╰' } else { '└' })?;
        put(self, right, bottom, if rounded { '╯' } else { '┘' })?;
        queue!(self.writer, ResetColor)
    }

    /// Print one line of `text` in the vertical middle of `rect`, clipped.
    fn line(&mut self, rect: Rect, text: &str, style: &DrawStyle) -> io::Result<()> {
        let row = Rect::new(
            rect.x,
            rect.y + (rect.height - 1).max(0) / 2,
            rect.width,
            rect.height.min(1),
        );
        let Some((x, y, w, _)) = self.visible(row) else {
            return Ok(());
        };
        // Characters left of the screen edge are skipped.
        let skip = usize::try_from(i32::from(x) - rect.x).unwrap_or(0);
        let clipped: String = text.chars().skip(skip).take(usize::from(w)).collect();
        queue!(self.writer, SetForegroundColor(to_crossterm(style.text_color)))?;
        if style.fill.a > 0 {
            queue!(self.writer, SetBackgroundColor(to_crossterm(style.fill)))?;
        }
        queue!(self.writer, cursor::MoveTo(x, y), Print(clipped), ResetColor)
    }
}

impl DrawBackend for TerminalBackend {
    fn begin_frame(&mut self, _dirty: Rect) -> Result<()> {
        let size = Self::size()?;
        self.screen = Rect::new(0, 0, size.width, size.height);
        Ok(())
    }

    fn draw_rect(&mut self, rect: Rect, style: &DrawStyle) -> Result<()> {
        if style.fill.a > 0 {
            self.paint_cells(rect, style.fill)?;
        }
        if style.stroke_width > 0 && style.stroke.a > 0 {
            self.outline(rect, style)?;
        }
        Ok(())
    }

    fn draw_text(&mut self, rect: Rect, text: &str, style: &DrawStyle) -> Result<()> {
        self.line(rect, text, style)?;
        Ok(())
    }

    fn draw_image(&mut self, rect: Rect, source: &str, style: &DrawStyle) -> Result<()> {
        self.line(rect, &format!("[{source}]"), style)?;
        Ok(())
    }

    fn present(&mut self, _dirty: Rect) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl Drop for TerminalBackend {
    fn drop(&mut self) {
        if let Err(err) = self.leave() {
            tracing::warn!(%err, "failed to restore the terminal");
        }
    }
}

// ---------------------------------------------------------------------------
// TerminalInput
// ---------------------------------------------------------------------------

/// Non-blocking crossterm input.
pub struct TerminalInput {
    start: Instant,
    pending: VecDeque<EventKind>,
}

impl TerminalInput {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            pending: VecDeque::new(),
        }
    }
}

impl Default for TerminalInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for TerminalInput {
    fn poll(&mut self) -> Result<Option<InputEvent>> {
        while self.pending.is_empty() && crossterm::event::poll(Duration::ZERO)? {
            self.pending.extend(input::from_crossterm(crossterm::event::read()?));
        }
        Ok(self
            .pending
            .pop_front()
            .map(|kind| InputEvent::new(self.start.elapsed(), kind)))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
