//! App struct: configuration, frame driver, lifecycle.
//!
//! [`App`] owns a [`ToolkitContext`] plus the two collaborators it talks to
//! once per frame: an [`InputSource`] to drain and a [`DrawBackend`] to paint
//! into. Each [`App::frame`] routes pending input, runs layout, then paints
//! and presents whatever became dirty.

use std::thread;
use std::time::{Duration, Instant};

use crate::backend::terminal::{TerminalBackend, TerminalInput};
use crate::backend::{DrawBackend, InputSource};
use crate::context::ToolkitContext;
use crate::error::{Error, Result};
use crate::event::input::{EventKind, InputEvent, Key, Modifiers};
use crate::geometry::Rect;
use crate::layout::engine::{LayoutReport, DEFAULT_MAX_ITERATIONS};

/// Events routed per frame before the rest wait for the next one.
const MAX_EVENTS_PER_FRAME: usize = 256;

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Optional window title, stored on the root widget.
    pub title: Option<String>,
    /// Initial window width.
    pub width: i32,
    /// Initial window height.
    pub height: i32,
    /// Theme active at startup.
    pub theme: String,
    /// Extra theme source text parsed at startup.
    pub theme_source: Option<String>,
    /// Target frames per second for [`App::run`].
    pub fps: u32,
    /// How many times one layout pass may process a single widget.
    pub max_layout_iterations: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: None,
            width: 800,
            height: 600,
            theme: "dark".to_string(),
            theme_source: None,
            fps: 60,
            max_layout_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl AppConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title (builder).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the initial window size (builder).
    pub fn with_window_size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the startup theme (builder).
    pub fn with_theme(mut self, name: impl Into<String>) -> Self {
        self.theme = name.into();
        self
    }

    /// Add theme source text to load at startup (builder).
    pub fn with_theme_source(mut self, source: impl Into<String>) -> Self {
        self.theme_source = Some(source.into());
        self
    }

    /// Set the target FPS (builder).
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Set the layout iteration cap (builder).
    pub fn with_max_layout_iterations(mut self, cap: usize) -> Self {
        self.max_layout_iterations = cap;
        self
    }

    fn frame_budget(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}

// ---------------------------------------------------------------------------
// FrameReport
// ---------------------------------------------------------------------------

/// What the layout step of a frame did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LayoutOutcome {
    /// Nothing was pending.
    #[default]
    Idle,
    Settled(LayoutReport),
    /// The pass hit the iteration cap and was rolled back.
    Diverged { container: crate::dom::NodeId, iterations: usize },
}

/// Summary of one [`App::frame`].
#[derive(Clone, Debug, Default)]
pub struct FrameReport {
    /// Events some handler or built-in behavior consumed.
    pub consumed: usize,
    /// Events nobody consumed, in arrival order.
    pub unconsumed: Vec<InputEvent>,
    pub layout: LayoutOutcome,
    /// Region repainted, empty when nothing was dirty.
    pub painted: Rect,
    pub presented: bool,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// The main application struct.
pub struct App<B: DrawBackend, S: InputSource> {
    ctx: ToolkitContext,
    backend: B,
    input: S,
    config: AppConfig,
    running: bool,
    frames: u64,
}

impl<B: DrawBackend, S: InputSource> App<B, S> {
    pub fn new(config: AppConfig, backend: B, input: S) -> Result<Self> {
        let ctx = ToolkitContext::new(&config)?;
        Ok(Self {
            ctx,
            backend,
            input,
            config,
            running: true,
            frames: 0,
        })
    }

    pub fn ctx(&self) -> &ToolkitContext {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut ToolkitContext {
        &mut self.ctx
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn input_mut(&mut self) -> &mut S {
        &mut self.input
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Frames driven so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn should_quit(&self) -> bool {
        !self.running
    }

    pub fn request_quit(&mut self) {
        self.running = false;
    }

    /// Drive one frame: route input, lay out, paint, present.
    ///
    /// A layout divergence is logged and reported, not returned: the frame
    /// still paints with the rolled-back geometry.
    pub fn frame(&mut self) -> Result<FrameReport> {
        let mut report = FrameReport::default();

        for _ in 0..MAX_EVENTS_PER_FRAME {
            let Some(event) = self.input.poll()? else {
                break;
            };
            if self.ctx.dispatch(&event).is_consumed() {
                report.consumed += 1;
                continue;
            }
            if is_interrupt(&event) {
                tracing::debug!("interrupt received, quitting");
                self.request_quit();
            }
            report.unconsumed.push(event);
        }

        report.layout = if self.ctx.is_layout_pending() {
            match self.ctx.layout() {
                Ok(pass) => LayoutOutcome::Settled(pass),
                Err(Error::LayoutDivergence { container, iterations }) => {
                    tracing::error!(?container, iterations, "layout diverged, subtree quarantined");
                    LayoutOutcome::Diverged { container, iterations }
                }
                Err(e) => return Err(e),
            }
        } else {
            LayoutOutcome::Idle
        };

        report.painted = self.ctx.paint(&mut self.backend)?;
        if !report.painted.is_empty() {
            self.backend.present(report.painted)?;
            report.presented = true;
        }
        for id in self.ctx.take_released() {
            self.backend.release(id);
        }

        self.frames += 1;
        Ok(report)
    }

    /// Drive frames at the configured rate until quit is requested.
    pub fn run(&mut self) -> Result<()> {
        let budget = self.config.frame_budget();
        while self.running {
            let started = Instant::now();
            self.frame()?;
            if let Some(rest) = budget.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        }
        Ok(())
    }

    /// Destroy every widget and tell the backend about each one.
    pub fn shutdown(&mut self) {
        for id in self.ctx.shutdown() {
            self.backend.release(id);
        }
        self.running = false;
    }
}

impl App<TerminalBackend, TerminalInput> {
    /// An app drawing into the current terminal, sized to it.
    pub fn terminal(config: AppConfig) -> Result<Self> {
        let size = TerminalBackend::size()?;
        let mut backend = TerminalBackend::new()?;
        backend.enter()?;
        let config = config.with_window_size(size.width, size.height);
        App::new(config, backend, TerminalInput::new())
    }
}

fn is_interrupt(event: &InputEvent) -> bool {
    matches!(
        &event.kind,
        EventKind::KeyDown(key)
            if key.code == Key::Char('c') && key.modifiers.contains(Modifiers::CTRL)
    )
}

// ===========================================================================
// Tests
// ===========================================================================
