//! Pilot: programmatic interaction with a headless App.
//!
//! The `Pilot` wraps an [`App`] over a [`RecordingBackend`] and a
//! [`ScriptedInput`]. Each interaction queues input and drives exactly one
//! frame, so assertions see the state after routing, layout and paint.

use crate::app::{App, AppConfig, FrameReport};
use crate::context::ToolkitContext;
use crate::dom::node::NodeId;
use crate::error::{Error, Result};
use crate::event::input::{EventKind, Key, KeyEvent, Modifiers, PointerButton};
use crate::geometry::{Point, Rect};

use super::recording::RecordingBackend;
use super::scripted::ScriptedInput;

/// A headless app driver for testing.
///
/// # Examples
///
/// ```
/// use trellis_ui::app::AppConfig;
/// use trellis_ui::config::{ConfigBatch, Value};
/// use trellis_ui::event::Key;
/// use trellis_ui::testing::Pilot;
/// use trellis_ui::widget::WidgetKind;
///
/// let mut pilot = Pilot::new(AppConfig::new().with_window_size(80, 24)).unwrap();
/// let root = pilot.ctx().root();
/// let entry = pilot.ctx_mut().create(root, WidgetKind::Entry, ConfigBatch::new()).unwrap();
/// pilot.ctx_mut().focus(entry).unwrap();
/// pilot.type_text("hi").unwrap();
/// pilot.press(Key::Backspace).unwrap();
/// assert_eq!(pilot.ctx().cget(entry, "text").unwrap(), Value::from("h"));
/// ```
pub struct Pilot {
    app: App<RecordingBackend, ScriptedInput>,
}

impl Pilot {
    pub fn new(config: AppConfig) -> Result<Self> {
        Ok(Self {
            app: App::new(config, RecordingBackend::new(), ScriptedInput::new())?,
        })
    }

    pub fn app(&self) -> &App<RecordingBackend, ScriptedInput> {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App<RecordingBackend, ScriptedInput> {
        &mut self.app
    }

    pub fn ctx(&self) -> &ToolkitContext {
        self.app.ctx()
    }

    pub fn ctx_mut(&mut self) -> &mut ToolkitContext {
        self.app.ctx_mut()
    }

    pub fn backend(&self) -> &RecordingBackend {
        self.app.backend()
    }

    /// Drive one frame with whatever input is queued.
    pub fn frame(&mut self) -> Result<FrameReport> {
        self.app.frame()
    }

    /// Queue raw events and drive one frame.
    pub fn send(&mut self, kinds: impl IntoIterator<Item = EventKind>) -> Result<FrameReport> {
        self.app.input_mut().extend(kinds);
        self.app.frame()
    }

    /// Press and release the left button at `point`.
    pub fn click(&mut self, point: Point) -> Result<FrameReport> {
        self.send([
            EventKind::PointerDown { position: point, button: PointerButton::Left },
            EventKind::PointerUp { position: point, button: PointerButton::Left },
        ])
    }

    /// Click the center of `id`'s laid-out rectangle, laying out first if
    /// needed.
    pub fn click_widget(&mut self, id: NodeId) -> Result<FrameReport> {
        if self.ctx().is_layout_pending() {
            self.frame()?;
        }
        let rect = self.ctx().rect(id)?;
        if rect.is_empty() {
            return Err(Error::NotFound(id));
        }
        self.click(center(rect))
    }

    /// Press, drag to `to`, and release.
    pub fn drag(&mut self, from: Point, to: Point) -> Result<FrameReport> {
        self.send([
            EventKind::PointerDown { position: from, button: PointerButton::Left },
            EventKind::PointerMove { position: to },
            EventKind::PointerUp { position: to, button: PointerButton::Left },
        ])
    }

    pub fn move_to(&mut self, point: Point) -> Result<FrameReport> {
        self.send([EventKind::PointerMove { position: point }])
    }

    pub fn press(&mut self, key: Key) -> Result<FrameReport> {
        self.press_with(key, Modifiers::empty())
    }

    pub fn press_with(&mut self, key: Key, modifiers: Modifiers) -> Result<FrameReport> {
        let event = KeyEvent::new(key, modifiers);
        self.send([EventKind::KeyDown(event), EventKind::KeyUp(event)])
    }

    pub fn type_text(&mut self, text: &str) -> Result<FrameReport> {
        self.send([EventKind::TextInput(text.to_string())])
    }
}

fn center(rect: Rect) -> Point {
    Point::new(rect.x + rect.width / 2, rect.y + rect.height / 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigBatch, Value};
    use crate::layout::place::PlaceOptions;
    use crate::widget::kind::WidgetKind;

    fn pilot() -> Pilot {
        Pilot::new(AppConfig::new().with_window_size(200, 100)).unwrap()
    }

    #[test]
    fn click_widget_toggles_checkbutton() {
        let mut pilot = pilot();
        let root = pilot.ctx().root();
        let check = pilot
            .ctx_mut()
            .create(root, WidgetKind::CheckButton, ConfigBatch::new().set("text", "on"))
            .unwrap();
        pilot.click_widget(check).unwrap();
        assert_eq!(pilot.ctx().cget(check, "checked").unwrap(), Value::Bool(true));
        assert_eq!(pilot.ctx().focused(), Some(check));
    }

    #[test]
    fn click_outside_everything_is_unconsumed() {
        let mut pilot = pilot();
        let root = pilot.ctx().root();
        let b = pilot.ctx_mut().create(root, WidgetKind::Button, ConfigBatch::new()).unwrap();
        pilot
            .ctx_mut()
            .set_layout_options(b, PlaceOptions::at(0, 0).size(10, 10))
            .unwrap();
        let report = pilot.click(Point::new(150, 80)).unwrap();
        assert_eq!(report.unconsumed.len(), 2);
    }

    #[test]
    fn drag_slides_scale() {
        let mut pilot = pilot();
        let root = pilot.ctx().root();
        let scale = pilot.ctx_mut().create(root, WidgetKind::Scale, ConfigBatch::new()).unwrap();
        pilot
            .ctx_mut()
            .set_layout_options(scale, PlaceOptions::at(0, 0).size(101, 20))
            .unwrap();
        pilot.frame().unwrap();
        pilot.drag(Point::new(10, 10), Point::new(300, 10)).unwrap();
        assert_eq!(pilot.ctx().cget(scale, "value").unwrap(), Value::Float(100.0));
        assert_eq!(pilot.ctx().captured(), None);
    }
}
