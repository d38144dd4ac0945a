//! An [`InputSource`] fed from a queue.

use std::collections::VecDeque;
use std::time::Duration;

use crate::backend::InputSource;
use crate::error::Result;
use crate::event::input::{EventKind, InputEvent};

/// Spacing between scripted timestamps.
const TICK: Duration = Duration::from_millis(1);

/// Replays queued events, stamping each with a monotonic clock.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    queue: VecDeque<InputEvent>,
    clock: Duration,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `kind`, timestamped one tick after the previous event.
    pub fn push(&mut self, kind: EventKind) {
        self.clock += TICK;
        self.queue.push_back(InputEvent::new(self.clock, kind));
    }

    pub fn extend(&mut self, kinds: impl IntoIterator<Item = EventKind>) {
        for kind in kinds {
            self.push(kind);
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Result<Option<InputEvent>> {
        Ok(self.queue.pop_front())
    }
}
