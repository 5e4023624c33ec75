//! Offline host that runs the playback engine without touching the real
//! pointer: time advances by a fixed tick per poll, start is immediate, no key
//! is ever pressed and every pointer move is recorded.

use std::{cell::Cell, rc::Rc};

use notepilot_core::{Clock, InputQuery, KeyCode, PointerSink};
use serde::Serialize;

/// One recorded pointer move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TraceSample {
    /// Seconds since playback start.
    pub t: f64,
    pub x: f64,
    pub y: f64,
}

/// Clock that moves forward by `tick` seconds every time it is read.
#[derive(Debug)]
pub struct SteppedClock {
    tick: f64,
    next: Cell<f64>,
    last_read: Rc<Cell<f64>>,
}

impl SteppedClock {
    pub fn new(tick: f64) -> Self {
        Self {
            tick,
            next: Cell::new(0.0),
            last_read: Rc::new(Cell::new(0.0)),
        }
    }
}

impl Clock for SteppedClock {
    type Instant = f64;

    fn now(&self) -> f64 {
        0.0
    }

    fn elapsed_since(&self, instant: f64) -> f64 {
        let elapsed = self.next.get() - instant;
        self.last_read.set(elapsed);
        self.next.set(self.next.get() + self.tick);
        elapsed
    }
}

/// Pointer that stamps every move with the latest clock reading.
#[derive(Debug)]
pub struct PathRecorder {
    anchor: (f64, f64),
    clock: Rc<Cell<f64>>,
    samples: Vec<TraceSample>,
}

impl PathRecorder {
    pub fn new(anchor: (f64, f64), clock: &SteppedClock) -> Self {
        Self {
            anchor,
            clock: Rc::clone(&clock.last_read),
            samples: Vec::new(),
        }
    }

    pub fn into_samples(self) -> Vec<TraceSample> {
        self.samples
    }
}

impl PointerSink for PathRecorder {
    fn move_to(&mut self, x: f64, y: f64) {
        self.samples.push(TraceSample {
            t: self.clock.get(),
            x,
            y,
        });
    }

    fn current_position(&self) -> (f64, f64) {
        self.anchor
    }
}

/// Keyboard with nothing pressed; waiting for a key returns at once.
#[derive(Debug, Default)]
pub struct IdleInput;

impl InputQuery for IdleInput {
    fn is_pressed(&self, _key: KeyCode) -> bool {
        false
    }

    fn wait_for(&mut self, key: KeyCode) {
        tracing::debug!(?key, "offline host starts immediately");
    }
}
