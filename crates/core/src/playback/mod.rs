//! Real-time pointer playback.
//!
//! The engine never talks to the operating system directly. Time, pointer
//! movement and key state come from the host through the [`Clock`],
//! [`PointerSink`] and [`InputQuery`] traits so the same loop can drive a real
//! mouse or an offline recorder.

mod engine;

use std::time::Instant;

use serde::{Deserialize, Serialize};

pub use engine::{
    CoordinateMapping, PlaybackEngine, PlaybackOutcome, PlaybackSession, PlaybackState,
    DEFAULT_SCALE, EMPTY_TIMELINE,
};

/// Monotonic time source polled once per loop iteration.
pub trait Clock {
    type Instant: Copy;

    fn now(&self) -> Self::Instant;

    /// Seconds elapsed since `instant`.
    fn elapsed_since(&self, instant: Self::Instant) -> f64;
}

/// Destination for pointer moves, in device coordinates.
pub trait PointerSink {
    fn move_to(&mut self, x: f64, y: f64);

    fn current_position(&self) -> (f64, f64);
}

/// Keyboard state as seen by the host.
pub trait InputQuery {
    fn is_pressed(&self, key: KeyCode) -> bool;

    /// Blocks until `key` is pressed.
    fn wait_for(&mut self, key: KeyCode);
}

/// Wall clock backed by [`std::time::Instant`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed_since(&self, instant: Instant) -> f64 {
        instant.elapsed().as_secs_f64()
    }
}

/// Hardware scan code of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(pub u32);

/// Key bindings polled by the playback loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hotkeys {
    /// Starts playback and captures the calibration anchor.
    pub start: KeyCode,
    pub offset_up: KeyCode,
    pub offset_down: KeyCode,
    /// Held together with an offset key to move by 10 ms instead of 1 ms.
    pub coarse_modifier: KeyCode,
    /// Either key ends playback immediately.
    pub stop: [KeyCode; 2],
}

impl Default for Hotkeys {
    fn default() -> Self {
        Self {
            start: KeyCode(65),
            offset_up: KeyCode(77),
            offset_down: KeyCode(75),
            coarse_modifier: KeyCode(42),
            stop: [KeyCode(57), KeyCode(1)],
        }
    }
}
