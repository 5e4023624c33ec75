//! Core library for Notepilot.
//!
//! Maps are decoded into raw notes ([`map`], [`sources`]), merged into a
//! playback timeline ([`timeline`]) and then replayed as pointer movement by
//! the [`playback`] engine, shaped by one of the curves in [`easing`]. The
//! host supplies the clock, pointer and keyboard through the traits in
//! [`playback`].

pub mod config;
pub mod easing;
pub mod error;
pub mod map;
pub mod playback;
pub mod sources;
pub mod timeline;

pub use config::{AppConfig, DEFAULT_CONFIG_PATH};
pub use easing::{Easing, EasingCurve};
pub use error::{FormatError, NotepilotError, Result};
pub use map::{decode, decode_with_header, CoverImage, MapHeader};
pub use playback::{
    Clock, CoordinateMapping, Hotkeys, InputQuery, KeyCode, PlaybackEngine, PlaybackOutcome,
    PlaybackSession, PlaybackState, PointerSink, SystemClock,
};
pub use sources::{load_points, MapFormat};
pub use timeline::{aggregate, RawPoint, TimelinePoint};
