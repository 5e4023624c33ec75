use std::collections::VecDeque;

use super::{Clock, Hotkeys, InputQuery, KeyCode, PointerSink};
use crate::{EasingCurve, NotepilotError, Result, TimelinePoint};

/// Device units per map unit.
pub const DEFAULT_SCALE: f64 = 55.333_333_333_3;

pub const EMPTY_TIMELINE: &str = "empty timeline";

const FINE_OFFSET_STEP_MS: i64 = 1;
const COARSE_OFFSET_STEP_MS: i64 = 10;

/// Linear map from map space onto device space around a calibration anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapping {
    anchor: (f64, f64),
    scale: f64,
}

impl CoordinateMapping {
    pub fn new(anchor: (f64, f64), scale: f64) -> Self {
        Self { anchor, scale }
    }

    pub fn anchor(&self) -> (f64, f64) {
        self.anchor
    }

    pub fn to_device(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (1.0 - x) * self.scale + self.anchor.0,
            (1.0 - y) * self.scale + self.anchor.1,
        )
    }
}

/// How a playback run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Every note on the timeline was reached.
    Completed,
    /// A stop key was pressed.
    AbortedByUser,
    /// Playback never started.
    InvalidInput(&'static str),
}

/// Mutable state of one playback run.
#[derive(Debug, Clone)]
pub struct PlaybackState<T> {
    /// Number of notes reached after the first one.
    pub current_index: usize,
    pub offset_ms: i64,
    /// Timestamp of the first note; `offset_ms` starts here.
    pub base_offset_ms: i64,
    pub start_wall_time: T,
    /// Clamped progress computed on the latest tick.
    pub last_t: f64,
    offset_up_held: bool,
    offset_down_held: bool,
}

impl<T> PlaybackState<T> {
    fn new(start_wall_time: T, first_timestamp_ms: i64) -> Self {
        Self {
            current_index: 0,
            offset_ms: first_timestamp_ms,
            base_offset_ms: first_timestamp_ms,
            start_wall_time,
            last_t: 0.0,
            offset_up_held: false,
            offset_down_held: false,
        }
    }

    /// Offset applied by the operator since playback started.
    pub fn relative_offset_ms(&self) -> i64 {
        self.offset_ms - self.base_offset_ms
    }
}

/// Drives a pointer along a timeline, interpolating between notes.
#[derive(Debug)]
pub struct PlaybackEngine<C, P, I> {
    clock: C,
    pointer: P,
    input: I,
    easing: EasingCurve,
    hotkeys: Hotkeys,
    scale: f64,
}

impl<C, P, I> PlaybackEngine<C, P, I>
where
    C: Clock,
    P: PointerSink,
    I: InputQuery,
{
    pub fn new(clock: C, pointer: P, input: I, easing: EasingCurve) -> Self {
        Self {
            clock,
            pointer,
            input,
            easing,
            hotkeys: Hotkeys::default(),
            scale: DEFAULT_SCALE,
        }
    }

    pub fn with_hotkeys(mut self, hotkeys: Hotkeys) -> Self {
        self.hotkeys = hotkeys;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn into_parts(self) -> (C, P, I) {
        (self.clock, self.pointer, self.input)
    }

    /// Plays `timeline` to the end or until a stop key is pressed.
    ///
    /// `on_offset` receives the relative offset in milliseconds every time the
    /// operator nudges it.
    pub fn run(
        &mut self,
        timeline: Vec<TimelinePoint>,
        mut on_offset: impl FnMut(i64),
    ) -> PlaybackOutcome {
        let mut session = match self.start(timeline) {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(%err, "playback not started");
                return PlaybackOutcome::InvalidInput(EMPTY_TIMELINE);
            }
        };

        loop {
            if let Some(outcome) = session.tick(&mut on_offset) {
                return outcome;
            }
        }
    }

    /// Waits for the start key, then positions the pointer on the first note.
    ///
    /// An empty timeline is rejected before anything blocks.
    pub fn start(&mut self, timeline: Vec<TimelinePoint>) -> Result<PlaybackSession<'_, C, P, I>> {
        let mut pending = VecDeque::from(timeline);
        let first = pending
            .pop_front()
            .ok_or(NotepilotError::InvalidInput(EMPTY_TIMELINE))?;

        self.input.wait_for(self.hotkeys.start);
        let mapping = CoordinateMapping::new(self.pointer.current_position(), self.scale);
        let state = PlaybackState::new(self.clock.now(), first.timestamp_ms);

        let (x, y) = mapping.to_device(first.x, first.y);
        self.pointer.move_to(x, y);

        tracing::info!(
            notes = pending.len() + 1,
            anchor = ?mapping.anchor(),
            easing = %self.easing.easing(),
            "playback started"
        );

        Ok(PlaybackSession {
            engine: self,
            mapping,
            state,
            old_note: first,
            pending,
        })
    }
}

/// A playback run in progress. Each [`tick`](Self::tick) is one poll of the
/// control loop.
pub struct PlaybackSession<'e, C: Clock, P, I> {
    engine: &'e mut PlaybackEngine<C, P, I>,
    mapping: CoordinateMapping,
    state: PlaybackState<C::Instant>,
    old_note: TimelinePoint,
    pending: VecDeque<TimelinePoint>,
}

impl<C, P, I> PlaybackSession<'_, C, P, I>
where
    C: Clock,
    P: PointerSink,
    I: InputQuery,
{
    pub fn state(&self) -> &PlaybackState<C::Instant> {
        &self.state
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Runs one iteration of the control loop. Returns the outcome once
    /// playback is over.
    pub fn tick(&mut self, on_offset: &mut dyn FnMut(i64)) -> Option<PlaybackOutcome> {
        let Some(&note) = self.pending.front() else {
            return Some(PlaybackOutcome::Completed);
        };

        let t = self.progress_towards(&note);
        self.state.last_t = t;

        let delta = self.engine.easing.evaluate(t);
        let x = self.old_note.x * (1.0 - delta) + note.x * delta;
        let y = self.old_note.y * (1.0 - delta) + note.y * delta;
        let (device_x, device_y) = self.mapping.to_device(x, y);
        self.engine.pointer.move_to(device_x, device_y);

        if t >= 1.0 {
            self.old_note = note;
            self.pending.pop_front();
            self.state.current_index += 1;
        }

        self.poll_offset_keys(on_offset);

        if self.stop_requested() {
            tracing::info!(
                reached = self.state.current_index,
                remaining = self.pending.len(),
                "playback stopped early"
            );
            return Some(PlaybackOutcome::AbortedByUser);
        }

        if self.pending.is_empty() {
            tracing::info!(
                offset_ms = self.state.relative_offset_ms(),
                "playback finished"
            );
            return Some(PlaybackOutcome::Completed);
        }

        None
    }

    /// Progress from the last reached note towards `note`, clamped to `[0, 1]`.
    /// Notes that share a timestamp are reached immediately.
    fn progress_towards(&self, note: &TimelinePoint) -> f64 {
        let elapsed = self.engine.clock.elapsed_since(self.state.start_wall_time);
        let from = self.seconds_after_start(self.old_note.timestamp_ms);
        let to = self.seconds_after_start(note.timestamp_ms);
        let span = to - from;
        if span == 0.0 {
            return 1.0;
        }
        ((elapsed - from) / span).clamp(0.0, 1.0)
    }

    fn seconds_after_start(&self, timestamp_ms: i64) -> f64 {
        (timestamp_ms - self.state.offset_ms) as f64 / 1000.0
    }

    fn poll_offset_keys(&mut self, on_offset: &mut dyn FnMut(i64)) {
        let hotkeys = &self.engine.hotkeys;
        let input = &self.engine.input;

        let up = fresh_press(&mut self.state.offset_up_held, input.is_pressed(hotkeys.offset_up));
        let down = fresh_press(
            &mut self.state.offset_down_held,
            input.is_pressed(hotkeys.offset_down),
        );
        if !up && !down {
            return;
        }

        let step = if input.is_pressed(hotkeys.coarse_modifier) {
            COARSE_OFFSET_STEP_MS
        } else {
            FINE_OFFSET_STEP_MS
        };
        for (fresh, sign) in [(up, 1), (down, -1)] {
            if fresh {
                self.state.offset_ms += sign * step;
                let relative = self.state.relative_offset_ms();
                tracing::debug!(offset_ms = relative, "offset adjusted");
                on_offset(relative);
            }
        }
    }

    fn stop_requested(&self) -> bool {
        let input = &self.engine.input;
        self.engine
            .hotkeys
            .stop
            .iter()
            .any(|&key: &KeyCode| input.is_pressed(key))
    }
}

/// Edge detection for a polled key: true only on the first poll after the
/// key went down.
fn fresh_press(held: &mut bool, pressed: bool) -> bool {
    let fresh = pressed && !*held;
    *held = pressed;
    fresh
}

#[cfg(test)]
mod tests {
    use std::{
        cell::{Cell, RefCell},
        collections::HashSet,
        rc::Rc,
    };

    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::Easing;

    const K: f64 = DEFAULT_SCALE;

    #[derive(Clone, Default)]
    struct ManualClock {
        now: Rc<Cell<f64>>,
        /// Added to the clock after every elapsed-time read.
        step: f64,
    }

    impl ManualClock {
        fn set(&self, seconds: f64) {
            self.now.set(seconds);
        }
    }

    impl Clock for ManualClock {
        type Instant = f64;

        fn now(&self) -> f64 {
            self.now.get()
        }

        fn elapsed_since(&self, instant: f64) -> f64 {
            let now = self.now.get();
            self.now.set(now + self.step);
            now - instant
        }
    }

    #[derive(Clone, Default)]
    struct RecordingPointer {
        position: (f64, f64),
        moves: Rc<RefCell<Vec<(f64, f64)>>>,
    }

    impl RecordingPointer {
        fn last(&self) -> (f64, f64) {
            *self.moves.borrow().last().expect("pointer never moved")
        }
    }

    impl PointerSink for RecordingPointer {
        fn move_to(&mut self, x: f64, y: f64) {
            self.moves.borrow_mut().push((x, y));
        }

        fn current_position(&self) -> (f64, f64) {
            self.position
        }
    }

    #[derive(Clone, Default)]
    struct ScriptedInput {
        pressed: Rc<RefCell<HashSet<KeyCode>>>,
        waited_for: Rc<RefCell<Vec<KeyCode>>>,
    }

    impl ScriptedInput {
        fn press(&self, key: KeyCode) {
            self.pressed.borrow_mut().insert(key);
        }

        fn release(&self, key: KeyCode) {
            self.pressed.borrow_mut().remove(&key);
        }
    }

    impl InputQuery for ScriptedInput {
        fn is_pressed(&self, key: KeyCode) -> bool {
            self.pressed.borrow().contains(&key)
        }

        fn wait_for(&mut self, key: KeyCode) {
            self.waited_for.borrow_mut().push(key);
        }
    }

    struct Harness {
        clock: ManualClock,
        pointer: RecordingPointer,
        input: ScriptedInput,
        engine: PlaybackEngine<ManualClock, RecordingPointer, ScriptedInput>,
    }

    fn harness(easing: Easing) -> Harness {
        let clock = ManualClock::default();
        let pointer = RecordingPointer::default();
        let input = ScriptedInput::default();
        let engine = PlaybackEngine::new(
            clock.clone(),
            pointer.clone(),
            input.clone(),
            EasingCurve::unit(easing),
        );
        Harness {
            clock,
            pointer,
            input,
            engine,
        }
    }

    fn point(x: f64, y: f64, timestamp_ms: i64) -> TimelinePoint {
        TimelinePoint { x, y, timestamp_ms }
    }

    fn assert_position(actual: (f64, f64), expected: (f64, f64)) {
        assert_abs_diff_eq!(actual.0, expected.0, epsilon = 1e-9);
        assert_abs_diff_eq!(actual.1, expected.1, epsilon = 1e-9);
    }

    fn ignore_offset(_: i64) {}

    #[test]
    fn empty_timeline_is_rejected_before_waiting() {
        let mut h = harness(Easing::Linear);
        let outcome = h.engine.run(Vec::new(), ignore_offset);

        assert_eq!(outcome, PlaybackOutcome::InvalidInput(EMPTY_TIMELINE));
        assert!(h.input.waited_for.borrow().is_empty());
        assert!(h.pointer.moves.borrow().is_empty());
    }

    #[test]
    fn interpolates_linearly_between_two_notes() {
        let mut h = harness(Easing::Linear);
        let mut session = h
            .engine
            .start(vec![point(0.0, 0.0, 0), point(1.0, 1.0, 100)])
            .unwrap();

        assert_eq!(*h.input.waited_for.borrow(), vec![Hotkeys::default().start]);
        assert_position(h.pointer.last(), (K, K));

        h.clock.set(0.0);
        assert_eq!(session.tick(&mut ignore_offset), None);
        assert_position(h.pointer.last(), (K, K));

        h.clock.set(0.05);
        assert_eq!(session.tick(&mut ignore_offset), None);
        assert_position(h.pointer.last(), (0.5 * K, 0.5 * K));

        h.clock.set(0.1);
        assert_eq!(session.tick(&mut ignore_offset), Some(PlaybackOutcome::Completed));
        assert_position(h.pointer.last(), (0.0, 0.0));
        assert_eq!(session.state().current_index, 1);
    }

    #[test]
    fn moves_are_relative_to_the_anchor() {
        let mut h = harness(Easing::Linear);
        h.pointer.position = (640.0, 360.0);
        let mut engine = PlaybackEngine::new(
            h.clock.clone(),
            h.pointer.clone(),
            h.input.clone(),
            EasingCurve::default(),
        )
        .with_scale(100.0);

        let session = engine.start(vec![point(0.5, 1.5, 40)]).unwrap();

        assert_eq!(session.state().offset_ms, 40);
        assert_eq!(session.state().relative_offset_ms(), 0);
        assert_position(h.pointer.last(), (690.0, 310.0));
    }

    #[test]
    fn eased_progress_shapes_the_path() {
        let mut h = harness(Easing::QuadEaseIn);
        let mut session = h
            .engine
            .start(vec![point(0.0, 0.0, 0), point(1.0, 0.0, 100)])
            .unwrap();

        h.clock.set(0.05);
        session.tick(&mut ignore_offset);
        assert_position(h.pointer.last(), (0.75 * K, K));
    }

    #[test]
    fn shared_timestamps_snap_to_the_next_note() {
        let mut h = harness(Easing::Linear);
        let mut session = h
            .engine
            .start(vec![point(0.0, 0.0, 500), point(2.0, 2.0, 500)])
            .unwrap();

        h.clock.set(0.0);
        assert_eq!(session.tick(&mut ignore_offset), Some(PlaybackOutcome::Completed));
        assert_eq!(session.state().last_t, 1.0);
        assert_position(h.pointer.last(), (-K, -K));
    }

    #[test]
    fn slow_ticks_clamp_progress() {
        let mut h = harness(Easing::Linear);
        let mut session = h
            .engine
            .start(vec![
                point(0.0, 0.0, 0),
                point(1.0, 1.0, 100),
                point(0.0, 0.0, 200),
            ])
            .unwrap();

        h.clock.set(0.5);
        assert_eq!(session.tick(&mut ignore_offset), None);
        assert_eq!(session.state().last_t, 1.0);
        assert_eq!(session.remaining(), 1);
        assert_position(h.pointer.last(), (0.0, 0.0));

        assert_eq!(session.tick(&mut ignore_offset), Some(PlaybackOutcome::Completed));
        assert_position(h.pointer.last(), (K, K));
    }

    #[test]
    fn progress_is_clamped_before_the_previous_note() {
        let mut h = harness(Easing::Linear);
        let mut session = h
            .engine
            .start(vec![point(0.0, 0.0, 1_000), point(1.0, 1.0, 2_000)])
            .unwrap();

        h.clock.set(-0.5);
        session.tick(&mut ignore_offset);
        assert_eq!(session.state().last_t, 0.0);
        assert_position(h.pointer.last(), (K, K));
    }

    #[test]
    fn held_offset_key_counts_once() {
        let mut h = harness(Easing::Linear);
        let hotkeys = Hotkeys::default();
        let mut reported = Vec::new();
        let mut record = |offset: i64| reported.push(offset);
        let mut session = h
            .engine
            .start(vec![point(0.0, 0.0, 0), point(1.0, 1.0, 10_000)])
            .unwrap();

        h.input.press(hotkeys.offset_up);
        for _ in 0..5 {
            assert_eq!(session.tick(&mut record), None);
        }
        assert_eq!(session.state().relative_offset_ms(), 1);

        h.input.release(hotkeys.offset_up);
        session.tick(&mut record);
        h.input.press(hotkeys.coarse_modifier);
        h.input.press(hotkeys.offset_up);
        for _ in 0..5 {
            session.tick(&mut record);
        }
        assert_eq!(session.state().relative_offset_ms(), 11);

        h.input.release(hotkeys.offset_up);
        h.input.release(hotkeys.coarse_modifier);
        h.input.press(hotkeys.offset_down);
        for _ in 0..5 {
            session.tick(&mut record);
        }
        assert_eq!(session.state().relative_offset_ms(), 10);
        assert_eq!(session.state().offset_ms, 10);

        assert_eq!(reported, vec![1, 11, 10]);
    }

    #[test]
    fn offset_shifts_the_schedule() {
        let mut h = harness(Easing::Linear);
        let hotkeys = Hotkeys::default();
        let mut session = h
            .engine
            .start(vec![point(0.0, 0.0, 0), point(1.0, 1.0, 100)])
            .unwrap();

        h.input.press(hotkeys.coarse_modifier);
        h.input.press(hotkeys.offset_up);
        session.tick(&mut ignore_offset);
        assert_eq!(session.state().relative_offset_ms(), 10);

        h.clock.set(0.045);
        session.tick(&mut ignore_offset);
        assert_abs_diff_eq!(session.state().last_t, 0.55, epsilon = 1e-9);
        assert_position(h.pointer.last(), (0.45 * K, 0.45 * K));
    }

    #[test]
    fn either_stop_key_aborts() {
        for stop in Hotkeys::default().stop {
            let mut h = harness(Easing::Linear);
            h.input.press(stop);

            let outcome = h.engine.run(
                vec![point(0.0, 0.0, 0), point(1.0, 1.0, 100), point(0.0, 0.0, 200)],
                ignore_offset,
            );

            assert_eq!(outcome, PlaybackOutcome::AbortedByUser);
            assert_eq!(h.pointer.moves.borrow().len(), 2);
        }
    }

    #[test]
    fn runs_to_completion_as_time_passes() {
        let clock = ManualClock {
            step: 0.001,
            ..ManualClock::default()
        };
        let pointer = RecordingPointer::default();
        let mut engine = PlaybackEngine::new(
            clock,
            pointer.clone(),
            ScriptedInput::default(),
            EasingCurve::unit(Easing::SineEaseInOut),
        );

        let outcome = engine.run(
            vec![point(0.0, 0.0, 0), point(1.0, 1.0, 20), point(0.5, 0.5, 40)],
            ignore_offset,
        );

        assert_eq!(outcome, PlaybackOutcome::Completed);
        let moves = pointer.moves.borrow();
        assert!(moves.len() > 30);
        assert_position(*moves.last().unwrap(), (0.5 * K, 0.5 * K));
    }

    #[test]
    fn single_note_timeline_completes_on_first_tick() {
        let mut h = harness(Easing::Linear);
        let outcome = h.engine.run(vec![point(1.0, 1.0, 0)], ignore_offset);
        assert_eq!(outcome, PlaybackOutcome::Completed);
        assert_eq!(*h.pointer.moves.borrow(), vec![(0.0, 0.0)]);
    }
}
