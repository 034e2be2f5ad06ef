//! Input subsystem - three push buttons and a rotary encoder.
//!
//! ## Layers
//!
//! - **Encoder**: quadrature decode into a shared signed position
//! - **Debouncer**: per-button press rate limit and hold detection
//! - **Sampler**: turns raw levels + encoder position into [`InputEvent`]s
//! - **SampledInput**: an [`InputSource`] over any [`Panel`]
//!
//! Dialogs and the menu only ever see [`InputEvent`]s, so they are driven
//! by scripted sources in tests.

pub mod debounce;
pub mod encoder;

use heapless::{Deque, Vec};

use crate::config::{BUTTON_DEBOUNCE_MS, INPUT_POLL_MS, SELECT_HOLD_MS};
use debounce::Debouncer;

/// Physical push buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Left,
    Right,
    Select,
}

impl Button {
    pub(crate) const fn index(self) -> usize {
        match self {
            Button::Left => 0,
            Button::Right => 1,
            Button::Select => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

/// User input after debouncing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputEvent {
    Press(Button),
    /// Select held past [`SELECT_HOLD_MS`].
    Hold(Button),
    Release(Button),
    Turn(Direction),
}

/// Button levels with `true` meaning pressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawLevels {
    pub left: bool,
    pub right: bool,
    pub select: bool,
}

/// Where dialogs and the menu get their events from.
pub trait InputSource {
    /// Next pending event, if any, without waiting.
    fn poll_event(&mut self) -> Option<InputEvent>;

    /// Called between unsuccessful polls.
    fn idle(&mut self);

    /// Block until an event arrives.
    fn wait_event(&mut self) -> InputEvent {
        loop {
            if let Some(event) = self.poll_event() {
                return event;
            }
            self.idle();
        }
    }
}

/// Converts successive raw samples into events.
pub struct Sampler {
    debouncer: Debouncer,
    last_position: i32,
    select_down: bool,
}

impl Sampler {
    pub const fn new(initial_position: i32) -> Self {
        Self {
            debouncer: Debouncer::new(BUTTON_DEBOUNCE_MS),
            last_position: initial_position,
            select_down: false,
        }
    }

    /// Events produced by one sample, in the order they should be handled.
    pub fn sample(&mut self, now_ms: u64, levels: RawLevels, position: i32) -> Vec<InputEvent, 4> {
        let mut events = Vec::new();

        let delta = position.wrapping_sub(self.last_position);
        self.last_position = position;
        if delta != 0 {
            let direction = if delta > 0 {
                Direction::Clockwise
            } else {
                Direction::CounterClockwise
            };
            let _ = events.push(InputEvent::Turn(direction));
        }

        if self.debouncer.poll_pressed(Button::Left, now_ms, levels.left) {
            let _ = events.push(InputEvent::Press(Button::Left));
        }
        if self.debouncer.poll_pressed(Button::Right, now_ms, levels.right) {
            let _ = events.push(InputEvent::Press(Button::Right));
        }

        if self.select_down {
            if !levels.select {
                self.select_down = false;
                self.debouncer
                    .poll_held(Button::Select, now_ms, false, SELECT_HOLD_MS);
                let _ = events.push(InputEvent::Release(Button::Select));
            } else if self
                .debouncer
                .poll_held(Button::Select, now_ms, true, SELECT_HOLD_MS)
            {
                let _ = events.push(InputEvent::Hold(Button::Select));
            }
        } else if self.debouncer.poll_pressed(Button::Select, now_ms, levels.select) {
            self.select_down = true;
            // Starts the hold timer.
            self.debouncer
                .poll_held(Button::Select, now_ms, true, SELECT_HOLD_MS);
            let _ = events.push(InputEvent::Press(Button::Select));
        }

        events
    }
}

/// Hardware access needed to sample the controls.
pub trait Panel {
    /// Monotonic milliseconds.
    fn now_ms(&self) -> u64;

    /// Current button levels, `true` = pressed.
    fn levels(&mut self) -> RawLevels;

    /// Current encoder position.
    fn position(&self) -> i32;

    /// Sleep for `ms` milliseconds.
    fn pause(&mut self, ms: u64);
}

/// [`InputSource`] that samples a [`Panel`] on demand.
pub struct SampledInput<P> {
    panel: P,
    sampler: Sampler,
    pending: Deque<InputEvent, 8>,
}

impl<P: Panel> SampledInput<P> {
    pub fn new(panel: P) -> Self {
        let position = panel.position();
        Self {
            panel,
            sampler: Sampler::new(position),
            pending: Deque::new(),
        }
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }
}

impl<P: Panel> InputSource for SampledInput<P> {
    fn poll_event(&mut self) -> Option<InputEvent> {
        if self.pending.is_empty() {
            let now = self.panel.now_ms();
            let levels = self.panel.levels();
            let position = self.panel.position();
            for event in self.sampler.sample(now, levels, position) {
                trace!("input: {:?}", event);
                if self.pending.push_back(event).is_err() {
                    warn!("input: event queue full, dropping {:?}", event);
                }
            }
        }
        self.pending.pop_front()
    }

    fn idle(&mut self) {
        self.panel.pause(INPUT_POLL_MS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: RawLevels = RawLevels {
        left: false,
        right: false,
        select: false,
    };
    const SELECT: RawLevels = RawLevels {
        left: false,
        right: false,
        select: true,
    };

    #[test]
    fn turn_reports_direction_of_delta() {
        let mut s = Sampler::new(0);
        assert_eq!(
            s.sample(0, IDLE, 3).as_slice(),
            &[InputEvent::Turn(Direction::Clockwise)]
        );
        assert_eq!(
            s.sample(5, IDLE, 1).as_slice(),
            &[InputEvent::Turn(Direction::CounterClockwise)]
        );
        assert!(s.sample(10, IDLE, 1).is_empty());
    }

    #[test]
    fn held_left_repeats_at_debounce_rate() {
        let mut s = Sampler::new(0);
        let left = RawLevels {
            left: true,
            ..IDLE
        };
        let presses = (0..400)
            .step_by(5)
            .filter(|&t| !s.sample(t, left, 0).is_empty())
            .count();
        assert_eq!(presses, 2);
    }

    #[test]
    fn short_select_is_press_then_release() {
        let mut s = Sampler::new(0);
        assert_eq!(
            s.sample(0, SELECT, 0).as_slice(),
            &[InputEvent::Press(Button::Select)]
        );
        assert!(s.sample(300, SELECT, 0).is_empty());
        assert_eq!(
            s.sample(400, IDLE, 0).as_slice(),
            &[InputEvent::Release(Button::Select)]
        );
    }

    #[test]
    fn long_select_reports_hold_once() {
        let mut s = Sampler::new(0);
        s.sample(0, SELECT, 0);
        assert!(s.sample(999, SELECT, 0).is_empty());
        assert_eq!(
            s.sample(1_000, SELECT, 0).as_slice(),
            &[InputEvent::Hold(Button::Select)]
        );
        assert!(s.sample(1_500, SELECT, 0).is_empty());
        assert_eq!(
            s.sample(1_600, IDLE, 0).as_slice(),
            &[InputEvent::Release(Button::Select)]
        );
    }

    #[test]
    fn select_bounce_after_release_is_ignored() {
        let mut s = Sampler::new(0);
        s.sample(0, SELECT, 0);
        s.sample(50, IDLE, 0);
        assert!(s.sample(60, SELECT, 0).is_empty());
        assert_eq!(
            s.sample(250, SELECT, 0).as_slice(),
            &[InputEvent::Press(Button::Select)]
        );
    }

    struct FakePanel {
        now: u64,
        script: std::vec::Vec<(RawLevels, i32)>,
        step: usize,
    }

    impl Panel for FakePanel {
        fn now_ms(&self) -> u64 {
            self.now
        }

        fn levels(&mut self) -> RawLevels {
            self.script.get(self.step).map_or(IDLE, |s| s.0)
        }

        fn position(&self) -> i32 {
            self.script
                .get(self.step)
                .or(self.script.last())
                .map_or(0, |s| s.1)
        }

        fn pause(&mut self, ms: u64) {
            self.now += ms;
            self.step += 1;
        }
    }

    #[test]
    fn sampled_input_waits_for_next_event() {
        let panel = FakePanel {
            now: 0,
            script: vec![(IDLE, 0), (IDLE, 0), (IDLE, -1), (SELECT, -1)],
            step: 0,
        };
        let mut input = SampledInput::new(panel);
        assert_eq!(
            input.wait_event(),
            InputEvent::Turn(Direction::CounterClockwise)
        );
        assert_eq!(input.wait_event(), InputEvent::Press(Button::Select));
        assert_eq!(input.panel().now, 15);
    }
}
