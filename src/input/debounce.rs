//! Time-based press filtering for the three push buttons.
//!
//! Pure logic: callers pass the current time and the raw (already
//! inverted, `true` = pressed) level, so everything here runs on the host.

use super::Button;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct ButtonSample {
    last_accepted_at: Option<u64>,
    held_since: Option<u64>,
    hold_reported: bool,
}

/// Per-button debounce and hold tracking.
#[derive(Clone, Debug)]
pub struct Debouncer {
    interval_ms: u64,
    samples: [ButtonSample; 3],
}

impl Debouncer {
    pub const fn new(interval_ms: u64) -> Self {
        const IDLE: ButtonSample = ButtonSample {
            last_accepted_at: None,
            held_since: None,
            hold_reported: false,
        };
        Self {
            interval_ms,
            samples: [IDLE; 3],
        }
    }

    /// True at most once per debounce interval while `raw` is asserted.
    pub fn poll_pressed(&mut self, button: Button, now_ms: u64, raw: bool) -> bool {
        if !raw {
            return false;
        }
        let sample = &mut self.samples[button.index()];
        let due = match sample.last_accepted_at {
            None => true,
            Some(at) => now_ms.saturating_sub(at) >= self.interval_ms,
        };
        if due {
            sample.last_accepted_at = Some(now_ms);
        }
        due
    }

    /// True once when `raw` has been asserted continuously for `threshold_ms`.
    ///
    /// Releasing the button re-arms the detector.
    pub fn poll_held(&mut self, button: Button, now_ms: u64, raw: bool, threshold_ms: u64) -> bool {
        let sample = &mut self.samples[button.index()];
        if !raw {
            sample.held_since = None;
            sample.hold_reported = false;
            return false;
        }
        let since = *sample.held_since.get_or_insert(now_ms);
        if !sample.hold_reported && now_ms.saturating_sub(since) >= threshold_ms {
            sample.hold_reported = true;
            return true;
        }
        false
    }
}
