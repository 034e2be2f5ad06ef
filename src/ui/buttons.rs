//! GPIO buttons and rotary encoder.
//!
//! Three push buttons (active-low with internal pull-up):
//!   - LEFT   - previous item
//!   - RIGHT  - next item
//!   - SELECT - confirm; hold to finish text entry
//!
//! The encoder lines are watched by an async task on the high-priority
//! executor; buttons are sampled on demand by the blocking main flow.

use defmt::trace;
use embassy_futures::select::select;
use embassy_nrf::gpio::Input;
use embassy_time::{block_for, Duration, Instant};
use mothership::input::{Panel, RawLevels};
use mothership::Encoder;

/// Button pins plus the shared encoder position.
pub struct Controls {
    left: Input<'static>,
    right: Input<'static>,
    select: Input<'static>,
    encoder: &'static Encoder,
}

impl Controls {
    pub fn new(
        left: Input<'static>,
        right: Input<'static>,
        select: Input<'static>,
        encoder: &'static Encoder,
    ) -> Self {
        Self {
            left,
            right,
            select,
            encoder,
        }
    }
}

impl Panel for Controls {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }

    fn levels(&mut self) -> RawLevels {
        RawLevels {
            left: self.left.is_low(),
            right: self.right.is_low(),
            select: self.select.is_low(),
        }
    }

    fn position(&self) -> i32 {
        self.encoder.position()
    }

    fn pause(&mut self, ms: u64) {
        block_for(Duration::from_millis(ms));
    }
}

/// Decode every edge on either encoder line.
#[embassy_executor::task]
pub async fn encoder_task(
    mut clk: Input<'static>,
    mut dt: Input<'static>,
    encoder: &'static Encoder,
) -> ! {
    encoder.seed(clk.is_high());
    loop {
        select(clk.wait_for_any_edge(), dt.wait_for_any_edge()).await;
        encoder.on_transition(clk.is_high(), dt.is_high());
        trace!("Encoder: {}", encoder.position());
    }
}
