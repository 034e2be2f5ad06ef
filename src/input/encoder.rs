//! Quadrature decoding for the KY-040 style rotary encoder.
//!
//! [`Encoder::on_transition`] runs from the encoder edge task on the
//! high-priority executor while dialog code on the main flow reads
//! [`Encoder::position`]. Both go through a critical-section mutex, so a
//! decode step is never observed half-done.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct EncoderState {
    position: i32,
    last_clk: bool,
}

/// Shared encoder position.
pub struct Encoder {
    state: Mutex<CriticalSectionRawMutex, Cell<EncoderState>>,
}

impl Encoder {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(EncoderState {
                position: 0,
                last_clk: false,
            })),
        }
    }

    /// Record the CLK level present at boot so the first edge decodes
    /// against the real line state.
    pub fn seed(&self, clk: bool) {
        self.state.lock(|cell| {
            let mut state = cell.get();
            state.last_clk = clk;
            cell.set(state);
        });
    }

    /// Handle one edge on either encoder line.
    ///
    /// A CLK change counts one detent: clockwise when DT differs from CLK,
    /// counter-clockwise otherwise.
    pub fn on_transition(&self, clk: bool, dt: bool) {
        self.state.lock(|cell| {
            let mut state = cell.get();
            if clk != state.last_clk {
                state.position = if dt != clk {
                    state.position.wrapping_add(1)
                } else {
                    state.position.wrapping_sub(1)
                };
            }
            state.last_clk = clk;
            cell.set(state);
        });
    }

    pub fn position(&self) -> i32 {
        self.state.lock(|cell| cell.get().position)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}
