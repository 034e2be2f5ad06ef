//! Heartbeat controller.
//!
//! A counter that advances modulo 10 at 1-4 Hz. The timer task lives on the
//! firmware side; it asks [`Heartbeat::schedule`] for the period, calls
//! [`Heartbeat::tick`] on every expiry and restarts when
//! [`Heartbeat::changed`] fires.
//!
//! Every schedule carries a generation number. `reconfigure` bumps it
//! together with the frequency under one critical section, and `tick`
//! discards anything stamped with an older generation, so a timer still
//! running the previous period cannot advance the counter once
//! `reconfigure` has returned.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use serde::Serialize;

use crate::config::{MAX_HEARTBEAT_HZ, MIN_HEARTBEAT_HZ};
use crate::error::{HeartbeatError, PublishError};
use crate::net::publish::Gatekeeper;
use crate::net::Network;

/// Ticks wrap at this value.
const TICK_MODULUS: u8 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeartbeatState {
    pub tick: u8,
    pub frequency_hz: u8,
    pub generation: u32,
}

/// The currently active timer configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Schedule {
    pub generation: u32,
    pub frequency_hz: u8,
}

impl Schedule {
    /// Timer period in milliseconds.
    pub fn period_ms(&self) -> u64 {
        1_000 / u64::from(self.frequency_hz.max(1))
    }
}

/// Snapshot published on `config`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ConfigSnapshot<'a> {
    pub client_id: &'a str,
    pub username: &'a str,
    pub server: &'a str,
    pub hz: u8,
}

pub struct Heartbeat {
    state: Mutex<CriticalSectionRawMutex, Cell<HeartbeatState>>,
    changed: Signal<CriticalSectionRawMutex, Schedule>,
}

impl Heartbeat {
    /// `frequency_hz` is clamped into the supported range.
    pub const fn new(frequency_hz: u8) -> Self {
        let frequency_hz = if frequency_hz < MIN_HEARTBEAT_HZ {
            MIN_HEARTBEAT_HZ
        } else if frequency_hz > MAX_HEARTBEAT_HZ {
            MAX_HEARTBEAT_HZ
        } else {
            frequency_hz
        };
        Self {
            state: Mutex::new(Cell::new(HeartbeatState {
                tick: 0,
                frequency_hz,
                generation: 0,
            })),
            changed: Signal::new(),
        }
    }

    pub fn state(&self) -> HeartbeatState {
        self.state.lock(Cell::get)
    }

    pub fn schedule(&self) -> Schedule {
        let state = self.state();
        Schedule {
            generation: state.generation,
            frequency_hz: state.frequency_hz,
        }
    }

    pub fn frequency_hz(&self) -> u8 {
        self.state().frequency_hz
    }

    /// Advance the counter for a timer expiry of `generation`.
    ///
    /// Returns `false` and leaves the counter alone when the tick belongs
    /// to a replaced schedule.
    pub fn tick(&self, generation: u32) -> bool {
        self.state.lock(|cell| {
            let mut state = cell.get();
            if state.generation != generation {
                return false;
            }
            state.tick = (state.tick + 1) % TICK_MODULUS;
            cell.set(state);
            true
        })
    }

    /// Switch to `frequency_hz` and restart the timer.
    pub fn reconfigure(&self, frequency_hz: u8) -> Result<Schedule, HeartbeatError> {
        if !(MIN_HEARTBEAT_HZ..=MAX_HEARTBEAT_HZ).contains(&frequency_hz) {
            return Err(HeartbeatError::FrequencyOutOfRange(frequency_hz));
        }
        let schedule = self.state.lock(|cell| {
            let mut state = cell.get();
            state.frequency_hz = frequency_hz;
            state.generation = state.generation.wrapping_add(1);
            cell.set(state);
            Schedule {
                generation: state.generation,
                frequency_hz,
            }
        });
        self.changed.signal(schedule);
        info!("heartbeat: {} Hz (generation {})", frequency_hz, schedule.generation);
        Ok(schedule)
    }

    /// Fires with the new schedule after every `reconfigure`.
    pub fn changed(&self) -> &Signal<CriticalSectionRawMutex, Schedule> {
        &self.changed
    }

    /// Publish the configuration snapshot on `config`.
    pub fn publish_config<N: Network>(
        &self,
        gatekeeper: &mut Gatekeeper<N>,
        snapshot: &ConfigSnapshot<'_>,
    ) -> Result<(), PublishError> {
        gatekeeper.publish_json("config", snapshot)
    }
}
