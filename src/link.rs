//! UART link to the Wi-Fi/MQTT co-processor.
//!
//! The co-processor owns the Wi-Fi association and the MQTT session and
//! speaks the line protocol in `mothership::net::frame`. Two tasks on the
//! high-priority executor move bytes:
//!
//! - `rx_task` reassembles lines, tracks `UP`/`DOWN` and queues `MSG`
//!   envelopes on [`INBOUND`]
//! - `tx_task` writes queued frames from [`OUTBOUND`]
//!
//! [`CoprocessorLink`] is the blocking [`Network`] used by the session loop.

use core::sync::atomic::{AtomicBool, Ordering};

use defmt::{debug, info, warn};
use embassy_nrf::peripherals::UARTE0;
use embassy_nrf::uarte::{UarteRx, UarteTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{block_for, Duration, Instant};
use heapless::Vec;
use mothership::config::{FRAME_LEN, LINK_CONNECT_TIMEOUT_MS};
use mothership::net::frame::{self, Frame, LineBuffer};
use mothership::{Envelope, LinkError, Network};

/// Queue depth for envelopes waiting for the session loop.
const INBOUND_DEPTH: usize = 4;

/// Queue depth for frames waiting for the UART.
const OUTBOUND_DEPTH: usize = 8;

/// Poll interval while waiting for `UP`.
const CONNECT_POLL_MS: u64 = 10;

type FrameBytes = Vec<u8, FRAME_LEN>;

/// Envelopes received from the broker.
pub static INBOUND: Channel<CriticalSectionRawMutex, Envelope, INBOUND_DEPTH> = Channel::new();

/// Encoded frames waiting to be written.
pub static OUTBOUND: Channel<CriticalSectionRawMutex, FrameBytes, OUTBOUND_DEPTH> =
    Channel::new();

/// Broker session state as last reported by the co-processor.
static LINK_UP: AtomicBool = AtomicBool::new(false);

#[embassy_executor::task]
pub async fn rx_task(mut rx: UarteRx<'static, UARTE0>) -> ! {
    let mut lines = LineBuffer::<FRAME_LEN>::new();
    let mut byte = [0u8; 1];
    loop {
        if let Err(e) = rx.read(&mut byte).await {
            warn!("Link: UART read error {:?}", e);
            continue;
        }
        let Some(line) = lines.feed(byte[0]) else {
            continue;
        };
        match frame::decode(&line) {
            Some(Frame::Msg { topic, payload }) => match Envelope::new(topic, payload) {
                Some(envelope) => {
                    if INBOUND.try_send(envelope).is_err() {
                        warn!("Link: inbound queue full, dropping {}", topic);
                    }
                }
                None => warn!("Link: oversized envelope on {}", topic),
            },
            Some(Frame::Up) => {
                info!("Link: broker up");
                LINK_UP.store(true, Ordering::Release);
            }
            Some(Frame::Down) => {
                warn!("Link: broker down");
                LINK_UP.store(false, Ordering::Release);
            }
            Some(Frame::Sub { .. } | Frame::Pub { .. }) | None => {
                debug!("Link: ignoring line of {} bytes", line.len());
            }
        }
    }
}

#[embassy_executor::task]
pub async fn tx_task(mut tx: UarteTx<'static, UARTE0>) -> ! {
    loop {
        let frame = OUTBOUND.receive().await;
        if let Err(e) = tx.write(&frame).await {
            warn!("Link: UART write error {:?}", e);
        }
    }
}

/// Blocking [`Network`] over the link queues.
pub struct CoprocessorLink {
    _private: (),
}

impl CoprocessorLink {
    pub const fn new() -> Self {
        Self { _private: () }
    }

    fn is_up(&self) -> bool {
        LINK_UP.load(Ordering::Acquire)
    }

    fn send(&mut self, frame: &Frame<'_>) -> Result<(), LinkError> {
        if !self.is_up() {
            return Err(LinkError::Disconnected);
        }
        let mut buf = [0u8; FRAME_LEN];
        let Some(len) = frame::encode(frame, &mut buf) else {
            warn!("Link: frame does not fit, dropping");
            return Ok(());
        };
        let bytes = Vec::from_slice(&buf[..len]).map_err(|_| LinkError::Busy)?;
        OUTBOUND.try_send(bytes).map_err(|_| LinkError::Busy)
    }
}

impl Network for CoprocessorLink {
    fn connect(&mut self) -> Result<(), LinkError> {
        // Envelopes from a previous session are stale.
        while INBOUND.try_receive().is_ok() {}

        let deadline = Instant::now() + Duration::from_millis(LINK_CONNECT_TIMEOUT_MS);
        while !self.is_up() {
            if Instant::now() >= deadline {
                return Err(LinkError::Disconnected);
            }
            block_for(Duration::from_millis(CONNECT_POLL_MS));
        }
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), LinkError> {
        self.send(&Frame::Sub { topic })
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), LinkError> {
        self.send(&Frame::Pub { topic, payload })
    }

    fn poll_incoming(&mut self) -> Result<Option<Envelope>, LinkError> {
        if !self.is_up() {
            return Err(LinkError::Disconnected);
        }
        Ok(INBOUND.try_receive().ok())
    }
}
