//! Mothership firmware entry point.
//!
//! Peripheral-facing tasks (encoder edges, heartbeat timer, UART link) run
//! on an interrupt-driven executor at priority 6. The dialogs, menu and
//! router run on the blocking thread-mode flow below it and poll input
//! with `embassy_time::block_for`, so they keep their simple sequential
//! shape while the tasks stay responsive.

#![no_std]
#![no_main]

mod link;
mod storage;
#[path = "ui/buttons.rs"]
mod buttons;
#[path = "ui/display.rs"]
mod display;

use cortex_m_rt::entry;
use defmt::{error, info, unwrap};
use embassy_executor::InterruptExecutor;
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::{Input, Pull};
use embassy_nrf::interrupt;
use embassy_nrf::interrupt::{InterruptExt, Priority};
use embassy_nrf::uarte::{self, Uarte};
use embassy_nrf::{bind_interrupts, pac, peripherals, twim};
use embassy_time::{Duration, Ticker};
use heapless::Vec;
use mothership::config::{DEFAULT_HEARTBEAT_HZ, MAX_CANNED_MESSAGES, MAX_CONTACTS};
use mothership::{
    setup, Context, DeviceConfig, Encoder, Heartbeat, Identity, Name, SampledInput, Terminal,
    Text,
};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::buttons::Controls;
use crate::display::Oled;
use crate::link::CoprocessorLink;

bind_interrupts!(struct Irqs {
    TWISPI0 => twim::InterruptHandler<peripherals::TWISPI0>;
    UARTE0 => uarte::InterruptHandler<peripherals::UARTE0>;
});

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();
static ENCODER: Encoder = Encoder::new();
static HEARTBEAT: Heartbeat = Heartbeat::new(DEFAULT_HEARTBEAT_HZ);
static CONFIG: StaticCell<DeviceConfig> = StaticCell::new();
static IDENTITY: StaticCell<Identity> = StaticCell::new();
static CONTACTS: StaticCell<Vec<Name, MAX_CONTACTS>> = StaticCell::new();
static CANNED_MESSAGES: StaticCell<Vec<Text, MAX_CANNED_MESSAGES>> = StaticCell::new();

#[interrupt]
unsafe fn EGU1_SWI1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// Advance the heartbeat, restarting the ticker on every reconfiguration.
#[embassy_executor::task]
async fn heartbeat_task(heartbeat: &'static Heartbeat) -> ! {
    let mut schedule = heartbeat.schedule();
    loop {
        info!("Heartbeat: every {} ms", schedule.period_ms());
        let mut ticker = Ticker::every(Duration::from_millis(schedule.period_ms()));
        loop {
            match select(ticker.next(), heartbeat.changed().wait()).await {
                Either::First(()) => {
                    heartbeat.tick(schedule.generation);
                }
                Either::Second(next) => {
                    schedule = next;
                    break;
                }
            }
        }
    }
}

/// The 64-bit factory-programmed device id.
fn device_id() -> [u8; 8] {
    let mut id = [0u8; 8];
    id[..4].copy_from_slice(&pac::FICR.deviceid(0).read().to_be_bytes());
    id[4..].copy_from_slice(&pac::FICR.deviceid(1).read().to_be_bytes());
    id
}

#[entry]
fn main() -> ! {
    let p = embassy_nrf::init(Default::default());
    info!("mothership starting");

    interrupt::EGU1_SWI1.set_priority(Priority::P6);
    let spawner = EXECUTOR_HIGH.start(interrupt::EGU1_SWI1);

    let mut oled = Oled::new(twim::Twim::new(
        p.TWISPI0,
        Irqs,
        p.P0_26,
        p.P0_27,
        twim::Config::default(),
    ));

    let clk = Input::new(p.P0_03, Pull::Up);
    let dt = Input::new(p.P0_04, Pull::Up);
    unwrap!(spawner.spawn(buttons::encoder_task(clk, dt, &ENCODER)));

    let controls = Controls::new(
        Input::new(p.P0_11, Pull::Up),
        Input::new(p.P0_12, Pull::Up),
        Input::new(p.P0_24, Pull::Up),
        &ENCODER,
    );
    let mut input = SampledInput::new(controls);

    let mut flash = storage::flash(p.NVMC);
    let mut config = storage::load_config(&mut flash);
    if setup::edit_config(&mut config, &mut oled, &mut input) {
        if let Err(e) = storage::save_config(&mut flash, &config) {
            error!("Config not saved: {}", e);
        }
    }
    let contacts: &'static Vec<Name, MAX_CONTACTS> =
        CONTACTS.init(storage::load_list(&mut flash, storage::KEY_CONTACTS));
    let canned_messages: &'static Vec<Text, MAX_CANNED_MESSAGES> =
        CANNED_MESSAGES.init(storage::load_list(&mut flash, storage::KEY_CANNED_MESSAGES));
    let config: &'static DeviceConfig = CONFIG.init(config);
    let identity: &'static Identity = IDENTITY.init(Identity::new(&device_id(), &config.username));
    info!("Client id {}", identity.client_id());

    let mut uart_config = uarte::Config::default();
    uart_config.baudrate = uarte::Baudrate::BAUD115200;
    let (tx, rx) = Uarte::new(p.UARTE0, Irqs, p.P0_08, p.P0_06, uart_config).split();
    unwrap!(spawner.spawn(link::rx_task(rx)));
    unwrap!(spawner.spawn(link::tx_task(tx)));
    unwrap!(spawner.spawn(heartbeat_task(&HEARTBEAT)));

    let ctx = Context {
        identity,
        config,
        heartbeat: &HEARTBEAT,
        contacts: contacts.as_slice(),
        canned_messages: canned_messages.as_slice(),
    };
    let mut terminal = Terminal::new(ctx, oled, input, CoprocessorLink::new());
    terminal.run()
}
