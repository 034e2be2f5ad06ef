//! Persistent storage for the device configuration, the contact list and
//! the canned messages.
//!
//! Uses the nRF52840's internal flash via `sequential-storage` crate.
//! The configuration is kept as its `key=value` text form under a single
//! map key, so a record written by an older firmware with fewer keys
//! still loads. The two lists are newline-separated text records,
//! provisioned alongside the firmware image.
//!
//! Storage is touched only at boot, from the blocking main flow, so the
//! async `sequential-storage` calls are driven with `block_on`.

use core::ops::Range;

use defmt::{error, info};
use embassy_embedded_hal::adapter::BlockingAsync;
use embassy_futures::block_on;
use embassy_nrf::nvmc::Nvmc;
use embassy_nrf::peripherals::NVMC;
use heapless::{String, Vec};
use mothership::config::{STORAGE_FLASH_PAGE_COUNT, STORAGE_FLASH_PAGE_START};
use mothership::text::parse_list;
use mothership::{DeviceConfig, Error};
use sequential_storage::cache::NoCache;
use sequential_storage::map::{fetch_item, store_item};

/// Flash page size for nRF52840 (4 KB).
const FLASH_PAGE_SIZE: u32 = 4096;

/// Start address of our storage region.
const STORAGE_START: u32 = STORAGE_FLASH_PAGE_START * FLASH_PAGE_SIZE;

/// End address (exclusive) of our storage region.
const STORAGE_END: u32 = (STORAGE_FLASH_PAGE_START + STORAGE_FLASH_PAGE_COUNT) * FLASH_PAGE_SIZE;

/// Key for the configuration record in the map storage.
const KEY_CONFIG: u8 = 0x01;

/// Newline-separated recipient names.
pub const KEY_CONTACTS: u8 = 0x02;

/// Newline-separated canned messages.
pub const KEY_CANNED_MESSAGES: u8 = 0x03;

/// Largest serialized configuration: five keys plus 32-byte values.
const MAX_RECORD_SIZE: usize = 256;

/// Scratch buffer for `sequential-storage`; holds one record plus its header.
const WORK_BUFFER_SIZE: usize = 512;

/// Scratch buffer for a list record: sixteen full-length lines.
const LIST_BUFFER_SIZE: usize = 1_280;

pub type Flash = BlockingAsync<Nvmc<'static>>;

const fn flash_range() -> Range<u32> {
    STORAGE_START..STORAGE_END
}

pub fn flash(nvmc: NVMC) -> Flash {
    BlockingAsync::new(Nvmc::new(nvmc))
}

/// Read the stored configuration, falling back to defaults.
pub fn load_config(flash: &mut Flash) -> DeviceConfig {
    let mut buf = [0u8; WORK_BUFFER_SIZE];
    let stored = block_on(fetch_item::<u8, &[u8], _>(
        flash,
        flash_range(),
        &mut NoCache::new(),
        &mut buf,
        &KEY_CONFIG,
    ));

    match stored {
        Ok(Some(data)) => {
            info!("Storage: loaded {} byte config", data.len());
            DeviceConfig::load_or_default(core::str::from_utf8(data).ok())
        }
        Ok(None) => DeviceConfig::load_or_default(None),
        Err(e) => {
            error!("Flash read error: {:?}", defmt::Debug2Format(&e));
            DeviceConfig::default()
        }
    }
}

/// Read the list stored under `key`; empty when absent or unreadable.
pub fn load_list<const L: usize, const N: usize>(flash: &mut Flash, key: u8) -> Vec<String<L>, N> {
    let mut buf = [0u8; LIST_BUFFER_SIZE];
    let stored = block_on(fetch_item::<u8, &[u8], _>(
        flash,
        flash_range(),
        &mut NoCache::new(),
        &mut buf,
        &key,
    ));

    match stored {
        Ok(Some(data)) => match core::str::from_utf8(data) {
            Ok(text) => {
                let list = parse_list(text);
                info!("Storage: list {=u8} has {} entries", key, list.len());
                list
            }
            Err(_) => {
                error!("Storage: list {=u8} is not UTF-8", key);
                Vec::new()
            }
        },
        Ok(None) => Vec::new(),
        Err(e) => {
            error!("Flash read error: {:?}", defmt::Debug2Format(&e));
            Vec::new()
        }
    }
}

/// Persist `config`.
pub fn save_config(flash: &mut Flash, config: &DeviceConfig) -> Result<(), Error> {
    let mut text: String<MAX_RECORD_SIZE> = String::new();
    config.write_to(&mut text).map_err(|_| Error::Storage)?;

    let mut buf = [0u8; WORK_BUFFER_SIZE];
    let item: &[u8] = text.as_bytes();
    block_on(store_item::<u8, &[u8], _>(
        flash,
        flash_range(),
        &mut NoCache::new(),
        &mut buf,
        &KEY_CONFIG,
        &item,
    ))
    .map_err(|e| {
        error!("Flash write error: {:?}", defmt::Debug2Format(&e));
        Error::Storage
    })?;

    info!("Storage: config saved");
    Ok(())
}
