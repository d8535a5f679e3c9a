use dialkeys::dial::{DialConfig, DialNotice, KeyMapMode};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};

#[cfg(feature = "letter-keys")]
pub(crate) const KEY_MAP_MODE: KeyMapMode = KeyMapMode::Letters;
#[cfg(not(feature = "letter-keys"))]
pub(crate) const KEY_MAP_MODE: KeyMapMode = KeyMapMode::Arrows;

pub(crate) const DIAL_CONFIG: DialConfig = DialConfig::DEFAULT.with_key_map(KEY_MAP_MODE);

pub(crate) const DIAL_POLL_MS: u64 = 1;
pub(crate) const HID_SETTLE_MS: u64 = 2;
pub(crate) const HID_WRITE_TIMEOUT_MS: u64 = 50;
pub(crate) const HID_POLL_MS: u8 = 1;
pub(crate) const HID_MAX_PACKET: u16 = 8;

pub(crate) const USB_VID: u16 = 0x303A;
pub(crate) const USB_PID: u16 = 0x8211;
pub(crate) const USB_MANUFACTURER: &str = "dialkeys";
pub(crate) const USB_PRODUCT: &str = "Dial Keyboard";
pub(crate) const USB_SERIAL: &str = "dialkeys-0001";

pub(crate) const PANEL_SPI_MHZ: u32 = 40;
pub(crate) const TOUCH_I2C_KHZ: u32 = 400;
pub(crate) const TOUCH_I2C_TIMEOUT_MS: u64 = 10;
pub(crate) const ENCODER_FILTER_CYCLES: u16 = 1000;

// Pin map (M5Dial):
//   power hold G46, button G42 (active low), encoder A/B G41/G40,
//   panel MOSI G5 SCLK G6 CS G7 DC G4 RST G8 BL G9,
//   touch SDA G11 SCL G12, USB D-/D+ G19/G20.

pub(crate) static DIAL_NOTICES: Channel<CriticalSectionRawMutex, DialNotice, 16> = Channel::new();
