use dialkeys::dial::{HidKey, HidSink, KeyReport};
use embassy_time::{with_timeout, Duration, Timer};
use embassy_usb::{
    class::hid::{self, HidWriter},
    Builder, UsbDevice,
};
use esp_hal::otg_fs::asynch::Driver;
use static_cell::StaticCell;
use usbd_hid::descriptor::{KeyboardReport, SerializedDescriptor};

use super::config::{
    HID_MAX_PACKET, HID_POLL_MS, HID_SETTLE_MS, HID_WRITE_TIMEOUT_MS, USB_MANUFACTURER,
    USB_PID, USB_PRODUCT, USB_SERIAL, USB_VID,
};

pub(crate) type UsbDriver = Driver<'static>;
pub(crate) type KeyboardWriter = HidWriter<'static, UsbDriver, 8>;

static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static HID_STATE: StaticCell<hid::State<'static>> = StaticCell::new();

pub(crate) fn build_keyboard(driver: UsbDriver) -> (UsbDevice<'static, UsbDriver>, KeyboardWriter) {
    let mut config = embassy_usb::Config::new(USB_VID, USB_PID);
    config.manufacturer = Some(USB_MANUFACTURER);
    config.product = Some(USB_PRODUCT);
    config.serial_number = Some(USB_SERIAL);
    config.max_power = 100;
    config.max_packet_size_0 = 64;

    let mut builder = Builder::new(
        driver,
        config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        MSOS_DESCRIPTOR.init([0; 256]),
        CONTROL_BUF.init([0; 64]),
    );

    let hid_config = hid::Config {
        report_descriptor: KeyboardReport::desc(),
        request_handler: None,
        poll_ms: HID_POLL_MS,
        max_packet_size: HID_MAX_PACKET,
    };
    let writer = HidWriter::<_, 8>::new(&mut builder, HID_STATE.init(hid::State::new()), hid_config);

    (builder.build(), writer)
}

#[embassy_executor::task]
pub(crate) async fn usb_task(mut device: UsbDevice<'static, UsbDriver>) {
    device.run().await;
}

/// Boot keyboard on the HID IN endpoint.
pub(crate) struct UsbKeyboard {
    writer: KeyboardWriter,
    report: KeyReport,
}

impl UsbKeyboard {
    pub(crate) fn new(writer: KeyboardWriter) -> Self {
        Self {
            writer,
            report: KeyReport::new(),
        }
    }

    async fn send(&mut self) {
        let report = KeyboardReport {
            modifier: self.report.wire_modifier(),
            reserved: 0,
            leds: 0,
            keycodes: self.report.keycodes,
        };

        match with_timeout(
            Duration::from_millis(HID_WRITE_TIMEOUT_MS),
            self.writer.write_serialize(&report),
        )
        .await
        {
            Ok(Ok(())) => {}
            Ok(Err(err)) => esp_println::println!("usb: hid_write_failed err={:?}", err),
            Err(_) => esp_println::println!("usb: hid_write_failed err=timeout"),
        }

        Timer::after(Duration::from_millis(HID_SETTLE_MS)).await;
    }
}

impl HidSink for UsbKeyboard {
    async fn press(&mut self, key: HidKey) {
        if let Err(err) = self.report.press(key) {
            esp_println::println!("usb: key_rejected key={:?} reason={:?}", key, err);
            return;
        }
        self.send().await;
    }

    async fn release(&mut self, key: HidKey) {
        if let Err(err) = self.report.release(key) {
            esp_println::println!("usb: key_rejected key={:?} reason={:?}", key, err);
            return;
        }
        self.send().await;
    }
}
