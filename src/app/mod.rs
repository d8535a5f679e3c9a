pub(crate) mod config;
mod dial_task;
mod input;
mod render;
mod usb;

use dialkeys::drivers::{Ft3267, Gc9a01, TouchInitStatus};
use esp_hal::{
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    i2c::master::{Config as I2cConfig, I2c, SoftwareTimeout},
    otg_fs::{
        asynch::{Config as UsbDriverConfig, Driver},
        Usb,
    },
    pcnt::{
        channel::{CtrlMode, EdgeMode},
        Pcnt,
    },
    spi::{
        master::{Config as SpiConfig, Spi},
        Mode as SpiMode,
    },
    time::{Duration as HalDuration, Rate},
    timer::timg::TimerGroup,
};
use static_cell::StaticCell;

use self::{
    config::{ENCODER_FILTER_CYCLES, PANEL_SPI_MHZ, TOUCH_I2C_KHZ, TOUCH_I2C_TIMEOUT_MS},
    dial_task::DialContext,
    input::DialInputs,
    render::PanelRenderer,
    usb::UsbKeyboard,
};

static USB_EP_OUT_BUFFER: StaticCell<[u8; 1024]> = StaticCell::new();
static POWER_HOLD: StaticCell<Output<'static>> = StaticCell::new();

pub(crate) fn run() -> ! {
    let peripherals = esp_hal::init(esp_hal::Config::default());
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // The board powers down as soon as this line drops.
    POWER_HOLD.init(Output::new(
        peripherals.GPIO46,
        Level::High,
        OutputConfig::default(),
    ));

    let usb = Usb::new(peripherals.USB0, peripherals.GPIO20, peripherals.GPIO19);
    let driver = Driver::new(
        usb,
        USB_EP_OUT_BUFFER.init([0; 1024]),
        UsbDriverConfig::default(),
    );
    let (usb_device, hid_writer) = usb::build_keyboard(driver);

    let spi_cfg = SpiConfig::default()
        .with_frequency(Rate::from_mhz(PANEL_SPI_MHZ))
        .with_mode(SpiMode::_0);
    let spi = Spi::new(peripherals.SPI2, spi_cfg)
        .expect("failed to init SPI2 for panel")
        .with_sck(peripherals.GPIO6)
        .with_mosi(peripherals.GPIO5);
    let mut panel = Gc9a01::new(
        spi,
        Output::new(peripherals.GPIO4, Level::Low, OutputConfig::default()),
        Output::new(peripherals.GPIO7, Level::High, OutputConfig::default()),
        Output::new(peripherals.GPIO8, Level::High, OutputConfig::default()),
    );
    let mut delay = Delay::new();
    if let Err(err) = panel.init(&mut delay) {
        esp_println::println!("panel: init_failed err={:?}", err);
        halt_forever();
    }
    let backlight = Output::new(peripherals.GPIO9, Level::High, OutputConfig::default());

    let i2c_cfg = I2cConfig::default()
        .with_frequency(Rate::from_khz(TOUCH_I2C_KHZ))
        .with_software_timeout(SoftwareTimeout::Transaction(HalDuration::from_millis(
            TOUCH_I2C_TIMEOUT_MS,
        )));
    let i2c = I2c::new(peripherals.I2C0, i2c_cfg)
        .expect("failed to init I2C0 for touch")
        .with_sda(peripherals.GPIO11)
        .with_scl(peripherals.GPIO12);
    let mut touch = Ft3267::new(i2c);
    match touch.init() {
        Ok(TouchInitStatus::Ready { vendor_id }) => {
            esp_println::println!("touch: ready vendor_id={:#04x}", vendor_id)
        }
        Ok(TouchInitStatus::VendorMismatch { vendor_id }) => {
            esp_println::println!("touch: vendor_mismatch vendor_id={:#04x}", vendor_id)
        }
        Err(err) => esp_println::println!("touch: init_failed err={:?}", err),
    }

    let pcnt = Pcnt::new(peripherals.PCNT);
    let encoder = pcnt.unit0;
    encoder
        .set_filter(Some(ENCODER_FILTER_CYCLES))
        .expect("failed to set encoder filter");
    encoder.clear();
    let pin_a = Input::new(
        peripherals.GPIO41,
        InputConfig::default().with_pull(Pull::Up),
    );
    let pin_b = Input::new(
        peripherals.GPIO40,
        InputConfig::default().with_pull(Pull::Up),
    );
    let ch0 = &encoder.channel0;
    ch0.set_ctrl_signal(pin_a.peripheral_input());
    ch0.set_edge_signal(pin_b.peripheral_input());
    ch0.set_ctrl_mode(CtrlMode::Reverse, CtrlMode::Keep);
    ch0.set_input_mode(EdgeMode::Increment, EdgeMode::Decrement);
    let ch1 = &encoder.channel1;
    ch1.set_ctrl_signal(pin_b.peripheral_input());
    ch1.set_edge_signal(pin_a.peripheral_input());
    ch1.set_ctrl_mode(CtrlMode::Reverse, CtrlMode::Keep);
    ch1.set_input_mode(EdgeMode::Decrement, EdgeMode::Increment);
    encoder.resume();

    let button = Input::new(
        peripherals.GPIO42,
        InputConfig::default().with_pull(Pull::Up),
    );

    let context = DialContext {
        inputs: DialInputs::new(encoder, (pin_a, pin_b), button, touch),
        renderer: PanelRenderer::new(panel, backlight),
        keyboard: UsbKeyboard::new(hid_writer),
    };

    let mut executor = esp_rtos::embassy::Executor::new();
    let executor = unsafe { make_static(&mut executor) };
    executor.run(move |spawner| {
        spawner.must_spawn(usb::usb_task(usb_device));
        spawner.must_spawn(dial_task::notice_log_task());
        spawner.must_spawn(dial_task::dial_task(context));
    });
}

unsafe fn make_static<T>(value: &mut T) -> &'static mut T {
    unsafe { core::mem::transmute(value) }
}

fn halt_forever() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
