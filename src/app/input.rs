use dialkeys::{
    dial::{
        config::BUTTON_DEBOUNCE_MS, ButtonEdgeTracker, DialSample, EncoderCounter,
        TouchEdgeTracker, TouchReading,
    },
    drivers::Ft3267,
};
use esp_hal::{
    gpio::Input,
    i2c::master::I2c,
    pcnt::unit::Unit,
    Blocking,
};

pub(crate) type TouchController = Ft3267<I2c<'static, Blocking>>;

/// Raw dial peripherals plus the edge trackers that turn their levels into
/// one [`DialSample`] per poll.
pub(crate) struct DialInputs {
    encoder: Unit<'static, 0>,
    _encoder_pins: (Input<'static>, Input<'static>),
    counter: EncoderCounter,
    button: Input<'static>,
    button_edges: ButtonEdgeTracker,
    touch: TouchController,
    touch_edges: TouchEdgeTracker,
    touch_faulted: bool,
}

impl DialInputs {
    pub(crate) fn new(
        encoder: Unit<'static, 0>,
        encoder_pins: (Input<'static>, Input<'static>),
        button: Input<'static>,
        touch: TouchController,
    ) -> Self {
        Self {
            encoder,
            _encoder_pins: encoder_pins,
            counter: EncoderCounter::new(),
            button,
            button_edges: ButtonEdgeTracker::new(BUTTON_DEBOUNCE_MS),
            touch,
            touch_edges: TouchEdgeTracker::new(),
            touch_faulted: false,
        }
    }

    pub(crate) fn encoder_position(&mut self) -> i32 {
        self.counter.observe(self.encoder.value())
    }

    pub(crate) fn sample(&mut self, now_ms: u64) -> DialSample {
        let encoder_position = self.encoder_position();
        let button = self.button_edges.observe(now_ms, self.button.is_low());
        let touch = self.touch_edges.observe(self.read_touch());

        DialSample {
            now_ms,
            touch,
            encoder_position,
            button,
        }
    }

    fn read_touch(&mut self) -> TouchReading {
        match self.touch.read() {
            Ok(reading) => {
                if self.touch_faulted {
                    esp_println::println!("touch: read_recovered");
                    self.touch_faulted = false;
                }
                reading
            }
            Err(err) => {
                if !self.touch_faulted {
                    esp_println::println!("touch: read_failed err={:?}", err);
                    self.touch_faulted = true;
                }
                TouchReading::RELEASED
            }
        }
    }
}
