use dialkeys::{
    dial::{TouchZone, ZoneRenderer},
    drivers::Gc9a01,
    ui::draw_zones,
};
use esp_hal::{gpio::Output, spi::master::Spi, Blocking};

pub(crate) type Panel = Gc9a01<Spi<'static, Blocking>, Output<'static>, Output<'static>, Output<'static>>;

pub(crate) struct PanelRenderer {
    panel: Panel,
    _backlight: Output<'static>,
}

impl PanelRenderer {
    pub(crate) fn new(panel: Panel, backlight: Output<'static>) -> Self {
        Self {
            panel,
            _backlight: backlight,
        }
    }
}

impl ZoneRenderer for PanelRenderer {
    fn render_zones(&mut self, pressed: TouchZone, shift_locked: bool) {
        if let Err(err) = draw_zones(&mut self.panel, pressed, shift_locked) {
            esp_println::println!(
                "panel: render_failed zone={:?} locked={} err={:?}",
                pressed,
                shift_locked,
                err
            );
        }
    }
}
